//! Budget CLI commands
//!
//! Monthly spending limits per category.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::format_budget_table;
use crate::error::{DompetError, DompetResult};
use crate::services::BudgetService;
use crate::storage::Storage;

use super::{announce_notifications, parse_money, parse_month_or_current};

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set (create or change) the limit for a category
    Set {
        /// Category name
        category: String,
        /// Monthly limit
        amount: String,
        /// Budget month (YYYY-MM, "current", "last")
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Show budgets with spending for a month
    List {
        /// Budget month (YYYY-MM, "current", "last")
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Remove a budget
    Delete {
        /// Category name or budget ID
        category: String,
        /// Budget month (YYYY-MM, "current", "last")
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Copy last month's budgets into a month that lacks them
    Copy {
        /// Target month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BudgetCommands,
) -> DompetResult<()> {
    let service = BudgetService::new(storage, settings.notifications.budget_warning_percent);

    match cmd {
        BudgetCommands::Set {
            category,
            amount,
            month,
        } => {
            let month = parse_month_or_current(month.as_deref())?;
            let budget = service.set(&category, month, parse_money(&amount)?)?;
            println!(
                "Budget for '{}' in {}: {}",
                budget.category,
                month.display_name(),
                budget.amount
            );

            if let Some(status) = service.status_for(&budget.category, month)? {
                println!(
                    "Spent so far: {} ({:.1}%), remaining {}",
                    status.spent, status.percent_used, status.remaining
                );
            }
            announce_notifications(storage, settings)?;
        }

        BudgetCommands::List { month } => {
            let month = parse_month_or_current(month.as_deref())?;
            println!("Budgets: {}", month.display_name());
            println!("{}", "=".repeat(60));
            print!("{}", format_budget_table(&service.status(month)?));
        }

        BudgetCommands::Delete { category, month } => {
            let month = parse_month_or_current(month.as_deref())?;
            let budget = service.resolve(&category, month)?.ok_or_else(|| {
                DompetError::budget_not_found(format!("{} {}", category, month))
            })?;
            service.delete(budget.id)?;
            println!(
                "Deleted budget for '{}' in {}",
                budget.category,
                month.display_name()
            );
        }

        BudgetCommands::Copy { month } => {
            let month = parse_month_or_current(month.as_deref())?;
            let created = service.copy_from_previous(month)?;
            if created == 0 {
                println!(
                    "Nothing to copy from {} into {}.",
                    month.prev().display_name(),
                    month.display_name()
                );
            } else {
                println!(
                    "Copied {} budget(s) from {} into {}.",
                    created,
                    month.prev().display_name(),
                    month.display_name()
                );
            }
        }
    }

    Ok(())
}
