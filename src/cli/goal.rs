//! Savings goal CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_goal_details, format_goal_table};
use crate::error::DompetResult;
use crate::models::TransactionSource;
use crate::services::{GoalService, TransactionFilter, TransactionService, UpdateGoalInput};
use crate::storage::Storage;

use super::{announce_notifications, parse_date, parse_date_or_today, parse_money, today};

/// Goal subcommands
#[derive(Subcommand)]
pub enum GoalCommands {
    /// Create a savings goal
    Add {
        /// Goal name
        name: String,
        /// Target amount
        target: String,
        /// Target date (YYYY-MM-DD)
        #[arg(short, long)]
        by: String,
        /// Amount already saved
        #[arg(short, long)]
        initial: Option<String>,
    },

    /// List goals
    List {
        /// Include completed goals
        #[arg(short, long)]
        all: bool,
    },

    /// Show a goal with its history
    Show {
        /// Goal name or ID
        goal: String,
    },

    /// Put money into a goal
    Contribute {
        /// Goal name or ID
        goal: String,
        amount: String,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Take money out of a goal
    Withdraw {
        /// Goal name or ID
        goal: String,
        amount: String,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Change a goal
    Edit {
        /// Goal name or ID
        goal: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        target: Option<String>,
        /// New target date (YYYY-MM-DD)
        #[arg(short, long)]
        by: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a goal (its transactions are kept)
    Delete {
        /// Goal name or ID
        goal: String,
    },
}

/// Handle a goal command
pub fn handle_goal_command(
    storage: &Storage,
    settings: &Settings,
    cmd: GoalCommands,
) -> DompetResult<()> {
    let service = GoalService::new(storage);
    let today = today();

    match cmd {
        GoalCommands::Add {
            name,
            target,
            by,
            initial,
        } => {
            let initial = initial.as_deref().map(parse_money).transpose()?;
            let goal = service.create(
                &name,
                parse_money(&target)?,
                parse_date(&by)?,
                initial,
                today,
            )?;
            println!("Created goal '{}' ({})", goal.name, goal.id);
            println!(
                "Save {} per month to reach {} by {}",
                goal.monthly_required(today),
                goal.target_amount,
                goal.target_date
            );
        }

        GoalCommands::List { all } => {
            let goals = service.list(all)?;
            print!("{}", format_goal_table(&goals, today));
        }

        GoalCommands::Show { goal } => {
            let goal = service.resolve(&goal)?;
            let history = TransactionService::new(storage)
                .list(TransactionFilter::new().goal(goal.id).limit(10))?;
            print!("{}", format_goal_details(&goal, &history, today));
        }

        GoalCommands::Contribute { goal, amount, date } => {
            let goal = service.resolve(&goal)?;
            let (txn, goal) = service.contribute(
                goal.id,
                parse_money(&amount)?,
                parse_date_or_today(date.as_deref())?,
                TransactionSource::Manual,
            )?;
            println!(
                "Saved {} toward '{}': {} of {} ({:.1}%)",
                txn.amount,
                goal.name,
                goal.current_amount,
                goal.target_amount,
                goal.progress_percent()
            );
            announce_notifications(storage, settings)?;
        }

        GoalCommands::Withdraw { goal, amount, date } => {
            let goal = service.resolve(&goal)?;
            let (txn, goal) = service.withdraw(
                goal.id,
                parse_money(&amount)?,
                parse_date_or_today(date.as_deref())?,
                TransactionSource::Manual,
            )?;
            println!(
                "Withdrew {} from '{}': {} left",
                txn.amount, goal.name, goal.current_amount
            );
        }

        GoalCommands::Edit {
            goal,
            name,
            target,
            by,
            notes,
        } => {
            let goal = service.resolve(&goal)?;
            let input = UpdateGoalInput {
                name,
                target_amount: target.as_deref().map(parse_money).transpose()?,
                target_date: by.as_deref().map(parse_date).transpose()?,
                notes,
            };
            let updated = service.update(goal.id, input)?;
            println!("Updated goal '{}'", updated.name);
            announce_notifications(storage, settings)?;
        }

        GoalCommands::Delete { goal } => {
            let goal = service.resolve(&goal)?;
            let deleted = service.delete(goal.id)?;
            println!("Deleted goal '{}'", deleted.name);
        }
    }

    Ok(())
}
