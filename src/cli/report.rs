//! CLI commands for reports
//!
//! The monthly report (terminal or printable markdown) and spending by
//! category over a date range.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::error::{DompetError, DompetResult};
use crate::export::{default_report_filename, export_monthly_report};
use crate::models::Month;
use crate::reports::{MonthlyReport, SpendingReport};
use crate::storage::Storage;

use super::{parse_date, parse_month_or_current, today};

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Monthly report: income, expenses, budgets, goals and bills
    Monthly {
        /// Report month (YYYY-MM, "current", "last")
        #[arg(short, long)]
        month: Option<String>,

        /// Write a printable markdown report instead of printing
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the markdown report to the default file name
        #[arg(long, conflicts_with = "output")]
        save: bool,
    },

    /// Spending by category
    Spending {
        /// Start date (YYYY-MM-DD), defaults to the first of this month
        #[arg(long, conflicts_with = "month")]
        from: Option<String>,

        /// End date (YYYY-MM-DD), defaults to today
        #[arg(long, conflicts_with = "month")]
        to: Option<String>,

        /// Whole month (YYYY-MM) instead of a date range
        #[arg(short, long)]
        month: Option<String>,

        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show top N categories only
        #[arg(long)]
        top: Option<usize>,
    },
}

/// Handle report commands
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ReportCommands,
) -> DompetResult<()> {
    match cmd {
        ReportCommands::Monthly {
            month,
            output,
            save,
        } => {
            let month = parse_month_or_current(month.as_deref())?;
            let output = match output {
                Some(path) => Some(path),
                None if save => Some(PathBuf::from(default_report_filename(month))),
                None => None,
            };

            match output {
                Some(path) => {
                    let path = export_monthly_report(storage, month, settings, &path)?;
                    println!("Report for {} written to {}", month.display_name(), path.display());
                }
                None => {
                    let report = MonthlyReport::generate(storage, month, settings)?;
                    println!("{}", report.format_terminal());
                }
            }
            Ok(())
        }

        ReportCommands::Spending {
            from,
            to,
            month,
            output,
            top,
        } => {
            let (start, end) = match month {
                Some(month) => {
                    let month = Month::parse(&month).map_err(DompetError::Validation)?;
                    (month.start_date(), month.end_date())
                }
                None => {
                    let today = today();
                    let start = match from {
                        Some(s) => parse_date(&s)?,
                        None => Month::containing(today).start_date(),
                    };
                    let end = match to {
                        Some(s) => parse_date(&s)?,
                        None => today,
                    };
                    (start, end)
                }
            };

            let report = SpendingReport::generate(storage, start, end)?;

            if let Some(path) = output {
                let file = File::create(&path).map_err(|e| {
                    DompetError::Export(format!("Failed to create file {}: {}", path.display(), e))
                })?;
                report.export_csv(BufWriter::new(file))?;
                println!("Spending report exported to: {}", path.display());
            } else if let Some(n) = top {
                println!("Top {} spending categories: {} to {}\n", n, start, end);
                println!("{:<30} {:>16} {:>8}", "Category", "Amount", "%");
                println!("{}", "-".repeat(56));
                for category in report.top_categories(n) {
                    println!(
                        "{:<30} {:>16} {:>7.1}%",
                        category.category,
                        category.amount.to_string(),
                        category.percent
                    );
                }
                println!("\nTotal spending: {}", report.total_spending);
            } else {
                println!("{}", report.format_terminal());
            }
            Ok(())
        }
    }
}
