//! Recurring bill CLI commands

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_bill_details, format_bill_table};
use crate::error::DompetResult;
use crate::models::{BillFrequency, TransactionSource};
use crate::services::{BillService, CreateBillInput, UpdateBillInput};
use crate::storage::Storage;

use super::{announce_notifications, parse_date, parse_date_or_today, parse_money, today};

/// Bill subcommands
#[derive(Subcommand)]
pub enum BillCommands {
    /// Add a bill
    Add {
        /// Bill name
        name: String,
        /// Amount due
        amount: String,
        /// Next due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: String,
        /// once, weekly, monthly or yearly
        #[arg(short, long, default_value = "monthly")]
        frequency: BillFrequency,
        /// Expense category used when paying
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// List bills
    List {
        /// Include inactive bills
        #[arg(short, long)]
        all: bool,
    },

    /// Show bill details
    Show {
        /// Bill name or ID
        bill: String,
    },

    /// Pay a bill and record the expense
    Pay {
        /// Bill name or ID
        bill: String,
        /// Amount actually paid, defaults to the bill amount
        #[arg(short, long)]
        amount: Option<String>,
        /// Payment date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Change a bill
    Edit {
        /// Bill name or ID
        bill: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        amount: Option<String>,
        /// Next due date (YYYY-MM-DD)
        #[arg(short, long)]
        due: Option<String>,
        #[arg(short, long)]
        frequency: Option<BillFrequency>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Reactivate or deactivate the bill
        #[arg(long)]
        active: Option<bool>,
    },

    /// Delete a bill (past payments are kept)
    Delete {
        /// Bill name or ID
        bill: String,
    },

    /// Bills due within the next days, overdue first
    Upcoming {
        /// Days ahead to look
        #[arg(short, long, default_value = "7")]
        days: i64,
    },
}

/// Handle a bill command
pub fn handle_bill_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BillCommands,
) -> DompetResult<()> {
    let service = BillService::new(storage);
    let today = today();
    let reminder_days = settings.notifications.bill_reminder_days;

    match cmd {
        BillCommands::Add {
            name,
            amount,
            due,
            frequency,
            category,
            notes,
        } => {
            let bill = service.create(CreateBillInput {
                name,
                amount: parse_money(&amount)?,
                due_date: parse_date(&due)?,
                frequency,
                category,
                notes,
            })?;
            println!(
                "Added bill '{}' ({} {}, due {})",
                bill.name, bill.amount, bill.frequency, bill.due_date
            );
            announce_notifications(storage, settings)?;
        }

        BillCommands::List { all } => {
            let bills = service.list(all)?;
            print!("{}", format_bill_table(&bills, today, reminder_days));
        }

        BillCommands::Show { bill } => {
            let bill = service.resolve(&bill)?;
            print!("{}", format_bill_details(&bill, today, reminder_days));
        }

        BillCommands::Pay { bill, amount, date } => {
            let bill = service.resolve(&bill)?;
            let amount = amount.as_deref().map(parse_money).transpose()?;
            let (txn, bill) = service.pay(
                bill.id,
                parse_date_or_today(date.as_deref())?,
                amount,
                TransactionSource::Manual,
            )?;
            println!("Paid '{}': {} ({})", bill.name, txn.amount, txn.category);
            if bill.active {
                println!("Next due: {}", bill.due_date);
            } else {
                println!("Bill is now inactive.");
            }
            announce_notifications(storage, settings)?;
        }

        BillCommands::Edit {
            bill,
            name,
            amount,
            due,
            frequency,
            category,
            notes,
            active,
        } => {
            let bill = service.resolve(&bill)?;
            let input = UpdateBillInput {
                name,
                amount: amount.as_deref().map(parse_money).transpose()?,
                due_date: due.as_deref().map(parse_date).transpose()?,
                frequency,
                category,
                notes,
                active,
            };
            let updated = service.update(bill.id, input)?;
            println!("Updated bill '{}'", updated.name);
            announce_notifications(storage, settings)?;
        }

        BillCommands::Delete { bill } => {
            let bill = service.resolve(&bill)?;
            let deleted = service.delete(bill.id)?;
            println!("Deleted bill '{}'", deleted.name);
        }

        BillCommands::Upcoming { days } => {
            let bills = service.upcoming(today, days)?;
            if bills.is_empty() {
                println!("No bills due in the next {} day(s).", days);
            } else {
                print!("{}", format_bill_table(&bills, today, reminder_days));
            }
        }
    }

    Ok(())
}
