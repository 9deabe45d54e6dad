//! Transaction CLI commands
//!
//! Implements CLI commands for transaction management.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_transaction_details, format_transaction_table};
use crate::error::{DompetError, DompetResult};
use crate::models::{normalize_category, Transaction, TransactionKind};
use crate::services::{
    CreateTransactionInput, TransactionFilter, TransactionService, UpdateTransactionInput,
};
use crate::storage::Storage;

use super::{
    announce_notifications, parse_date, parse_date_or_today, parse_money, parse_month_or_current,
};

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record a transaction
    Add {
        /// income or expense
        kind: TransactionKind,
        /// Amount (e.g. "25000", "25.000", "Rp 1.250.000")
        amount: String,
        /// Category name
        category: String,
        /// Description
        #[arg(short = 'm', long)]
        description: Option<String>,
        /// Transaction date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
    },
    /// List transactions, newest first
    List {
        /// Only this month (YYYY-MM, "current", "last")
        #[arg(short = 'M', long, conflicts_with_all = ["from", "to"])]
        month: Option<String>,
        /// income or expense
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionKind>,
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,
        /// Text to search in descriptions and categories
        #[arg(short, long)]
        search: Option<String>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
        /// Number of transactions to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },
    /// Show transaction details
    Show {
        /// Transaction ID
        id: String,
    },
    /// Edit a transaction
    Edit {
        /// Transaction ID
        id: String,
        /// New type
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionKind>,
        /// New amount
        #[arg(short, long)]
        amount: Option<String>,
        /// New category
        #[arg(short, long)]
        category: Option<String>,
        /// New description
        #[arg(short = 'm', long)]
        description: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: String,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransactionCommands,
) -> DompetResult<()> {
    let service = TransactionService::new(storage);

    match cmd {
        TransactionCommands::Add {
            kind,
            amount,
            category,
            description,
            date,
        } => {
            let category = normalize_category(kind, &category)
                .ok_or_else(|| DompetError::Validation("Category is required".into()))?;
            let mut input = CreateTransactionInput::new(
                kind,
                parse_money(&amount)?,
                category,
                parse_date_or_today(date.as_deref())?,
            );
            if let Some(description) = description {
                input = input.description(description);
            }

            let txn = service.create(input)?;
            println!("Recorded {} {} ({})", txn.kind.label(), txn.amount, txn.category);
            println!("  ID: {}", txn.id);
            announce_notifications(storage, settings)?;
        }

        TransactionCommands::List {
            month,
            kind,
            category,
            search,
            from,
            to,
            limit,
        } => {
            let mut filter = TransactionFilter::new().limit(limit);
            if let Some(kind) = kind {
                filter = filter.kind(kind);
            }
            if let Some(category) = category {
                filter = filter.category(category);
            }
            if let Some(search) = search {
                filter = filter.search(search);
            }
            if from.is_some() || to.is_some() {
                let start = from.as_deref().map(parse_date).transpose()?;
                let end = to.as_deref().map(parse_date).transpose()?;
                filter = filter.date_range(
                    start.unwrap_or(chrono::NaiveDate::MIN),
                    end.unwrap_or(chrono::NaiveDate::MAX),
                );
            } else if month.is_some() {
                let month = parse_month_or_current(month.as_deref())?;
                filter = filter.date_range(month.start_date(), month.end_date());
            }

            let transactions = service.list(filter)?;
            print!("{}", format_transaction_table(&transactions));
        }

        TransactionCommands::Show { id } => {
            let txn = find_transaction(&service, &id)?;
            let goal_name = match txn.goal_id {
                Some(goal_id) => storage.goals.get(goal_id)?.map(|g| g.name),
                None => None,
            };
            let bill_name = match txn.bill_id {
                Some(bill_id) => storage.bills.get(bill_id)?.map(|b| b.name),
                None => None,
            };
            print!(
                "{}",
                format_transaction_details(&txn, goal_name.as_deref(), bill_name.as_deref())
            );
        }

        TransactionCommands::Edit {
            id,
            kind,
            amount,
            category,
            description,
            date,
        } => {
            let txn = find_transaction(&service, &id)?;
            let input = UpdateTransactionInput {
                kind,
                amount: amount.as_deref().map(parse_money).transpose()?,
                category,
                description,
                date: date.as_deref().map(parse_date).transpose()?,
            };
            if input.kind.is_none()
                && input.amount.is_none()
                && input.category.is_none()
                && input.description.is_none()
                && input.date.is_none()
            {
                println!("Nothing to change.");
                return Ok(());
            }

            let updated = service.update(txn.id, input)?;
            println!("Updated transaction {}", updated.id);
            announce_notifications(storage, settings)?;
        }

        TransactionCommands::Delete { id } => {
            let txn = find_transaction(&service, &id)?;
            let deleted = service.delete(txn.id)?;
            println!("Deleted: {}", deleted);
        }
    }

    Ok(())
}

fn find_transaction(service: &TransactionService, id: &str) -> DompetResult<Transaction> {
    service
        .find(id)?
        .ok_or_else(|| DompetError::transaction_not_found(id))
}
