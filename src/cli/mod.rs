//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod ai;
pub mod audit;
pub mod backup;
pub mod bill;
pub mod budget;
pub mod chat;
pub mod export;
pub mod goal;
pub mod notify;
pub mod report;
pub mod summary;
pub mod transaction;

pub use ai::{handle_ai_command, AiCommands};
pub use audit::handle_audit_command;
pub use backup::{handle_backup_command, BackupCommands};
pub use bill::{handle_bill_command, BillCommands};
pub use budget::{handle_budget_command, BudgetCommands};
pub use chat::{handle_chat_command, ChatArgs};
pub use export::{handle_export_command, ExportCommands};
pub use goal::{handle_goal_command, GoalCommands};
pub use notify::{handle_notify_command, NotifyCommands};
pub use report::{handle_report_command, ReportCommands};
pub use summary::handle_summary_command;
pub use transaction::{handle_transaction_command, TransactionCommands};

use chrono::{Local, NaiveDate};

use crate::config::settings::Settings;
use crate::error::{DompetError, DompetResult};
use crate::models::{Money, Month};
use crate::services::NotificationService;
use crate::storage::Storage;

/// Today's date in local time
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn parse_money(s: &str) -> DompetResult<Money> {
    let amount =
        Money::parse(s).map_err(|e| DompetError::Validation(format!("Invalid amount: {}", e)))?;
    if !amount.is_positive() {
        return Err(DompetError::Validation(format!(
            "Amount must be positive: {}",
            s
        )));
    }
    Ok(amount)
}

pub(crate) fn parse_date(s: &str) -> DompetResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| DompetError::Validation(format!("Invalid date: {}. Use YYYY-MM-DD", s)))
}

pub(crate) fn parse_date_or_today(s: Option<&str>) -> DompetResult<NaiveDate> {
    s.map(parse_date).transpose().map(|d| d.unwrap_or_else(today))
}

pub(crate) fn parse_month_or_current(s: Option<&str>) -> DompetResult<Month> {
    match s {
        Some(s) => Month::parse(s).map_err(DompetError::Validation),
        None => Ok(Month::containing(today())),
    }
}

/// Run the notification rules and print anything new
pub(crate) fn announce_notifications(storage: &Storage, settings: &Settings) -> DompetResult<()> {
    let created = NotificationService::new(storage, &settings.notifications).generate(today())?;
    for notification in &created {
        println!("{} {}", notification.kind.icon(), notification.message);
    }
    Ok(())
}
