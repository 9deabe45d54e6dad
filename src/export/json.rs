//! JSON Export functionality
//!
//! Exports the complete dataset to JSON format with schema versioning.

use crate::error::{DompetError, DompetResult};
use crate::models::{Bill, Budget, Goal, Notification, Transaction};
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full dataset export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub transactions: Vec<Transaction>,

    pub budgets: Vec<Budget>,

    pub goals: Vec<Goal>,

    pub bills: Vec<Bill>,

    pub notifications: Vec<Notification>,

    /// Export metadata
    pub metadata: ExportMetadata,
}

/// Export metadata for reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub transaction_count: usize,
    pub budget_count: usize,
    pub goal_count: usize,
    pub bill_count: usize,

    /// Date range of transactions (earliest)
    pub earliest_transaction: Option<String>,

    /// Date range of transactions (latest)
    pub latest_transaction: Option<String>,
}

impl FullExport {
    /// Create a new full export from storage
    pub fn from_storage(storage: &Storage) -> DompetResult<Self> {
        let transactions = storage.transactions.get_all()?;
        let budgets = storage.budgets.get_all()?;
        let goals = storage.goals.get_all()?;
        let bills = storage.bills.get_all()?;
        let notifications = storage.notifications.get_all()?;

        let earliest_transaction = transactions
            .iter()
            .map(|t| t.date)
            .min()
            .map(|d| d.to_string());

        let latest_transaction = transactions
            .iter()
            .map(|t| t.date)
            .max()
            .map(|d| d.to_string());

        let metadata = ExportMetadata {
            transaction_count: transactions.len(),
            budget_count: budgets.len(),
            goal_count: goals.len(),
            bill_count: bills.len(),
            earliest_transaction,
            latest_transaction,
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            transactions,
            budgets,
            goals,
            bills,
            notifications,
            metadata,
        })
    }

    /// Validate the export structure
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        let goal_ids: HashSet<_> = self.goals.iter().map(|g| g.id).collect();
        let bill_ids: HashSet<_> = self.bills.iter().map(|b| b.id).collect();

        let mut seen = HashSet::new();
        for txn in &self.transactions {
            if !seen.insert(txn.id) {
                return Err(format!("Duplicate transaction {}", txn.id));
            }
            if let Err(e) = txn.validate() {
                return Err(format!("Transaction {} is invalid: {}", txn.id, e));
            }
            if let Some(goal_id) = txn.goal_id {
                if !goal_ids.contains(&goal_id) {
                    return Err(format!(
                        "Transaction {} references unknown goal {}",
                        txn.id, goal_id
                    ));
                }
            }
            if let Some(bill_id) = txn.bill_id {
                if !bill_ids.contains(&bill_id) {
                    return Err(format!(
                        "Transaction {} references unknown bill {}",
                        txn.id, bill_id
                    ));
                }
            }
        }

        let mut budget_keys = HashSet::new();
        for budget in &self.budgets {
            if !budget_keys.insert((budget.category.to_lowercase(), budget.month)) {
                return Err(format!(
                    "Duplicate budget for {} in {}",
                    budget.category, budget.month
                ));
            }
        }

        Ok(())
    }
}

/// Export the full dataset to JSON
pub fn export_full_json<W: Write>(storage: &Storage, writer: W, pretty: bool) -> DompetResult<()> {
    let export = FullExport::from_storage(storage)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| DompetError::Export(e.to_string()))?;

    Ok(())
}

/// Parse and validate a JSON export
pub fn import_from_json(json_str: &str) -> DompetResult<FullExport> {
    let export: FullExport = serde_json::from_str(json_str)
        .map_err(|e| DompetError::Validation(format!("Invalid export file: {}", e)))?;

    export.validate().map_err(DompetError::Validation)?;

    Ok(export)
}
