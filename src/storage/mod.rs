//! Storage layer for Dompet
//!
//! JSON files in the data directory, one per entity type, each fronted by an
//! in-memory repository. Writes are atomic and every mutation performed
//! through the services is also recorded in the audit log.

pub mod bills;
pub mod budgets;
pub mod chat_history;
pub mod file_io;
pub mod goals;
pub mod init;
pub mod notifications;
pub mod transactions;

pub use bills::BillRepository;
pub use budgets::BudgetRepository;
pub use chat_history::ChatHistoryRepository;
pub use file_io::{read_json, write_json_atomic};
pub use goals::GoalRepository;
pub use init::initialize_storage;
pub use notifications::NotificationRepository;
pub use transactions::TransactionRepository;

use serde::Serialize;
use tracing::debug;

use crate::audit::{generate_diff, AuditEntry, AuditLogger, EntityType};
use crate::config::paths::DompetPaths;
use crate::error::{DompetError, DompetResult};

pub(crate) fn lock_error<E: std::fmt::Display>(e: E) -> DompetError {
    DompetError::Storage(format!("Repository lock poisoned: {}", e))
}

/// Coordinates access to every repository and the audit log
pub struct Storage {
    paths: DompetPaths,
    audit: AuditLogger,
    pub transactions: TransactionRepository,
    pub budgets: BudgetRepository,
    pub goals: GoalRepository,
    pub bills: BillRepository,
    pub notifications: NotificationRepository,
    pub chat_history: ChatHistoryRepository,
}

impl Storage {
    pub fn new(paths: DompetPaths) -> Result<Self, DompetError> {
        paths.ensure_directories()?;

        Ok(Self {
            audit: AuditLogger::new(paths.audit_log()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            budgets: BudgetRepository::new(paths.budgets_file()),
            goals: GoalRepository::new(paths.goals_file()),
            bills: BillRepository::new(paths.bills_file()),
            notifications: NotificationRepository::new(paths.notifications_file()),
            chat_history: ChatHistoryRepository::new(paths.chat_history_file()),
            paths,
        })
    }

    pub fn paths(&self) -> &DompetPaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), DompetError> {
        self.transactions.load()?;
        self.budgets.load()?;
        self.goals.load()?;
        self.bills.load()?;
        self.notifications.load()?;
        self.chat_history.load()?;
        debug!(
            base_dir = %self.paths.base_dir().display(),
            transactions = self.transactions.count()?,
            "storage loaded"
        );
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), DompetError> {
        self.transactions.save()?;
        self.budgets.save()?;
        self.goals.save()?;
        self.bills.save()?;
        self.notifications.save()?;
        self.chat_history.save()?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> DompetResult<()> {
        let entry = AuditEntry::create(entity_type, entity_id, entity_name, entity);
        self.audit.log(&entry)
    }

    /// Record an update; the diff summary is computed when not supplied
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
        diff_summary: Option<String>,
    ) -> DompetResult<()> {
        let diff_summary = diff_summary.or_else(|| {
            let before = serde_json::to_value(before).ok()?;
            let after = serde_json::to_value(after).ok()?;
            generate_diff(&before, &after)
        });
        let entry = AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
            diff_summary,
        );
        self.audit.log(&entry)
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> DompetResult<()> {
        let entry = AuditEntry::delete(entity_type, entity_id, entity_name, entity);
        self.audit.log(&entry)
    }
}
