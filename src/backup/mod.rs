//! Backup system for Dompet
//!
//! Rolling backups with configurable retention policies and restore.
//!
//! # Backup Format
//!
//! Backups are JSON files named `backup-YYYYMMDD-HHMMSS-mmm.json` holding:
//! - `schema_version`: Version for migration support
//! - `created_at`: Timestamp when backup was created
//! - `sections`: raw contents of each entity file (transactions, budgets,
//!   goals, bills, notifications, chat history)
//!
//! # Retention Policy
//!
//! The first backup of each calendar month counts as a monthly backup.
//! By default the system keeps 30 daily and 12 monthly backups.
//!
//! # Example
//!
//! ```rust,ignore
//! use dompet::backup::{BackupManager, RestoreManager};
//! use dompet::config::{paths::DompetPaths, settings::BackupRetention};
//!
//! let paths = DompetPaths::new()?;
//! let backup_manager = BackupManager::new(paths.clone(), BackupRetention::default());
//! let (backup_path, _pruned) = backup_manager.create_backup_with_retention()?;
//!
//! let restore_manager = RestoreManager::new(paths);
//! let result = restore_manager.restore_from_file(&backup_path)?;
//! println!("{}", result.summary());
//! ```

mod manager;
mod restore;

pub use manager::{BackupArchive, BackupInfo, BackupManager, BACKUP_SCHEMA_VERSION};
pub use restore::{RestoreManager, RestoreResult, ValidationResult};
