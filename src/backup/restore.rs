//! Backup restoration for Dompet

use std::fs;
use std::path::Path;

use tracing::info;

use crate::config::paths::DompetPaths;
use crate::error::{DompetError, DompetResult};
use crate::storage::file_io::write_json_atomic;

use super::manager::{BackupArchive, BACKUP_SCHEMA_VERSION, SECTIONS};

/// Handles restoring from backups
pub struct RestoreManager {
    paths: DompetPaths,
}

impl RestoreManager {
    pub fn new(paths: DompetPaths) -> Self {
        Self { paths }
    }

    /// Restore data from a backup file
    ///
    /// Overwrites current entity files with the archive contents. Sections
    /// missing from the archive leave the current file untouched.
    pub fn restore_from_file(&self, backup_path: &Path) -> DompetResult<RestoreResult> {
        let archive = read_archive(backup_path)?;
        let validation = validate_archive(&archive);
        if !validation.is_valid {
            return Err(DompetError::Backup(format!(
                "Backup is not valid: {}",
                validation.summary()
            )));
        }
        self.restore_from_archive(&archive)
    }

    pub fn restore_from_archive(&self, archive: &BackupArchive) -> DompetResult<RestoreResult> {
        self.paths.ensure_directories()?;

        let mut result = RestoreResult {
            schema_version: archive.schema_version,
            backup_date: archive.created_at,
            restored: Vec::new(),
        };

        for (name, file) in SECTIONS {
            match archive.sections.get(*name) {
                Some(value) if value.is_object() => {
                    write_json_atomic(file(&self.paths), value)?;
                    result.restored.push((*name).to_string());
                }
                _ => {}
            }
        }

        info!(sections = result.restored.len(), "backup restored");
        Ok(result)
    }

    /// Validate a backup file without restoring it
    pub fn validate_backup(&self, backup_path: &Path) -> DompetResult<ValidationResult> {
        Ok(validate_archive(&read_archive(backup_path)?))
    }
}

fn read_archive(path: &Path) -> DompetResult<BackupArchive> {
    let contents = fs::read_to_string(path)
        .map_err(|e| DompetError::Backup(format!("Failed to read backup file: {}", e)))?;

    serde_json::from_str(&contents)
        .map_err(|e| DompetError::Backup(format!("Failed to parse backup file: {}", e)))
}

fn validate_archive(archive: &BackupArchive) -> ValidationResult {
    let mut present = Vec::new();
    let mut missing = Vec::new();
    let mut malformed = Vec::new();

    for (name, _) in SECTIONS {
        match archive.sections.get(*name) {
            Some(value) if value.is_object() => present.push((*name).to_string()),
            None | Some(serde_json::Value::Null) => missing.push((*name).to_string()),
            Some(_) => malformed.push((*name).to_string()),
        }
    }

    ValidationResult {
        is_valid: archive.schema_version <= BACKUP_SCHEMA_VERSION && malformed.is_empty(),
        schema_version: archive.schema_version,
        backup_date: archive.created_at,
        present,
        missing,
        malformed,
    }
}

/// Result of a restore operation
#[derive(Debug)]
pub struct RestoreResult {
    pub schema_version: u32,
    pub backup_date: chrono::DateTime<chrono::Utc>,
    /// Section names written back to disk
    pub restored: Vec<String>,
}

impl RestoreResult {
    pub fn all_restored(&self) -> bool {
        self.restored.len() == SECTIONS.len()
    }

    pub fn summary(&self) -> String {
        format!("Restored: {}", self.restored.join(", "))
    }
}

/// Result of validating a backup
#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub schema_version: u32,
    pub backup_date: chrono::DateTime<chrono::Utc>,
    pub present: Vec<String>,
    pub missing: Vec<String>,
    /// Sections that exist but are not JSON objects
    pub malformed: Vec<String>,
}

impl ValidationResult {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.malformed.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.schema_version > BACKUP_SCHEMA_VERSION {
            return format!(
                "Unsupported backup version v{} (newest supported is v{})",
                self.schema_version, BACKUP_SCHEMA_VERSION
            );
        }
        if !self.malformed.is_empty() {
            return format!(
                "Corrupt backup (v{}): malformed {}",
                self.schema_version,
                self.malformed.join(", ")
            );
        }
        if self.missing.is_empty() {
            format!("Complete backup (v{})", self.schema_version)
        } else {
            format!(
                "Partial backup (v{}): has {}, missing {}",
                self.schema_version,
                self.present.join(", "),
                self.missing.join(", ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::manager::BackupManager;
    use crate::config::settings::BackupRetention;
    use crate::models::{Money, Transaction};
    use crate::storage::init::initialize_storage;
    use crate::storage::Storage;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_env() -> (RestoreManager, BackupManager, DompetPaths, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = DompetPaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths).unwrap();

        let backup_manager = BackupManager::new(paths.clone(), BackupRetention::default());
        let restore_manager = RestoreManager::new(paths.clone());

        (restore_manager, backup_manager, paths, temp_dir)
    }

    #[test]
    fn test_restore_brings_back_data() {
        let (restore_manager, backup_manager, paths, _temp) = create_test_env();

        let mut storage = Storage::new(paths.clone()).unwrap();
        storage.load_all().unwrap();
        storage
            .transactions
            .upsert(Transaction::expense(
                Money::from_rupiah(15_000),
                "Transportasi",
                NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            ))
            .unwrap();
        storage.transactions.save().unwrap();

        let backup_path = backup_manager.create_backup().unwrap();

        fs::remove_dir_all(paths.data_dir()).unwrap();

        let result = restore_manager.restore_from_file(&backup_path).unwrap();
        assert!(result.all_restored());
        assert!(result.summary().contains("transactions"));

        let mut reloaded = Storage::new(paths).unwrap();
        reloaded.load_all().unwrap();
        assert_eq!(reloaded.transactions.count().unwrap(), 1);
    }

    #[test]
    fn test_validate_backup() {
        let (restore_manager, backup_manager, _paths, _temp) = create_test_env();
        let backup_path = backup_manager.create_backup().unwrap();

        let result = restore_manager.validate_backup(&backup_path).unwrap();
        assert!(result.is_valid);
        assert!(result.is_complete());
        assert!(result.summary().contains("Complete backup"));
    }

    #[test]
    fn test_rejects_malformed_section() {
        let (restore_manager, _backup_manager, paths, temp) = create_test_env();
        let path = temp.path().join("bad.json");
        fs::write(
            &path,
            r#"{"schema_version":1,"created_at":"2025-01-01T00:00:00Z","sections":{"transactions":[1,2]}}"#,
        )
        .unwrap();

        let validation = restore_manager.validate_backup(&path).unwrap();
        assert!(!validation.is_valid);
        assert_eq!(validation.malformed, vec!["transactions".to_string()]);

        let before = fs::read_to_string(paths.transactions_file()).unwrap();
        assert!(restore_manager.restore_from_file(&path).is_err());
        assert_eq!(fs::read_to_string(paths.transactions_file()).unwrap(), before);
    }

    #[test]
    fn test_partial_backup_summary() {
        let (restore_manager, _backup_manager, _paths, temp) = create_test_env();
        let path = temp.path().join("partial.json");
        fs::write(
            &path,
            r#"{"schema_version":1,"created_at":"2025-01-01T00:00:00Z","sections":{"goals":{"goals":[]}}}"#,
        )
        .unwrap();

        let validation = restore_manager.validate_backup(&path).unwrap();
        assert!(validation.is_valid);
        assert!(!validation.is_complete());
        assert!(validation.summary().starts_with("Partial backup"));

        let result = restore_manager.restore_from_file(&path).unwrap();
        assert_eq!(result.restored, vec!["goals".to_string()]);
    }
}
