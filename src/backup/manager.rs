//! Backup manager for Dompet
//!
//! Handles rolling backups with configurable retention policies.
//! Backups are stored as dated JSON archives.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::paths::DompetPaths;
use crate::config::settings::BackupRetention;
use crate::error::{DompetError, DompetResult};
use crate::storage::file_io::write_json_atomic;

/// Current archive schema version
pub const BACKUP_SCHEMA_VERSION: u32 = 1;

/// Entity files captured in every archive, keyed by section name
pub(crate) const SECTIONS: &[(&str, fn(&DompetPaths) -> PathBuf)] = &[
    ("transactions", DompetPaths::transactions_file),
    ("budgets", DompetPaths::budgets_file),
    ("goals", DompetPaths::goals_file),
    ("bills", DompetPaths::bills_file),
    ("notifications", DompetPaths::notifications_file),
    ("chat_history", DompetPaths::chat_history_file),
];

/// Metadata about a backup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    /// Backup filename
    pub filename: String,
    /// Full path to backup
    pub path: PathBuf,
    /// When the backup was created
    pub created_at: DateTime<Utc>,
    /// Size in bytes
    pub size_bytes: u64,
    /// Whether this is the first backup of its month (kept longer)
    pub is_monthly: bool,
}

/// Backup archive format
#[derive(Debug, Serialize, Deserialize)]
pub struct BackupArchive {
    /// Schema version for migration support
    pub schema_version: u32,
    /// When the backup was created
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub app_version: String,
    /// Raw contents of each entity file
    pub sections: BTreeMap<String, serde_json::Value>,
}

/// Manages backup creation and retention
pub struct BackupManager {
    backup_dir: PathBuf,
    paths: DompetPaths,
    retention: BackupRetention,
}

impl BackupManager {
    pub fn new(paths: DompetPaths, retention: BackupRetention) -> Self {
        let backup_dir = paths.backup_dir();
        Self {
            backup_dir,
            paths,
            retention,
        }
    }

    /// Create a backup of all data
    ///
    /// Returns the path to the created backup file.
    pub fn create_backup(&self) -> DompetResult<PathBuf> {
        fs::create_dir_all(&self.backup_dir)
            .map_err(|e| DompetError::Backup(format!("Failed to create backup directory: {}", e)))?;

        let now = Utc::now();
        let filename = format!(
            "backup-{}-{:03}.json",
            now.format("%Y%m%d-%H%M%S"),
            now.timestamp_subsec_millis()
        );
        let backup_path = self.backup_dir.join(&filename);

        let archive = self.create_archive(now)?;
        write_json_atomic(&backup_path, &archive)?;

        debug!(path = %backup_path.display(), "backup created");
        Ok(backup_path)
    }

    fn create_archive(&self, timestamp: DateTime<Utc>) -> DompetResult<BackupArchive> {
        let mut sections = BTreeMap::new();
        for (name, file) in SECTIONS {
            sections.insert((*name).to_string(), read_json_value(&file(&self.paths))?);
        }

        Ok(BackupArchive {
            schema_version: BACKUP_SCHEMA_VERSION,
            created_at: timestamp,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            sections,
        })
    }

    /// List all available backups, newest first
    pub fn list_backups(&self) -> DompetResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();
        let entries = fs::read_dir(&self.backup_dir)
            .map_err(|e| DompetError::Backup(format!("Failed to read backup directory: {}", e)))?;

        for entry in entries {
            let entry = entry
                .map_err(|e| DompetError::Backup(format!("Failed to read directory entry: {}", e)))?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(info) = parse_backup_info(&path) {
                    backups.push(info);
                }
            }
        }

        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        // The oldest backup of each calendar month is the monthly one
        let mut months_seen = HashSet::new();
        for backup in backups.iter_mut().rev() {
            let key = (backup.created_at.year(), backup.created_at.month());
            backup.is_monthly = months_seen.insert(key);
        }

        Ok(backups)
    }

    /// Enforce retention policy by deleting old backups
    pub fn enforce_retention(&self) -> DompetResult<Vec<PathBuf>> {
        let backups = self.list_backups()?;
        let mut deleted = Vec::new();

        let (monthly, daily): (Vec<_>, Vec<_>) = backups.into_iter().partition(|b| b.is_monthly);

        let expired = daily
            .into_iter()
            .skip(self.retention.daily_count as usize)
            .chain(monthly.into_iter().skip(self.retention.monthly_count as usize));

        for backup in expired {
            fs::remove_file(&backup.path)
                .map_err(|e| DompetError::Backup(format!("Failed to delete old backup: {}", e)))?;
            debug!(path = %backup.path.display(), "backup pruned");
            deleted.push(backup.path);
        }

        Ok(deleted)
    }

    /// Create a backup and then enforce retention policy
    pub fn create_backup_with_retention(&self) -> DompetResult<(PathBuf, Vec<PathBuf>)> {
        let backup_path = self.create_backup()?;
        let deleted = self.enforce_retention()?;
        Ok((backup_path, deleted))
    }

    pub fn backup_dir(&self) -> &PathBuf {
        &self.backup_dir
    }

    /// Get a specific backup by filename
    pub fn get_backup(&self, filename: &str) -> DompetResult<Option<BackupInfo>> {
        Ok(self
            .list_backups()?
            .into_iter()
            .find(|b| b.filename == filename))
    }

    /// Get the most recent backup
    pub fn get_latest_backup(&self) -> DompetResult<Option<BackupInfo>> {
        Ok(self.list_backups()?.into_iter().next())
    }
}

fn parse_backup_info(path: &Path) -> Option<BackupInfo> {
    let filename = path.file_name()?.to_string_lossy().to_string();
    let stamp = filename.strip_prefix("backup-")?.strip_suffix(".json")?;
    let created_at = parse_backup_timestamp(stamp)?;
    let size_bytes = fs::metadata(path).ok()?.len();

    Some(BackupInfo {
        filename,
        path: path.to_path_buf(),
        created_at,
        size_bytes,
        is_monthly: false,
    })
}

/// Read a JSON file as a generic Value, `null` if the file doesn't exist
fn read_json_value(path: &Path) -> DompetResult<serde_json::Value> {
    if !path.exists() {
        return Ok(serde_json::Value::Null);
    }

    let contents = fs::read_to_string(path)
        .map_err(|e| DompetError::Backup(format!("Failed to read {}: {}", path.display(), e)))?;

    serde_json::from_str(&contents)
        .map_err(|e| DompetError::Backup(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Parse `YYYYMMDD-HHMMSS` or `YYYYMMDD-HHMMSS-mmm`
fn parse_backup_timestamp(stamp: &str) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = stamp.split('-').collect();
    let (date_part, time_part, millis) = match parts.as_slice() {
        [date, time] => (*date, *time, 0),
        [date, time, millis] => (*date, *time, millis.parse().ok()?),
        _ => return None,
    };

    if date_part.len() != 8 || time_part.len() != 6 {
        return None;
    }

    let field = |s: &str, range: std::ops::Range<usize>| -> Option<u32> { s.get(range)?.parse().ok() };

    let date = NaiveDate::from_ymd_opt(
        date_part.get(0..4)?.parse().ok()?,
        field(date_part, 4..6)?,
        field(date_part, 6..8)?,
    )?;
    let time = chrono::NaiveTime::from_hms_milli_opt(
        field(time_part, 0..2)?,
        field(time_part, 2..4)?,
        field(time_part, 4..6)?,
        millis,
    )?;

    Some(DateTime::from_naive_utc_and_offset(
        chrono::NaiveDateTime::new(date, time),
        Utc,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::init::initialize_storage;
    use tempfile::TempDir;

    fn create_test_manager() -> (BackupManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = DompetPaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths).unwrap();

        let retention = BackupRetention {
            daily_count: 3,
            monthly_count: 2,
        };

        (BackupManager::new(paths, retention), temp_dir)
    }

    fn touch_backup(manager: &BackupManager, stamp: &str) {
        fs::write(manager.backup_dir().join(format!("backup-{}.json", stamp)), "{}").unwrap();
    }

    #[test]
    fn test_create_backup() {
        let (manager, _temp) = create_test_manager();

        let backup_path = manager.create_backup().unwrap();
        assert!(backup_path.exists());

        let contents = fs::read_to_string(&backup_path).unwrap();
        let archive: BackupArchive = serde_json::from_str(&contents).unwrap();
        assert_eq!(archive.schema_version, BACKUP_SCHEMA_VERSION);
        assert_eq!(archive.sections.len(), SECTIONS.len());
        assert!(archive.sections["transactions"].is_object());
    }

    #[test]
    fn test_list_marks_first_of_month() {
        let (manager, _temp) = create_test_manager();
        touch_backup(&manager, "20250103-090000");
        touch_backup(&manager, "20250115-090000");
        touch_backup(&manager, "20250201-090000-250");
        touch_backup(&manager, "not-a-backup");

        let backups = manager.list_backups().unwrap();
        assert_eq!(backups.len(), 3);
        assert_eq!(backups[0].filename, "backup-20250201-090000-250.json");
        assert!(backups[0].is_monthly);
        assert!(!backups[1].is_monthly);
        assert!(backups[2].is_monthly);
    }

    #[test]
    fn test_retention_policy() {
        let (manager, _temp) = create_test_manager();
        for day in 1..=6 {
            touch_backup(&manager, &format!("202503{:02}-120000", day));
        }
        touch_backup(&manager, "20250201-120000");
        touch_backup(&manager, "20250101-120000");

        // Monthly: Mar 1, Feb 1, Jan 1 (keep 2). Daily: Mar 2..6 (keep 3).
        let deleted = manager.enforce_retention().unwrap();
        assert_eq!(deleted.len(), 3);

        let remaining: Vec<_> = manager
            .list_backups()
            .unwrap()
            .into_iter()
            .map(|b| b.filename)
            .collect();
        assert!(remaining.contains(&"backup-20250301-120000.json".to_string()));
        assert!(remaining.contains(&"backup-20250201-120000.json".to_string()));
        assert!(!remaining.contains(&"backup-20250101-120000.json".to_string()));
        assert!(!remaining.contains(&"backup-20250302-120000.json".to_string()));
    }

    #[test]
    fn test_get_latest_backup() {
        let (manager, _temp) = create_test_manager();
        assert!(manager.get_latest_backup().unwrap().is_none());

        let path = manager.create_backup().unwrap();
        let latest = manager.get_latest_backup().unwrap().unwrap();
        assert_eq!(latest.path, path);
        assert!(manager.get_backup(&latest.filename).unwrap().is_some());
    }

    #[test]
    fn test_parse_backup_timestamp() {
        let timestamp = parse_backup_timestamp("20251127-143022").unwrap();
        assert_eq!((timestamp.year(), timestamp.month(), timestamp.day()), (2025, 11, 27));

        let timestamp = parse_backup_timestamp("20251127-143022-456").unwrap();
        assert_eq!(timestamp.timestamp_subsec_millis(), 456);

        assert!(parse_backup_timestamp("20251327-143022").is_none());
        assert!(parse_backup_timestamp("2025112-143022").is_none());
    }
}
