//! Path management for Dompet
//!
//! ## Path Resolution Order
//!
//! 1. `DOMPET_DATA_DIR` environment variable (if set)
//! 2. The platform config directory (`~/.config/dompet` on Linux,
//!    `~/Library/Application Support/id.dompet.dompet` on macOS,
//!    `%APPDATA%\dompet\dompet` on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::DompetError;

/// Environment variable that overrides the data location
pub const DATA_DIR_ENV: &str = "DOMPET_DATA_DIR";

/// Manages all paths used by Dompet
#[derive(Debug, Clone)]
pub struct DompetPaths {
    /// Base directory for all Dompet data
    base_dir: PathBuf,
}

impl DompetPaths {
    /// Create a new DompetPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no platform config directory can be determined
    /// and no override is set.
    pub fn new() -> Result<Self, DompetError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create DompetPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn transactions_file(&self) -> PathBuf {
        self.data_dir().join("transactions.json")
    }

    pub fn budgets_file(&self) -> PathBuf {
        self.data_dir().join("budgets.json")
    }

    pub fn goals_file(&self) -> PathBuf {
        self.data_dir().join("goals.json")
    }

    pub fn bills_file(&self) -> PathBuf {
        self.data_dir().join("bills.json")
    }

    /// Notifications and their de-duplication markers
    pub fn notifications_file(&self) -> PathBuf {
        self.data_dir().join("notifications.json")
    }

    pub fn chat_history_file(&self) -> PathBuf {
        self.data_dir().join("chat_history.json")
    }

    /// Ensure base, data and backup directories exist
    pub fn ensure_directories(&self) -> Result<(), DompetError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| DompetError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| DompetError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.backup_dir())
            .map_err(|e| DompetError::Io(format!("Failed to create backup directory: {}", e)))?;

        Ok(())
    }

    /// Check if Dompet has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, DompetError> {
    ProjectDirs::from("id", "dompet", "dompet")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            DompetError::Config(format!(
                "Could not determine a config directory; set {}",
                DATA_DIR_ENV
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = DompetPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(paths.backup_dir(), temp_dir.path().join("backups"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = DompetPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(paths.backup_dir().exists());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = DompetPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.goals_file(),
            temp_dir.path().join("data").join("goals.json")
        );
        assert_eq!(
            paths.notifications_file(),
            temp_dir.path().join("data").join("notifications.json")
        );
    }
}
