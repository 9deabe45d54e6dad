//! User settings for Dompet
//!
//! Manages user preferences: currency display, notification thresholds,
//! AI provider models and backup retention.

use serde::{Deserialize, Serialize};

use super::paths::DompetPaths;
use crate::error::DompetError;

/// Backup retention settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupRetention {
    /// Number of daily backups to keep
    pub daily_count: u32,
    /// Number of monthly backups to keep
    pub monthly_count: u32,
}

impl Default for BackupRetention {
    fn default() -> Self {
        Self {
            daily_count: 30,
            monthly_count: 12,
        }
    }
}

/// Thresholds used by the notification rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Percent of a budget spent before a warning is raised
    #[serde(default = "default_budget_warning_percent")]
    pub budget_warning_percent: u32,

    /// Days before a bill's due date to start reminding
    #[serde(default = "default_bill_reminder_days")]
    pub bill_reminder_days: i64,

    /// Days before a goal's target date to warn when it is still incomplete
    #[serde(default = "default_goal_deadline_days")]
    pub goal_deadline_days: i64,
}

fn default_budget_warning_percent() -> u32 {
    80
}

fn default_bill_reminder_days() -> i64 {
    3
}

fn default_goal_deadline_days() -> i64 {
    14
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            budget_warning_percent: default_budget_warning_percent(),
            bill_reminder_days: default_bill_reminder_days(),
            goal_deadline_days: default_goal_deadline_days(),
        }
    }
}

/// AI provider preferences (keys come from the environment, never from disk)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSettings {
    /// Gemini model used for the chat assistant
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// OpenRouter model used for receipt OCR and text parsing
    #[serde(default = "default_openrouter_model")]
    pub openrouter_model: String,

    /// Maximum model round-trips per chat message
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: usize,

    /// Number of chat turns kept on disk
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_openrouter_model() -> String {
    "google/gemini-2.0-flash-001".to_string()
}

fn default_max_tool_iterations() -> usize {
    5
}

fn default_history_limit() -> usize {
    40
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            gemini_model: default_gemini_model(),
            openrouter_model: default_openrouter_model(),
            max_tool_iterations: default_max_tool_iterations(),
            history_limit: default_history_limit(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// User settings for Dompet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol shown in reports and prompts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default)]
    pub notifications: NotificationSettings,

    #[serde(default)]
    pub ai: AiSettings,

    /// Backup retention policy
    #[serde(default)]
    pub backup_retention: BackupRetention,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "Rp".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            notifications: NotificationSettings::default(),
            ai: AiSettings::default(),
            backup_retention: BackupRetention::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &DompetPaths) -> Result<Self, DompetError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| DompetError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                DompetError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &DompetPaths) -> Result<(), DompetError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| DompetError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| DompetError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.currency_symbol, "Rp");
        assert_eq!(settings.notifications.budget_warning_percent, 80);
        assert_eq!(settings.notifications.bill_reminder_days, 3);
        assert_eq!(settings.ai.max_tool_iterations, 5);
        assert_eq!(settings.backup_retention.daily_count, 30);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = DompetPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.notifications.budget_warning_percent = 90;
        settings.ai.gemini_model = "gemini-1.5-pro".to_string();
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.notifications.budget_warning_percent, 90);
        assert_eq!(loaded.ai.gemini_model, "gemini-1.5-pro");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"currency_symbol": "IDR"}"#).unwrap();
        assert_eq!(settings.currency_symbol, "IDR");
        assert_eq!(settings.notifications.goal_deadline_days, 14);
        assert_eq!(settings.ai.history_limit, 40);
    }
}
