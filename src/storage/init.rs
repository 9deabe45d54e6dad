//! First-run setup of the data directory

use tracing::info;

use crate::config::paths::DompetPaths;
use crate::config::settings::Settings;
use crate::error::DompetError;

use super::file_io::write_json_atomic;

/// Create the directory tree, default settings and empty data files
///
/// Existing files are left untouched, so running this twice is harmless.
pub fn initialize_storage(paths: &DompetPaths) -> Result<(), DompetError> {
    paths.ensure_directories()?;

    if !paths.settings_file().exists() {
        Settings::default().save(paths)?;
        info!(path = %paths.settings_file().display(), "created default settings");
    }

    let empty_files = [
        (paths.transactions_file(), serde_json::json!({ "transactions": [] })),
        (paths.budgets_file(), serde_json::json!({ "budgets": [] })),
        (paths.goals_file(), serde_json::json!({ "goals": [] })),
        (paths.bills_file(), serde_json::json!({ "bills": [] })),
        (
            paths.notifications_file(),
            serde_json::json!({ "notifications": [], "markers": [] }),
        ),
        (paths.chat_history_file(), serde_json::json!({ "messages": [] })),
    ];

    for (path, empty) in empty_files {
        if !path.exists() {
            write_json_atomic(&path, &empty)?;
        }
    }

    Ok(())
}

/// Whether `initialize_storage` still needs to run
pub fn needs_initialization(paths: &DompetPaths) -> bool {
    !paths.settings_file().exists()
}
