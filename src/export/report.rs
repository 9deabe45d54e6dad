//! Printable report export

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::settings::Settings;
use crate::error::{DompetError, DompetResult};
use crate::models::Month;
use crate::reports::MonthlyReport;
use crate::storage::Storage;

/// Default file name for a month's report, e.g. `laporan-2025-01.md`
pub fn default_report_filename(month: Month) -> String {
    format!("laporan-{}.md", month)
}

/// Write the markdown monthly report to `path`, creating parent directories
pub fn export_monthly_report(
    storage: &Storage,
    month: Month,
    settings: &Settings,
    path: &Path,
) -> DompetResult<PathBuf> {
    let report = MonthlyReport::generate(storage, month, settings)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| DompetError::Export(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
    }

    fs::write(path, report.format_markdown())
        .map_err(|e| DompetError::Export(format!("Failed to write {}: {}", path.display(), e)))?;

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::DompetPaths;
    use tempfile::TempDir;

    #[test]
    fn test_export_monthly_report() {
        let temp_dir = TempDir::new().unwrap();
        let paths = DompetPaths::with_base_dir(temp_dir.path().join("data"));
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let month = Month::new(2025, 3).unwrap();
        let target = temp_dir
            .path()
            .join("out")
            .join(default_report_filename(month));

        let written =
            export_monthly_report(&storage, month, &Settings::default(), &target).unwrap();
        assert_eq!(written, target);

        let contents = fs::read_to_string(&target).unwrap();
        assert!(contents.starts_with("# Laporan Keuangan Maret 2025"));
        assert!(target.ends_with("laporan-2025-03.md"));
    }
}
