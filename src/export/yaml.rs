//! YAML Export functionality
//!
//! Exports the complete dataset to YAML format for human-readable backup.

use crate::error::{DompetError, DompetResult};
use crate::export::json::FullExport;
use crate::storage::Storage;
use std::io::Write;

/// Export the full dataset to YAML format
pub fn export_full_yaml<W: Write>(storage: &Storage, mut writer: W) -> DompetResult<()> {
    let export = FullExport::from_storage(storage)?;

    let header = format!(
        "# Dompet Full Data Export\n# Generated: {}\n# App Version: {}\n#\n# Keep it secure - it contains all your financial data.\n\n",
        export.exported_at, export.app_version
    );
    writer
        .write_all(header.as_bytes())
        .map_err(|e| DompetError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export)?;

    Ok(())
}

/// Parse and validate a YAML export
pub fn import_from_yaml(yaml_str: &str) -> DompetResult<FullExport> {
    let export: FullExport = serde_yaml::from_str(yaml_str)
        .map_err(|e| DompetError::Validation(format!("Invalid export file: {}", e)))?;

    export.validate().map_err(DompetError::Validation)?;

    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::DompetPaths;
    use crate::models::{Bill, BillFrequency, Money};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let paths = DompetPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        storage
            .bills
            .upsert(Bill::new(
                "Listrik",
                Money::from_rupiah(400_000),
                NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
                BillFrequency::Monthly,
            ))
            .unwrap();

        let mut yaml_output = Vec::new();
        export_full_yaml(&storage, &mut yaml_output).unwrap();
        let yaml_string = String::from_utf8(yaml_output).unwrap();

        assert!(yaml_string.starts_with("# Dompet Full Data Export"));
        assert!(yaml_string.contains("Listrik"));

        let imported = import_from_yaml(&yaml_string).unwrap();
        assert_eq!(imported.bills.len(), 1);
        assert_eq!(imported.bills[0].frequency, BillFrequency::Monthly);
    }
}
