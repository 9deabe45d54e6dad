//! Export module for Dompet
//!
//! Provides data export in multiple formats:
//! - CSV: transactions (spreadsheet-compatible)
//! - JSON: machine-readable full dataset export
//! - YAML: human-readable full dataset export
//! - Markdown: the printable monthly report

pub mod csv;
pub mod json;
pub mod report;
pub mod yaml;

pub use self::csv::export_transactions_csv;
pub use json::{export_full_json, import_from_json, FullExport, EXPORT_SCHEMA_VERSION};
pub use report::{default_report_filename, export_monthly_report};
pub use yaml::{export_full_yaml, import_from_yaml};
