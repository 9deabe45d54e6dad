//! CLI commands for data export

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::{Subcommand, ValueEnum};

use crate::error::{DompetError, DompetResult};
use crate::export::{
    export_full_json, export_full_yaml, export_transactions_csv, import_from_json,
    import_from_yaml, FullExport,
};
use crate::storage::Storage;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// CSV format (transactions only)
    Csv,
    /// JSON format (full dataset)
    Json,
    /// YAML format (full dataset, human-readable)
    Yaml,
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export all data to a file
    All {
        /// Output file path
        output: PathBuf,

        /// Export format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Export transactions to CSV
    Transactions {
        /// Output file path
        output: PathBuf,
    },

    /// Check that a JSON or YAML export file is complete and consistent
    Verify {
        /// Export file (.json, .yaml or .yml)
        file: PathBuf,
    },

    /// Show what an export would contain without writing files
    Info,
}

/// Handle export commands
pub fn handle_export_command(storage: &Storage, cmd: ExportCommands) -> DompetResult<()> {
    match cmd {
        ExportCommands::All {
            output,
            format,
            pretty,
        } => {
            let mut writer = create_writer(&output)?;
            match format {
                ExportFormat::Csv => {
                    let count = export_transactions_csv(storage, &mut writer)?;
                    println!("Exported {} transactions to: {}", count, output.display());
                    println!("Note: CSV holds transactions only. Use json or yaml for everything.");
                }
                ExportFormat::Json => {
                    export_full_json(storage, &mut writer, pretty)?;
                    println!("Full dataset exported to: {}", output.display());
                }
                ExportFormat::Yaml => {
                    export_full_yaml(storage, &mut writer)?;
                    println!("Full dataset exported to: {}", output.display());
                }
            }
        }

        ExportCommands::Transactions { output } => {
            let count = export_transactions_csv(storage, create_writer(&output)?)?;
            println!("Exported {} transactions to: {}", count, output.display());
        }

        ExportCommands::Verify { file } => {
            let contents = fs::read_to_string(&file).map_err(|e| {
                DompetError::Export(format!("Failed to read {}: {}", file.display(), e))
            })?;
            let export = if is_yaml(&file) {
                import_from_yaml(&contents)?
            } else {
                import_from_json(&contents)?
            };
            println!("{} is a valid export.", file.display());
            print_counts(&export);
        }

        ExportCommands::Info => {
            let export = FullExport::from_storage(storage)?;
            println!("Export schema: {}", export.schema_version);
            println!("App version:   {}", export.app_version);
            println!();
            print_counts(&export);
        }
    }

    Ok(())
}

fn create_writer(path: &Path) -> DompetResult<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        DompetError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn print_counts(export: &FullExport) {
    let meta = &export.metadata;
    println!("  Transactions:  {}", meta.transaction_count);
    println!("  Budgets:       {}", meta.budget_count);
    println!("  Goals:         {}", meta.goal_count);
    println!("  Bills:         {}", meta.bill_count);
    if let (Some(earliest), Some(latest)) = (&meta.earliest_transaction, &meta.latest_transaction) {
        println!("  Date range:    {} to {}", earliest, latest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_detection() {
        assert!(is_yaml(Path::new("dompet.yaml")));
        assert!(is_yaml(Path::new("dompet.yml")));
        assert!(!is_yaml(Path::new("dompet.json")));
        assert!(!is_yaml(Path::new("dompet")));
    }
}
