//! Backup CLI commands

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::Subcommand;

use crate::backup::{BackupManager, RestoreManager};
use crate::config::paths::DompetPaths;
use crate::config::settings::Settings;
use crate::error::{DompetError, DompetResult};

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a backup now and prune old ones
    Create,

    /// List backups, newest first
    List,

    /// Restore from a backup (use "latest" for the newest)
    Restore {
        /// Backup filename or path
        backup: String,

        /// Actually overwrite the current data
        #[arg(short, long)]
        force: bool,
    },

    /// Show what a backup contains
    Info {
        /// Backup filename or path
        backup: String,
    },

    /// Delete backups beyond the retention policy
    Prune {
        /// Actually delete them
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command
pub fn handle_backup_command(
    paths: &DompetPaths,
    settings: &Settings,
    cmd: BackupCommands,
) -> DompetResult<()> {
    let retention = settings.backup_retention.clone();
    let manager = BackupManager::new(paths.clone(), retention.clone());

    match cmd {
        BackupCommands::Create => {
            let (path, pruned) = manager.create_backup_with_retention()?;
            println!("Backup created: {}", display_name(&path));
            println!("Location: {}", path.display());
            if !pruned.is_empty() {
                println!("Pruned {} old backup(s).", pruned.len());
            }
        }

        BackupCommands::List => {
            let backups = manager.list_backups()?;
            if backups.is_empty() {
                println!("No backups found. Create one with: dompet backup create");
                return Ok(());
            }

            let now = Utc::now();
            for (i, backup) in backups.iter().enumerate() {
                println!(
                    "{:>3}. {} ({} ago, {}){}",
                    i + 1,
                    backup.filename,
                    format_age(now.signed_duration_since(backup.created_at)),
                    format_size(backup.size_bytes),
                    if backup.is_monthly { " [monthly]" } else { "" }
                );
            }
            println!("\nTotal: {} backup(s)", backups.len());
        }

        BackupCommands::Restore { backup, force } => {
            let path = resolve_backup_path(&manager, &backup)?;
            let restore = RestoreManager::new(paths.clone());
            let validation = restore.validate_backup(&path)?;

            println!("File:    {}", path.display());
            println!(
                "Created: {}",
                validation.backup_date.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Status:  {}", validation.summary());

            if !validation.is_valid {
                return Err(DompetError::Backup(format!(
                    "Refusing to restore {}: {}",
                    display_name(&path),
                    validation.summary()
                )));
            }

            if !force {
                println!("\nThis overwrites ALL current data. Run again with --force to proceed:");
                println!("  dompet backup restore {} --force", backup);
                return Ok(());
            }

            let safety = manager.create_backup()?;
            println!("\nCurrent data saved to {}", display_name(&safety));

            let result = restore.restore_from_file(&path)?;
            println!("{}", result.summary());
            if !result.all_restored() {
                println!("Sections missing from the backup were left untouched.");
            }
        }

        BackupCommands::Info { backup } => {
            let path = resolve_backup_path(&manager, &backup)?;
            let validation = RestoreManager::new(paths.clone()).validate_backup(&path)?;
            let size = std::fs::metadata(&path)?.len();

            println!("File:     {}", path.display());
            println!("Size:     {}", format_size(size));
            println!(
                "Created:  {}",
                validation.backup_date.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Schema:   v{}", validation.schema_version);
            println!("Contains: {}", validation.present.join(", "));
            if !validation.missing.is_empty() {
                println!("Missing:  {}", validation.missing.join(", "));
            }
            if !validation.malformed.is_empty() {
                println!("Corrupt:  {}", validation.malformed.join(", "));
            }
            println!("Status:   {}", validation.summary());
        }

        BackupCommands::Prune { force } => {
            let backups = manager.list_backups()?;
            let (monthly, daily): (Vec<_>, Vec<_>) = backups.iter().partition(|b| b.is_monthly);
            let expired = daily.len().saturating_sub(retention.daily_count as usize)
                + monthly.len().saturating_sub(retention.monthly_count as usize);

            println!(
                "Retention: {} daily, {} monthly. Have {} daily, {} monthly.",
                retention.daily_count,
                retention.monthly_count,
                daily.len(),
                monthly.len()
            );

            if expired == 0 {
                println!("No backups to prune.");
            } else if !force {
                println!("{} backup(s) would be deleted. Run with --force to delete them.", expired);
            } else {
                let deleted = manager.enforce_retention()?;
                println!("Deleted {} backup(s).", deleted.len());
            }
        }
    }

    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Resolve "latest", a filename in the backup directory, or a path
fn resolve_backup_path(manager: &BackupManager, backup: &str) -> DompetResult<PathBuf> {
    if backup.eq_ignore_ascii_case("latest") {
        return manager
            .get_latest_backup()?
            .map(|b| b.path)
            .ok_or_else(|| DompetError::NotFound {
                entity_type: "Backup",
                identifier: "latest".to_string(),
            });
    }

    let path = PathBuf::from(backup);
    if path.exists() {
        return Ok(path);
    }

    for candidate in [backup.to_string(), format!("{}.json", backup)] {
        let in_dir = manager.backup_dir().join(&candidate);
        if in_dir.exists() {
            return Ok(in_dir);
        }
    }

    Err(DompetError::NotFound {
        entity_type: "Backup",
        identifier: backup.to_string(),
    })
}

fn format_age(duration: chrono::Duration) -> String {
    let minutes = duration.num_minutes();
    if minutes < 1 {
        format!("{}s", duration.num_seconds().max(0))
    } else if minutes < 60 {
        format!("{}m", minutes)
    } else if minutes < 60 * 24 {
        format!("{}h", minutes / 60)
    } else {
        format!("{}d", minutes / (60 * 24))
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
