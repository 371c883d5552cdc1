//! Backup CLI commands
//!
//! Implements CLI commands for snapshot backups and restores.

use clap::Subcommand;
use std::path::PathBuf;

use crate::backup::{BackupManager, RestoreManager};
use crate::config::Settings;
use crate::error::{GestionError, GestionResult};
use crate::services::SettingService;
use crate::storage::Storage;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Write a snapshot of every table to the backup directory
    Create {
        /// Apply the retention policy afterwards
        #[arg(long)]
        prune: bool,
    },

    /// List all available backups
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Replace all data with the contents of a backup
    Restore {
        /// Backup filename or path (use 'latest' for most recent)
        backup: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a backup and show what it contains
    Info {
        /// Backup filename or path
        backup: String,
    },

    /// Delete old backups according to retention policy
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command
pub fn handle_backup_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BackupCommands,
) -> GestionResult<()> {
    let manager = BackupManager::new(storage, settings.backup_retention.clone());
    let retention = manager.retention();

    match cmd {
        BackupCommands::Create { prune } => {
            println!("Creating backup...");
            let outcome = manager.create_backup()?;
            println!("Backup created: {}", file_name(&outcome.path));
            println!("Location: {}", outcome.path.display());
            println!("Rows: {}", outcome.rows);
            if let Some(err) = &outcome.last_backup_error {
                println!("Warning: could not record the backup time: {}", err);
            }

            if prune {
                let deleted = manager.enforce_retention()?;
                if !deleted.is_empty() {
                    println!("Pruned {} old backup(s).", deleted.len());
                }
            }
        }

        BackupCommands::List { verbose } => {
            let backups = manager.list_backups()?;

            if backups.is_empty() {
                println!("No backups found.");
                println!("Create one with: gestion backup create");
                return Ok(());
            }

            println!("Available Backups");
            println!("=================");
            if let Some(last) = SettingService::new(storage).last_backup()? {
                println!("Last backup: {}", last.format("%Y-%m-%d %H:%M:%S UTC"));
            }
            println!();

            for (i, backup) in backups.iter().enumerate() {
                let age = chrono::Utc::now().signed_duration_since(backup.created_at);
                let age_str = format_duration(age);

                let monthly_marker = if backup.is_monthly { " [monthly]" } else { "" };

                if verbose {
                    println!(
                        "{}. {}{}\n   Created: {}\n   Size: {}\n   Age: {}\n",
                        i + 1,
                        backup.filename,
                        monthly_marker,
                        backup.created_at.format("%Y-%m-%d %H:%M:%S%.3f UTC"),
                        format_size(backup.size_bytes),
                        age_str,
                    );
                } else {
                    println!(
                        "  {}. {} ({} ago, {}){}",
                        i + 1,
                        backup.filename,
                        age_str,
                        format_size(backup.size_bytes),
                        monthly_marker,
                    );
                }
            }

            println!();
            println!("Total: {} backup(s)", backups.len());
        }

        BackupCommands::Restore { backup, force } => {
            let backup_path = resolve_backup_path(&manager, &backup)?;

            // Validate the backup first
            let restore_manager = RestoreManager::new(storage);
            let validation = restore_manager.validate_backup(&backup_path)?;

            println!("Backup Information");
            println!("==================");
            println!("File: {}", backup_path.display());
            println!(
                "Created: {}",
                validation.backup_date.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Status: {}", validation.summary());
            println!();

            if !force {
                println!("WARNING: This will overwrite ALL current data!");
                println!("To proceed, run again with --force flag:");
                println!("  gestion backup restore {} --force", backup);
                return Ok(());
            }

            // Snapshot the current data so the restore can be undone
            println!("Creating backup of current data before restore...");
            let pre_restore = manager.create_backup()?;
            println!("Pre-restore backup saved: {}", file_name(&pre_restore.path));
            println!();

            println!("Restoring from backup...");
            let result = restore_manager.restore_from_file(&backup_path)?;

            println!("Restore complete!");
            println!("{}", result.summary());
            println!("Rows replaced: {}", result.rows_removed);
        }

        BackupCommands::Info { backup } => {
            let backup_path = resolve_backup_path(&manager, &backup)?;
            let validation = RestoreManager::new(storage).validate_backup(&backup_path)?;
            let metadata = std::fs::metadata(&backup_path)?;

            println!("Backup Details");
            println!("==============");
            println!("File: {}", backup_path.display());
            println!("Size: {}", format_size(metadata.len()));
            println!(
                "Created: {}",
                validation.backup_date.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Snapshot version: {}", validation.version);
            println!("Schema version: {}", validation.schema_version);
            println!();
            println!("Contents:");
            for (table, count) in &validation.counts {
                println!("  {:<14} {}", format!("{}:", table), count);
            }
            println!();
            println!("Status: Valid ({} rows)", validation.total_rows());
        }

        BackupCommands::Prune { force } => {
            let plan = manager.retention_plan()?;
            let policy = format!(
                "{} daily, {} monthly",
                retention.daily_count, retention.monthly_count
            );

            if plan.expired.is_empty() {
                println!("Nothing to prune under the retention policy ({}).", policy);
                println!(
                    "Kept: {} daily, {} monthly",
                    plan.daily_kept, plan.monthly_kept
                );
                return Ok(());
            }

            println!("Prune Summary");
            println!("=============");
            println!("Retention policy: {}", policy);
            println!(
                "Expired: {} daily, {} monthly",
                plan.daily_expired, plan.monthly_expired
            );
            for backup in &plan.expired {
                println!("  - {}", backup.filename);
            }
            println!();

            if !force {
                println!("To delete these backups, run again with --force flag:");
                println!("  gestion backup prune --force");
                return Ok(());
            }

            let deleted = manager.enforce_retention()?;
            println!("Deleted {} backup(s).", deleted.len());
        }
    }

    Ok(())
}

/// Resolve a backup identifier to a full path
fn resolve_backup_path(manager: &BackupManager, backup: &str) -> GestionResult<PathBuf> {
    if backup.eq_ignore_ascii_case("latest") {
        return manager
            .get_latest_backup()?
            .map(|b| b.path)
            .ok_or_else(|| GestionError::not_found("Backup", "latest"));
    }

    let path = PathBuf::from(backup);
    if path.exists() {
        return Ok(path);
    }

    let in_backup_dir = manager.backup_dir().join(backup);
    if in_backup_dir.exists() {
        return Ok(in_backup_dir);
    }

    let with_ext = manager.backup_dir().join(format!("{}.json", backup));
    if with_ext.exists() {
        return Ok(with_ext);
    }

    Err(GestionError::not_found("Backup", backup))
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format a duration in human-readable form
fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }

    format!("{}mo", days / 30)
}

/// Format a file size in human-readable form
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(chrono::Duration::seconds(42)), "42s");
        assert_eq!(format_duration(chrono::Duration::minutes(90)), "1h");
        assert_eq!(format_duration(chrono::Duration::days(65)), "2mo");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
