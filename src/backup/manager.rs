//! Backup manager for Gestion
//!
//! Writes snapshots of the whole store to the backup directory and prunes old
//! ones according to the retention policy.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use tracing::{info, warn};

use crate::config::settings::BackupRetention;
use crate::error::{GestionError, GestionResult};
use crate::services::SettingService;
use crate::storage::{write_json_atomic, Storage};

use super::snapshot::Snapshot;

/// Metadata about a backup file, taken from its name and size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub filename: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
    /// The oldest backup of its calendar month; kept under the monthly quota
    pub is_monthly: bool,
}

/// Result of a successful export
#[derive(Debug)]
pub struct BackupOutcome {
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub rows: usize,
    /// Set when the snapshot was written but `last_backup` could not be updated
    pub last_backup_error: Option<GestionError>,
}

/// Outcome of applying the retention policy to the current backups
#[derive(Debug, Clone)]
pub struct RetentionPlan {
    pub daily_kept: usize,
    pub monthly_kept: usize,
    pub daily_expired: usize,
    pub monthly_expired: usize,
    /// Backups that would be deleted, daily ones first
    pub expired: Vec<BackupInfo>,
}

pub struct BackupManager<'a> {
    storage: &'a Storage,
    backup_dir: PathBuf,
    retention: BackupRetention,
}

impl<'a> BackupManager<'a> {
    pub fn new(storage: &'a Storage, retention: BackupRetention) -> Self {
        Self {
            backup_dir: storage.paths().backup_dir(),
            storage,
            retention,
        }
    }

    /// Export every table to a new snapshot file
    ///
    /// The rows are read under one lock, so the snapshot is consistent. The
    /// file is written atomically; only after it is in place is the
    /// `last_backup` setting updated.
    pub fn create_backup(&self) -> GestionResult<BackupOutcome> {
        let now = Utc::now();
        let snapshot = self
            .storage
            .db()
            .read(|conn| Snapshot::capture(conn, now))?;

        let path = self.backup_dir.join(backup_filename(now));
        write_json_atomic(&path, &snapshot)?;

        let rows = snapshot.tables.total_rows();
        info!(path = %path.display(), rows, "backup written");

        let last_backup_error = match SettingService::new(self.storage).record_backup(now) {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "backup written but last_backup was not updated");
                Some(e)
            }
        };

        Ok(BackupOutcome {
            path,
            created_at: now,
            rows,
            last_backup_error,
        })
    }

    /// Create a backup and then enforce the retention policy
    pub fn create_backup_with_retention(&self) -> GestionResult<(BackupOutcome, Vec<PathBuf>)> {
        let outcome = self.create_backup()?;
        let deleted = self.enforce_retention()?;
        Ok((outcome, deleted))
    }

    /// Backups in the backup directory, newest first
    pub fn list_backups(&self) -> GestionResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.backup_dir)
            .map_err(|e| GestionError::Io(format!("Failed to read backup directory: {}", e)))?;

        let mut backups = Vec::new();
        for entry in entries {
            let entry = entry
                .map_err(|e| GestionError::Io(format!("Failed to read directory entry: {}", e)))?;
            if let Some(info) = backup_info(&entry.path()) {
                backups.push(info);
            }
        }

        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        mark_monthly(&mut backups);
        Ok(backups)
    }

    /// Which backups the retention policy would keep and which it would delete
    pub fn retention_plan(&self) -> GestionResult<RetentionPlan> {
        let (monthly, daily): (Vec<_>, Vec<_>) = self
            .list_backups()?
            .into_iter()
            .partition(|b| b.is_monthly);

        let daily_kept = daily.len().min(self.retention.daily_count as usize);
        let monthly_kept = monthly.len().min(self.retention.monthly_count as usize);
        let mut expired: Vec<BackupInfo> = daily.into_iter().skip(daily_kept).collect();
        let daily_expired = expired.len();
        expired.extend(monthly.into_iter().skip(monthly_kept));

        Ok(RetentionPlan {
            daily_kept,
            monthly_kept,
            daily_expired,
            monthly_expired: expired.len() - daily_expired,
            expired,
        })
    }

    /// Delete backups beyond the daily and monthly quotas
    pub fn enforce_retention(&self) -> GestionResult<Vec<PathBuf>> {
        let plan = self.retention_plan()?;

        let mut deleted = Vec::new();
        for backup in plan.expired {
            fs::remove_file(&backup.path).map_err(|e| {
                GestionError::Io(format!("Failed to delete {}: {}", backup.filename, e))
            })?;
            deleted.push(backup.path);
        }

        if !deleted.is_empty() {
            info!(count = deleted.len(), "old backups pruned");
        }
        Ok(deleted)
    }

    pub fn retention(&self) -> &BackupRetention {
        &self.retention
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// A backup in the backup directory by file name
    pub fn get_backup(&self, filename: &str) -> GestionResult<Option<BackupInfo>> {
        Ok(self
            .list_backups()?
            .into_iter()
            .find(|b| b.filename == filename))
    }

    pub fn get_latest_backup(&self) -> GestionResult<Option<BackupInfo>> {
        Ok(self.list_backups()?.into_iter().next())
    }
}

fn backup_filename(at: DateTime<Utc>) -> String {
    format!(
        "backup-{}-{:03}.json",
        at.format("%Y%m%d-%H%M%S"),
        at.timestamp_subsec_millis()
    )
}

fn backup_info(path: &Path) -> Option<BackupInfo> {
    let filename = path.file_name()?.to_str()?.to_string();
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

/// Flag the oldest backup of each month; `backups` is newest first
fn mark_monthly(backups: &mut [BackupInfo]) {
    let mut months = BTreeSet::new();
    for backup in backups.iter_mut().rev() {
        let month = (backup.created_at.year(), backup.created_at.month());
        backup.is_monthly = months.insert(month);
    }
}

/// Parse `YYYYMMDD-HHMMSS` with an optional `-mmm` millisecond suffix
fn parse_backup_timestamp(stamp: &str) -> Option<DateTime<Utc>> {
    let mut parts = stamp.split('-');
    let date = NaiveDate::parse_from_str(parts.next()?, "%Y%m%d").ok()?;
    let time = parts.next()?;
    if time.len() != 6 {
        return None;
    }
    let time = NaiveTime::parse_from_str(time, "%H%M%S").ok()?;
    let millis = match parts.next() {
        Some(ms) if ms.len() == 3 => ms.parse().ok()?,
        Some(_) => return None,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }

    let time = time.with_nanosecond(millis * 1_000_000)?;
    Some(NaiveDateTime::new(date, time).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, ProviderDraft};
    use crate::services::ProviderService;
    use crate::storage::testing::open_storage;
    use chrono::TimeZone;

    fn retention() -> BackupRetention {
        BackupRetention {
            daily_count: 3,
            monthly_count: 2,
        }
    }

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "{}").unwrap();
    }

    #[test]
    fn test_create_backup_writes_snapshot_and_records_time() {
        let (_temp, storage) = open_storage();
        ProviderService::new(&storage)
            .create(ProviderDraft::new("Acme"))
            .unwrap();
        let manager = BackupManager::new(&storage, retention());

        let outcome = manager.create_backup().unwrap();
        assert!(outcome.path.exists());
        assert!(outcome.last_backup_error.is_none());
        assert_eq!(outcome.rows, 1);

        let snapshot = Snapshot::load(&outcome.path).unwrap();
        assert_eq!(snapshot.tables.providers[0].name, "Acme");

        let recorded = SettingService::new(&storage).last_backup().unwrap().unwrap();
        assert_eq!(recorded.timestamp_millis(), outcome.created_at.timestamp_millis());
    }

    #[test]
    fn test_empty_store_exports() {
        let (_temp, storage) = open_storage();
        let outcome = BackupManager::new(&storage, retention())
            .create_backup()
            .unwrap();
        assert_eq!(outcome.rows, 0);
        assert_eq!(Snapshot::load(&outcome.path).unwrap().tables.total_rows(), 0);
    }

    #[test]
    fn test_snapshot_amounts_are_cents() {
        let (_temp, storage) = open_storage();
        crate::services::ProductService::new(&storage)
            .create(crate::models::ProductDraft::new("Widget", Money::from_cents(4999)))
            .unwrap();
        let outcome = BackupManager::new(&storage, retention())
            .create_backup()
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&outcome.path).unwrap()).unwrap();
        assert_eq!(raw["format"], "gestion-snapshot");
        assert_eq!(raw["tables"]["products"][0]["price"], 4999);
    }

    #[test]
    fn test_list_backups_newest_first() {
        let (_temp, storage) = open_storage();
        let manager = BackupManager::new(&storage, retention());
        touch(manager.backup_dir(), "backup-20240105-080000-000.json");
        touch(manager.backup_dir(), "backup-20240107-080000-000.json");
        touch(manager.backup_dir(), "backup-20240106-080000-000.json");
        touch(manager.backup_dir(), "notes.json");

        let names: Vec<_> = manager
            .list_backups()
            .unwrap()
            .into_iter()
            .map(|b| b.filename)
            .collect();
        assert_eq!(
            names,
            vec![
                "backup-20240107-080000-000.json",
                "backup-20240106-080000-000.json",
                "backup-20240105-080000-000.json",
            ]
        );
        assert_eq!(
            manager.get_latest_backup().unwrap().unwrap().filename,
            "backup-20240107-080000-000.json"
        );
    }

    #[test]
    fn test_retention_keeps_quotas() {
        let (_temp, storage) = open_storage();
        let manager = BackupManager::new(&storage, retention());
        for day in 1..=6 {
            touch(
                manager.backup_dir(),
                &format!("backup-202403{:02}-080000-000.json", day),
            );
        }
        touch(manager.backup_dir(), "backup-20240201-080000-000.json");
        touch(manager.backup_dir(), "backup-20240110-080000-000.json");

        let plan = manager.retention_plan().unwrap();
        assert_eq!((plan.daily_kept, plan.daily_expired), (3, 2));
        assert_eq!((plan.monthly_kept, plan.monthly_expired), (2, 1));

        let deleted = manager.enforce_retention().unwrap();

        // March: 1st is monthly, 2nd..6th daily (keep 3 newest). Feb and Jan are
        // monthly too, and only 2 monthly backups are kept.
        let mut deleted: Vec<_> = deleted
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        deleted.sort();
        assert_eq!(
            deleted,
            vec![
                "backup-20240110-080000-000.json",
                "backup-20240302-080000-000.json",
                "backup-20240303-080000-000.json",
            ]
        );
        assert_eq!(manager.list_backups().unwrap().len(), 5);
    }

    #[test]
    fn test_get_backup_by_name() {
        let (_temp, storage) = open_storage();
        let manager = BackupManager::new(&storage, retention());
        touch(manager.backup_dir(), "backup-20240105-080000-000.json");

        let found = manager
            .get_backup("backup-20240105-080000-000.json")
            .unwrap()
            .unwrap();
        assert!(found.is_monthly);
        assert_eq!(found.size_bytes, 2);
        assert!(manager
            .get_backup("backup-20240106-080000-000.json")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_parse_backup_timestamp() {
        let with_millis = parse_backup_timestamp("20251127-143022-456").unwrap();
        assert_eq!(
            with_millis,
            Utc.with_ymd_and_hms(2025, 11, 27, 14, 30, 22).unwrap()
                + chrono::Duration::milliseconds(456)
        );

        let without = parse_backup_timestamp("20251127-143022").unwrap();
        assert_eq!(without.second(), 22);

        assert!(parse_backup_timestamp("20251127").is_none());
        assert!(parse_backup_timestamp("20251327-143022").is_none());
        assert!(parse_backup_timestamp("20251127-143022-1-2").is_none());
    }

    #[test]
    fn test_filename_round_trips() {
        let at = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 58).unwrap()
            + chrono::Duration::milliseconds(7);
        let name = backup_filename(at);
        assert_eq!(name, "backup-20240229-235958-007.json");
        let stamp = name.strip_prefix("backup-").unwrap().strip_suffix(".json").unwrap();
        assert_eq!(parse_backup_timestamp(stamp), Some(at));
    }
}
