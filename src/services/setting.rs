//! Setting service
//!
//! Data-level metadata stored in the `settings` table, including the time of
//! the last successful backup.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, warn};

use crate::audit::AuditEntry;
use crate::error::{GestionError, GestionResult};
use crate::events::Topic;
use crate::models::{Setting, LAST_BACKUP_KEY};
use crate::storage::{SettingRepository, Storage};

pub struct SettingService<'a> {
    storage: &'a Storage,
}

impl<'a> SettingService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn get(&self, key: &str) -> GestionResult<Option<String>> {
        let setting = self
            .storage
            .db()
            .read(|conn| SettingRepository::new(conn).get(key))?;
        Ok(setting.map(|s| s.value))
    }

    pub fn all(&self) -> GestionResult<Vec<Setting>> {
        self.storage
            .db()
            .read(|conn| SettingRepository::new(conn).all())
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn set(&self, key: &str, value: &str) -> GestionResult<Setting> {
        let setting = Setting::new(key.trim(), value);
        setting.validate()?;

        let before = self.storage.db().write(|tx| {
            let repo = SettingRepository::new(tx);
            let before = repo.get(&setting.key)?;
            repo.upsert(&setting)?;
            Ok(before)
        })?;

        debug!(key = %setting.key, "setting stored");
        let entry = match before {
            Some(before) => AuditEntry::updated(&before, &setting),
            None => AuditEntry::created(&setting),
        };
        self.storage.committed(&entry, Topic::AnyDataChanged);
        Ok(setting)
    }

    /// When the last backup was written, if one ever was
    ///
    /// An unparseable stored value is logged and treated as absent.
    pub fn last_backup(&self) -> GestionResult<Option<DateTime<Utc>>> {
        let Some(raw) = self.get(LAST_BACKUP_KEY)? else {
            return Ok(None);
        };
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(at) => Ok(Some(at.with_timezone(&Utc))),
            Err(e) => {
                warn!(value = %raw, error = %e, "ignoring malformed last_backup setting");
                Ok(None)
            }
        }
    }

    /// Remember `at` as the time of the last successful backup
    pub fn record_backup(&self, at: DateTime<Utc>) -> GestionResult<()> {
        let setting = Setting::new(
            LAST_BACKUP_KEY,
            at.to_rfc3339_opts(SecondsFormat::Millis, true),
        );
        self.storage
            .db()
            .write(|tx| SettingRepository::new(tx).upsert(&setting))
            .map_err(|e| GestionError::Storage(format!("Failed to record backup time: {}", e)))
    }
}
