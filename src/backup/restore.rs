//! Backup restoration for Gestion
//!
//! A restore replaces every table with the snapshot's rows, keeping their
//! snapshot keys. The snapshot is decoded and checked before the store is
//! touched, and the replacement runs as one transaction. `last_backup` is
//! stamped with the restore time rather than taken from the snapshot.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

use crate::audit::AuditEntry;
use crate::error::GestionResult;
use crate::events::Topic;
use crate::models::{Setting, LAST_BACKUP_KEY};
use crate::storage::{
    CarrierRepository, CashDepositRepository, CategoryRepository, CourierRepository,
    ExpenseRepository, ProductRepository, ProviderRepository, SettingRepository, Storage,
    TransferRepository,
};

use super::snapshot::Snapshot;

pub struct RestoreManager<'a> {
    storage: &'a Storage,
}

impl<'a> RestoreManager<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Decode and check a backup file without restoring it
    pub fn validate_backup(&self, backup_path: &Path) -> GestionResult<SnapshotSummary> {
        let snapshot = Snapshot::load(backup_path)?;
        Ok(SnapshotSummary::of(&snapshot))
    }

    /// Replace the store's contents with a backup file
    pub fn restore_from_file(&self, backup_path: &Path) -> GestionResult<RestoreResult> {
        let snapshot = Snapshot::load(backup_path)?;
        self.restore(&snapshot, &backup_path.display().to_string())
    }

    /// Replace the store's contents with an in-memory snapshot
    pub fn restore_snapshot(&self, snapshot: &Snapshot) -> GestionResult<RestoreResult> {
        snapshot.validate()?;
        self.restore(snapshot, "snapshot")
    }

    fn restore(&self, snapshot: &Snapshot, source: &str) -> GestionResult<RestoreResult> {
        let t = &snapshot.tables;
        let stamp = Setting::new(
            LAST_BACKUP_KEY,
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        );

        let rows_removed = self.storage.db().write(|tx| {
            let mut removed = 0;
            removed += ExpenseRepository::new(tx).delete_all()?;
            removed += ProductRepository::new(tx).delete_all()?;
            removed += TransferRepository::new(tx).delete_all()?;
            removed += CashDepositRepository::new(tx).delete_all()?;
            removed += CarrierRepository::new(tx).delete_all()?;
            removed += CourierRepository::new(tx).delete_all()?;
            removed += ProviderRepository::new(tx).delete_all()?;
            removed += CategoryRepository::new(tx).delete_all()?;
            removed += SettingRepository::new(tx).delete_all()?;

            let providers = ProviderRepository::new(tx);
            for row in &t.providers {
                providers.insert_with_id(row)?;
            }
            let categories = CategoryRepository::new(tx);
            for row in &t.categories {
                categories.insert_with_id(row)?;
            }
            let carriers = CarrierRepository::new(tx);
            for row in &t.carriers {
                carriers.insert_with_id(row)?;
            }
            let couriers = CourierRepository::new(tx);
            for row in &t.couriers {
                couriers.insert_with_id(row)?;
            }
            let settings = SettingRepository::new(tx);
            for row in &t.settings {
                settings.upsert(row)?;
            }
            settings.upsert(&stamp)?;
            let products = ProductRepository::new(tx);
            for row in &t.products {
                products.insert_with_id(row)?;
            }
            let expenses = ExpenseRepository::new(tx);
            for row in &t.expenses {
                expenses.insert_with_id(row)?;
            }
            let transfers = TransferRepository::new(tx);
            for row in &t.transfers {
                transfers.insert_with_id(row)?;
            }
            let deposits = CashDepositRepository::new(tx);
            for row in &t.cash_deposits {
                deposits.insert_with_id(row)?;
            }

            Ok(removed)
        })?;

        let result = RestoreResult {
            backup_date: snapshot.created_at,
            counts: t.counts(),
            rows_removed,
        };
        info!(
            source,
            rows = t.total_rows(),
            removed = rows_removed,
            "snapshot restored"
        );

        self.storage.committed(
            &AuditEntry::restored(source, result.summary()),
            Topic::AnyDataChanged,
        );
        Ok(result)
    }
}

/// Result of a restore operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreResult {
    /// When the restored snapshot was taken
    pub backup_date: DateTime<Utc>,
    /// Rows restored per table
    pub counts: Vec<(&'static str, usize)>,
    /// Rows that were in the store before the restore
    pub rows_removed: usize,
}

impl RestoreResult {
    pub fn total_rows(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    pub fn summary(&self) -> String {
        let tables: Vec<String> = self
            .counts
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(table, n)| format!("{} {}", n, table))
            .collect();

        if tables.is_empty() {
            format!(
                "Restored an empty snapshot from {}",
                self.backup_date.format("%Y-%m-%d %H:%M")
            )
        } else {
            format!(
                "Restored {} from {}",
                tables.join(", "),
                self.backup_date.format("%Y-%m-%d %H:%M")
            )
        }
    }
}

/// What a valid backup file contains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub version: u64,
    pub schema_version: i64,
    pub backup_date: DateTime<Utc>,
    pub counts: Vec<(&'static str, usize)>,
}

impl SnapshotSummary {
    fn of(snapshot: &Snapshot) -> Self {
        Self {
            version: snapshot.version,
            schema_version: snapshot.schema_version,
            backup_date: snapshot.created_at,
            counts: snapshot.tables.counts(),
        }
    }

    pub fn total_rows(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "Snapshot v{} (schema {}) with {} rows",
            self.version,
            self.schema_version,
            self.total_rows()
        )
    }
}
