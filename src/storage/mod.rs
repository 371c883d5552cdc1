//! Storage layer for Gestion
//!
//! A single SQLite database holds every table. [`Database`] serializes access
//! to the connection; the repositories borrow that connection (or an open
//! transaction) and map rows to typed records.

pub mod carriers;
pub mod cash_deposits;
pub mod categories;
pub mod couriers;
pub mod database;
pub mod expenses;
pub mod file_io;
pub mod integrity;
pub mod products;
pub mod providers;
pub mod query;
pub mod schema;
pub mod settings;
pub mod transfers;

pub use carriers::CarrierRepository;
pub use cash_deposits::{CashDepositFilter, CashDepositRepository};
pub use categories::CategoryRepository;
pub use couriers::CourierRepository;
pub use database::Database;
pub use expenses::{ExpenseFilter, ExpenseRepository};
pub use file_io::{read_json_required, write_json_atomic};
pub use integrity::{check_delete, require_parent, DeleteDecision, Relation};
pub use products::{NewProduct, ProductFilter, ProductRepository};
pub use providers::ProviderRepository;
pub use query::{DateRange, NameFilter};
pub use schema::{ensure_schema, SchemaReport, SCHEMA_VERSION};
pub use settings::SettingRepository;
pub use transfers::{TransferFilter, TransferRepository};

use std::sync::Arc;

use tracing::{info, warn};

use crate::audit::{AuditEntry, AuditLogger};
use crate::config::paths::GestionPaths;
use crate::error::GestionResult;
use crate::events::{EventBus, Topic};

/// Main storage coordinator: the database, the notification bus and the audit log
pub struct Storage {
    paths: GestionPaths,
    db: Database,
    bus: Arc<EventBus>,
    audit: AuditLogger,
    schema_report: SchemaReport,
}

impl Storage {
    /// Open the database under `paths`, creating directories and bringing the
    /// schema up to date. A failed migration aborts startup.
    pub fn open(paths: GestionPaths, bus: Arc<EventBus>) -> GestionResult<Self> {
        paths.ensure_directories()?;

        let db = Database::open(&paths.database_file())?;
        let schema_report = db.migrate()?;
        info!(
            path = %paths.database_file().display(),
            version = schema_report.current_version,
            "storage opened"
        );

        Ok(Self {
            audit: AuditLogger::new(paths.audit_log()),
            paths,
            db,
            bus,
            schema_report,
        })
    }

    pub fn paths(&self) -> &GestionPaths {
        &self.paths
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// The bus every committed change is published on
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// What schema work ran when this store was opened
    pub fn schema_report(&self) -> &SchemaReport {
        &self.schema_report
    }

    /// Append to the audit log after a committed write
    ///
    /// The write already happened, so a failure here is logged rather than
    /// returned.
    pub(crate) fn record(&self, entry: &AuditEntry) {
        if let Err(e) = self.audit.log(entry) {
            warn!(
                entity = %entry.entity_type,
                id = %entry.entity_id,
                error = %e,
                "failed to append audit entry"
            );
        }
    }

    /// Audit a committed change, then notify subscribers of `topic`
    pub(crate) fn committed(&self, entry: &AuditEntry, topic: Topic) {
        self.record(entry);
        self.bus.publish_change(topic);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GestionPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths, Arc::new(EventBus::new())).unwrap();

        assert!(temp_dir.path().join("data").join("gestion.db").exists());
        assert!(temp_dir.path().join("backups").exists());
        assert_eq!(storage.schema_report().previous_version, 0);
    }

    #[test]
    fn test_reopen_keeps_schema() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GestionPaths::with_base_dir(temp_dir.path().to_path_buf());

        Storage::open(paths.clone(), Arc::new(EventBus::new())).unwrap();
        let reopened = Storage::open(paths, Arc::new(EventBus::new())).unwrap();
        assert!(reopened.schema_report().is_unchanged());
    }
}
