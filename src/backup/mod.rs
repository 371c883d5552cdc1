//! Backup system for Gestion
//!
//! Whole-store snapshots written as pretty JSON, rolling retention, and
//! transactional restore.
//!
//! # Architecture
//!
//! - `Snapshot`: the file format, with decoding and validation
//! - `BackupManager`: exports snapshots and applies the retention policy
//! - `RestoreManager`: validates and restores snapshots
//!
//! # Retention Policy
//!
//! By default the system keeps 30 daily backups and 12 monthly backups (the
//! oldest backup of each month).
//!
//! # Example
//!
//! ```rust,ignore
//! use gestion::backup::{BackupManager, RestoreManager};
//! use gestion::config::settings::BackupRetention;
//!
//! let outcome = BackupManager::new(&storage, BackupRetention::default()).create_backup()?;
//!
//! let result = RestoreManager::new(&storage).restore_from_file(&outcome.path)?;
//! println!("{}", result.summary());
//! ```

mod manager;
mod restore;
mod snapshot;

pub use manager::{BackupInfo, BackupManager, BackupOutcome, RetentionPlan};
pub use restore::{RestoreManager, RestoreResult, SnapshotSummary};
pub use snapshot::{Snapshot, SnapshotTables, SNAPSHOT_FORMAT, SNAPSHOT_VERSION};
