//! Audit logging for Gestion
//!
//! Every committed create, update and delete, and every restore, is appended
//! to `audit.log` as one JSON object per line, with before/after values and
//! a short diff for updates.
//!
//! # Example
//!
//! ```rust,ignore
//! use gestion::audit::{AuditEntry, AuditLogger};
//!
//! let logger = AuditLogger::new(paths.audit_log());
//! logger.log(&AuditEntry::created(&provider))?;
//! logger.log(&AuditEntry::updated(&before, &after))?;
//! ```

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, Audited, EntityType, Operation};
pub use logger::AuditLogger;
