//! Custom error types for Gestion
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use rusqlite::ErrorCode;
use thiserror::Error;

/// The main error type for Gestion operations
#[derive(Error, Debug)]
pub enum GestionError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid input, rejected before any write is attempted
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// A write would create a dangling reference or remove a referenced row
    #[error("Referential integrity violation: {0}")]
    ReferentialIntegrity(String),

    /// Snapshot has an unknown format or version
    #[error("Incompatible snapshot: {0}")]
    SnapshotIncompatible(String),

    /// Schema creation or migration failed
    #[error("Migration error: {0}")]
    Migration(String),

    /// Underlying database errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl GestionError {
    /// Create a "not found" error for any entity type
    pub fn not_found(entity_type: &'static str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            identifier: identifier.to_string(),
        }
    }

    /// Create a referential integrity error for a missing parent row
    pub fn missing_parent(entity_type: &'static str, identifier: impl ToString) -> Self {
        Self::ReferentialIntegrity(format!(
            "{} {} does not exist",
            entity_type,
            identifier.to_string()
        ))
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a referential integrity error
    pub fn is_referential(&self) -> bool {
        matches!(self, Self::ReferentialIntegrity(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for GestionError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GestionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<rusqlite::Error> for GestionError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &err {
            if failure.code == ErrorCode::ConstraintViolation {
                let detail = message.clone().unwrap_or_else(|| err.to_string());
                return match failure.extended_code {
                    rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                        Self::ReferentialIntegrity(detail)
                    }
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => Self::Duplicate {
                        entity_type: "Row",
                        identifier: detail,
                    },
                    _ => Self::Storage(detail),
                };
            }
        }
        Self::Storage(err.to_string())
    }
}

/// Result type alias for Gestion operations
pub type GestionResult<T> = Result<T, GestionError>;
