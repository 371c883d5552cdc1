//! Key/value metadata rows stored alongside the business data

use serde::{Deserialize, Serialize};

use super::validation::ValidationError;

/// Key of the timestamp written after every successful export
pub const LAST_BACKUP_KEY: &str = "last_backup";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

impl Setting {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.key.trim().is_empty() {
            return Err(ValidationError::EmptyField("Setting key"));
        }
        Ok(())
    }
}
