//! Provider model
//!
//! Suppliers that products are bought from.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::ProviderId;
use super::validation::{check_name, optional_text, required_name, ValidationError};

/// A stored provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl Provider {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_name("Provider name", &self.name)
    }

    /// Check if this provider matches a name, ignoring ASCII case
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.trim().eq_ignore_ascii_case(name.trim())
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Input for creating or updating a provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderDraft {
    pub name: String,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl ProviderDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Trim and validate every field
    pub fn normalize(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_name("Provider name", &self.name)?,
            phone: optional_text(self.phone),
            notes: optional_text(self.notes),
        })
    }
}
