//! Carrier and courier models
//!
//! Carriers are freight companies, couriers are individual delivery people.
//! Expenses may point at either.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CarrierId, CourierId};
use super::validation::{check_name, optional_text, required_name, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Carrier {
    pub id: CarrierId,
    pub name: String,
    pub observations: Option<String>,
}

impl Carrier {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_name("Carrier name", &self.name)
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarrierDraft {
    pub name: String,
    pub observations: Option<String>,
}

impl CarrierDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            observations: None,
        }
    }

    pub fn with_observations(mut self, observations: impl Into<String>) -> Self {
        self.observations = Some(observations.into());
        self
    }

    pub fn normalize(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_name("Carrier name", &self.name)?,
            observations: optional_text(self.observations),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Courier {
    pub id: CourierId,
    pub name: String,
    pub phone: Option<String>,
    pub observations: Option<String>,
}

impl Courier {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_name("Courier name", &self.name)
    }
}

impl fmt::Display for Courier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourierDraft {
    pub name: String,
    pub phone: Option<String>,
    pub observations: Option<String>,
}

impl CourierDraft {
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

    pub fn with_observations(mut self, observations: impl Into<String>) -> Self {
        self.observations = Some(observations.into());
        self
    }

    pub fn normalize(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required_name("Courier name", &self.name)?,
            phone: optional_text(self.phone),
            observations: optional_text(self.observations),
        })
    }
}
