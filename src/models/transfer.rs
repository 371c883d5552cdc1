//! Transfer model
//!
//! Money received into one of the shop's accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::TransferId;
use super::money::Money;
use super::validation::{check_name, check_positive, optional_text, required_name, ValidationError};

/// Account labels offered by the front end; any non-empty label is accepted
pub const KNOWN_ACCOUNT_TYPES: [&str; 5] = ["Nequi", "Daviplata", "Bancolombia", "Datafono", "Otro"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transfer {
    pub id: TransferId,
    pub amount: Money,
    pub account_type: String,
    pub sender_name: String,
    pub observations: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub occurred_at: DateTime<Utc>,
}

impl Transfer {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive("Amount", self.amount)?;
        check_name("Account type", &self.account_type)?;
        check_name("Sender name", &self.sender_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferDraft {
    pub amount: Money,
    pub account_type: String,
    pub sender_name: String,
    pub observations: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl TransferDraft {
    pub fn new(
        amount: Money,
        account_type: impl Into<String>,
        sender_name: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            amount,
            account_type: account_type.into(),
            sender_name: sender_name.into(),
            observations: None,
            occurred_at,
        }
    }

    pub fn with_observations(mut self, observations: impl Into<String>) -> Self {
        self.observations = Some(observations.into());
        self
    }

    pub fn normalize(self) -> Result<Self, ValidationError> {
        check_positive("Amount", self.amount)?;
        Ok(Self {
            amount: self.amount,
            account_type: required_name("Account type", &self.account_type)?,
            sender_name: required_name("Sender name", &self.sender_name)?,
            observations: optional_text(self.observations),
            occurred_at: self.occurred_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_amount_must_be_positive() {
        let draft = TransferDraft::new(Money::zero(), "Nequi", "Ana", Utc::now());
        assert_eq!(
            draft.normalize(),
            Err(ValidationError::NonPositiveAmount("Amount"))
        );
    }

    #[test]
    fn test_sender_required() {
        let draft = TransferDraft::new(Money::from_units(10), "Nequi", " ", Utc::now());
        assert_eq!(
            draft.normalize(),
            Err(ValidationError::EmptyField("Sender name"))
        );
    }

    #[test]
    fn test_occurred_at_serializes_as_millis() {
        let transfer = Transfer {
            id: TransferId::new(1),
            amount: Money::from_units(5),
            account_type: "Nequi".into(),
            sender_name: "Ana".into(),
            observations: None,
            occurred_at: Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
        };
        let value = serde_json::to_value(&transfer).unwrap();
        assert_eq!(value["occurred_at"], 1_700_000_000_123_i64);
    }
}
