//! Cash deposit model
//!
//! Money put into the cash box (the "base"). Deposits minus expenses is the
//! cash balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::CashDepositId;
use super::money::Money;
use super::validation::{check_positive, optional_text, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CashDeposit {
    pub id: CashDepositId,
    pub amount: Money,
    pub observations: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub occurred_at: DateTime<Utc>,
}

impl CashDeposit {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive("Amount", self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashDepositDraft {
    pub amount: Money,
    pub observations: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl CashDepositDraft {
    pub fn new(amount: Money, occurred_at: DateTime<Utc>) -> Self {
        Self {
            amount,
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
            observations: optional_text(self.observations),
            ..self
        })
    }
}
