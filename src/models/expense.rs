//! Expense model
//!
//! Cash-box outflows. An expense may reference the carrier or courier it was
//! paid to.

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{CarrierId, CourierId, ExpenseId};
use super::money::Money;
use super::validation::{check_positive, optional_text, ValidationError};

/// Kind of expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExpenseType {
    Freight,
    Delivery,
    Carrier,
    Other,
}

impl ExpenseType {
    pub const ALL: [ExpenseType; 4] = [Self::Freight, Self::Delivery, Self::Carrier, Self::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Freight => "Freight",
            Self::Delivery => "Delivery",
            Self::Carrier => "Carrier",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExpenseType {
    type Err = String;

    /// Case-insensitive; also accepts the shop's Spanish labels
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "freight" | "flete" => Ok(Self::Freight),
            "delivery" | "domicilio" => Ok(Self::Delivery),
            "carrier" | "transportadora" => Ok(Self::Carrier),
            "other" | "otro" => Ok(Self::Other),
            other => Err(format!("Unknown expense type: {}", other)),
        }
    }
}

impl ToSql for ExpenseType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ExpenseType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        text.parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expense {
    pub id: ExpenseId,
    pub expense_type: ExpenseType,
    pub amount: Money,
    pub observations: Option<String>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub occurred_at: DateTime<Utc>,
    pub carrier_id: Option<CarrierId>,
    pub courier_id: Option<CourierId>,
}

impl Expense {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_positive("Amount", self.amount)
    }
}

/// An expense joined with the names of its carrier and courier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseListing {
    pub expense: Expense,
    pub carrier_name: Option<String>,
    pub courier_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseDraft {
    pub expense_type: ExpenseType,
    pub amount: Money,
    pub observations: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub carrier_id: Option<CarrierId>,
    pub courier_id: Option<CourierId>,
}

impl ExpenseDraft {
    pub fn new(expense_type: ExpenseType, amount: Money, occurred_at: DateTime<Utc>) -> Self {
        Self {
            expense_type,
            amount,
            observations: None,
            occurred_at,
            carrier_id: None,
            courier_id: None,
        }
    }

    pub fn with_carrier(mut self, id: CarrierId) -> Self {
        self.carrier_id = Some(id);
        self
    }

    pub fn with_courier(mut self, id: CourierId) -> Self {
        self.courier_id = Some(id);
        self
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_type_parse() {
        assert_eq!("freight".parse::<ExpenseType>().unwrap(), ExpenseType::Freight);
        assert_eq!("Flete".parse::<ExpenseType>().unwrap(), ExpenseType::Freight);
        assert_eq!(
            "Transportadora".parse::<ExpenseType>().unwrap(),
            ExpenseType::Carrier
        );
        assert!("fuel".parse::<ExpenseType>().is_err());
    }

    #[test]
    fn test_expense_type_serde() {
        assert_eq!(
            serde_json::to_string(&ExpenseType::Delivery).unwrap(),
            "\"Delivery\""
        );
    }

    #[test]
    fn test_draft_requires_positive_amount() {
        let draft = ExpenseDraft::new(ExpenseType::Other, Money::from_cents(-5), Utc::now());
        assert!(draft.normalize().is_err());
    }
}
