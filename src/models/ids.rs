//! Strongly-typed ID wrappers for all entity types
//!
//! Keys are the SQLite rowids assigned on insert. Using newtype wrappers
//! prevents accidentally mixing up IDs from different entity types at
//! compile time.

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw rowid
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Get the underlying rowid
            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(s.parse()?))
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                i64::column_result(value).map(Self)
            }
        }
    };
}

define_id!(ProviderId, "prv-");
define_id!(CategoryId, "cat-");
define_id!(ProductId, "prd-");
define_id!(TransferId, "trf-");
define_id!(CarrierId, "car-");
define_id!(CourierId, "cou-");
define_id!(ExpenseId, "exp-");
define_id!(CashDepositId, "dep-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefix() {
        assert_eq!(ProviderId::new(7).to_string(), "prv-7");
        assert_eq!(ExpenseId::new(12).to_string(), "exp-12");
    }

    #[test]
    fn test_parse_with_and_without_prefix() {
        assert_eq!("cat-3".parse::<CategoryId>().unwrap(), CategoryId::new(3));
        assert_eq!("3".parse::<CategoryId>().unwrap(), CategoryId::new(3));
        assert!("cat-x".parse::<CategoryId>().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&ProductId::new(5)).unwrap();
        assert_eq!(json, "5");
        let id: ProductId = serde_json::from_str("5").unwrap();
        assert_eq!(id.get(), 5);
    }
}
