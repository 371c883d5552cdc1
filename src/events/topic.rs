//! Notification topics

use std::fmt;
use std::str::FromStr;

/// A named channel on the bus: one per entity table plus the umbrella topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    Products,
    Expenses,
    Transfers,
    Providers,
    Categories,
    Carriers,
    Couriers,
    CashDeposits,
    /// Published by every mutating command and after a restore
    AnyDataChanged,
}

impl Topic {
    pub const ALL: [Topic; 9] = [
        Topic::Products,
        Topic::Expenses,
        Topic::Transfers,
        Topic::Providers,
        Topic::Categories,
        Topic::Carriers,
        Topic::Couriers,
        Topic::CashDeposits,
        Topic::AnyDataChanged,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Products => "products",
            Topic::Expenses => "expenses",
            Topic::Transfers => "transfers",
            Topic::Providers => "providers",
            Topic::Categories => "categories",
            Topic::Carriers => "carriers",
            Topic::Couriers => "couriers",
            Topic::CashDeposits => "cash_deposits",
            Topic::AnyDataChanged => "any_data_changed",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown topic: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for topic in Topic::ALL {
            assert_eq!(topic.as_str().parse::<Topic>().unwrap(), topic);
        }
        assert!("orders".parse::<Topic>().is_err());
    }
}
