//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::diff::generate_diff;
use crate::models::{
    CashDeposit, Category, Carrier, Courier, Expense, Product, Provider, Setting, Transfer,
};

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
    /// Every table was replaced from a snapshot
    Restore,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Operation::Create => "CREATE",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
            Operation::Restore => "RESTORE",
        };
        f.write_str(label)
    }
}

/// Types of entities that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Provider,
    Category,
    Product,
    Transfer,
    Carrier,
    Courier,
    Expense,
    CashDeposit,
    Setting,
    Snapshot,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EntityType::Provider => "Provider",
            EntityType::Category => "Category",
            EntityType::Product => "Product",
            EntityType::Transfer => "Transfer",
            EntityType::Carrier => "Carrier",
            EntityType::Courier => "Courier",
            EntityType::Expense => "Expense",
            EntityType::CashDeposit => "CashDeposit",
            EntityType::Setting => "Setting",
            EntityType::Snapshot => "Snapshot",
        };
        f.write_str(label)
    }
}

/// A record that knows how to describe itself in the audit log
pub trait Audited: Serialize {
    const ENTITY_TYPE: EntityType;

    fn audit_id(&self) -> String;

    fn audit_name(&self) -> Option<String> {
        None
    }
}

macro_rules! audited_by_name {
    ($($ty:ty => $entity:ident),* $(,)?) => {
        $(
            impl Audited for $ty {
                const ENTITY_TYPE: EntityType = EntityType::$entity;

                fn audit_id(&self) -> String {
                    self.id.to_string()
                }

                fn audit_name(&self) -> Option<String> {
                    Some(self.name.clone())
                }
            }
        )*
    };
}

audited_by_name!(
    Provider => Provider,
    Category => Category,
    Product => Product,
    Carrier => Carrier,
    Courier => Courier,
);

impl Audited for Transfer {
    const ENTITY_TYPE: EntityType = EntityType::Transfer;

    fn audit_id(&self) -> String {
        self.id.to_string()
    }

    fn audit_name(&self) -> Option<String> {
        Some(format!("{} via {}", self.sender_name, self.account_type))
    }
}

impl Audited for Expense {
    const ENTITY_TYPE: EntityType = EntityType::Expense;

    fn audit_id(&self) -> String {
        self.id.to_string()
    }

    fn audit_name(&self) -> Option<String> {
        Some(self.expense_type.to_string())
    }
}

impl Audited for CashDeposit {
    const ENTITY_TYPE: EntityType = EntityType::CashDeposit;

    fn audit_id(&self) -> String {
        self.id.to_string()
    }
}

impl Audited for Setting {
    const ENTITY_TYPE: EntityType = EntityType::Setting;

    fn audit_id(&self) -> String {
        self.key.clone()
    }
}

/// A single audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the operation occurred (UTC)
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    pub entity_type: EntityType,

    /// Display form of the key, e.g. `prv-3`
    pub entity_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,

    /// Human-readable diff or restore summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    fn new<T: Audited>(operation: Operation, record: &T) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type: T::ENTITY_TYPE,
            entity_id: record.audit_id(),
            entity_name: record.audit_name(),
            before: None,
            after: None,
            diff_summary: None,
        }
    }

    pub fn created<T: Audited>(record: &T) -> Self {
        Self {
            after: serde_json::to_value(record).ok(),
            ..Self::new(Operation::Create, record)
        }
    }

    /// Update entry with the field diff computed from both states
    pub fn updated<T: Audited>(before: &T, after: &T) -> Self {
        let before_json = serde_json::to_value(before).ok();
        let after_json = serde_json::to_value(after).ok();
        let diff_summary = match (&before_json, &after_json) {
            (Some(b), Some(a)) => generate_diff(b, a),
            _ => None,
        };

        Self {
            before: before_json,
            after: after_json,
            diff_summary,
            ..Self::new(Operation::Update, after)
        }
    }

    pub fn deleted<T: Audited>(record: &T) -> Self {
        Self {
            before: serde_json::to_value(record).ok(),
            ..Self::new(Operation::Delete, record)
        }
    }

    /// Entry for a completed restore; `source` names the snapshot
    pub fn restored(source: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Restore,
            entity_type: EntityType::Snapshot,
            entity_id: source.into(),
            entity_name: None,
            before: None,
            after: None,
            diff_summary: Some(summary.into()),
        }
    }

    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  Changes: {}", diff));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, ProductId, ProviderId};

    fn widget() -> Product {
        Product {
            id: ProductId::new(4),
            name: "Widget".into(),
            price: Money::from_cents(4999),
            provider_id: Some(ProviderId::new(1)),
            category_id: None,
            observations: None,
        }
    }

    #[test]
    fn test_created_entry() {
        let entry = AuditEntry::created(&widget());

        assert_eq!(entry.operation, Operation::Create);
        assert_eq!(entry.entity_type, EntityType::Product);
        assert_eq!(entry.entity_id, "prd-4");
        assert_eq!(entry.entity_name.as_deref(), Some("Widget"));
        assert!(entry.before.is_none());
        assert_eq!(entry.after.as_ref().unwrap()["price"], 4999);
    }

    #[test]
    fn test_updated_entry_has_diff() {
        let before = widget();
        let after = Product {
            price: Money::from_cents(5500),
            ..widget()
        };

        let entry = AuditEntry::updated(&before, &after);
        assert_eq!(entry.operation, Operation::Update);
        assert_eq!(entry.diff_summary.as_deref(), Some("price: 4999 -> 5500"));
    }

    #[test]
    fn test_deleted_entry() {
        let entry = AuditEntry::deleted(&widget());
        assert!(entry.before.is_some());
        assert!(entry.after.is_none());
    }

    #[test]
    fn test_restored_entry_round_trips() {
        let entry = AuditEntry::restored("backup-20240101-120000-000.json", "42 rows");
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: AuditEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.operation, Operation::Restore);
        assert_eq!(parsed.entity_type, EntityType::Snapshot);
        assert!(json.contains("\"restore\""));
    }

    #[test]
    fn test_human_readable_format() {
        let formatted = AuditEntry::created(&widget()).format_human_readable();
        assert!(formatted.contains("CREATE Product prd-4 (Widget)"));
    }

    #[test]
    fn test_cash_deposit_has_no_name() {
        use crate::models::CashDepositId;
        let deposit = CashDeposit {
            id: CashDepositId::new(2),
            amount: Money::from_units(10),
            observations: None,
            occurred_at: Utc::now(),
        };
        let entry = AuditEntry::created(&deposit);
        assert_eq!(entry.entity_id, "dep-2");
        assert!(entry.entity_name.is_none());
    }
}
