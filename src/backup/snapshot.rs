//! Snapshot artifact
//!
//! A snapshot is the whole store as one JSON document: a format marker, a
//! version, and one array of rows per table. Rows use the store's native
//! representation (amounts in cents, timestamps in epoch milliseconds).

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GestionError, GestionResult};
use crate::models::{
    Carrier, CashDeposit, Category, Courier, Expense, Product, Provider, Setting, Transfer,
};
use crate::storage::{
    read_json_required, CarrierRepository, CashDepositRepository, CategoryRepository,
    CourierRepository, ExpenseRepository, ProductRepository, ProviderRepository,
    SettingRepository, TransferRepository, SCHEMA_VERSION,
};

/// Marker identifying a gestion snapshot file
pub const SNAPSHOT_FORMAT: &str = "gestion-snapshot";

/// Snapshot layout version this build reads and writes
pub const SNAPSHOT_VERSION: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    pub format: String,
    pub version: u64,
    pub schema_version: i64,
    pub created_at: DateTime<Utc>,
    pub tables: SnapshotTables,
}

/// One array per table; every table must be present, even when empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotTables {
    pub providers: Vec<Provider>,
    pub categories: Vec<Category>,
    pub carriers: Vec<Carrier>,
    pub couriers: Vec<Courier>,
    pub settings: Vec<Setting>,
    pub products: Vec<Product>,
    pub expenses: Vec<Expense>,
    pub transfers: Vec<Transfer>,
    pub cash_deposits: Vec<CashDeposit>,
}

impl SnapshotTables {
    /// Row count per table, parents first
    pub fn counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("providers", self.providers.len()),
            ("categories", self.categories.len()),
            ("carriers", self.carriers.len()),
            ("couriers", self.couriers.len()),
            ("settings", self.settings.len()),
            ("products", self.products.len()),
            ("expenses", self.expenses.len()),
            ("transfers", self.transfers.len()),
            ("cash_deposits", self.cash_deposits.len()),
        ]
    }

    pub fn total_rows(&self) -> usize {
        self.counts().iter().map(|(_, n)| n).sum()
    }
}

impl Snapshot {
    /// Read every table through `conn`
    pub fn capture(conn: &Connection, created_at: DateTime<Utc>) -> GestionResult<Self> {
        Ok(Self {
            format: SNAPSHOT_FORMAT.to_string(),
            version: SNAPSHOT_VERSION,
            schema_version: SCHEMA_VERSION,
            created_at,
            tables: SnapshotTables {
                providers: ProviderRepository::new(conn).all()?,
                categories: CategoryRepository::new(conn).all()?,
                carriers: CarrierRepository::new(conn).all()?,
                couriers: CourierRepository::new(conn).all()?,
                settings: SettingRepository::new(conn).all()?,
                products: ProductRepository::new(conn).all()?,
                expenses: ExpenseRepository::new(conn).all()?,
                transfers: TransferRepository::new(conn).all()?,
                cash_deposits: CashDepositRepository::new(conn).all()?,
            },
        })
    }

    /// Load and fully validate a snapshot file without touching the store
    pub fn load(path: &Path) -> GestionResult<Self> {
        let value: Value = read_json_required(path)?;
        Self::from_value(value)
    }

    /// Check the marker and version, then decode and validate every row
    ///
    /// The marker is checked on the raw document first so that files from
    /// another program or a future version get a clear error rather than a
    /// field-level decoding message.
    pub fn from_value(value: Value) -> GestionResult<Self> {
        let format = value.get("format").and_then(Value::as_str);
        if format != Some(SNAPSHOT_FORMAT) {
            return Err(incompatible(match format {
                Some(other) => format!("unknown format marker '{}'", other),
                None => "missing format marker".to_string(),
            }));
        }

        match value.get("version").and_then(Value::as_u64) {
            Some(SNAPSHOT_VERSION) => {}
            Some(other) => {
                return Err(incompatible(format!(
                    "snapshot version {} is not supported (expected {})",
                    other, SNAPSHOT_VERSION
                )))
            }
            None => return Err(incompatible("missing snapshot version".to_string())),
        }

        let snapshot: Snapshot = serde_json::from_value(value)
            .map_err(|e| incompatible(format!("malformed snapshot: {}", e)))?;

        if snapshot.schema_version > SCHEMA_VERSION {
            return Err(incompatible(format!(
                "snapshot was written by schema version {}, newer than {}",
                snapshot.schema_version, SCHEMA_VERSION
            )));
        }

        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Row rules, unique keys, and references between tables of the snapshot
    pub fn validate(&self) -> GestionResult<()> {
        let t = &self.tables;

        for row in &t.providers {
            row.validate().map_err(|e| invalid_row("providers", row.id, e))?;
        }
        for row in &t.categories {
            row.validate().map_err(|e| invalid_row("categories", row.id, e))?;
        }
        for row in &t.carriers {
            row.validate().map_err(|e| invalid_row("carriers", row.id, e))?;
        }
        for row in &t.couriers {
            row.validate().map_err(|e| invalid_row("couriers", row.id, e))?;
        }
        for row in &t.settings {
            row.validate().map_err(|e| invalid_row("settings", &row.key, e))?;
        }
        for row in &t.products {
            row.validate().map_err(|e| invalid_row("products", row.id, e))?;
        }
        for row in &t.expenses {
            row.validate().map_err(|e| invalid_row("expenses", row.id, e))?;
        }
        for row in &t.transfers {
            row.validate().map_err(|e| invalid_row("transfers", row.id, e))?;
        }
        for row in &t.cash_deposits {
            row.validate().map_err(|e| invalid_row("cash_deposits", row.id, e))?;
        }

        let providers = unique_keys("providers", t.providers.iter().map(|r| r.id))?;
        let categories = unique_keys("categories", t.categories.iter().map(|r| r.id))?;
        let carriers = unique_keys("carriers", t.carriers.iter().map(|r| r.id))?;
        let couriers = unique_keys("couriers", t.couriers.iter().map(|r| r.id))?;
        unique_keys("settings", t.settings.iter().map(|r| r.key.as_str()))?;
        unique_keys("products", t.products.iter().map(|r| r.id))?;
        unique_keys("expenses", t.expenses.iter().map(|r| r.id))?;
        unique_keys("transfers", t.transfers.iter().map(|r| r.id))?;
        unique_keys("cash_deposits", t.cash_deposits.iter().map(|r| r.id))?;
        unique_keys(
            "categories",
            t.categories.iter().map(|r| Category::normalize_name(&r.name)),
        )?;

        for product in &t.products {
            check_reference("products", product.id, "provider", product.provider_id, &providers)?;
            check_reference("products", product.id, "category", product.category_id, &categories)?;
        }
        for expense in &t.expenses {
            check_reference("expenses", expense.id, "carrier", expense.carrier_id, &carriers)?;
            check_reference("expenses", expense.id, "courier", expense.courier_id, &couriers)?;
        }

        Ok(())
    }
}

fn incompatible(detail: String) -> GestionError {
    GestionError::SnapshotIncompatible(detail)
}

fn invalid_row(table: &str, key: impl std::fmt::Display, err: impl std::fmt::Display) -> GestionError {
    incompatible(format!("{} row {}: {}", table, key, err))
}

fn unique_keys<K>(table: &str, keys: impl Iterator<Item = K>) -> GestionResult<BTreeSet<K>>
where
    K: Ord + std::fmt::Display,
{
    let mut seen = BTreeSet::new();
    for key in keys {
        if seen.contains(&key) {
            return Err(incompatible(format!("{} contains '{}' more than once", table, key)));
        }
        seen.insert(key);
    }
    Ok(seen)
}

fn check_reference<K, P>(
    table: &str,
    row: K,
    parent: &str,
    reference: Option<P>,
    parents: &BTreeSet<P>,
) -> GestionResult<()>
where
    K: std::fmt::Display,
    P: Ord + std::fmt::Display,
{
    match reference {
        Some(id) if !parents.contains(&id) => Err(GestionError::ReferentialIntegrity(format!(
            "{} row {} references {} {}, which is not in the snapshot",
            table, row, parent, id
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "format": "gestion-snapshot",
            "version": 1,
            "schema_version": 2,
            "created_at": "2024-01-07T12:00:00Z",
            "tables": {
                "providers": [{"id": 1, "name": "Acme", "phone": "3001234567", "notes": null}],
                "categories": [{"id": 4, "name": "Tools"}],
                "carriers": [],
                "couriers": [],
                "settings": [],
                "products": [{
                    "id": 9, "name": "Widget", "price": 4999,
                    "provider_id": 1, "category_id": 4, "observations": null
                }],
                "expenses": [],
                "transfers": [],
                "cash_deposits": [{"id": 2, "amount": 100000, "occurred_at": 1704628800000_i64}]
            }
        })
    }

    #[test]
    fn test_valid_document() {
        let snapshot = Snapshot::from_value(document()).unwrap();
        assert_eq!(snapshot.tables.products[0].price.cents(), 4999);
        assert_eq!(snapshot.tables.total_rows(), 4);
        // absent optional field decodes as None
        assert!(snapshot.tables.cash_deposits[0].observations.is_none());
    }

    #[test]
    fn test_wrong_marker_or_version() {
        let mut doc = document();
        doc["format"] = json!("other-backup");
        assert!(matches!(
            Snapshot::from_value(doc),
            Err(GestionError::SnapshotIncompatible(_))
        ));

        let mut doc = document();
        doc["version"] = json!(2);
        let err = Snapshot::from_value(doc).unwrap_err();
        assert!(err.to_string().contains("version 2"));
    }

    #[test]
    fn test_missing_required_field() {
        let mut doc = document();
        doc["tables"]["products"][0]
            .as_object_mut()
            .unwrap()
            .remove("price");
        assert!(matches!(
            Snapshot::from_value(doc),
            Err(GestionError::SnapshotIncompatible(_))
        ));
    }

    #[test]
    fn test_missing_table_rejected() {
        let mut doc = document();
        doc["tables"].as_object_mut().unwrap().remove("transfers");
        assert!(Snapshot::from_value(doc).is_err());
    }

    #[test]
    fn test_row_rules_apply() {
        let mut doc = document();
        doc["tables"]["products"][0]["price"] = json!(-1);
        let err = Snapshot::from_value(doc).unwrap_err();
        assert!(err.to_string().contains("products row prd-9"));
    }

    #[test]
    fn test_dangling_reference() {
        let mut doc = document();
        doc["tables"]["products"][0]["provider_id"] = json!(77);
        assert!(Snapshot::from_value(doc).unwrap_err().is_referential());
    }

    #[test]
    fn test_duplicate_keys() {
        let mut doc = document();
        doc["tables"]["categories"] = json!([{"id": 4, "name": "Tools"}, {"id": 5, "name": "tools"}]);
        assert!(Snapshot::from_value(doc).is_err());
    }
}
