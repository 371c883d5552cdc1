//! Referential checks run before writes
//!
//! SQLite enforces the foreign keys as well; these checks exist so callers
//! get a typed answer ("blocked by 3 products") instead of a constraint
//! failure string, and so a delete can be previewed without attempting it.

use rusqlite::Connection;

use crate::error::{GestionError, GestionResult};

/// A nullable foreign key from a child table to a parent table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    ProductProvider,
    ProductCategory,
    ExpenseCarrier,
    ExpenseCourier,
}

impl Relation {
    pub const ALL: [Relation; 4] = [
        Relation::ProductProvider,
        Relation::ProductCategory,
        Relation::ExpenseCarrier,
        Relation::ExpenseCourier,
    ];

    pub fn parent_entity(&self) -> &'static str {
        match self {
            Relation::ProductProvider => "Provider",
            Relation::ProductCategory => "Category",
            Relation::ExpenseCarrier => "Carrier",
            Relation::ExpenseCourier => "Courier",
        }
    }

    pub fn parent_table(&self) -> &'static str {
        match self {
            Relation::ProductProvider => "providers",
            Relation::ProductCategory => "categories",
            Relation::ExpenseCarrier => "carriers",
            Relation::ExpenseCourier => "couriers",
        }
    }

    pub fn child_table(&self) -> &'static str {
        match self {
            Relation::ProductProvider | Relation::ProductCategory => "products",
            Relation::ExpenseCarrier | Relation::ExpenseCourier => "expenses",
        }
    }

    pub fn child_column(&self) -> &'static str {
        match self {
            Relation::ProductProvider => "provider_id",
            Relation::ProductCategory => "category_id",
            Relation::ExpenseCarrier => "carrier_id",
            Relation::ExpenseCourier => "courier_id",
        }
    }
}

/// Outcome of a pre-delete check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteDecision {
    Allowed,
    Blocked {
        entity_type: &'static str,
        id: i64,
        dependent_table: &'static str,
        dependents: i64,
    },
}

impl DeleteDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, DeleteDecision::Allowed)
    }

    /// Turn `Blocked` into a [`GestionError::ReferentialIntegrity`]
    pub fn into_result(self) -> GestionResult<()> {
        match self {
            DeleteDecision::Allowed => Ok(()),
            DeleteDecision::Blocked {
                entity_type,
                id,
                dependent_table,
                dependents,
            } => Err(GestionError::ReferentialIntegrity(format!(
                "{} {} is still referenced by {} row(s) in {}",
                entity_type, id, dependents, dependent_table
            ))),
        }
    }
}

/// Decide whether the parent row `id` may be deleted under `relation`
pub fn check_delete(conn: &Connection, relation: Relation, id: i64) -> GestionResult<DeleteDecision> {
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {} = ?1",
        relation.child_table(),
        relation.child_column()
    );
    let dependents: i64 = conn.query_row(&sql, [id], |row| row.get(0))?;

    if dependents == 0 {
        Ok(DeleteDecision::Allowed)
    } else {
        Ok(DeleteDecision::Blocked {
            entity_type: relation.parent_entity(),
            id,
            dependent_table: relation.child_table(),
            dependents,
        })
    }
}

/// Fail with a referential error unless the parent row exists
pub fn require_parent(conn: &Connection, relation: Relation, id: Option<i64>) -> GestionResult<()> {
    let Some(id) = id else {
        return Ok(());
    };
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)",
        relation.parent_table()
    );
    let exists: bool = conn.query_row(&sql, [id], |row| row.get(0))?;
    if exists {
        Ok(())
    } else {
        Err(GestionError::missing_parent(relation.parent_entity(), id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::connection as conn;

    #[test]
    fn test_unreferenced_parent_allowed() {
        let conn = conn();
        conn.execute("INSERT INTO categories (name) VALUES ('Aseo')", [])
            .unwrap();
        let decision = check_delete(&conn, Relation::ProductCategory, 1).unwrap();
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_referenced_parent_blocked() {
        let conn = conn();
        conn.execute_batch(
            "INSERT INTO carriers (name) VALUES ('Servientrega');
             INSERT INTO expenses (expense_type, amount, occurred_at, carrier_id) VALUES ('Carrier', 100, 0, 1);
             INSERT INTO expenses (expense_type, amount, occurred_at, carrier_id) VALUES ('Carrier', 200, 0, 1);",
        )
        .unwrap();

        let decision = check_delete(&conn, Relation::ExpenseCarrier, 1).unwrap();
        assert_eq!(
            decision,
            DeleteDecision::Blocked {
                entity_type: "Carrier",
                id: 1,
                dependent_table: "expenses",
                dependents: 2,
            }
        );
        assert!(decision.into_result().unwrap_err().is_referential());
    }

    #[test]
    fn test_require_parent() {
        let conn = conn();
        assert!(require_parent(&conn, Relation::ProductProvider, None).is_ok());
        let err = require_parent(&conn, Relation::ProductProvider, Some(9)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Referential integrity violation: Provider 9 does not exist"
        );
    }
}
