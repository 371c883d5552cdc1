//! Expense repository
//!
//! Expenses are paid out of the cash box. Listings join the carrier and
//! courier names.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{GestionError, GestionResult};
use crate::models::{
    CarrierId, CourierId, Expense, ExpenseDraft, ExpenseId, ExpenseListing, ExpenseType, Money,
};

use super::query::{timestamp_at, Conditions, DateRange};

const COLUMNS: &str = "id, expense_type, amount, observations, occurred_at, carrier_id, courier_id";

const LISTING_SELECT: &str = "SELECT e.id, e.expense_type, e.amount, e.observations, e.occurred_at, \
     e.carrier_id, e.courier_id, ca.name, co.name \
     FROM expenses e \
     LEFT JOIN carriers ca ON ca.id = e.carrier_id \
     LEFT JOIN couriers co ON co.id = e.courier_id";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    pub range: DateRange,
    pub expense_type: Option<ExpenseType>,
    pub carrier_id: Option<CarrierId>,
    pub courier_id: Option<CourierId>,
    /// Substring of the observations
    pub search: Option<String>,
    pub limit: Option<usize>,
}

pub struct ExpenseRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ExpenseRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, draft: &ExpenseDraft) -> GestionResult<Expense> {
        self.conn.execute(
            "INSERT INTO expenses (expense_type, amount, observations, occurred_at, carrier_id, courier_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                draft.expense_type,
                draft.amount,
                draft.observations,
                draft.occurred_at.timestamp_millis(),
                draft.carrier_id,
                draft.courier_id
            ],
        )?;
        Ok(Expense {
            id: ExpenseId::new(self.conn.last_insert_rowid()),
            expense_type: draft.expense_type,
            amount: draft.amount,
            observations: draft.observations.clone(),
            occurred_at: draft.occurred_at,
            carrier_id: draft.carrier_id,
            courier_id: draft.courier_id,
        })
    }

    pub fn insert_with_id(&self, expense: &Expense) -> GestionResult<()> {
        self.conn.execute(
            "INSERT INTO expenses (id, expense_type, amount, observations, occurred_at, carrier_id, courier_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                expense.id,
                expense.expense_type,
                expense.amount,
                expense.observations,
                expense.occurred_at.timestamp_millis(),
                expense.carrier_id,
                expense.courier_id
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, id: ExpenseId) -> GestionResult<Option<Expense>> {
        let sql = format!("SELECT {} FROM expenses WHERE id = ?1", COLUMNS);
        Ok(self.conn.query_row(&sql, [id], map_row).optional()?)
    }

    pub fn update(&self, expense: &Expense) -> GestionResult<()> {
        let changed = self.conn.execute(
            "UPDATE expenses SET expense_type = ?2, amount = ?3, observations = ?4, occurred_at = ?5, \
             carrier_id = ?6, courier_id = ?7 WHERE id = ?1",
            params![
                expense.id,
                expense.expense_type,
                expense.amount,
                expense.observations,
                expense.occurred_at.timestamp_millis(),
                expense.carrier_id,
                expense.courier_id
            ],
        )?;
        if changed == 0 {
            return Err(GestionError::not_found("Expense", expense.id));
        }
        Ok(())
    }

    pub fn delete(&self, id: ExpenseId) -> GestionResult<bool> {
        Ok(self.conn.execute("DELETE FROM expenses WHERE id = ?1", [id])? > 0)
    }

    /// Newest first
    pub fn list(&self, filter: &ExpenseFilter) -> GestionResult<Vec<ExpenseListing>> {
        let mut conditions = Conditions::new();
        conditions.range("e.occurred_at", &filter.range);
        conditions.push_opt(
            "e.expense_type = ?",
            filter.expense_type.map(|t| t.as_str().to_string()),
        );
        conditions.push_opt("e.carrier_id = ?", filter.carrier_id.map(|id| id.get()));
        conditions.push_opt("e.courier_id = ?", filter.courier_id.map(|id| id.get()));
        conditions.like_any(&["e.observations"], filter.search.as_deref());
        let where_sql = conditions.where_sql();
        let limit_sql = conditions.limit_sql(filter.limit);
        let sql = format!(
            "{}{} ORDER BY e.occurred_at DESC, e.id DESC{}",
            LISTING_SELECT, where_sql, limit_sql
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(conditions.params(), map_listing)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn all(&self) -> GestionResult<Vec<Expense>> {
        let sql = format!("SELECT {} FROM expenses ORDER BY id", COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn total(&self, range: &DateRange) -> GestionResult<Money> {
        let mut conditions = Conditions::new();
        conditions.range("occurred_at", range);
        let sql = format!(
            "SELECT COALESCE(SUM(amount), 0) FROM expenses{}",
            conditions.where_sql()
        );
        Ok(self
            .conn
            .query_row(&sql, conditions.params(), |row| row.get(0))?)
    }

    pub fn count(&self, range: &DateRange) -> GestionResult<i64> {
        let mut conditions = Conditions::new();
        conditions.range("occurred_at", range);
        let sql = format!("SELECT COUNT(*) FROM expenses{}", conditions.where_sql());
        Ok(self
            .conn
            .query_row(&sql, conditions.params(), |row| row.get(0))?)
    }

    /// Totals per expense type; types with no rows in range are absent
    pub fn totals_by_type(&self, range: &DateRange) -> GestionResult<Vec<(ExpenseType, Money)>> {
        let mut conditions = Conditions::new();
        conditions.range("occurred_at", range);
        let sql = format!(
            "SELECT expense_type, SUM(amount) FROM expenses{} GROUP BY expense_type ORDER BY expense_type",
            conditions.where_sql()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(conditions.params(), |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Latest expenses by date, for activity feeds
    pub fn recent(&self, limit: usize) -> GestionResult<Vec<ExpenseListing>> {
        self.list(&ExpenseFilter {
            limit: Some(limit),
            ..ExpenseFilter::default()
        })
    }

    pub fn delete_all(&self) -> GestionResult<usize> {
        Ok(self.conn.execute("DELETE FROM expenses", [])?)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        expense_type: row.get(1)?,
        amount: row.get(2)?,
        observations: row.get(3)?,
        occurred_at: timestamp_at(row, 4)?,
        carrier_id: row.get(5)?,
        courier_id: row.get(6)?,
    })
}

fn map_listing(row: &Row<'_>) -> rusqlite::Result<ExpenseListing> {
    Ok(ExpenseListing {
        expense: map_row(row)?,
        carrier_name: row.get(7)?,
        courier_name: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CarrierDraft, CourierDraft};
    use crate::storage::testing::{connection, day};
    use crate::storage::{CarrierRepository, CourierRepository};

    #[test]
    fn test_insert_and_listing_names() {
        let conn = connection();
        let carrier = CarrierRepository::new(&conn)
            .insert(&CarrierDraft::new("Servientrega"))
            .unwrap();
        let courier = CourierRepository::new(&conn)
            .insert(&CourierDraft::new("Pedro"))
            .unwrap();

        let repo = ExpenseRepository::new(&conn);
        let expense = repo
            .insert(
                &ExpenseDraft::new(ExpenseType::Carrier, Money::from_units(20_000), day(1))
                    .with_carrier(carrier.id)
                    .with_courier(courier.id),
            )
            .unwrap();

        assert_eq!(repo.get(expense.id).unwrap(), Some(expense.clone()));
        let listing = &repo.list(&ExpenseFilter::default()).unwrap()[0];
        assert_eq!(listing.carrier_name.as_deref(), Some("Servientrega"));
        assert_eq!(listing.courier_name.as_deref(), Some("Pedro"));
    }

    #[test]
    fn test_list_newest_first_with_range() {
        let conn = connection();
        let repo = ExpenseRepository::new(&conn);
        for d in [3, 1, 2] {
            repo.insert(&ExpenseDraft::new(
                ExpenseType::Other,
                Money::from_units(d as i64),
                day(d),
            ))
            .unwrap();
        }

        let all: Vec<_> = repo
            .list(&ExpenseFilter::default())
            .unwrap()
            .into_iter()
            .map(|l| l.expense.occurred_at)
            .collect();
        assert_eq!(all, vec![day(3), day(2), day(1)]);

        let ranged = repo
            .list(&ExpenseFilter {
                range: DateRange::between(day(2), day(3)),
                ..ExpenseFilter::default()
            })
            .unwrap();
        assert_eq!(ranged.len(), 2);
    }

    #[test]
    fn test_totals_by_type_only_present_keys() {
        let conn = connection();
        let repo = ExpenseRepository::new(&conn);
        repo.insert(&ExpenseDraft::new(ExpenseType::Freight, Money::from_units(150), day(1)))
            .unwrap();
        repo.insert(&ExpenseDraft::new(ExpenseType::Freight, Money::from_units(50), day(2)))
            .unwrap();
        repo.insert(&ExpenseDraft::new(ExpenseType::Delivery, Money::from_units(10), day(9)))
            .unwrap();

        let totals = repo.totals_by_type(&DateRange::between(day(1), day(5))).unwrap();
        assert_eq!(totals, vec![(ExpenseType::Freight, Money::from_units(200))]);
        assert_eq!(repo.total(&DateRange::all()).unwrap(), Money::from_units(210));
        assert_eq!(repo.count(&DateRange::between(day(9), day(9))).unwrap(), 1);
    }

    #[test]
    fn test_filter_by_type() {
        let conn = connection();
        let repo = ExpenseRepository::new(&conn);
        repo.insert(&ExpenseDraft::new(ExpenseType::Freight, Money::from_units(1), day(1)))
            .unwrap();
        repo.insert(
            &ExpenseDraft::new(ExpenseType::Other, Money::from_units(2), day(1))
                .with_observations("bolsas"),
        )
        .unwrap();

        let other = repo
            .list(&ExpenseFilter {
                expense_type: Some(ExpenseType::Other),
                search: Some("BOLS".into()),
                ..ExpenseFilter::default()
            })
            .unwrap();
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].expense.amount, Money::from_units(2));
    }
}
