//! Transfer repository

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{GestionError, GestionResult};
use crate::models::{Money, Transfer, TransferDraft, TransferId};

use super::query::{timestamp_at, Conditions, DateRange};

const COLUMNS: &str = "id, amount, account_type, sender_name, observations, occurred_at";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferFilter {
    pub range: DateRange,
    /// Exact account label, compared case-insensitively
    pub account_type: Option<String>,
    /// Substring of the sender name or observations
    pub search: Option<String>,
    pub limit: Option<usize>,
}

pub struct TransferRepository<'a> {
    conn: &'a Connection,
}

impl<'a> TransferRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, draft: &TransferDraft) -> GestionResult<Transfer> {
        self.conn.execute(
            "INSERT INTO transfers (amount, account_type, sender_name, observations, occurred_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                draft.amount,
                draft.account_type,
                draft.sender_name,
                draft.observations,
                draft.occurred_at.timestamp_millis()
            ],
        )?;
        Ok(Transfer {
            id: TransferId::new(self.conn.last_insert_rowid()),
            amount: draft.amount,
            account_type: draft.account_type.clone(),
            sender_name: draft.sender_name.clone(),
            observations: draft.observations.clone(),
            occurred_at: draft.occurred_at,
        })
    }

    pub fn insert_with_id(&self, transfer: &Transfer) -> GestionResult<()> {
        self.conn.execute(
            "INSERT INTO transfers (id, amount, account_type, sender_name, observations, occurred_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                transfer.id,
                transfer.amount,
                transfer.account_type,
                transfer.sender_name,
                transfer.observations,
                transfer.occurred_at.timestamp_millis()
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, id: TransferId) -> GestionResult<Option<Transfer>> {
        let sql = format!("SELECT {} FROM transfers WHERE id = ?1", COLUMNS);
        Ok(self.conn.query_row(&sql, [id], map_row).optional()?)
    }

    pub fn update(&self, transfer: &Transfer) -> GestionResult<()> {
        let changed = self.conn.execute(
            "UPDATE transfers SET amount = ?2, account_type = ?3, sender_name = ?4, \
             observations = ?5, occurred_at = ?6 WHERE id = ?1",
            params![
                transfer.id,
                transfer.amount,
                transfer.account_type,
                transfer.sender_name,
                transfer.observations,
                transfer.occurred_at.timestamp_millis()
            ],
        )?;
        if changed == 0 {
            return Err(GestionError::not_found("Transfer", transfer.id));
        }
        Ok(())
    }

    pub fn delete(&self, id: TransferId) -> GestionResult<bool> {
        Ok(self.conn.execute("DELETE FROM transfers WHERE id = ?1", [id])? > 0)
    }

    /// Newest first
    pub fn list(&self, filter: &TransferFilter) -> GestionResult<Vec<Transfer>> {
        let mut conditions = Conditions::new();
        conditions.range("occurred_at", &filter.range);
        conditions.push_opt(
            "lower(account_type) = lower(?)",
            filter.account_type.as_ref().map(|a| a.trim().to_string()),
        );
        conditions.like_any(&["sender_name", "observations"], filter.search.as_deref());
        let where_sql = conditions.where_sql();
        let limit_sql = conditions.limit_sql(filter.limit);
        let sql = format!(
            "SELECT {} FROM transfers{} ORDER BY occurred_at DESC, id DESC{}",
            COLUMNS, where_sql, limit_sql
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(conditions.params(), map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn all(&self) -> GestionResult<Vec<Transfer>> {
        let sql = format!("SELECT {} FROM transfers ORDER BY id", COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn total(&self, range: &DateRange) -> GestionResult<Money> {
        let mut conditions = Conditions::new();
        conditions.range("occurred_at", range);
        let sql = format!(
            "SELECT COALESCE(SUM(amount), 0) FROM transfers{}",
            conditions.where_sql()
        );
        Ok(self
            .conn
            .query_row(&sql, conditions.params(), |row| row.get(0))?)
    }

    pub fn count(&self, range: &DateRange) -> GestionResult<i64> {
        let mut conditions = Conditions::new();
        conditions.range("occurred_at", range);
        let sql = format!("SELECT COUNT(*) FROM transfers{}", conditions.where_sql());
        Ok(self
            .conn
            .query_row(&sql, conditions.params(), |row| row.get(0))?)
    }

    /// Totals per account label as stored; labels with no rows in range are absent
    pub fn totals_by_account(&self, range: &DateRange) -> GestionResult<Vec<(String, Money)>> {
        let mut conditions = Conditions::new();
        conditions.range("occurred_at", range);
        let sql = format!(
            "SELECT account_type, SUM(amount) FROM transfers{} GROUP BY account_type ORDER BY account_type",
            conditions.where_sql()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(conditions.params(), |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn recent(&self, limit: usize) -> GestionResult<Vec<Transfer>> {
        self.list(&TransferFilter {
            limit: Some(limit),
            ..TransferFilter::default()
        })
    }

    pub fn delete_all(&self) -> GestionResult<usize> {
        Ok(self.conn.execute("DELETE FROM transfers", [])?)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Transfer> {
    Ok(Transfer {
        id: row.get(0)?,
        amount: row.get(1)?,
        account_type: row.get(2)?,
        sender_name: row.get(3)?,
        observations: row.get(4)?,
        occurred_at: timestamp_at(row, 5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::{connection, day};

    fn transfer(units: i64, account: &str, sender: &str, d: u32) -> TransferDraft {
        TransferDraft::new(Money::from_units(units), account, sender, day(d))
    }

    #[test]
    fn test_round_trip() {
        let conn = connection();
        let repo = TransferRepository::new(&conn);
        let created = repo
            .insert(&transfer(150_000, "Nequi", "Ana", 1).with_observations("pedido 12"))
            .unwrap();
        assert_eq!(repo.get(created.id).unwrap(), Some(created));
    }

    #[test]
    fn test_filters_and_breakdown() {
        let conn = connection();
        let repo = TransferRepository::new(&conn);
        repo.insert(&transfer(100, "Nequi", "Ana", 1)).unwrap();
        repo.insert(&transfer(200, "Nequi", "Luis", 2)).unwrap();
        repo.insert(&transfer(50, "Daviplata", "Ana", 3)).unwrap();

        let nequi = repo
            .list(&TransferFilter {
                account_type: Some("nequi".into()),
                ..TransferFilter::default()
            })
            .unwrap();
        assert_eq!(nequi.len(), 2);
        assert_eq!(nequi[0].sender_name, "Luis");

        let ana = repo
            .list(&TransferFilter {
                search: Some("ana".into()),
                ..TransferFilter::default()
            })
            .unwrap();
        assert_eq!(ana.len(), 2);

        let totals = repo.totals_by_account(&DateRange::all()).unwrap();
        assert_eq!(
            totals,
            vec![
                ("Daviplata".to_string(), Money::from_units(50)),
                ("Nequi".to_string(), Money::from_units(300)),
            ]
        );
        assert_eq!(
            repo.total(&DateRange::between(day(2), day(3))).unwrap(),
            Money::from_units(250)
        );
    }
}
