//! Cash deposit repository

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{GestionError, GestionResult};
use crate::models::{CashDeposit, CashDepositDraft, CashDepositId, Money};

use super::query::{timestamp_at, Conditions, DateRange};

const COLUMNS: &str = "id, amount, observations, occurred_at";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CashDepositFilter {
    pub range: DateRange,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

pub struct CashDepositRepository<'a> {
    conn: &'a Connection,
}

impl<'a> CashDepositRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, draft: &CashDepositDraft) -> GestionResult<CashDeposit> {
        self.conn.execute(
            "INSERT INTO cash_deposits (amount, observations, occurred_at) VALUES (?1, ?2, ?3)",
            params![
                draft.amount,
                draft.observations,
                draft.occurred_at.timestamp_millis()
            ],
        )?;
        Ok(CashDeposit {
            id: CashDepositId::new(self.conn.last_insert_rowid()),
            amount: draft.amount,
            observations: draft.observations.clone(),
            occurred_at: draft.occurred_at,
        })
    }

    pub fn insert_with_id(&self, deposit: &CashDeposit) -> GestionResult<()> {
        self.conn.execute(
            "INSERT INTO cash_deposits (id, amount, observations, occurred_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                deposit.id,
                deposit.amount,
                deposit.observations,
                deposit.occurred_at.timestamp_millis()
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, id: CashDepositId) -> GestionResult<Option<CashDeposit>> {
        let sql = format!("SELECT {} FROM cash_deposits WHERE id = ?1", COLUMNS);
        Ok(self.conn.query_row(&sql, [id], map_row).optional()?)
    }

    pub fn update(&self, deposit: &CashDeposit) -> GestionResult<()> {
        let changed = self.conn.execute(
            "UPDATE cash_deposits SET amount = ?2, observations = ?3, occurred_at = ?4 WHERE id = ?1",
            params![
                deposit.id,
                deposit.amount,
                deposit.observations,
                deposit.occurred_at.timestamp_millis()
            ],
        )?;
        if changed == 0 {
            return Err(GestionError::not_found("CashDeposit", deposit.id));
        }
        Ok(())
    }

    pub fn delete(&self, id: CashDepositId) -> GestionResult<bool> {
        Ok(self
            .conn
            .execute("DELETE FROM cash_deposits WHERE id = ?1", [id])?
            > 0)
    }

    /// Newest first
    pub fn list(&self, filter: &CashDepositFilter) -> GestionResult<Vec<CashDeposit>> {
        let mut conditions = Conditions::new();
        conditions.range("occurred_at", &filter.range);
        conditions.like_any(&["observations"], filter.search.as_deref());
        let where_sql = conditions.where_sql();
        let limit_sql = conditions.limit_sql(filter.limit);
        let sql = format!(
            "SELECT {} FROM cash_deposits{} ORDER BY occurred_at DESC, id DESC{}",
            COLUMNS, where_sql, limit_sql
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(conditions.params(), map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn all(&self) -> GestionResult<Vec<CashDeposit>> {
        let sql = format!("SELECT {} FROM cash_deposits ORDER BY id", COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn total(&self, range: &DateRange) -> GestionResult<Money> {
        let mut conditions = Conditions::new();
        conditions.range("occurred_at", range);
        let sql = format!(
            "SELECT COALESCE(SUM(amount), 0) FROM cash_deposits{}",
            conditions.where_sql()
        );
        Ok(self
            .conn
            .query_row(&sql, conditions.params(), |row| row.get(0))?)
    }

    pub fn delete_all(&self) -> GestionResult<usize> {
        Ok(self.conn.execute("DELETE FROM cash_deposits", [])?)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<CashDeposit> {
    Ok(CashDeposit {
        id: row.get(0)?,
        amount: row.get(1)?,
        observations: row.get(2)?,
        occurred_at: timestamp_at(row, 3)?,
    })
}
