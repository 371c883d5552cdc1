//! Courier repository

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{GestionError, GestionResult};
use crate::models::{Courier, CourierDraft, CourierId};

use super::query::{Conditions, NameFilter};

const COLUMNS: &str = "id, name, phone, observations";

pub struct CourierRepository<'a> {
    conn: &'a Connection,
}

impl<'a> CourierRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, draft: &CourierDraft) -> GestionResult<Courier> {
        self.conn.execute(
            "INSERT INTO couriers (name, phone, observations) VALUES (?1, ?2, ?3)",
            params![draft.name, draft.phone, draft.observations],
        )?;
        Ok(Courier {
            id: CourierId::new(self.conn.last_insert_rowid()),
            name: draft.name.clone(),
            phone: draft.phone.clone(),
            observations: draft.observations.clone(),
        })
    }

    pub fn insert_with_id(&self, courier: &Courier) -> GestionResult<()> {
        self.conn.execute(
            "INSERT INTO couriers (id, name, phone, observations) VALUES (?1, ?2, ?3, ?4)",
            params![courier.id, courier.name, courier.phone, courier.observations],
        )?;
        Ok(())
    }

    pub fn get(&self, id: CourierId) -> GestionResult<Option<Courier>> {
        let sql = format!("SELECT {} FROM couriers WHERE id = ?1", COLUMNS);
        Ok(self.conn.query_row(&sql, [id], map_row).optional()?)
    }

    pub fn update(&self, courier: &Courier) -> GestionResult<()> {
        let changed = self.conn.execute(
            "UPDATE couriers SET name = ?2, phone = ?3, observations = ?4 WHERE id = ?1",
            params![courier.id, courier.name, courier.phone, courier.observations],
        )?;
        if changed == 0 {
            return Err(GestionError::not_found("Courier", courier.id));
        }
        Ok(())
    }

    pub fn delete(&self, id: CourierId) -> GestionResult<bool> {
        Ok(self.conn.execute("DELETE FROM couriers WHERE id = ?1", [id])? > 0)
    }

    pub fn list(&self, filter: &NameFilter) -> GestionResult<Vec<Courier>> {
        let mut conditions = Conditions::new();
        conditions.like_any(&["name", "phone"], filter.search.as_deref());
        let where_sql = conditions.where_sql();
        let limit_sql = conditions.limit_sql(filter.limit);
        let sql = format!(
            "SELECT {} FROM couriers{} ORDER BY name COLLATE NOCASE, id{}",
            COLUMNS, where_sql, limit_sql
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(conditions.params(), map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn all(&self) -> GestionResult<Vec<Courier>> {
        let sql = format!("SELECT {} FROM couriers ORDER BY id", COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn find_by_name(&self, name: &str) -> GestionResult<Option<Courier>> {
        let sql = format!(
            "SELECT {} FROM couriers WHERE lower(trim(name)) = lower(trim(?1)) ORDER BY id LIMIT 1",
            COLUMNS
        );
        Ok(self.conn.query_row(&sql, [name], map_row).optional()?)
    }

    pub fn delete_all(&self) -> GestionResult<usize> {
        Ok(self.conn.execute("DELETE FROM couriers", [])?)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Courier> {
    Ok(Courier {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        observations: row.get(3)?,
    })
}
