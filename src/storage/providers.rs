//! Provider repository

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{GestionError, GestionResult};
use crate::models::{Provider, ProviderDraft, ProviderId};

use super::query::{Conditions, NameFilter};

const COLUMNS: &str = "id, name, phone, notes";

pub struct ProviderRepository<'a> {
    conn: &'a Connection,
}

impl<'a> ProviderRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, draft: &ProviderDraft) -> GestionResult<Provider> {
        self.conn.execute(
            "INSERT INTO providers (name, phone, notes) VALUES (?1, ?2, ?3)",
            params![draft.name, draft.phone, draft.notes],
        )?;
        Ok(Provider {
            id: ProviderId::new(self.conn.last_insert_rowid()),
            name: draft.name.clone(),
            phone: draft.phone.clone(),
            notes: draft.notes.clone(),
        })
    }

    /// Insert keeping the given id (restore path)
    pub fn insert_with_id(&self, provider: &Provider) -> GestionResult<()> {
        self.conn.execute(
            "INSERT INTO providers (id, name, phone, notes) VALUES (?1, ?2, ?3, ?4)",
            params![provider.id, provider.name, provider.phone, provider.notes],
        )?;
        Ok(())
    }

    pub fn get(&self, id: ProviderId) -> GestionResult<Option<Provider>> {
        let sql = format!("SELECT {} FROM providers WHERE id = ?1", COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, [id], map_row)
            .optional()?)
    }

    pub fn update(&self, provider: &Provider) -> GestionResult<()> {
        let changed = self.conn.execute(
            "UPDATE providers SET name = ?2, phone = ?3, notes = ?4 WHERE id = ?1",
            params![provider.id, provider.name, provider.phone, provider.notes],
        )?;
        if changed == 0 {
            return Err(GestionError::not_found("Provider", provider.id));
        }
        Ok(())
    }

    pub fn delete(&self, id: ProviderId) -> GestionResult<bool> {
        Ok(self.conn.execute("DELETE FROM providers WHERE id = ?1", [id])? > 0)
    }

    /// Name or phone contains the search text; ordered by name
    pub fn list(&self, filter: &NameFilter) -> GestionResult<Vec<Provider>> {
        let mut conditions = Conditions::new();
        conditions.like_any(&["name", "phone"], filter.search.as_deref());
        let where_sql = conditions.where_sql();
        let limit_sql = conditions.limit_sql(filter.limit);
        let sql = format!(
            "SELECT {} FROM providers{} ORDER BY name COLLATE NOCASE, id{}",
            COLUMNS, where_sql, limit_sql
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(conditions.params(), map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Every row in key order
    pub fn all(&self) -> GestionResult<Vec<Provider>> {
        let sql = format!("SELECT {} FROM providers ORDER BY id", COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Case-insensitive exact name match; the lowest id wins on ties
    pub fn find_by_name(&self, name: &str) -> GestionResult<Option<Provider>> {
        let sql = format!(
            "SELECT {} FROM providers WHERE lower(trim(name)) = lower(trim(?1)) ORDER BY id LIMIT 1",
            COLUMNS
        );
        Ok(self.conn.query_row(&sql, [name], map_row).optional()?)
    }

    pub fn count(&self) -> GestionResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM providers", [], |row| row.get(0))?)
    }

    pub fn delete_all(&self) -> GestionResult<usize> {
        Ok(self.conn.execute("DELETE FROM providers", [])?)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Provider> {
    Ok(Provider {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        notes: row.get(3)?,
    })
}
