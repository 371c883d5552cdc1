//! Category repository
//!
//! Category names are unique without regard to case; the column carries
//! `COLLATE NOCASE` and the service checks before writing.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{GestionError, GestionResult};
use crate::models::{Category, CategoryId};

use super::query::{Conditions, NameFilter};

pub struct CategoryRepository<'a> {
    conn: &'a Connection,
}

impl<'a> CategoryRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, name: &str) -> GestionResult<Category> {
        self.conn
            .execute("INSERT INTO categories (name) VALUES (?1)", [name])?;
        Ok(Category {
            id: CategoryId::new(self.conn.last_insert_rowid()),
            name: name.to_string(),
        })
    }

    pub fn insert_with_id(&self, category: &Category) -> GestionResult<()> {
        self.conn.execute(
            "INSERT INTO categories (id, name) VALUES (?1, ?2)",
            params![category.id, category.name],
        )?;
        Ok(())
    }

    pub fn get(&self, id: CategoryId) -> GestionResult<Option<Category>> {
        Ok(self
            .conn
            .query_row("SELECT id, name FROM categories WHERE id = ?1", [id], map_row)
            .optional()?)
    }

    pub fn update(&self, category: &Category) -> GestionResult<()> {
        let changed = self.conn.execute(
            "UPDATE categories SET name = ?2 WHERE id = ?1",
            params![category.id, category.name],
        )?;
        if changed == 0 {
            return Err(GestionError::not_found("Category", category.id));
        }
        Ok(())
    }

    pub fn delete(&self, id: CategoryId) -> GestionResult<bool> {
        Ok(self.conn.execute("DELETE FROM categories WHERE id = ?1", [id])? > 0)
    }

    pub fn list(&self, filter: &NameFilter) -> GestionResult<Vec<Category>> {
        let mut conditions = Conditions::new();
        conditions.like_any(&["name"], filter.search.as_deref());
        let where_sql = conditions.where_sql();
        let limit_sql = conditions.limit_sql(filter.limit);
        let sql = format!(
            "SELECT id, name FROM categories{} ORDER BY name COLLATE NOCASE, id{}",
            where_sql, limit_sql
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(conditions.params(), map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn all(&self) -> GestionResult<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM categories ORDER BY id")?;
        let rows = stmt.query_map([], map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn find_by_name(&self, name: &str) -> GestionResult<Option<Category>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name FROM categories WHERE lower(trim(name)) = lower(trim(?1)) ORDER BY id LIMIT 1",
                [name],
                map_row,
            )
            .optional()?)
    }

    pub fn count(&self) -> GestionResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?)
    }

    pub fn delete_all(&self) -> GestionResult<usize> {
        Ok(self.conn.execute("DELETE FROM categories", [])?)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}
