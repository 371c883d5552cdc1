//! Carrier repository

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{GestionError, GestionResult};
use crate::models::{Carrier, CarrierDraft, CarrierId};

use super::query::{Conditions, NameFilter};

const COLUMNS: &str = "id, name, observations";

pub struct CarrierRepository<'a> {
    conn: &'a Connection,
}

impl<'a> CarrierRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, draft: &CarrierDraft) -> GestionResult<Carrier> {
        self.conn.execute(
            "INSERT INTO carriers (name, observations) VALUES (?1, ?2)",
            params![draft.name, draft.observations],
        )?;
        Ok(Carrier {
            id: CarrierId::new(self.conn.last_insert_rowid()),
            name: draft.name.clone(),
            observations: draft.observations.clone(),
        })
    }

    pub fn insert_with_id(&self, carrier: &Carrier) -> GestionResult<()> {
        self.conn.execute(
            "INSERT INTO carriers (id, name, observations) VALUES (?1, ?2, ?3)",
            params![carrier.id, carrier.name, carrier.observations],
        )?;
        Ok(())
    }

    pub fn get(&self, id: CarrierId) -> GestionResult<Option<Carrier>> {
        let sql = format!("SELECT {} FROM carriers WHERE id = ?1", COLUMNS);
        Ok(self.conn.query_row(&sql, [id], map_row).optional()?)
    }

    pub fn update(&self, carrier: &Carrier) -> GestionResult<()> {
        let changed = self.conn.execute(
            "UPDATE carriers SET name = ?2, observations = ?3 WHERE id = ?1",
            params![carrier.id, carrier.name, carrier.observations],
        )?;
        if changed == 0 {
            return Err(GestionError::not_found("Carrier", carrier.id));
        }
        Ok(())
    }

    pub fn delete(&self, id: CarrierId) -> GestionResult<bool> {
        Ok(self.conn.execute("DELETE FROM carriers WHERE id = ?1", [id])? > 0)
    }

    pub fn list(&self, filter: &NameFilter) -> GestionResult<Vec<Carrier>> {
        let mut conditions = Conditions::new();
        conditions.like_any(&["name", "observations"], filter.search.as_deref());
        let where_sql = conditions.where_sql();
        let limit_sql = conditions.limit_sql(filter.limit);
        let sql = format!(
            "SELECT {} FROM carriers{} ORDER BY name COLLATE NOCASE, id{}",
            COLUMNS, where_sql, limit_sql
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(conditions.params(), map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn all(&self) -> GestionResult<Vec<Carrier>> {
        let sql = format!("SELECT {} FROM carriers ORDER BY id", COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], map_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn find_by_name(&self, name: &str) -> GestionResult<Option<Carrier>> {
        let sql = format!(
            "SELECT {} FROM carriers WHERE lower(trim(name)) = lower(trim(?1)) ORDER BY id LIMIT 1",
            COLUMNS
        );
        Ok(self.conn.query_row(&sql, [name], map_row).optional()?)
    }

    pub fn delete_all(&self) -> GestionResult<usize> {
        Ok(self.conn.execute("DELETE FROM carriers", [])?)
    }
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Carrier> {
    Ok(Carrier {
        id: row.get(0)?,
        name: row.get(1)?,
        observations: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::connection;

    #[test]
    fn test_round_trip() {
        let conn = connection();
        let repo = CarrierRepository::new(&conn);
        let created = repo
            .insert(&CarrierDraft::new("Servientrega").with_observations("Nacional"))
            .unwrap();

        assert_eq!(repo.get(created.id).unwrap(), Some(created.clone()));
        assert_eq!(repo.find_by_name("servientrega").unwrap(), Some(created));
        assert_eq!(repo.list(&NameFilter::search("nacio")).unwrap().len(), 1);
    }
}
