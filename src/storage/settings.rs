//! Settings table repository

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::GestionResult;
use crate::models::Setting;

pub struct SettingRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SettingRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, key: &str) -> GestionResult<Option<Setting>> {
        Ok(self
            .conn
            .query_row(
                "SELECT key, value FROM settings WHERE key = ?1",
                [key],
                |row| {
                    Ok(Setting {
                        key: row.get(0)?,
                        value: row.get(1)?,
                    })
                },
            )
            .optional()?)
    }

    /// Insert or replace the value for `key`
    pub fn upsert(&self, setting: &Setting) -> GestionResult<()> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![setting.key, setting.value],
        )?;
        Ok(())
    }

    pub fn delete(&self, key: &str) -> GestionResult<bool> {
        Ok(self.conn.execute("DELETE FROM settings WHERE key = ?1", [key])? > 0)
    }

    pub fn all(&self) -> GestionResult<Vec<Setting>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM settings ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok(Setting {
                key: row.get(0)?,
                value: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn delete_all(&self) -> GestionResult<usize> {
        Ok(self.conn.execute("DELETE FROM settings", [])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::connection;

    #[test]
    fn test_upsert_replaces() {
        let conn = connection();
        let repo = SettingRepository::new(&conn);

        repo.upsert(&Setting::new("last_backup", "a")).unwrap();
        repo.upsert(&Setting::new("last_backup", "b")).unwrap();

        assert_eq!(repo.get("last_backup").unwrap().unwrap().value, "b");
        assert_eq!(repo.all().unwrap().len(), 1);
        assert!(repo.delete("last_backup").unwrap());
        assert!(repo.get("last_backup").unwrap().is_none());
    }
}
