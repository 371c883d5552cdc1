//! SQLite connection wrapper
//!
//! One connection per process, serialized behind a mutex. Reads borrow the
//! connection directly; writes always run inside a transaction that commits
//! when the closure returns `Ok` and rolls back otherwise.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Transaction};
use tracing::debug;

use crate::error::{GestionError, GestionResult};

use super::schema::{self, SchemaReport};

pub struct Database {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl Database {
    /// Open (or create) the database file and apply connection pragmas
    pub fn open(path: &Path) -> GestionResult<Self> {
        let conn = Connection::open(path).map_err(|e| {
            GestionError::Storage(format!("Failed to open {}: {}", path.display(), e))
        })?;
        configure(&conn)?;
        debug!(path = %path.display(), "database opened");

        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// Private in-memory database, used by tests
    pub fn open_in_memory() -> GestionResult<Self> {
        let conn = Connection::open_in_memory()?;
        configure(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Bring the schema up to date
    pub fn migrate(&self) -> GestionResult<SchemaReport> {
        let mut conn = self.lock()?;
        schema::ensure_schema(&mut conn)
    }

    /// Run a read-only closure against the connection
    pub fn read<T, F>(&self, f: F) -> GestionResult<T>
    where
        F: FnOnce(&Connection) -> GestionResult<T>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Run `f` inside a transaction
    ///
    /// Dropping an uncommitted `Transaction` rolls it back, so an early
    /// return through `?` leaves the database untouched.
    pub fn write<T, F>(&self, f: F) -> GestionResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> GestionResult<T>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    fn lock(&self) -> GestionResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| GestionError::Storage(format!("Failed to acquire database lock: {}", e)))
    }
}

fn configure(conn: &Connection) -> GestionResult<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;",
    )?;
    Ok(())
}
