//! Schema creation and additive migrations
//!
//! Every table is created with `CREATE TABLE IF NOT EXISTS`, so running this
//! against an up-to-date database changes nothing. Columns that were added
//! after a table first shipped live in [`ADDITIVE_MIGRATIONS`] and are only
//! applied when `PRAGMA table_info` shows them missing. Nothing here ever
//! drops or rewrites data.

use rusqlite::{Connection, OptionalExtension};
use tracing::info;

use crate::error::{GestionError, GestionResult};

/// Version written to `PRAGMA user_version` once the schema is current
pub const SCHEMA_VERSION: i64 = 2;

/// Tables in parent-before-child order
pub const TABLES: &[(&str, &str)] = &[
    (
        "providers",
        "CREATE TABLE IF NOT EXISTS providers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            phone TEXT,
            notes TEXT
        )",
    ),
    (
        "categories",
        "CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE
        )",
    ),
    (
        "carriers",
        "CREATE TABLE IF NOT EXISTS carriers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            observations TEXT
        )",
    ),
    (
        "couriers",
        "CREATE TABLE IF NOT EXISTS couriers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            phone TEXT,
            observations TEXT
        )",
    ),
    (
        "settings",
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
    ),
    (
        "products",
        "CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            price INTEGER NOT NULL CHECK (price >= 0),
            provider_id INTEGER REFERENCES providers(id),
            category_id INTEGER REFERENCES categories(id),
            observations TEXT
        )",
    ),
    (
        "expenses",
        "CREATE TABLE IF NOT EXISTS expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            expense_type TEXT NOT NULL,
            amount INTEGER NOT NULL CHECK (amount > 0),
            observations TEXT,
            occurred_at INTEGER NOT NULL,
            carrier_id INTEGER REFERENCES carriers(id)
        )",
    ),
    (
        "transfers",
        "CREATE TABLE IF NOT EXISTS transfers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount INTEGER NOT NULL CHECK (amount > 0),
            account_type TEXT NOT NULL,
            sender_name TEXT NOT NULL,
            observations TEXT,
            occurred_at INTEGER NOT NULL
        )",
    ),
    (
        "cash_deposits",
        "CREATE TABLE IF NOT EXISTS cash_deposits (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount INTEGER NOT NULL CHECK (amount > 0),
            observations TEXT,
            occurred_at INTEGER NOT NULL
        )",
    ),
];

/// A column added after its table first shipped
#[derive(Debug, Clone, Copy)]
pub struct ColumnMigration {
    pub table: &'static str,
    pub column: &'static str,
    pub definition: &'static str,
}

pub const ADDITIVE_MIGRATIONS: &[ColumnMigration] = &[ColumnMigration {
    table: "expenses",
    column: "courier_id",
    definition: "INTEGER REFERENCES couriers(id)",
}];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_products_provider ON products(provider_id)",
    "CREATE INDEX IF NOT EXISTS idx_products_category ON products(category_id)",
    "CREATE INDEX IF NOT EXISTS idx_expenses_occurred_at ON expenses(occurred_at)",
    "CREATE INDEX IF NOT EXISTS idx_expenses_carrier ON expenses(carrier_id)",
    "CREATE INDEX IF NOT EXISTS idx_expenses_courier ON expenses(courier_id)",
    "CREATE INDEX IF NOT EXISTS idx_transfers_occurred_at ON transfers(occurred_at)",
    "CREATE INDEX IF NOT EXISTS idx_cash_deposits_occurred_at ON cash_deposits(occurred_at)",
];

/// What a call to [`ensure_schema`] changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
    pub previous_version: i64,
    pub current_version: i64,
    pub tables_created: Vec<String>,
    pub columns_added: Vec<String>,
}

impl SchemaReport {
    pub fn is_unchanged(&self) -> bool {
        self.tables_created.is_empty()
            && self.columns_added.is_empty()
            && self.previous_version == self.current_version
    }
}

/// Create missing tables, apply missing columns and stamp the version
pub fn ensure_schema(conn: &mut Connection) -> GestionResult<SchemaReport> {
    let previous_version = user_version(conn)?;
    if previous_version > SCHEMA_VERSION {
        return Err(GestionError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            previous_version, SCHEMA_VERSION
        )));
    }

    let tx = conn.transaction().map_err(migration_error)?;
    let mut report = SchemaReport {
        previous_version,
        current_version: SCHEMA_VERSION,
        ..SchemaReport::default()
    };

    for (table, ddl) in TABLES {
        let existed = table_exists(&tx, table)?;
        tx.execute_batch(ddl).map_err(migration_error)?;
        if !existed {
            report.tables_created.push((*table).to_string());
        }
    }

    for migration in ADDITIVE_MIGRATIONS {
        if table_has_column(&tx, migration.table, migration.column)? {
            continue;
        }
        let sql = format!(
            "ALTER TABLE {} ADD COLUMN {} {}",
            migration.table, migration.column, migration.definition
        );
        tx.execute_batch(&sql).map_err(migration_error)?;
        report
            .columns_added
            .push(format!("{}.{}", migration.table, migration.column));
    }

    for ddl in INDEXES {
        tx.execute_batch(ddl).map_err(migration_error)?;
    }

    tx.pragma_update(None, "user_version", SCHEMA_VERSION)
        .map_err(migration_error)?;
    tx.commit().map_err(migration_error)?;

    if !report.is_unchanged() {
        info!(
            from = report.previous_version,
            to = report.current_version,
            tables = ?report.tables_created,
            columns = ?report.columns_added,
            "schema updated"
        );
    }

    Ok(report)
}

pub fn user_version(conn: &Connection) -> GestionResult<i64> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(migration_error)
}

pub fn table_exists(conn: &Connection, table: &str) -> GestionResult<bool> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get(0),
        )
        .optional()
        .map_err(migration_error)?;
    Ok(found.is_some())
}

pub fn table_has_column(conn: &Connection, table: &str, column: &str) -> GestionResult<bool> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", table))
        .map_err(migration_error)?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(migration_error)?;

    for name in names {
        if name.map_err(migration_error)?.eq_ignore_ascii_case(column) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn migration_error(err: rusqlite::Error) -> GestionError {
    GestionError::Migration(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        conn
    }

    #[test]
    fn test_fresh_database_gets_every_table() {
        let mut conn = fresh();
        let report = ensure_schema(&mut conn).unwrap();

        assert_eq!(report.previous_version, 0);
        assert_eq!(report.current_version, SCHEMA_VERSION);
        assert_eq!(report.tables_created.len(), TABLES.len());
        assert_eq!(report.columns_added, vec!["expenses.courier_id".to_string()]);
        assert!(table_has_column(&conn, "expenses", "courier_id").unwrap());
        assert_eq!(user_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_second_run_is_a_no_op() {
        let mut conn = fresh();
        ensure_schema(&mut conn).unwrap();

        let report = ensure_schema(&mut conn).unwrap();
        assert!(report.is_unchanged());
    }

    #[test]
    fn test_legacy_database_keeps_rows_and_gains_column() {
        let mut conn = fresh();
        conn.execute_batch(
            "CREATE TABLE carriers (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, observations TEXT);
             CREATE TABLE expenses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                expense_type TEXT NOT NULL,
                amount INTEGER NOT NULL,
                observations TEXT,
                occurred_at INTEGER NOT NULL,
                carrier_id INTEGER REFERENCES carriers(id)
             );
             INSERT INTO expenses (expense_type, amount, occurred_at) VALUES ('Freight', 20000, 0);",
        )
        .unwrap();

        let report = ensure_schema(&mut conn).unwrap();
        assert!(!report.tables_created.contains(&"expenses".to_string()));
        assert!(report.tables_created.contains(&"couriers".to_string()));
        assert_eq!(report.columns_added, vec!["expenses.courier_id".to_string()]);

        let (count, courier): (i64, Option<i64>) = conn
            .query_row("SELECT COUNT(*), MAX(courier_id) FROM expenses", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(count, 1);
        assert!(courier.is_none());
    }

    #[test]
    fn test_newer_version_rejected() {
        let mut conn = fresh();
        conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .unwrap();

        let err = ensure_schema(&mut conn).unwrap_err();
        assert!(matches!(err, GestionError::Migration(_)));
        assert!(!table_exists(&conn, "providers").unwrap());
    }

    #[test]
    fn test_table_helpers() {
        let mut conn = fresh();
        assert!(!table_exists(&conn, "products").unwrap());
        ensure_schema(&mut conn).unwrap();
        assert!(table_exists(&conn, "products").unwrap());
        assert!(table_has_column(&conn, "products", "price").unwrap());
        assert!(!table_has_column(&conn, "products", "stock").unwrap());
    }
}
