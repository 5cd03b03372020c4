//! Database layer for the patient registry.

mod patients;
mod schema;

pub use patients::*;
pub use schema::*;

use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};
use thiserror::Error;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
///
/// Owns the single connection every repository borrows.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let started_at = Instant::now();
        info!("event=db_open module=db status=start mode=file");

        let result = Connection::open(path)
            .map_err(DbError::from)
            .and_then(Self::bootstrap);
        log_open_result("file", started_at, &result);
        result
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let started_at = Instant::now();
        info!("event=db_open module=db status=start mode=memory");

        let result = Connection::open_in_memory()
            .map_err(DbError::from)
            .and_then(Self::bootstrap);
        log_open_result("memory", started_at, &result);
        result
    }

    fn bootstrap(conn: Connection) -> DbResult<Self> {
        // Bounded wait on a locked database file.
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

fn log_open_result(mode: &str, started_at: Instant, result: &DbResult<Database>) {
    match result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={} duration_ms={}",
            mode,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={} duration_ms={} error={}",
            mode,
            started_at.elapsed().as_millis(),
            err
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        let columns: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM pragma_table_info('patients') ORDER BY cid")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert_eq!(
            columns,
            vec![
                "document",
                "name",
                "surname",
                "birth_date",
                "hospitalization_count"
            ]
        );
    }

    #[test]
    fn test_schema_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.initialize().is_ok());
    }

    #[test]
    fn test_counter_defaults_to_zero() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO patients (document, name, surname, birth_date) VALUES ('12345678Z', 'Ana', 'Ruiz', '2001-01-31')",
                [],
            )
            .unwrap();

        let count: i64 = db
            .conn()
            .query_row(
                "SELECT hospitalization_count FROM patients WHERE document = '12345678Z'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 0);
    }
}
