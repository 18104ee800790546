//! SQLite storage for operators, patients, the catalog and the audit log.
//!
//! Each table gets its own `impl Database` block in a sibling module.

mod schema;
mod audit;
mod catalog;
mod operators;
mod patients;

pub use schema::*;
pub use operators::*;

use std::path::Path;

use rusqlite::Connection;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: i32, supported: i32 },

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Owns the station's SQLite connection.
pub struct Database {
    conn: Connection,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.conn.path())
            .finish()
    }
}

impl Database {
    /// Open (or create) the database file at `path` and bring its schema up.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(path = %path.as_ref().display(), "Opened station database");
        Self::with_connection(conn)
    }

    /// Throwaway database, used by tests and `open_station_in_memory`.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> DbResult<Self> {
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Apply `SCHEMA` and stamp `SCHEMA_VERSION`. Refuses files written by a
    /// newer build.
    fn migrate(&self) -> DbResult<()> {
        let found = self.schema_version()?;
        if found > SCHEMA_VERSION {
            return Err(DbError::UnsupportedSchema {
                found,
                supported: SCHEMA_VERSION,
            });
        }

        self.conn.execute_batch(SCHEMA)?;
        if found < SCHEMA_VERSION {
            self.conn
                .pragma_update(None, "user_version", SCHEMA_VERSION)?;
        }
        Ok(())
    }

    /// Value of `PRAGMA user_version`; 0 for a fresh file.
    pub fn schema_version(&self) -> DbResult<i32> {
        Ok(self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))?)
    }

    /// Raw connection, for ad-hoc queries in tests and tooling.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
