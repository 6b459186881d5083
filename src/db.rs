mod rows;
mod schema;
pub mod tags;

use std::path::Path;

use rusqlite::{Connection, Transaction};

use crate::error::Result;
use schema::{INITIAL_SCHEMA, MIGRATIONS, POST_MIGRATION_INDEXES};

pub use rows::{NoteTagRow, all_notes, collect_notes, note_by_id};

/// Database wrapper providing connection management and schema initialization.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens an in-memory SQLite database.
    ///
    /// Automatically initializes the schema on connection open.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Opens a file-based SQLite database at the given path.
    ///
    /// Creates the database file if it does not exist.
    /// Automatically initializes the schema on connection open.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize_schema()?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// Uses IF NOT EXISTS for idempotent execution.
    /// Runs migrations for column additions, ignoring "duplicate column" errors.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute("PRAGMA foreign_keys = ON", [])?;
        self.conn.execute_batch(INITIAL_SCHEMA)?;

        for statement in MIGRATIONS.lines() {
            let trimmed = statement.trim();
            if trimmed.is_empty() || trimmed.starts_with("--") {
                continue;
            }

            match self.conn.execute(trimmed, []) {
                Ok(_) => tracing::info!(migration = trimmed, "applied schema migration"),
                Err(rusqlite::Error::SqliteFailure(err, msg)) => {
                    let is_duplicate_column = msg
                        .as_ref()
                        .map(|s| s.contains("duplicate column"))
                        .unwrap_or(false);

                    if !is_duplicate_column {
                        return Err(rusqlite::Error::SqliteFailure(err, msg).into());
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.conn.execute_batch(POST_MIGRATION_INDEXES)?;

        Ok(())
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Starts a transaction on the shared connection.
    ///
    /// The transaction rolls back when dropped without `commit()`.
    pub fn transaction(&self) -> Result<Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }
}
