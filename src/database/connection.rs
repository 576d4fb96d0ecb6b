//! SQLite connection for the state table

use std::path::Path;
use std::time::Duration;
use rusqlite::Connection;
use crate::error::Result;
use super::schema;

/// How long a write waits for another process holding the file lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open an existing database file
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn })
    }

    /// Open (or create) the file and make sure the state table exists
    pub fn create(path: &Path) -> Result<Self> {
        let db = Self::open(path)?;
        db.conn.execute_batch(&schema::CREATE_ALL_TABLES.join(";\n"))?;
        Ok(db)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run `f` inside a transaction
    ///
    /// Commits when `f` succeeds and rolls back when it fails; the error
    /// from `f` is returned after the rollback.
    pub fn in_transaction<T>(&mut self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let tx = self.conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }
}
