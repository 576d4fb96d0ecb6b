//! Persistence port for the collection store
//!
//! The store hands its whole state to a [`StateStore`] after every change
//! and reads it back on startup. Adapters decide where the JSON blob lives.

use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use tracing::debug;
use crate::error::{CollectionError, Result};
use crate::DATABASE_FILENAME;
use super::{Database, StoreState, queries};

/// Load/save boundary for the serialized store state
pub trait StateStore {
    /// Read the last saved state; `None` if nothing was saved yet
    fn load(&self) -> Result<Option<StoreState>>;

    /// Replace the saved state
    fn save(&mut self, state: &StoreState) -> Result<()>;
}

/// Keeps the serialized blob in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryStateStore {
    blob: Option<String>,
    /// When set, every save fails (for exercising rollback paths)
    fail_saves: bool,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing JSON blob
    pub fn from_json(blob: &str) -> Self {
        Self { blob: Some(blob.to_string()), fail_saves: false }
    }

    /// The last saved blob
    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }

    /// Make subsequent saves fail
    pub fn set_fail_saves(&mut self, fail: bool) {
        self.fail_saves = fail;
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<Option<StoreState>> {
        self.blob.as_deref().map(decode_state).transpose()
    }

    fn save(&mut self, state: &StoreState) -> Result<()> {
        if self.fail_saves {
            return Err(CollectionError::InvalidOperation("State store is read-only".to_string()));
        }
        self.blob = Some(serde_json::to_string(state)?);
        Ok(())
    }
}

/// Stores the blob in a single-row SQLite table
pub struct SqliteStateStore {
    folder: PathBuf,
    db: Database,
}

impl SqliteStateStore {
    /// Open the database in `folder`
    ///
    /// The folder must contain the database file.
    pub fn open(folder: &Path) -> Result<Self> {
        let db_path = folder.join(DATABASE_FILENAME);

        if !db_path.exists() {
            return Err(CollectionError::DatabaseError(format!(
                "Database not found: {}",
                db_path.to_string_lossy()
            )));
        }

        Ok(Self { folder: folder.to_path_buf(), db: Database::open(&db_path)? })
    }

    /// Create the folder and database
    pub fn create(folder: &Path) -> Result<Self> {
        std::fs::create_dir_all(folder)?;
        let db = Database::create(&folder.join(DATABASE_FILENAME))?;
        Ok(Self { folder: folder.to_path_buf(), db })
    }

    /// Open if the database exists, otherwise create it
    pub fn open_or_create(folder: &Path) -> Result<Self> {
        if folder.join(DATABASE_FILENAME).exists() {
            Self::open(folder)
        } else {
            Self::create(folder)
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.folder.join(DATABASE_FILENAME)
    }

    /// Time of the last successful save
    pub fn last_saved_at(&self) -> Result<Option<DateTime<Utc>>> {
        queries::get_state_updated_at(self.db.connection())
    }
}

impl StateStore for SqliteStateStore {
    fn load(&self) -> Result<Option<StoreState>> {
        let conn = self.db.connection();
        queries::get_state_blob(conn)?.as_deref().map(decode_state).transpose()
    }

    fn save(&mut self, state: &StoreState) -> Result<()> {
        let blob = serde_json::to_string(state)?;

        self.db.in_transaction(|conn| queries::set_state_blob(conn, &blob))?;
        debug!(bytes = blob.len(), "state saved");
        Ok(())
    }
}

fn decode_state(blob: &str) -> Result<StoreState> {
    let state: StoreState = serde_json::from_str(blob)?;
    if state.version > crate::STATE_VERSION {
        return Err(CollectionError::InvalidOperation(format!(
            "Unsupported state version: {}",
            state.version
        )));
    }
    Ok(state)
}
