//! Main CollectionStore API
//!
//! This module provides the service object that owns all collection state.
//! Every mutation runs against a copy of the state, is persisted through the
//! injected [`StateStore`], and only then replaces the live state.

use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};
use crate::config::StoreConfig;
use crate::database::{Collection, MemoryStateStore, SqliteStateStore, StateStore, StoreState};
use crate::error::{CollectionError, Result};
use crate::rules::RuleEvaluator;
use crate::sync::AutoSyncScheduler;

/// Collection state owner
pub struct CollectionStore {
    /// Live state
    pub(crate) state: StoreState,
    /// Persistence port
    pub(crate) state_store: Box<dyn StateStore>,
    pub(crate) config: StoreConfig,
    pub(crate) evaluator: RuleEvaluator,
    /// Auto-sync timers
    pub(crate) scheduler: AutoSyncScheduler,
    /// Collections with a sync in flight
    pub(crate) syncing: HashSet<String>,
}

impl CollectionStore {
    /// Build a store over a persistence adapter, loading any saved state
    pub fn new(state_store: Box<dyn StateStore>, config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let scheduler = AutoSyncScheduler::new(config.sync_interval_secs)?;
        let state = state_store.load()?.unwrap_or_default();
        info!(collections = state.collections.len(), "collection store loaded");

        Ok(Self {
            state,
            state_store,
            evaluator: config.evaluator(),
            scheduler,
            config,
            syncing: HashSet::new(),
        })
    }

    /// Store backed by memory only
    pub fn in_memory() -> Self {
        Self {
            state: StoreState::default(),
            state_store: Box::new(MemoryStateStore::new()),
            evaluator: RuleEvaluator::default(),
            scheduler: AutoSyncScheduler::default(),
            config: StoreConfig::default(),
            syncing: HashSet::new(),
        }
    }

    /// Open a SQLite-backed store from a folder
    ///
    /// The folder should contain an existing database file.
    pub fn open(folder: &Path) -> Result<Self> {
        Self::open_with_config(folder, StoreConfig::default())
    }

    /// Open a SQLite-backed store with explicit configuration
    pub fn open_with_config(folder: &Path, config: StoreConfig) -> Result<Self> {
        let state_store = SqliteStateStore::open(folder)?;
        Self::new(Box::new(state_store), config)
    }

    /// Create a new SQLite-backed store in the specified folder
    pub fn create(folder: &Path) -> Result<Self> {
        let mut state_store = SqliteStateStore::create(folder)?;
        state_store.save(&StoreState::default())?;
        info!(folder = %folder.display(), "collection store created");
        Self::new(Box::new(state_store), StoreConfig::default())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &RuleEvaluator {
        &self.evaluator
    }

    /// Read-only view of the full state (for export or inspection)
    pub fn state(&self) -> &StoreState {
        &self.state
    }

    /// Run a mutation atomically
    ///
    /// The closure works on a copy; the copy is saved and swapped in only if
    /// both the closure and the save succeed.
    pub(crate) fn mutate<T>(&mut self, f: impl FnOnce(&mut StoreState) -> Result<T>) -> Result<T> {
        let mut next = self.state.clone();
        let value = f(&mut next)?;
        self.state_store.save(&next)?;
        self.state = next;
        debug!("state committed");
        Ok(value)
    }
}

/// Find a collection by ID inside a state copy
pub(crate) fn find_collection_mut<'a>(state: &'a mut StoreState, collection_id: &str) -> Result<&'a mut Collection> {
    state
        .collections
        .iter_mut()
        .find(|c| c.id == collection_id)
        .ok_or_else(|| CollectionError::CollectionNotFound(collection_id.to_string()))
}
