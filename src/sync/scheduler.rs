//! Cooperative auto-sync timers
//!
//! The host polls [`AutoSyncScheduler::due`] from its own loop. Each
//! collection has at most one armed timer.

use std::collections::BTreeMap;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use crate::error::{CollectionError, Result};

/// Timer table for collections with auto-sync enabled
#[derive(Debug, Clone)]
pub struct AutoSyncScheduler {
    interval: Duration,
    /// Collection ID -> next due time
    timers: BTreeMap<String, DateTime<Utc>>,
}

impl Default for AutoSyncScheduler {
    fn default() -> Self {
        Self {
            interval: Duration::seconds(crate::DEFAULT_SYNC_INTERVAL_SECS as i64),
            timers: BTreeMap::new(),
        }
    }
}

impl AutoSyncScheduler {
    /// Scheduler firing every `interval_secs` seconds
    ///
    /// The interval must lie in `1..=MAX_SYNC_INTERVAL_SECS`.
    pub fn new(interval_secs: u64) -> Result<Self> {
        let interval = (1..=crate::MAX_SYNC_INTERVAL_SECS)
            .contains(&interval_secs)
            .then(|| i64::try_from(interval_secs).ok())
            .flatten()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                CollectionError::ConfigError(format!("Sync interval out of range: {} seconds", interval_secs))
            })?;

        Ok(Self { interval, timers: BTreeMap::new() })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arm a timer due one interval after `now`
    ///
    /// Returns false and leaves the existing timer untouched if one is
    /// already armed for the collection.
    pub fn schedule(&mut self, collection_id: &str, now: DateTime<Utc>) -> bool {
        if self.timers.contains_key(collection_id) {
            return false;
        }
        debug!(collection_id, "auto-sync timer armed");
        self.timers.insert(collection_id.to_string(), now + self.interval);
        true
    }

    /// Disarm a collection's timer; returns true if one was armed
    pub fn cancel(&mut self, collection_id: &str) -> bool {
        let removed = self.timers.remove(collection_id).is_some();
        if removed {
            debug!(collection_id, "auto-sync timer cancelled");
        }
        removed
    }

    pub fn is_scheduled(&self, collection_id: &str) -> bool {
        self.timers.contains_key(collection_id)
    }

    /// Next due time for a collection
    pub fn next_due(&self, collection_id: &str) -> Option<DateTime<Utc>> {
        self.timers.get(collection_id).copied()
    }

    /// Number of armed timers
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Collect due collections in ID order and re-arm them for `now + interval`
    pub fn due(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let interval = self.interval;
        let mut fired = Vec::new();
        for (id, next) in self.timers.iter_mut() {
            if *next <= now {
                fired.push(id.clone());
                *next = now + interval;
            }
        }
        fired
    }
}
