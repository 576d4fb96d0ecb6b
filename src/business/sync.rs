//! Sync operations
//!
//! This module provides the commit side of collection sync for the
//! CollectionStore: applying previews, manual one-shot syncs guarded by a
//! busy flag, rule-change syncs and auto-sync polling.

use std::collections::HashSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use crate::database::{CollectionItem, Item};
use crate::error::Result;
use crate::rules::{RuleSet, ValidationResult};
use crate::sync::{
    SyncHistoryEntry, SyncPreview, SyncStatus, SyncTrigger, create_sync_preview_with, sync_status,
    validate_sync,
};
use crate::utils::generate_history_id;
use super::store::{CollectionStore, find_collection_mut};

/// Result of a sync commit
///
/// Commits report failure here instead of returning an error; check
/// `success` before using the counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub collection_id: String,
    pub success: bool,
    pub errors: Vec<String>,
    pub items_added: usize,
    pub items_removed: usize,
    /// History record appended by a successful commit
    pub entry: Option<SyncHistoryEntry>,
}

impl SyncOutcome {
    fn failure(collection_id: &str, message: String) -> Self {
        Self {
            collection_id: collection_id.to_string(),
            success: false,
            errors: vec![message],
            items_added: 0,
            items_removed: 0,
            entry: None,
        }
    }
}

/// Proof that a manual sync holds a collection's busy flag
///
/// Obtained from [`CollectionStore::begin_manual_sync`] and consumed by
/// finishing or abandoning the sync.
#[derive(Debug)]
pub struct SyncTicket {
    collection_id: String,
}

impl SyncTicket {
    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }
}

/// Result of a rule update that may have triggered a sync
#[derive(Debug, Clone, PartialEq)]
pub struct RuleUpdate {
    pub validation: ValidationResult,
    /// Present when auto-sync is enabled on the collection
    pub sync: Option<SyncOutcome>,
}

impl CollectionStore {
    /// Compute the sync delta for a collection without changing anything
    pub fn preview_sync(&self, collection_id: &str, catalog: &[Item]) -> Result<SyncPreview> {
        let collection = self.require_collection(collection_id)?;
        Ok(create_sync_preview_with(&self.evaluator, collection, catalog))
    }

    /// Pre-flight check for syncing a collection
    pub fn validate_sync(&self, collection_id: &str) -> Result<ValidationResult> {
        Ok(validate_sync(self.require_collection(collection_id)?))
    }

    /// Unsynced, synced or stale against the given catalog
    pub fn sync_status(&self, collection_id: &str, catalog: &[Item]) -> Result<SyncStatus> {
        let collection = self.require_collection(collection_id)?;
        let preview = create_sync_preview_with(&self.evaluator, collection, catalog);
        Ok(sync_status(collection, &preview))
    }

    /// True while a sync holds the collection's busy flag
    pub fn is_syncing(&self, collection_id: &str) -> bool {
        self.syncing.contains(collection_id)
    }

    /// Recompute the preview and commit it
    pub fn commit_sync(
        &mut self,
        collection_id: &str,
        catalog: &[Item],
        trigger: SyncTrigger,
        user: &str,
    ) -> SyncOutcome {
        if !self.acquire(collection_id) {
            return busy(collection_id);
        }
        let outcome = self.sync_locked(collection_id, catalog, trigger, user);
        self.syncing.remove(collection_id);
        outcome
    }

    /// Commit a previously computed preview
    pub fn apply_preview(
        &mut self,
        collection_id: &str,
        preview: &SyncPreview,
        trigger: SyncTrigger,
        user: &str,
    ) -> SyncOutcome {
        if !self.acquire(collection_id) {
            return busy(collection_id);
        }
        let outcome = self.apply_locked(collection_id, preview, trigger, user);
        self.syncing.remove(collection_id);
        outcome
    }

    /// Take the busy flag for a manual sync
    ///
    /// Fails with [`crate::CollectionError::SyncInProgress`] while another
    /// sync holds the flag.
    pub fn begin_manual_sync(&mut self, collection_id: &str) -> Result<SyncTicket> {
        self.require_collection(collection_id)?;
        if !self.acquire(collection_id) {
            warn!(collection_id, "manual sync rejected, already in progress");
            return Err(crate::CollectionError::SyncInProgress(collection_id.to_string()));
        }
        debug!(collection_id, "manual sync started");
        Ok(SyncTicket { collection_id: collection_id.to_string() })
    }

    /// Run the reconciliation for a started manual sync and release the flag
    pub fn finish_manual_sync(&mut self, ticket: SyncTicket, catalog: &[Item], user: &str) -> SyncOutcome {
        let outcome = self.sync_locked(&ticket.collection_id, catalog, SyncTrigger::Manual, user);
        self.syncing.remove(&ticket.collection_id);
        outcome
    }

    /// Release the flag without syncing
    pub fn abandon_manual_sync(&mut self, ticket: SyncTicket) {
        self.syncing.remove(&ticket.collection_id);
        debug!(collection_id = %ticket.collection_id, "manual sync abandoned");
    }

    /// Update rules and, if auto-sync is on, commit with the `rule-change` trigger
    pub fn update_rules_and_sync(
        &mut self,
        collection_id: &str,
        rules: RuleSet,
        catalog: &[Item],
        user: &str,
    ) -> Result<RuleUpdate> {
        let validation = self.update_rules(collection_id, rules)?;

        let sync = if self.require_collection(collection_id)?.auto_sync {
            Some(self.commit_sync(collection_id, catalog, SyncTrigger::RuleChange, user))
        } else {
            None
        };

        Ok(RuleUpdate { validation, sync })
    }

    /// Turn auto-sync on or off and arm or cancel the collection's timer
    pub fn set_auto_sync(&mut self, collection_id: &str, enabled: bool, now: DateTime<Utc>) -> Result<()> {
        self.mutate(|state| {
            let collection = find_collection_mut(state, collection_id)?;
            collection.auto_sync = enabled;
            collection.updated_at = now;
            Ok(())
        })?;

        if enabled {
            self.scheduler.schedule(collection_id, now);
        } else {
            self.scheduler.cancel(collection_id);
        }
        info!(collection_id, enabled, "auto-sync toggled");
        Ok(())
    }

    /// Start watching a collection (it is on screen); arms its timer if auto-sync is on
    pub fn observe(&mut self, collection_id: &str, now: DateTime<Utc>) -> Result<bool> {
        let auto_sync = self.require_collection(collection_id)?.auto_sync;
        Ok(auto_sync && self.scheduler.schedule(collection_id, now))
    }

    /// Stop watching a collection; cancels its timer
    pub fn unobserve(&mut self, collection_id: &str) -> bool {
        self.scheduler.cancel(collection_id)
    }

    /// True if an auto-sync timer is armed for the collection
    pub fn is_auto_sync_scheduled(&self, collection_id: &str) -> bool {
        self.scheduler.is_scheduled(collection_id)
    }

    /// Fire due auto-sync timers
    ///
    /// Timers of deleted or disabled collections are cancelled. A due
    /// collection is committed only when its preview has changes.
    pub fn poll_auto_sync(&mut self, catalog: &[Item], now: DateTime<Utc>) -> Vec<SyncOutcome> {
        let mut outcomes = Vec::new();

        for collection_id in self.scheduler.due(now) {
            let preview = self
                .get_collection(&collection_id)
                .filter(|c| c.auto_sync)
                .map(|c| create_sync_preview_with(&self.evaluator, c, catalog));
            let Some(preview) = preview else {
                self.scheduler.cancel(&collection_id);
                continue;
            };

            if !preview.has_changes() {
                debug!(collection_id = %collection_id, "auto-sync: no changes");
                continue;
            }

            let user = self.config.default_user.clone();
            outcomes.push(self.apply_preview(&collection_id, &preview, SyncTrigger::Auto, &user));
        }

        outcomes
    }

    fn acquire(&mut self, collection_id: &str) -> bool {
        self.syncing.insert(collection_id.to_string())
    }

    fn sync_locked(&mut self, collection_id: &str, catalog: &[Item], trigger: SyncTrigger, user: &str) -> SyncOutcome {
        match self.preview_sync(collection_id, catalog) {
            Ok(preview) => self.apply_locked(collection_id, &preview, trigger, user),
            Err(e) => SyncOutcome::failure(collection_id, e.to_string()),
        }
    }

    fn apply_locked(
        &mut self,
        collection_id: &str,
        preview: &SyncPreview,
        trigger: SyncTrigger,
        user: &str,
    ) -> SyncOutcome {
        let result = self.mutate(|state| {
            let now = Utc::now();
            let collection = find_collection_mut(state, collection_id)?;

            let remove_ids: HashSet<&str> = preview.items_to_remove.iter().map(|i| i.id()).collect();
            let before = collection.items.len();
            collection.items.retain(|i| !remove_ids.contains(i.id()));
            let removed = before - collection.items.len();

            let mut order = collection.next_order();
            let mut added = 0;
            for item in &preview.items_to_add {
                if collection.contains(&item.id) {
                    continue;
                }
                collection.items.push(CollectionItem {
                    item: item.clone(),
                    added_at: now,
                    added_by: user.to_string(),
                    order,
                    pinned: false,
                });
                order += 1;
                added += 1;
            }

            collection.last_synced_at = Some(now);
            collection.updated_at = now;

            let entry = SyncHistoryEntry {
                id: generate_history_id(),
                timestamp: now,
                items_added: added,
                items_removed: removed,
                rules_applied: collection.filters.conditions.clone(),
                triggered_by: trigger,
                user_id: user.to_string(),
            };
            state.history.entry(collection_id.to_string()).or_default().insert(0, entry.clone());
            Ok(entry)
        });

        match result {
            Ok(entry) => {
                info!(
                    collection_id,
                    added = entry.items_added,
                    removed = entry.items_removed,
                    trigger = ?trigger,
                    "sync committed"
                );
                SyncOutcome {
                    collection_id: collection_id.to_string(),
                    success: true,
                    errors: Vec::new(),
                    items_added: entry.items_added,
                    items_removed: entry.items_removed,
                    entry: Some(entry),
                }
            }
            Err(e) => {
                warn!(collection_id, error = %e, "sync failed");
                SyncOutcome::failure(collection_id, e.to_string())
            }
        }
    }
}

fn busy(collection_id: &str) -> SyncOutcome {
    warn!(collection_id, "sync rejected, already in progress");
    SyncOutcome::failure(collection_id, format!("Sync already in progress for {}", collection_id))
}
