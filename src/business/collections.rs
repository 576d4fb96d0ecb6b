//! Collection operations
//!
//! This module provides collection and item management operations for the
//! CollectionStore.

use std::collections::HashSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use crate::database::{Collection, CollectionItem, CollectionSource, Item};
use crate::error::{CollectionError, Result};
use crate::rules::{RuleSet, ValidationResult, validate_rules};
use crate::sync::{SyncHistoryEntry, SyncStats, get_sync_stats};
use crate::utils::generate_collection_id;
use super::store::{CollectionStore, find_collection_mut};
use super::suggestions::CollectionSuggestion;

/// Bulk operation on selected items of a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "action", content = "target")]
pub enum BulkAction {
    Remove,
    Pin,
    Unpin,
    /// Copy the items into another collection
    CopyTo(String),
}

/// Copy items into a collection, skipping IDs it already holds
fn append_items<'a>(
    collection: &mut Collection,
    items: impl IntoIterator<Item = &'a Item>,
    user: &str,
    now: DateTime<Utc>,
) -> usize {
    let mut order = collection.next_order();
    let mut added = 0;
    for item in items {
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
    added
}

fn new_collection(name: &str, description: Option<String>, source: CollectionSource, user: &str) -> Result<Collection> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CollectionError::InvalidOperation("Collection name is required".to_string()));
    }
    let now = Utc::now();
    Ok(Collection {
        id: generate_collection_id(),
        name: name.to_string(),
        description,
        items: Vec::new(),
        filters: RuleSet::default(),
        auto_sync: false,
        last_synced_at: None,
        source,
        created_by: user.to_string(),
        created_at: now,
        updated_at: now,
    })
}

impl CollectionStore {
    /// Get all collections in creation order
    pub fn get_collections(&self) -> &[Collection] {
        &self.state.collections
    }

    /// Get a collection by ID
    pub fn get_collection(&self, collection_id: &str) -> Option<&Collection> {
        self.state.collections.iter().find(|c| c.id == collection_id)
    }

    pub(crate) fn require_collection(&self, collection_id: &str) -> Result<&Collection> {
        self.get_collection(collection_id)
            .ok_or_else(|| CollectionError::CollectionNotFound(collection_id.to_string()))
    }

    /// Number of items a collection holds
    ///
    /// The one place counts come from; views should not count items themselves.
    pub fn item_count(&self, collection_id: &str) -> Result<usize> {
        Ok(self.require_collection(collection_id)?.item_count())
    }

    /// Create an empty manual collection
    pub fn create_collection(&mut self, name: &str, description: Option<&str>, user: &str) -> Result<String> {
        let collection = new_collection(name, description.map(str::to_string), CollectionSource::Manual, user)?;
        let id = collection.id.clone();

        self.mutate(|state| {
            state.collections.push(collection);
            Ok(())
        })?;

        info!(collection_id = %id, "collection created");
        Ok(id)
    }

    /// Create a collection from a suggestion, pre-populated with its matches
    pub fn create_from_suggestion(
        &mut self,
        suggestion: &CollectionSuggestion,
        catalog: &[Item],
        user: &str,
    ) -> Result<String> {
        let mut collection = new_collection(
            &suggestion.name,
            Some(suggestion.description.clone()),
            CollectionSource::Suggestion,
            user,
        )?;
        collection.filters = suggestion.rules.clone();
        let now = collection.created_at;

        let matching = self.evaluator.find_matching_items(catalog, &suggestion.rules);
        let added = append_items(&mut collection, matching, user, now);
        let id = collection.id.clone();

        self.mutate(|state| {
            state.collections.push(collection);
            Ok(())
        })?;

        info!(collection_id = %id, suggestion = %suggestion.id, items = added, "collection created from suggestion");
        Ok(id)
    }

    /// Create a collection holding a search result set
    pub fn create_from_search(&mut self, name: &str, query: &str, results: &[Item], user: &str) -> Result<String> {
        let mut collection = new_collection(
            name,
            Some(format!("Search results for \"{}\"", query)),
            CollectionSource::Search,
            user,
        )?;
        let now = collection.created_at;
        let added = append_items(&mut collection, results, user, now);
        let id = collection.id.clone();

        self.mutate(|state| {
            state.collections.push(collection);
            Ok(())
        })?;

        info!(collection_id = %id, items = added, "collection created from search");
        Ok(id)
    }

    /// Rename a collection
    pub fn rename_collection(&mut self, collection_id: &str, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CollectionError::InvalidOperation("Collection name is required".to_string()));
        }

        self.mutate(|state| {
            let collection = find_collection_mut(state, collection_id)?;
            collection.name = name.to_string();
            collection.updated_at = Utc::now();
            Ok(())
        })
    }

    /// Delete a collection
    ///
    /// Its sync history is kept; entries are never deleted once committed.
    pub fn delete_collection(&mut self, collection_id: &str) -> Result<()> {
        if self.syncing.contains(collection_id) {
            return Err(CollectionError::SyncInProgress(collection_id.to_string()));
        }

        self.mutate(|state| {
            let before = state.collections.len();
            state.collections.retain(|c| c.id != collection_id);
            if state.collections.len() == before {
                return Err(CollectionError::CollectionNotFound(collection_id.to_string()));
            }
            Ok(())
        })?;

        self.scheduler.cancel(collection_id);
        info!(collection_id, "collection deleted");
        Ok(())
    }

    /// Add copies of items; returns how many were new
    pub fn add_items(&mut self, collection_id: &str, items: &[Item], user: &str) -> Result<usize> {
        self.mutate(|state| {
            let collection = find_collection_mut(state, collection_id)?;
            let now = Utc::now();
            let added = append_items(collection, items, user, now);
            if added > 0 {
                collection.updated_at = now;
            }
            Ok(added)
        })
    }

    /// Remove items by ID; returns how many were held
    pub fn remove_items(&mut self, collection_id: &str, item_ids: &[&str]) -> Result<usize> {
        self.mutate(|state| {
            let collection = find_collection_mut(state, collection_id)?;
            let ids: HashSet<&str> = item_ids.iter().copied().collect();
            let before = collection.items.len();
            collection.items.retain(|i| !ids.contains(i.id()));
            let removed = before - collection.items.len();
            if removed > 0 {
                collection.updated_at = Utc::now();
            }
            Ok(removed)
        })
    }

    /// Move an item to a new position and renumber `order`
    ///
    /// Indexes past the end move the item last.
    pub fn reorder_item(&mut self, collection_id: &str, item_id: &str, new_index: usize) -> Result<()> {
        self.mutate(|state| {
            let collection = find_collection_mut(state, collection_id)?;
            let from = collection
                .items
                .iter()
                .position(|i| i.id() == item_id)
                .ok_or_else(|| CollectionError::ItemNotFound(item_id.to_string()))?;

            let entry = collection.items.remove(from);
            let to = new_index.min(collection.items.len());
            collection.items.insert(to, entry);
            collection.renumber();
            collection.updated_at = Utc::now();
            Ok(())
        })
    }

    /// Apply one action to several items; returns how many items it touched
    pub fn bulk_update(
        &mut self,
        collection_id: &str,
        item_ids: &[&str],
        action: BulkAction,
        user: &str,
    ) -> Result<usize> {
        let ids: HashSet<&str> = item_ids.iter().copied().collect();

        self.mutate(|state| {
            let now = Utc::now();
            let source = find_collection_mut(state, collection_id)?;

            let touched = match &action {
                BulkAction::Remove => {
                    let before = source.items.len();
                    source.items.retain(|i| !ids.contains(i.id()));
                    before - source.items.len()
                }
                BulkAction::Pin | BulkAction::Unpin => {
                    let pinned = action == BulkAction::Pin;
                    let mut count = 0;
                    for entry in source.items.iter_mut().filter(|i| ids.contains(i.id())) {
                        entry.pinned = pinned;
                        count += 1;
                    }
                    count
                }
                BulkAction::CopyTo(target_id) => {
                    if target_id == collection_id {
                        return Err(CollectionError::InvalidOperation(
                            "Cannot copy items into the same collection".to_string(),
                        ));
                    }
                    let selected: Vec<Item> = source
                        .items
                        .iter()
                        .filter(|i| ids.contains(i.id()))
                        .map(|i| i.item.clone())
                        .collect();
                    let target = find_collection_mut(state, target_id)?;
                    let added = append_items(target, &selected, user, now);
                    if added > 0 {
                        target.updated_at = now;
                    }
                    added
                }
            };

            if touched > 0 && !matches!(action, BulkAction::CopyTo(_)) {
                find_collection_mut(state, collection_id)?.updated_at = now;
            }
            Ok(touched)
        })
    }

    /// Replace a collection's rules after validating them
    ///
    /// Invalid rules are rejected with [`CollectionError::InvalidRules`] and
    /// leave the collection unchanged. On success the validation result is
    /// returned so callers can surface warnings.
    pub fn update_rules(&mut self, collection_id: &str, rules: RuleSet) -> Result<ValidationResult> {
        let validation = validate_rules(&rules.conditions, &self.config.validation);
        let rule_count = rules.len();
        if !validation.valid {
            warn!(collection_id, errors = validation.errors.len(), "rule update rejected");
            return Err(CollectionError::InvalidRules { errors: validation.errors });
        }

        self.mutate(|state| {
            let collection = find_collection_mut(state, collection_id)?;
            collection.filters = rules;
            collection.updated_at = Utc::now();
            Ok(())
        })?;

        info!(
            collection_id,
            rules = rule_count,
            warnings = validation.warnings.len(),
            "rules updated"
        );
        Ok(validation)
    }

    /// Sync history of a collection, newest first
    pub fn get_sync_history(&self, collection_id: &str) -> &[SyncHistoryEntry] {
        self.state.history.get(collection_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rollup statistics over a collection's sync history
    pub fn get_sync_stats(&self, collection_id: &str) -> SyncStats {
        get_sync_stats(self.get_sync_history(collection_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::business::store::tests::{create_test_store, sample_catalog};
    use crate::rules::{Operator, Rule};

    fn ids(collection: &Collection) -> Vec<&str> {
        collection.items.iter().map(|i| i.id()).collect()
    }

    #[test]
    fn test_create_collection() {
        let mut store = create_test_store();
        let id = store.create_collection("  Fleet  ", Some("All vehicles"), "u1").unwrap();

        let collection = store.get_collection(&id).unwrap();
        assert_eq!(collection.name, "Fleet");
        assert_eq!(collection.description.as_deref(), Some("All vehicles"));
        assert_eq!(collection.source, CollectionSource::Manual);
        assert_eq!(collection.created_by, "u1");
        assert!(collection.filters.is_empty());
    }

    #[test]
    fn test_create_collection_requires_name() {
        let mut store = create_test_store();
        assert!(store.create_collection("   ", None, "u1").is_err());
        assert!(store.get_collections().is_empty());
    }

    #[test]
    fn test_add_items_skips_duplicates_and_orders() {
        let mut store = create_test_store();
        let catalog = sample_catalog();
        let id = store.create_collection("Mixed", None, "u1").unwrap();

        assert_eq!(store.add_items(&id, &catalog[..2], "u1").unwrap(), 2);
        assert_eq!(store.add_items(&id, &catalog[1..3], "u2").unwrap(), 1);

        let collection = store.get_collection(&id).unwrap();
        assert_eq!(ids(collection), vec!["p1", "p2", "v1"]);
        let orders: Vec<u32> = collection.items.iter().map(|i| i.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        assert_eq!(collection.items[2].added_by, "u2");
        assert_eq!(store.item_count(&id).unwrap(), 3);
    }

    #[test]
    fn test_remove_items() {
        let mut store = create_test_store();
        let id = store.create_collection("Mixed", None, "u1").unwrap();
        store.add_items(&id, &sample_catalog(), "u1").unwrap();

        assert_eq!(store.remove_items(&id, &["p2", "zz"]).unwrap(), 1);
        assert_eq!(ids(store.get_collection(&id).unwrap()), vec!["p1", "v1", "a1"]);
    }

    #[test]
    fn test_reorder_item() {
        let mut store = create_test_store();
        let id = store.create_collection("Mixed", None, "u1").unwrap();
        store.add_items(&id, &sample_catalog(), "u1").unwrap();

        store.reorder_item(&id, "a1", 0).unwrap();
        store.reorder_item(&id, "p1", 99).unwrap();

        let collection = store.get_collection(&id).unwrap();
        assert_eq!(ids(collection), vec!["a1", "p2", "v1", "p1"]);
        let orders: Vec<u32> = collection.items.iter().map(|i| i.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);

        assert!(matches!(
            store.reorder_item(&id, "missing", 0),
            Err(CollectionError::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_bulk_pin_and_remove() {
        let mut store = create_test_store();
        let id = store.create_collection("Mixed", None, "u1").unwrap();
        store.add_items(&id, &sample_catalog(), "u1").unwrap();

        assert_eq!(store.bulk_update(&id, &["p1", "v1"], BulkAction::Pin, "u1").unwrap(), 2);
        let pinned: Vec<&str> = store.get_collection(&id).unwrap().items.iter()
            .filter(|i| i.pinned).map(|i| i.id()).collect();
        assert_eq!(pinned, vec!["p1", "v1"]);

        assert_eq!(store.bulk_update(&id, &["v1"], BulkAction::Unpin, "u1").unwrap(), 1);
        assert_eq!(store.bulk_update(&id, &["p1", "p2"], BulkAction::Remove, "u1").unwrap(), 2);
        assert_eq!(ids(store.get_collection(&id).unwrap()), vec!["v1", "a1"]);
    }

    #[test]
    fn test_bulk_copy_makes_independent_copies() {
        let mut store = create_test_store();
        let source = store.create_collection("Source", None, "u1").unwrap();
        let target = store.create_collection("Target", None, "u2").unwrap();
        store.add_items(&source, &sample_catalog(), "u1").unwrap();
        store.bulk_update(&source, &["p1"], BulkAction::Pin, "u1").unwrap();

        assert_eq!(store.bulk_update(&source, &["p1", "v1"], BulkAction::CopyTo(target.clone()), "u2").unwrap(), 2);

        // pinning in one collection does not leak into the other
        let copied = &store.get_collection(&target).unwrap().items;
        assert_eq!(copied.len(), 2);
        assert!(copied.iter().all(|i| !i.pinned));
        assert!(store.get_collection(&source).unwrap().items[0].pinned);

        store.reorder_item(&target, "v1", 0).unwrap();
        assert_eq!(ids(store.get_collection(&source).unwrap())[0], "p1");
    }

    #[test]
    fn test_bulk_copy_errors() {
        let mut store = create_test_store();
        let source = store.create_collection("Source", None, "u1").unwrap();
        assert!(store.bulk_update(&source, &[], BulkAction::CopyTo(source.clone()), "u1").is_err());
        assert!(matches!(
            store.bulk_update(&source, &[], BulkAction::CopyTo("nope".to_string()), "u1"),
            Err(CollectionError::CollectionNotFound(_))
        ));
    }

    #[test]
    fn test_rename_and_delete() {
        let mut store = create_test_store();
        let id = store.create_collection("Old", None, "u1").unwrap();
        store.rename_collection(&id, "New").unwrap();
        assert_eq!(store.get_collection(&id).unwrap().name, "New");

        store.delete_collection(&id).unwrap();
        assert!(store.get_collection(&id).is_none());
        assert!(matches!(store.delete_collection(&id), Err(CollectionError::CollectionNotFound(_))));
        assert!(matches!(store.rename_collection(&id, "X"), Err(CollectionError::CollectionNotFound(_))));
    }

    #[test]
    fn test_update_rules_valid_returns_warnings() {
        let mut store = create_test_store();
        let id = store.create_collection("Rated", None, "u1").unwrap();

        let rules = RuleSet::all(vec![Rule::new("name", Operator::GreaterThan, "m")]);
        let result = store.update_rules(&id, rules.clone()).unwrap();
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(store.get_collection(&id).unwrap().filters, rules);
    }

    #[test]
    fn test_update_rules_invalid_leaves_collection_unchanged() {
        let mut store = create_test_store();
        let id = store.create_collection("Rated", None, "u1").unwrap();
        let good = RuleSet::all(vec![Rule::new("status", Operator::Equals, "Active")]);
        store.update_rules(&id, good.clone()).unwrap();

        let bad = RuleSet::all(vec![Rule::new("", Operator::Equals, "x")]);
        match store.update_rules(&id, bad) {
            Err(CollectionError::InvalidRules { errors }) => assert_eq!(errors[0].field, "field"),
            other => panic!("Expected InvalidRules, got {:?}", other),
        }
        assert_eq!(store.get_collection(&id).unwrap().filters, good);
    }

    #[test]
    fn test_history_for_unknown_collection_is_empty() {
        let store = create_test_store();
        assert!(store.get_sync_history("nope").is_empty());
        assert_eq!(store.get_sync_stats("nope").total_syncs, 0);
    }
}
