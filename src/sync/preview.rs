//! Sync preview: the add/remove delta between a collection and its rules
//!
//! Computing a preview never mutates anything; committing it is done by
//! the collection store.

use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use crate::database::{Collection, CollectionItem, Item};
use crate::rules::{RuleEvaluator, ValidationError, ValidationResult, ValidationWarning};

/// Counts of a sync delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncChanges {
    pub added: usize,
    pub removed: usize,
    pub unchanged: usize,
}

/// Unapplied delta between a collection's items and its rule matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPreview {
    /// Catalog items matched by the rules but not yet held
    pub items_to_add: Vec<Item>,
    /// Held items the rules no longer match
    pub items_to_remove: Vec<CollectionItem>,
    /// Held items the rules still match
    pub unchanged: Vec<CollectionItem>,
    pub current_count: usize,
    pub new_count: usize,
    pub changes: SyncChanges,
}

impl SyncPreview {
    /// True if committing would change the collection
    pub fn has_changes(&self) -> bool {
        self.changes.added > 0 || self.changes.removed > 0
    }

    /// Item count after commit (`unchanged + added`)
    pub fn projected_count(&self) -> usize {
        self.changes.unchanged + self.changes.added
    }
}

/// Sync state of a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Never synced
    Unsynced,
    /// Synced and the rules still select exactly the held items
    Synced,
    /// Rules or catalog changed since the last sync
    Stale,
}

/// Compute the sync delta with the default asset evaluator
pub fn create_sync_preview(collection: &Collection, catalog: &[Item]) -> SyncPreview {
    create_sync_preview_with(&RuleEvaluator::default(), collection, catalog)
}

/// Compute the sync delta with a specific evaluator
pub fn create_sync_preview_with(
    evaluator: &RuleEvaluator,
    collection: &Collection,
    catalog: &[Item],
) -> SyncPreview {
    let current_ids: HashSet<&str> = collection.items.iter().map(|i| i.id()).collect();

    // a repeated catalog ID counts once, first occurrence wins
    let mut matching_ids: HashSet<&str> = HashSet::new();
    let matching: Vec<&Item> = evaluator
        .find_matching_items(catalog, &collection.filters)
        .into_iter()
        .filter(|i| matching_ids.insert(i.id.as_str()))
        .collect();

    let items_to_add: Vec<Item> = matching
        .iter()
        .filter(|i| !current_ids.contains(i.id.as_str()))
        .map(|i| (*i).clone())
        .collect();

    let (unchanged, items_to_remove): (Vec<CollectionItem>, Vec<CollectionItem>) = collection
        .items
        .iter()
        .cloned()
        .partition(|i| matching_ids.contains(i.id()));

    let changes = SyncChanges {
        added: items_to_add.len(),
        removed: items_to_remove.len(),
        unchanged: unchanged.len(),
    };

    SyncPreview {
        current_count: collection.items.len(),
        new_count: changes.unchanged + changes.added,
        items_to_add,
        items_to_remove,
        unchanged,
        changes,
    }
}

/// Derive the sync state from a fresh preview
pub fn sync_status(collection: &Collection, preview: &SyncPreview) -> SyncStatus {
    if collection.last_synced_at.is_none() {
        SyncStatus::Unsynced
    } else if preview.has_changes() {
        SyncStatus::Stale
    } else {
        SyncStatus::Synced
    }
}

/// Pre-flight check before a sync
///
/// Does not block anything by itself; callers decide how to treat warnings.
pub fn validate_sync(collection: &Collection) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if collection.filters.is_empty() {
        errors.push(ValidationError::new(None, "filters", "No rules defined"));
    }
    if !collection.auto_sync {
        warnings.push(ValidationWarning::new(None, "autoSync", "Auto-sync is disabled"));
    }
    if collection.items.is_empty() {
        warnings.push(ValidationWarning::new(None, "items", "Collection has no items"));
    }

    ValidationResult::from_parts(errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::database::CollectionSource;
    use crate::rules::{Operator, Rule, RuleSet};

    fn held(id: &str, order: u32) -> CollectionItem {
        CollectionItem {
            item: Item::new(id).with("category", "Properties"),
            added_at: Utc::now(),
            added_by: "tester".to_string(),
            order,
            pinned: false,
        }
    }

    fn collection(items: Vec<CollectionItem>, filters: RuleSet) -> Collection {
        let now = Utc::now();
        Collection {
            id: "c1".to_string(),
            name: "Test".to_string(),
            description: None,
            items,
            filters,
            auto_sync: true,
            last_synced_at: None,
            source: CollectionSource::Manual,
            created_by: "tester".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn ids_of(items: &[CollectionItem]) -> Vec<&str> {
        items.iter().map(|i| i.id()).collect()
    }

    #[test]
    fn test_rules_match_all_adds_missing() {
        let col = collection(
            vec![held("a", 0)],
            RuleSet::all(vec![Rule::new("category", Operator::Equals, "Properties")]),
        );
        let catalog = vec![
            Item::new("a").with("category", "Properties"),
            Item::new("b").with("category", "Properties"),
        ];

        let preview = create_sync_preview(&col, &catalog);
        assert_eq!(preview.items_to_add.len(), 1);
        assert_eq!(preview.items_to_add[0].id, "b");
        assert!(preview.items_to_remove.is_empty());
        assert_eq!(ids_of(&preview.unchanged), vec!["a"]);
        assert_eq!(preview.changes, SyncChanges { added: 1, removed: 0, unchanged: 1 });
        assert_eq!(preview.current_count, 1);
        assert_eq!(preview.new_count, 2);
    }

    #[test]
    fn test_repeated_catalog_id_counts_once() {
        let col = collection(
            vec![],
            RuleSet::all(vec![Rule::new("category", Operator::Equals, "Properties")]),
        );
        let catalog = vec![
            Item::new("b").with("category", "Properties").with("name", "first"),
            Item::new("b").with("category", "Properties").with("name", "second"),
        ];

        let preview = create_sync_preview(&col, &catalog);
        assert_eq!(preview.items_to_add.len(), 1);
        assert_eq!(preview.items_to_add[0].name(), Some("first"));
        assert_eq!(preview.changes.added, 1);
        assert_eq!(preview.new_count, 1);
    }

    #[test]
    fn test_rules_match_other_item_replaces() {
        let col = collection(
            vec![held("a", 0)],
            RuleSet::all(vec![Rule::new("name", Operator::Equals, "Bravo")]),
        );
        let catalog = vec![
            Item::new("a").with("name", "Alpha"),
            Item::new("b").with("name", "Bravo"),
        ];

        let preview = create_sync_preview(&col, &catalog);
        assert_eq!(preview.items_to_add[0].id, "b");
        assert_eq!(ids_of(&preview.items_to_remove), vec!["a"]);
        assert!(preview.unchanged.is_empty());
        assert_eq!(preview.new_count, 1);
    }

    #[test]
    fn test_preview_is_idempotent() {
        let col = collection(
            vec![held("a", 0), held("c", 1)],
            RuleSet::all(vec![Rule::new("value", Operator::GreaterThan, 10.0)]),
        );
        let catalog = vec![
            Item::new("a").with("value", 50),
            Item::new("b").with("value", 20),
            Item::new("c").with("value", 5),
        ];
        let first = create_sync_preview(&col, &catalog);
        let second = create_sync_preview(&col, &catalog);
        assert_eq!(first, second);
    }

    #[test]
    fn test_partition_completeness() {
        let col = collection(
            vec![held("a", 0), held("b", 1), held("x", 2)],
            RuleSet::all(vec![Rule::new("tags", Operator::Contains, "keep")]),
        );
        let catalog = vec![
            Item::new("a").with("tags", vec!["keep"]),
            Item::new("b").with("tags", vec!["drop"]),
            Item::new("d").with("tags", vec!["keep"]),
        ];
        let preview = create_sync_preview(&col, &catalog);

        for added in &preview.items_to_add {
            assert!(!col.contains(&added.id));
        }
        for removed in &preview.items_to_remove {
            assert!(col.contains(removed.id()));
        }
        assert_eq!(preview.unchanged.len() + preview.items_to_remove.len(), col.items.len());
        assert_eq!(preview.projected_count(), preview.new_count);
    }

    #[test]
    fn test_empty_rules_remove_everything() {
        let col = collection(vec![held("a", 0)], RuleSet::default());
        let catalog = vec![Item::new("a"), Item::new("b")];
        let preview = create_sync_preview(&col, &catalog);
        assert!(preview.items_to_add.is_empty());
        assert_eq!(preview.changes.removed, 1);
    }

    #[test]
    fn test_sync_status_transitions() {
        let mut col = collection(
            vec![held("a", 0)],
            RuleSet::all(vec![Rule::new("category", Operator::Equals, "Properties")]),
        );
        let catalog = vec![Item::new("a").with("category", "Properties")];

        let preview = create_sync_preview(&col, &catalog);
        assert_eq!(sync_status(&col, &preview), SyncStatus::Unsynced);

        col.last_synced_at = Some(Utc::now());
        assert_eq!(sync_status(&col, &preview), SyncStatus::Synced);

        let grown = vec![
            Item::new("a").with("category", "Properties"),
            Item::new("b").with("category", "Properties"),
        ];
        let preview = create_sync_preview(&col, &grown);
        assert_eq!(sync_status(&col, &preview), SyncStatus::Stale);
    }

    #[test]
    fn test_validate_sync() {
        let mut col = collection(vec![], RuleSet::default());
        col.auto_sync = false;
        let result = validate_sync(&col);
        assert!(!result.valid);
        assert_eq!(result.errors[0].message, "No rules defined");
        assert_eq!(result.warnings.len(), 2);

        let col = collection(
            vec![held("a", 0)],
            RuleSet::all(vec![Rule::new("name", Operator::IsNotEmpty, "")]),
        );
        let result = validate_sync(&col);
        assert!(result.valid);
        assert!(result.warnings.is_empty());
    }
}
