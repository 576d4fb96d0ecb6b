//! Data models for items, collections and persisted state

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::rules::RuleSet;
use crate::sync::SyncHistoryEntry;

/// Catalog asset (property, vehicle, entity, aircraft, ...)
///
/// Everything except the ID is free-form JSON. The engine never mutates an
/// item; collections hold their own copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identifier
    pub id: String,
    /// Remaining fields (`name`, `category`, `value`, `tags`, ...)
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Item {
    /// Create an item with no fields
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string(), fields: Map::new() }
    }

    /// Builder-style field setter
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    /// Item name, if set
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }
}

/// An item as held by one collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionItem {
    /// Independent copy of the catalog item
    pub item: Item,
    pub added_at: DateTime<Utc>,
    pub added_by: String,
    /// Position within the collection, 0-based
    pub order: u32,
    #[serde(default)]
    pub pinned: bool,
}

impl CollectionItem {
    pub fn id(&self) -> &str {
        &self.item.id
    }
}

/// How a collection came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionSource {
    #[default]
    Manual,
    Suggestion,
    Search,
}

/// User-defined or suggested collection of items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub items: Vec<CollectionItem>,
    #[serde(default)]
    pub filters: RuleSet,
    #[serde(default)]
    pub auto_sync: bool,
    #[serde(default)]
    pub last_synced_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source: CollectionSource,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Collection {
    /// Number of items currently held
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// True if an item with this ID is held
    pub fn contains(&self, item_id: &str) -> bool {
        self.items.iter().any(|i| i.id() == item_id)
    }

    /// Next sequential `order` value
    pub(crate) fn next_order(&self) -> u32 {
        self.items.iter().map(|i| i.order + 1).max().unwrap_or(0)
    }

    /// Renumber `order` to match the current positions
    pub(crate) fn renumber(&mut self) {
        for (index, item) in self.items.iter_mut().enumerate() {
            item.order = index as u32;
        }
    }
}

/// Full persisted state blob
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    pub version: u32,
    #[serde(default)]
    pub collections: Vec<Collection>,
    /// Sync history per collection ID, newest entry first
    #[serde(default)]
    pub history: BTreeMap<String, Vec<SyncHistoryEntry>>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            version: crate::STATE_VERSION,
            collections: Vec::new(),
            history: BTreeMap::new(),
        }
    }
}
