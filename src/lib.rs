//! # Asset Collections Core
//!
//! Rule-filtered asset collections with preview-first auto-sync.
//!
//! ## Features
//!
//! - Flat field/operator/value rules combined with AND, OR or NOT
//! - Typed comparisons for text, numbers, booleans, lists and dates
//! - Side-effect free sync previews and an append-only sync history
//! - Auto-sync timers driven by the caller's clock
//! - SQLite state storage
//!
//! ## Example
//!
//! ```no_run
//! use assetcore::{CollectionStore, Item, Operator, Rule, RuleSet, SyncTrigger};
//! use std::path::Path;
//!
//! let mut store = CollectionStore::open(Path::new("/path/to/store")).unwrap();
//! let id = store.create_collection("Active Properties", None, "alice").unwrap();
//! store.update_rules(&id, RuleSet::all(vec![
//!     Rule::new("category", Operator::Equals, "Properties"),
//!     Rule::new("status", Operator::Equals, "Active"),
//! ])).unwrap();
//!
//! let catalog = vec![Item::new("p1").with("category", "Properties").with("status", "Active")];
//! let preview = store.preview_sync(&id, &catalog).unwrap();
//! println!("{} to add, {} to remove", preview.changes.added, preview.changes.removed);
//!
//! let outcome = store.commit_sync(&id, &catalog, SyncTrigger::Manual, "alice");
//! assert!(outcome.success);
//! ```

pub mod business;
pub mod config;
pub mod database;
pub mod error;
pub mod rules;
pub mod sync;
pub mod utils;

// Re-export main types
pub use error::{CollectionError, Result};
pub use config::StoreConfig;
pub use database::models::{Collection, CollectionItem, CollectionSource, Item, StoreState};
pub use database::{MemoryStateStore, SqliteStateStore, StateStore};
pub use business::{
    BuiltinSuggestions, BulkAction, CollectionStore, CollectionSuggestion, RuleUpdate, SuggestionProvider,
    SyncOutcome, SyncTicket,
};
pub use rules::{
    FieldKind, FieldSchema, LogicalOperator, Operator, Rule, RuleEvaluator, RuleSet, RuleValue,
    ValidationConfig, ValidationResult, apply_rules, evaluate_condition, find_matching_items, validate_rules,
};
pub use sync::{SyncHistoryEntry, SyncPreview, SyncStats, SyncStatus, SyncTrigger};

/// State document version
pub const STATE_VERSION: u32 = 1;

/// Database filename
pub const DATABASE_FILENAME: &str = "collections.db";

/// Collection ID length
pub const COLLECTION_ID_LENGTH: usize = 12;

/// Rule ID length
pub const RULE_ID_LENGTH: usize = 8;

/// Default auto-sync interval in seconds
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30;

/// Longest accepted auto-sync interval in seconds (one week)
pub const MAX_SYNC_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

/// Default maximum number of conditions in a rule set
pub const DEFAULT_MAX_CONDITIONS: usize = 10;

/// User recorded for syncs nobody started by hand
pub const SYSTEM_USER: &str = "system";
