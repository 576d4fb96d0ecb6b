//! Business logic layer
//!
//! This module provides the high-level CollectionStore API for managing
//! collections, their items and rules, syncs and suggestions.

pub mod store;
pub mod collections;
pub mod sync;
pub mod suggestions;

pub use store::CollectionStore;
pub use collections::BulkAction;
pub use sync::{RuleUpdate, SyncOutcome, SyncTicket};
pub use suggestions::{BuiltinSuggestions, CollectionSuggestion, SuggestionProvider};
