//! Data models and persistence
//!
//! Handles:
//! - Item, collection and state models
//! - SQLite connection and schema
//! - The state persistence port and its adapters

pub mod models;
pub mod schema;
pub mod connection;
pub mod queries;
pub mod state;

pub use connection::Database;
pub use models::*;
pub use state::{MemoryStateStore, SqliteStateStore, StateStore};
