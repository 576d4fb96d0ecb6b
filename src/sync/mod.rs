//! Sync reconciliation between collections and their rules
//!
//! This module provides:
//! - **preview**: Side-effect free add/remove delta and pre-flight checks
//! - **history**: Append-only sync records and rollup statistics
//! - **scheduler**: Cooperative auto-sync timers

mod history;
mod preview;
mod scheduler;

pub use history::{SyncHistoryEntry, SyncStats, SyncTrigger, get_sync_stats};
pub use preview::{
    SyncChanges, SyncPreview, SyncStatus, create_sync_preview, create_sync_preview_with, sync_status,
    validate_sync,
};
pub use scheduler::AutoSyncScheduler;
