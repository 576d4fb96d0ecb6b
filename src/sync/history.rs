//! Sync history records and rollup statistics

use std::collections::HashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::rules::Rule;

/// What caused a sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncTrigger {
    Auto,
    #[default]
    Manual,
    RuleChange,
}

/// Immutable audit record of one committed sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncHistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub items_added: usize,
    pub items_removed: usize,
    /// Rules as they were when the sync ran
    pub rules_applied: Vec<Rule>,
    pub triggered_by: SyncTrigger,
    pub user_id: String,
}

/// Rollup over a collection's sync history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStats {
    pub total_syncs: usize,
    pub total_items_added: usize,
    pub total_items_removed: usize,
    pub last_sync: Option<DateTime<Utc>>,
    pub most_active_trigger: SyncTrigger,
}

/// Reduce a newest-first history into stats
///
/// Ties for the most frequent trigger go to the one seen first.
pub fn get_sync_stats(history: &[SyncHistoryEntry]) -> SyncStats {
    let mut counts: HashMap<SyncTrigger, usize> = HashMap::new();
    let mut seen: Vec<SyncTrigger> = Vec::new();

    for entry in history {
        let count = counts.entry(entry.triggered_by).or_insert(0);
        if *count == 0 {
            seen.push(entry.triggered_by);
        }
        *count += 1;
    }

    let mut most_active_trigger = SyncTrigger::Manual;
    let mut best = 0;
    for trigger in seen {
        let count = counts[&trigger];
        if count > best {
            best = count;
            most_active_trigger = trigger;
        }
    }

    SyncStats {
        total_syncs: history.len(),
        total_items_added: history.iter().map(|e| e.items_added).sum(),
        total_items_removed: history.iter().map(|e| e.items_removed).sum(),
        last_sync: history.first().map(|e| e.timestamp),
        most_active_trigger,
    }
}
