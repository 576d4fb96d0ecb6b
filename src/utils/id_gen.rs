//! ID generation utilities

use rand::Rng;
use rand::distr::Alphanumeric;

/// Random alphanumeric ID of the given length
pub fn generate_id(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Generate a collection ID (12 characters)
pub fn generate_collection_id() -> String {
    generate_id(crate::COLLECTION_ID_LENGTH)
}

/// Generate a rule ID (8 characters)
pub fn generate_rule_id() -> String {
    generate_id(crate::RULE_ID_LENGTH)
}

/// Generate a sync history entry ID (32 characters, UUID-like)
pub fn generate_history_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
