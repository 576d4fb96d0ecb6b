//! Database schema definitions

/// SQL to create the state table
///
/// Holds a single row (`state_id = 1`) with the serialized store state.
pub const CREATE_STATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS collection_state (
    state_id        INTEGER NOT NULL PRIMARY KEY,
    blob            TEXT NOT NULL,
    updated_at      TEXT
)
"#;

/// All table creation statements in order
pub const CREATE_ALL_TABLES: &[&str] = &[
    CREATE_STATE_TABLE,
];
