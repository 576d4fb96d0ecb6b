//! SQL query operations for database access
//!
//! Low-level access to the state table. For collection operations, use the
//! CollectionStore API.

use rusqlite::{Connection, OptionalExtension, params};
use chrono::{DateTime, Utc};
use crate::error::Result;
use crate::utils::{format_datetime, parse_datetime};

/// Row ID of the single state row
const STATE_ROW_ID: i64 = 1;

/// Read the stored state blob, if any
pub fn get_state_blob(conn: &Connection) -> Result<Option<String>> {
    let blob = conn
        .query_row(
            "SELECT blob FROM collection_state WHERE state_id = ?",
            params![STATE_ROW_ID],
            |row| row.get(0),
        )
        .optional()?;
    Ok(blob)
}

/// Insert or replace the state blob
pub fn set_state_blob(conn: &Connection, blob: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO collection_state (state_id, blob, updated_at) VALUES (?, ?, ?)
         ON CONFLICT(state_id) DO UPDATE SET blob = excluded.blob, updated_at = excluded.updated_at",
        params![STATE_ROW_ID, blob, format_datetime(&Utc::now())],
    )?;
    Ok(())
}

/// Time of the last state write
pub fn get_state_updated_at(conn: &Connection) -> Result<Option<DateTime<Utc>>> {
    let raw: Option<Option<String>> = conn
        .query_row(
            "SELECT updated_at FROM collection_state WHERE state_id = ?",
            params![STATE_ROW_ID],
            |row| row.get(0),
        )
        .optional()?;
    Ok(raw.flatten().as_deref().and_then(parse_datetime))
}
