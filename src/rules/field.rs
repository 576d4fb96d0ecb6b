//! Field value access and field schema
//!
//! Items carry free-form JSON fields. [`get_field_value`] resolves a dotted
//! path against an item; [`FieldSchema`] tells the evaluator which kind of
//! value a field holds so comparisons can dispatch on the declared kind.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::database::Item;

/// Declared kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    List,
    Date,
}

/// Resolve a possibly dotted field path on an item
///
/// Returns `None` as soon as a segment is missing or a non-object is
/// reached before the last segment. A JSON `null` is treated as absent.
pub fn get_field_value<'a>(item: &'a Item, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let first = segments.next()?;

    let mut current = item.fields.get(first)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }

    if current.is_null() { None } else { Some(current) }
}

/// Name-based date detection for fields without a declared kind
pub fn looks_like_date_field(field: &str) -> bool {
    field.contains("date") || field.ends_with("At")
}

/// Mapping from field name to declared kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(default)]
    kinds: HashMap<String, FieldKind>,
}

impl FieldSchema {
    /// Schema with no declarations; dispatch falls back to runtime types
    pub fn empty() -> Self {
        Self::default()
    }

    /// Declare the kind of a field
    pub fn with_field(mut self, field: &str, kind: FieldKind) -> Self {
        self.kinds.insert(field.to_string(), kind);
        self
    }

    /// Declared kind, if any
    pub fn declared(&self, field: &str) -> Option<FieldKind> {
        self.kinds.get(field).copied()
    }

    /// True if comparisons on this field go through date parsing
    ///
    /// A declared kind wins; undeclared fields use the name heuristic.
    pub fn is_date(&self, field: &str) -> bool {
        match self.declared(field) {
            Some(kind) => kind == FieldKind::Date,
            None => looks_like_date_field(field),
        }
    }

    /// True if the field is declared numeric
    pub fn is_numeric(&self, field: &str) -> bool {
        self.declared(field) == Some(FieldKind::Number)
    }

    /// Names of all fields declared with `kind`, sorted
    pub fn fields_of_kind(&self, kind: FieldKind) -> Vec<String> {
        let mut fields: Vec<String> = self
            .kinds
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(name, _)| name.clone())
            .collect();
        fields.sort();
        fields
    }
}

/// Schema for the standard asset fields
pub fn asset_schema() -> FieldSchema {
    FieldSchema::empty()
        .with_field("name", FieldKind::Text)
        .with_field("category", FieldKind::Text)
        .with_field("status", FieldKind::Text)
        .with_field("location", FieldKind::Text)
        .with_field("value", FieldKind::Number)
        .with_field("guestRating", FieldKind::Number)
        .with_field("internalRating", FieldKind::Number)
        .with_field("rating", FieldKind::Number)
        .with_field("price", FieldKind::Number)
        .with_field("quantity", FieldKind::Number)
        .with_field("order", FieldKind::Number)
        .with_field("tags", FieldKind::List)
        .with_field("labels", FieldKind::List)
        .with_field("flagged", FieldKind::Boolean)
        .with_field("pinned", FieldKind::Boolean)
        .with_field("archived", FieldKind::Boolean)
        .with_field("lastUpdated", FieldKind::Date)
        .with_field("createdAt", FieldKind::Date)
        .with_field("updatedAt", FieldKind::Date)
        .with_field("addedAt", FieldKind::Date)
}
