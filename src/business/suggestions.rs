//! Collection suggestions
//!
//! Suggestion sources sit behind [`SuggestionProvider`]. The built-in
//! provider offers a fixed set of rule sets and reports how many catalog
//! items each one currently matches.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::database::Item;
use crate::rules::{Operator, Rule, RuleEvaluator, RuleSet, RuleValue};

/// A proposed collection: a name plus the rules that would fill it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSuggestion {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rules: RuleSet,
    /// Catalog items matching `rules` when the suggestion was made
    pub match_count: usize,
}

/// Source of collection suggestions
pub trait SuggestionProvider {
    fn suggest(&self, catalog: &[Item]) -> Vec<CollectionSuggestion>;
}

/// Fixed-rule suggestions
#[derive(Debug, Clone, Default)]
pub struct BuiltinSuggestions {
    evaluator: RuleEvaluator,
    /// Cut-off for "Recently Updated"; that suggestion is skipped when unset
    recent_since: Option<DateTime<Utc>>,
}

impl BuiltinSuggestions {
    pub fn new(evaluator: RuleEvaluator) -> Self {
        Self { evaluator, recent_since: None }
    }

    pub fn with_recent_since(mut self, since: DateTime<Utc>) -> Self {
        self.recent_since = Some(since);
        self
    }

    fn templates(&self) -> Vec<(&'static str, &'static str, &'static str, RuleSet)> {
        let mut templates = vec![
            (
                "high-value-properties",
                "High-Value Properties",
                "Active properties valued over 1,000,000 with strong guest ratings",
                RuleSet::all(vec![
                    rule("hvp-value", "value", Operator::GreaterThan, 1_000_000.0),
                    rule("hvp-category", "category", Operator::In, vec!["Properties"]),
                    rule("hvp-status", "status", Operator::In, vec!["Active"]),
                    rule("hvp-rating", "guestRating", Operator::GreaterThanOrEqual, 4.0),
                ]),
            ),
            (
                "flagged-items",
                "Flagged Items",
                "Items flagged for review",
                RuleSet::all(vec![rule("flagged", "flagged", Operator::Equals, true)]),
            ),
            (
                "needs-attention",
                "Needs Attention",
                "Items under maintenance or inactive",
                RuleSet::all(vec![rule(
                    "attention-status",
                    "status",
                    Operator::In,
                    vec!["Maintenance", "Inactive"],
                )]),
            ),
            (
                "top-rated",
                "Top Rated",
                "Items with a guest rating of 4.5 or more",
                RuleSet::all(vec![rule("top-rating", "guestRating", Operator::GreaterThanOrEqual, 4.5)]),
            ),
        ];

        if let Some(since) = self.recent_since {
            templates.push((
                "recently-updated",
                "Recently Updated",
                "Items changed since the cut-off date",
                RuleSet::all(vec![rule(
                    "recent-updated",
                    "updatedAt",
                    Operator::GreaterThanOrEqual,
                    since.to_rfc3339(),
                )]),
            ));
        }
        templates
    }
}

fn rule(id: &str, field: &str, operator: Operator, value: impl Into<RuleValue>) -> Rule {
    Rule {
        id: id.to_string(),
        ..Rule::new(field, operator, value)
    }
}

impl SuggestionProvider for BuiltinSuggestions {
    fn suggest(&self, catalog: &[Item]) -> Vec<CollectionSuggestion> {
        let suggestions: Vec<CollectionSuggestion> = self
            .templates()
            .into_iter()
            .filter_map(|(id, name, description, rules)| {
                let match_count = self.evaluator.find_matching_items(catalog, &rules).len();
                (match_count > 0).then(|| CollectionSuggestion {
                    id: id.to_string(),
                    name: name.to_string(),
                    description: description.to_string(),
                    rules,
                    match_count,
                })
            })
            .collect();

        debug!(count = suggestions.len(), "suggestions computed");
        suggestions
    }
}
