//! Rule data model
//!
//! A [`Rule`] is one flat `field / operator / value` condition. A [`RuleSet`]
//! is an ordered list of rules joined by a single [`LogicalOperator`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    In,
    NotIn,
    IsEmpty,
    IsNotEmpty,
    /// Any operator name this version does not know; always evaluates to false
    #[serde(other)]
    Unknown,
}

impl Operator {
    /// Wire name of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::GreaterThan => "greater_than",
            Operator::LessThan => "less_than",
            Operator::GreaterThanOrEqual => "greater_than_or_equal",
            Operator::LessThanOrEqual => "less_than_or_equal",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::IsEmpty => "is_empty",
            Operator::IsNotEmpty => "is_not_empty",
            Operator::Unknown => "unknown",
        }
    }

    /// True for `is_empty` / `is_not_empty`, which take no comparison value
    pub fn is_empty_check(&self) -> bool {
        matches!(self, Operator::IsEmpty | Operator::IsNotEmpty)
    }

    /// True for the ordering comparisons (`greater_than` family)
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            Operator::GreaterThan
                | Operator::LessThan
                | Operator::GreaterThanOrEqual
                | Operator::LessThanOrEqual
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison value of a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl RuleValue {
    /// True for an empty string (after trimming) or an empty list
    pub fn is_blank(&self) -> bool {
        match self {
            RuleValue::Text(s) => s.trim().is_empty(),
            RuleValue::List(values) => values.is_empty(),
            _ => false,
        }
    }

    /// String form used by text and membership comparisons
    pub fn to_text(&self) -> String {
        match self {
            RuleValue::Bool(b) => b.to_string(),
            RuleValue::Number(n) => format_number(*n),
            RuleValue::Text(s) => s.clone(),
            RuleValue::List(values) => values.join(","),
        }
    }
}

impl From<&str> for RuleValue {
    fn from(s: &str) -> Self {
        RuleValue::Text(s.to_string())
    }
}

impl From<String> for RuleValue {
    fn from(s: String) -> Self {
        RuleValue::Text(s)
    }
}

impl From<f64> for RuleValue {
    fn from(n: f64) -> Self {
        RuleValue::Number(n)
    }
}

impl From<bool> for RuleValue {
    fn from(b: bool) -> Self {
        RuleValue::Bool(b)
    }
}

impl From<Vec<&str>> for RuleValue {
    fn from(values: Vec<&str>) -> Self {
        RuleValue::List(values.into_iter().map(str::to_string).collect())
    }
}

/// Render a number without a trailing `.0` for whole values
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// A single atomic condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    /// Field path, possibly dotted (`createdBy.name`)
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub operator: Option<Operator>,
    #[serde(default)]
    pub value: Option<RuleValue>,
}

impl Rule {
    /// Create a rule with a generated ID; the field path is trimmed
    pub fn new(field: &str, operator: Operator, value: impl Into<RuleValue>) -> Self {
        Self {
            id: crate::utils::generate_rule_id(),
            field: field.trim().to_string(),
            operator: Some(operator),
            value: Some(value.into()),
        }
    }

    /// Create a value-less rule (`is_empty` / `is_not_empty`)
    pub fn check(field: &str, operator: Operator) -> Self {
        Self {
            id: crate::utils::generate_rule_id(),
            field: field.trim().to_string(),
            operator: Some(operator),
            value: None,
        }
    }
}

/// Combinator joining the rules of a set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
    /// NAND over the whole list: true unless every rule holds
    Not,
}

/// Ordered rules plus one combinator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub operator: LogicalOperator,
    #[serde(default)]
    pub conditions: Vec<Rule>,
}

impl RuleSet {
    /// AND-combined rule set
    pub fn all(conditions: Vec<Rule>) -> Self {
        Self { operator: LogicalOperator::And, conditions }
    }

    /// OR-combined rule set
    pub fn any(conditions: Vec<Rule>) -> Self {
        Self { operator: LogicalOperator::Or, conditions }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }
}
