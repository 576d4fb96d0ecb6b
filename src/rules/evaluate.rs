//! Condition and rule set evaluation
//!
//! Evaluation never fails: a value that cannot be parsed, an operator the
//! field kind does not support, or an unknown operator all evaluate to
//! `false`, so an item that cannot be shown to match is treated as
//! non-matching.

use std::borrow::Cow;
use serde_json::Value;
use crate::database::Item;
use crate::utils::{date_millis, parse_date, parse_number};
use super::field::{FieldKind, FieldSchema, asset_schema, get_field_value};
use super::model::{LogicalOperator, Operator, Rule, RuleSet, RuleValue, format_number};

/// Field value after kind resolution
enum Typed<'a> {
    Text(Cow<'a, str>),
    Number(f64),
    Bool(bool),
    List(&'a [Value]),
    Other,
}

/// Evaluates rules against items using a field schema
#[derive(Debug, Clone)]
pub struct RuleEvaluator {
    schema: FieldSchema,
    case_sensitive: bool,
}

impl Default for RuleEvaluator {
    fn default() -> Self {
        Self::new(asset_schema(), false)
    }
}

impl RuleEvaluator {
    pub fn new(schema: FieldSchema, case_sensitive: bool) -> Self {
        Self { schema, case_sensitive }
    }

    /// Same evaluator with a different case sensitivity
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// Evaluate a single rule against an item
    pub fn evaluate(&self, item: &Item, rule: &Rule) -> bool {
        let Some(operator) = rule.operator else {
            return false;
        };

        // Missing field: only is_empty holds
        let Some(field_value) = get_field_value(item, &rule.field) else {
            return operator == Operator::IsEmpty;
        };

        match operator {
            Operator::IsEmpty => return is_empty_value(field_value),
            Operator::IsNotEmpty => return !is_empty_value(field_value),
            Operator::Unknown => return false,
            _ => {}
        }

        if self.schema.is_date(&rule.field) && is_date_comparison(operator) {
            return compare_dates(field_value, operator, rule.value.as_ref());
        }

        let value = rule.value.as_ref();
        match self.resolve(&rule.field, field_value) {
            Typed::Text(text) => self.compare_text(&text, operator, value),
            Typed::Number(n) => compare_number(n, operator, value),
            Typed::Bool(b) => compare_bool(b, operator, value),
            Typed::List(elements) => self.compare_list(elements, operator, value),
            Typed::Other => false,
        }
    }

    /// True if the item satisfies the rule set's combinator
    pub fn matches(&self, item: &Item, rule_set: &RuleSet) -> bool {
        let mut results = rule_set.conditions.iter().map(|rule| self.evaluate(item, rule));
        match rule_set.operator {
            LogicalOperator::And => results.all(|r| r),
            LogicalOperator::Or => results.any(|r| r),
            LogicalOperator::Not => !results.all(|r| r),
        }
    }

    /// Stable filter of `items` by the rule set
    ///
    /// An empty AND set keeps every item.
    pub fn apply_rules<'a>(&self, items: &'a [Item], rule_set: &RuleSet) -> Vec<&'a Item> {
        items.iter().filter(|item| self.matches(item, rule_set)).collect()
    }

    /// Items of the catalog a collection's rules select
    ///
    /// NOTE: unlike [`RuleEvaluator::apply_rules`], an empty rule set selects
    /// nothing here. Sync treats "no rules" as "no matches" so that a
    /// collection without rules never pulls in the whole catalog.
    pub fn find_matching_items<'a>(&self, catalog: &'a [Item], rule_set: &RuleSet) -> Vec<&'a Item> {
        if rule_set.is_empty() {
            return Vec::new();
        }
        catalog.iter().filter(|item| self.matches(item, rule_set)).collect()
    }

    fn resolve<'a>(&self, field: &str, value: &'a Value) -> Typed<'a> {
        match self.schema.declared(field) {
            Some(FieldKind::Text) => match value {
                Value::String(s) => Typed::Text(Cow::Borrowed(s)),
                Value::Number(_) | Value::Bool(_) => Typed::Text(Cow::Owned(value_text(value))),
                _ => Typed::Other,
            },
            Some(FieldKind::Number) => match value {
                Value::Number(n) => n.as_f64().map_or(Typed::Other, Typed::Number),
                Value::String(s) => parse_number(s).map_or(Typed::Other, Typed::Number),
                _ => Typed::Other,
            },
            Some(FieldKind::Boolean) => match value {
                Value::Bool(b) => Typed::Bool(*b),
                Value::String(s) if s == "true" || s == "false" => Typed::Bool(s == "true"),
                _ => Typed::Other,
            },
            Some(FieldKind::List) => match value {
                Value::Array(elements) => Typed::List(elements),
                _ => Typed::Other,
            },
            Some(FieldKind::Date) | None => runtime_type(value),
        }
    }

    fn fold<'a>(&self, s: &'a str) -> Cow<'a, str> {
        if self.case_sensitive {
            Cow::Borrowed(s)
        } else {
            Cow::Owned(s.to_lowercase())
        }
    }

    fn compare_text(&self, text: &str, operator: Operator, value: Option<&RuleValue>) -> bool {
        let Some(value) = value else {
            return false;
        };
        let left = self.fold(text);

        match operator {
            Operator::In | Operator::NotIn => {
                let found = candidates(value).iter().any(|c| self.fold(c) == left);
                if operator == Operator::In { found } else { !found }
            }
            _ => {
                let target = value.to_text();
                let right = self.fold(&target);
                match operator {
                    Operator::Equals => left == right,
                    Operator::NotEquals => left != right,
                    Operator::Contains => left.contains(&*right),
                    Operator::NotContains => !left.contains(&*right),
                    Operator::StartsWith => left.starts_with(&*right),
                    Operator::EndsWith => left.ends_with(&*right),
                    _ => false,
                }
            }
        }
    }

    fn compare_list(&self, elements: &[Value], operator: Operator, value: Option<&RuleValue>) -> bool {
        let Some(value) = value else {
            return false;
        };
        let folded: Vec<String> = elements.iter().map(|e| self.fold(&value_text(e)).into_owned()).collect();

        match operator {
            Operator::Contains | Operator::NotContains => {
                let wanted = candidates(value);
                let found = wanted.iter().any(|w| folded.iter().any(|e| *e == self.fold(w)));
                if operator == Operator::Contains { found } else { !found }
            }
            Operator::In | Operator::NotIn => {
                let wanted = candidates(value);
                let intersects = folded.iter().any(|e| wanted.iter().any(|w| self.fold(w) == e.as_str()));
                if operator == Operator::In { intersects } else { !intersects }
            }
            _ => false,
        }
    }
}

/// Evaluate a single rule with the asset schema
pub fn evaluate_condition(item: &Item, rule: &Rule, case_sensitive: bool) -> bool {
    RuleEvaluator::default().case_sensitive(case_sensitive).evaluate(item, rule)
}

/// Filter items by a rule set with the asset schema; empty AND keeps all
pub fn apply_rules<'a>(items: &'a [Item], rule_set: &RuleSet) -> Vec<&'a Item> {
    RuleEvaluator::default().apply_rules(items, rule_set)
}

/// Catalog items matched by a rule set with the asset schema; empty selects none
pub fn find_matching_items<'a>(catalog: &'a [Item], rule_set: &RuleSet) -> Vec<&'a Item> {
    RuleEvaluator::default().find_matching_items(catalog, rule_set)
}

fn runtime_type(value: &Value) -> Typed<'_> {
    match value {
        Value::String(s) => Typed::Text(Cow::Borrowed(s)),
        Value::Number(n) => n.as_f64().map_or(Typed::Other, Typed::Number),
        Value::Bool(b) => Typed::Bool(*b),
        Value::Array(elements) => Typed::List(elements),
        _ => Typed::Other,
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Array(elements) => elements.is_empty(),
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Rule value as a candidate set: a list, or a one-element set for scalars
fn candidates(value: &RuleValue) -> Vec<String> {
    match value {
        RuleValue::List(values) => values.clone(),
        scalar => vec![scalar.to_text()],
    }
}

fn rule_number(value: &RuleValue) -> Option<f64> {
    match value {
        RuleValue::Number(n) => Some(*n),
        RuleValue::Text(s) => parse_number(s),
        _ => None,
    }
}

fn compare_number(n: f64, operator: Operator, value: Option<&RuleValue>) -> bool {
    let Some(value) = value else {
        return false;
    };

    if matches!(operator, Operator::In | Operator::NotIn) {
        let parsed: Vec<f64> = match value {
            RuleValue::List(values) => values.iter().filter_map(|v| parse_number(v)).collect(),
            scalar => rule_number(scalar).into_iter().collect(),
        };
        if parsed.is_empty() {
            return false;
        }
        let found = parsed.contains(&n);
        return if operator == Operator::In { found } else { !found };
    }

    let Some(target) = rule_number(value) else {
        return false;
    };
    match operator {
        Operator::Equals => n == target,
        Operator::NotEquals => n != target,
        Operator::GreaterThan => n > target,
        Operator::LessThan => n < target,
        Operator::GreaterThanOrEqual => n >= target,
        Operator::LessThanOrEqual => n <= target,
        _ => false,
    }
}

fn compare_bool(b: bool, operator: Operator, value: Option<&RuleValue>) -> bool {
    let target = match value {
        Some(RuleValue::Bool(v)) => *v,
        Some(RuleValue::Text(s)) => s == "true",
        _ => false,
    };
    match operator {
        Operator::Equals => b == target,
        Operator::NotEquals => b != target,
        _ => false,
    }
}

fn is_date_comparison(operator: Operator) -> bool {
    matches!(operator, Operator::Equals | Operator::NotEquals) || operator.is_ordering()
}

fn compare_dates(field_value: &Value, operator: Operator, value: Option<&RuleValue>) -> bool {
    let Some(left) = date_millis(field_value) else {
        return false;
    };
    let right = match value {
        Some(RuleValue::Text(s)) => parse_date(s).map(|dt| dt.timestamp_millis()),
        Some(RuleValue::Number(n)) => Some(*n as i64),
        _ => None,
    };
    let Some(right) = right else {
        return false;
    };

    match operator {
        Operator::Equals => left == right,
        Operator::NotEquals => left != right,
        Operator::GreaterThan => left > right,
        Operator::LessThan => left < right,
        Operator::GreaterThanOrEqual => left >= right,
        Operator::LessThanOrEqual => left <= right,
        _ => false,
    }
}
