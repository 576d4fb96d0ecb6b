//! Static validation of rule lists
//!
//! Errors block saving a rule set; warnings are advisory only.

use serde::{Deserialize, Serialize};
use crate::utils::parse_number;
use super::field::{FieldKind, asset_schema};
use super::model::{Operator, Rule, RuleValue};

/// Limits and allow-lists applied by [`validate_rules`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationConfig {
    /// Maximum number of rules in one set
    pub max_conditions: usize,
    /// Fields rules may reference; empty means any field
    pub allowed_fields: Vec<String>,
    /// Operators rules may use; empty means any operator
    pub allowed_operators: Vec<Operator>,
    /// Fields known to hold numbers; defaults to the numeric fields of [`asset_schema`]
    pub numeric_fields: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_conditions: crate::DEFAULT_MAX_CONDITIONS,
            allowed_fields: Vec::new(),
            allowed_operators: Vec::new(),
            numeric_fields: asset_schema().fields_of_kind(FieldKind::Number),
        }
    }
}

/// A problem that blocks saving
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Rule the error belongs to; `None` for set-level errors
    pub rule_id: Option<String>,
    /// Which part is wrong: `field`, `operator`, `value` or `conditions`
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(rule_id: Option<&str>, field: &str, message: &str) -> Self {
        Self {
            rule_id: rule_id.map(str::to_string),
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// An advisory finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationWarning {
    pub rule_id: Option<String>,
    pub field: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(rule_id: Option<&str>, field: &str, message: &str) -> Self {
        Self {
            rule_id: rule_id.map(str::to_string),
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Outcome of a validation pass
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Build a result; `valid` is derived from `errors`
    pub fn from_parts(errors: Vec<ValidationError>, warnings: Vec<ValidationWarning>) -> Self {
        Self { valid: errors.is_empty(), errors, warnings }
    }
}

/// Check a rule list for structural errors and data-quality warnings
pub fn validate_rules(rules: &[Rule], config: &ValidationConfig) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if rules.len() > config.max_conditions {
        errors.push(ValidationError::new(
            None,
            "conditions",
            &format!("Too many conditions: {} (maximum {})", rules.len(), config.max_conditions),
        ));
    }

    for rule in rules {
        let id = Some(rule.id.as_str());
        let field = rule.field.trim();

        if field.is_empty() {
            errors.push(ValidationError::new(id, "field", "Field is required"));
        } else if field != rule.field {
            // lookups use the path as written, so padding would never match
            errors.push(ValidationError::new(
                id,
                "field",
                &format!("Field '{}' has leading or trailing whitespace", rule.field),
            ));
        } else if !config.allowed_fields.is_empty() && !config.allowed_fields.iter().any(|f| f == field) {
            errors.push(ValidationError::new(id, "field", &format!("Field '{}' is not allowed", field)));
        }

        let Some(operator) = rule.operator else {
            errors.push(ValidationError::new(id, "operator", "Operator is required"));
            continue;
        };

        if !config.allowed_operators.is_empty() && !config.allowed_operators.contains(&operator) {
            errors.push(ValidationError::new(
                id,
                "operator",
                &format!("Operator '{}' is not allowed", operator),
            ));
        }

        if operator == Operator::Unknown {
            warnings.push(ValidationWarning::new(id, "operator", "Unknown operator; the rule never matches"));
            continue;
        }

        if operator.is_empty_check() {
            continue;
        }

        if rule.value.as_ref().is_none_or(RuleValue::is_blank) {
            warnings.push(ValidationWarning::new(id, "value", "Value is empty"));
        }

        if field.is_empty() {
            continue;
        }

        let numeric_field = config.numeric_fields.iter().any(|f| f == field);

        if operator.is_ordering() && !numeric_field {
            warnings.push(ValidationWarning::new(
                id,
                "operator",
                &format!("Operator '{}' is intended for numeric fields", operator),
            ));
        }

        if numeric_field
            && let Some(RuleValue::Text(text)) = &rule.value
            && !text.trim().is_empty()
            && parse_number(text).is_none()
        {
            warnings.push(ValidationWarning::new(
                id,
                "value",
                &format!("Value '{}' is not a number", text),
            ));
        }
    }

    ValidationResult::from_parts(errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, field: &str, operator: Option<Operator>, value: Option<RuleValue>) -> Rule {
        Rule { id: id.to_string(), field: field.to_string(), operator, value }
    }

    #[test]
    fn test_valid_rules() {
        let rules = vec![
            rule("r1", "value", Some(Operator::GreaterThan), Some(RuleValue::Number(1000.0))),
            rule("r2", "status", Some(Operator::Equals), Some("Active".into())),
        ];
        let result = validate_rules(&rules, &ValidationConfig::default());
        assert!(result.valid);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_field_is_single_error() {
        let rules = vec![rule("r1", "", Some(Operator::Equals), Some("x".into()))];
        let result = validate_rules(&rules, &ValidationConfig::default());
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "field");
        assert_eq!(result.errors[0].rule_id.as_deref(), Some("r1"));
    }

    #[test]
    fn test_missing_operator() {
        let rules = vec![rule("r1", "name", None, Some("x".into()))];
        let result = validate_rules(&rules, &ValidationConfig::default());
        assert!(!result.valid);
        assert_eq!(result.errors[0].field, "operator");
    }

    #[test]
    fn test_too_many_conditions() {
        let config = ValidationConfig { max_conditions: 2, ..Default::default() };
        let rules: Vec<Rule> = (0..3)
            .map(|i| rule(&format!("r{}", i), "name", Some(Operator::Contains), Some("a".into())))
            .collect();
        let result = validate_rules(&rules, &config);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "conditions");
        assert!(result.errors[0].rule_id.is_none());
    }

    #[test]
    fn test_allow_lists() {
        let config = ValidationConfig {
            allowed_fields: vec!["name".to_string()],
            allowed_operators: vec![Operator::Equals],
            ..Default::default()
        };
        let rules = vec![
            rule("r1", "name", Some(Operator::Equals), Some("a".into())),
            rule("r2", "status", Some(Operator::Equals), Some("a".into())),
            rule("r3", "name", Some(Operator::Contains), Some("a".into())),
        ];
        let result = validate_rules(&rules, &config);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].rule_id.as_deref(), Some("r2"));
        assert_eq!(result.errors[1].rule_id.as_deref(), Some("r3"));
    }

    #[test]
    fn test_empty_value_warning() {
        let rules = vec![
            rule("r1", "name", Some(Operator::Equals), None),
            rule("r2", "name", Some(Operator::Equals), Some("".into())),
            rule("r3", "name", Some(Operator::IsEmpty), None),
        ];
        let result = validate_rules(&rules, &ValidationConfig::default());
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings.iter().all(|w| w.field == "value"));
    }

    #[test]
    fn test_ordering_on_non_numeric_field_warns() {
        let rules = vec![rule("r1", "name", Some(Operator::GreaterThan), Some("m".into()))];
        let result = validate_rules(&rules, &ValidationConfig::default());
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].field, "operator");
    }

    #[test]
    fn test_non_numeric_value_on_numeric_field_warns() {
        let rules = vec![rule("r1", "value", Some(Operator::Equals), Some("a lot".into()))];
        let result = validate_rules(&rules, &ValidationConfig::default());
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].message.contains("not a number"));
    }

    #[test]
    fn test_padded_field_is_error() {
        let config = ValidationConfig { allowed_fields: vec!["status".to_string()], ..Default::default() };
        let rules = vec![rule("r1", "status ", Some(Operator::Equals), Some("Active".into()))];
        let result = validate_rules(&rules, &config);
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].field, "field");
        assert!(result.errors[0].message.contains("whitespace"));
    }

    #[test]
    fn test_constructor_trims_field() {
        let config = ValidationConfig { allowed_fields: vec!["status".to_string()], ..Default::default() };
        let padded = Rule::new(" status ", Operator::Equals, "Active");
        assert_eq!(padded.field, "status");
        assert!(validate_rules(&[padded], &config).valid);
    }

    #[test]
    fn test_unknown_operator_warns() {
        let rules = vec![rule("r1", "name", Some(Operator::Unknown), Some("x".into()))];
        let result = validate_rules(&rules, &ValidationConfig::default());
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].field, "operator");
    }

    #[test]
    fn test_numeric_fields_follow_asset_schema() {
        let config = ValidationConfig::default();
        let schema = asset_schema();
        assert!(!config.numeric_fields.is_empty());
        assert!(config.numeric_fields.iter().all(|f| schema.is_numeric(f)));
        for field in ["value", "guestRating", "internalRating", "price", "quantity", "rating", "order"] {
            assert!(config.numeric_fields.iter().any(|f| f == field), "{} missing", field);
        }
    }

    #[test]
    fn test_validation_is_repeatable() {
        let rules = vec![
            rule("r1", "", None, None),
            rule("r2", "name", Some(Operator::LessThan), Some("".into())),
        ];
        let config = ValidationConfig::default();
        assert_eq!(validate_rules(&rules, &config), validate_rules(&rules, &config));
    }
}
