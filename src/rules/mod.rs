//! Rule engine
//!
//! Flat field/operator/value rules, their evaluation against items, and
//! static validation of rule lists.

pub mod model;
pub mod field;
pub mod evaluate;
pub mod validate;

pub use model::{LogicalOperator, Operator, Rule, RuleSet, RuleValue};
pub use field::{FieldKind, FieldSchema, asset_schema, get_field_value};
pub use evaluate::{RuleEvaluator, apply_rules, evaluate_condition, find_matching_items};
pub use validate::{ValidationConfig, ValidationError, ValidationResult, ValidationWarning, validate_rules};
