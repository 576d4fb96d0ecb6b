//! Store configuration

use serde::{Deserialize, Serialize};
use crate::error::{CollectionError, Result};
use crate::rules::{FieldSchema, RuleEvaluator, ValidationConfig, asset_schema};

/// Settings for a [`crate::CollectionStore`]
///
/// Every field has a default, so a config document only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Rule validation limits and allow-lists
    pub validation: ValidationConfig,
    /// Compare strings case-sensitively
    pub case_sensitive: bool,
    /// Auto-sync polling interval in seconds
    pub sync_interval_secs: u64,
    /// User recorded when none is given
    pub default_user: String,
    /// Field kinds; `None` uses the standard asset schema
    pub schema: Option<FieldSchema>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            validation: ValidationConfig::default(),
            case_sensitive: false,
            sync_interval_secs: crate::DEFAULT_SYNC_INTERVAL_SECS,
            default_user: crate::SYSTEM_USER.to_string(),
            schema: None,
        }
    }
}

impl StoreConfig {
    /// Parse a JSON config document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: StoreConfig = serde_json::from_str(json)
            .map_err(|e| CollectionError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot bound
    pub fn validate(&self) -> Result<()> {
        if !(1..=crate::MAX_SYNC_INTERVAL_SECS).contains(&self.sync_interval_secs) {
            return Err(CollectionError::ConfigError(format!(
                "syncIntervalSecs must be between 1 and {}",
                crate::MAX_SYNC_INTERVAL_SECS
            )));
        }
        Ok(())
    }

    /// Evaluator matching this configuration
    pub fn evaluator(&self) -> RuleEvaluator {
        let schema = self.schema.clone().unwrap_or_else(asset_schema);
        RuleEvaluator::new(schema, self.case_sensitive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Operator;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.sync_interval_secs, 30);
        assert_eq!(config.validation.max_conditions, 10);
        assert!(!config.case_sensitive);
        assert_eq!(config.default_user, "system");
    }

    #[test]
    fn test_from_json_partial() {
        let config = StoreConfig::from_json(
            r#"{"caseSensitive": true, "validation": {"maxConditions": 3, "allowedOperators": ["equals", "in"]}}"#,
        )
        .unwrap();
        assert!(config.case_sensitive);
        assert_eq!(config.validation.max_conditions, 3);
        assert_eq!(config.validation.allowed_operators, vec![Operator::Equals, Operator::In]);
        // untouched keys keep defaults
        assert_eq!(config.sync_interval_secs, 30);
        assert!(config.validation.numeric_fields.contains(&"value".to_string()));
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(StoreConfig::from_json("{oops"), Err(CollectionError::ConfigError(_))));
        assert!(matches!(
            StoreConfig::from_json(r#"{"syncIntervalSecs": 0}"#),
            Err(CollectionError::ConfigError(_))
        ));
    }

    #[test]
    fn test_from_json_interval_too_large() {
        for json in [
            r#"{"syncIntervalSecs": 604801}"#,
            r#"{"syncIntervalSecs": 10000000000000000}"#,
            r#"{"syncIntervalSecs": 18446744073709551615}"#,
        ] {
            assert!(matches!(StoreConfig::from_json(json), Err(CollectionError::ConfigError(_))));
        }
        assert!(StoreConfig::from_json(r#"{"syncIntervalSecs": 604800}"#).is_ok());
    }
}
