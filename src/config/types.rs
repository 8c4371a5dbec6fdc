//! Configuration types for the compensation rules engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calculation::DEFAULT_DECIMAL_PLACES;
use crate::models::RuleSet;

fn default_decimal_places() -> u32 {
    DEFAULT_DECIMAL_PLACES
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0:3000".to_string()
}

/// Engine-wide settings from `engine.yaml`.
///
/// Only `name` and `version` are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Deployment name reported by the API.
    pub name: String,
    /// Version of the configuration bundle.
    pub version: String,
    /// Precision for currencies with no entry in `currency_decimal_places`.
    #[serde(default = "default_decimal_places")]
    pub default_decimal_places: u32,
    /// Minor units per ISO currency code (e.g. `JPY: 0`).
    #[serde(default)]
    pub currency_decimal_places: BTreeMap<String, u32>,
    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Address the HTTP server listens on.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl EngineSettings {
    /// Decimal places for a currency, falling back to the default.
    ///
    /// Currency codes are matched case-insensitively.
    pub fn decimal_places_for(&self, currency: Option<&str>) -> u32 {
        currency
            .and_then(|code| {
                self.currency_decimal_places
                    .get(&code.to_ascii_uppercase())
                    .copied()
            })
            .unwrap_or(self.default_decimal_places)
    }
}

/// Complete engine configuration.
///
/// Aggregates the settings and every rule set loaded from a configuration
/// directory. Rule sets are keyed by name.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    settings: EngineSettings,
    rule_sets: BTreeMap<String, RuleSet>,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(settings: EngineSettings, rule_sets: Vec<RuleSet>) -> Self {
        let rule_sets = rule_sets
            .into_iter()
            .map(|rule_set| (rule_set.name.clone(), rule_set))
            .collect();
        Self {
            settings,
            rule_sets,
        }
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Returns all rule sets ordered by name.
    pub fn rule_sets(&self) -> &BTreeMap<String, RuleSet> {
        &self.rule_sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> EngineSettings {
        serde_yaml::from_str(
            r#"
name: test
version: "2025.1"
currency_decimal_places:
  JPY: 0
  KWD: 3
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_settings_defaults() {
        let settings = settings();
        assert_eq!(settings.default_decimal_places, 2);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.bind_address, "0.0.0.0:3000");
    }

    #[test]
    fn test_decimal_places_for_currency() {
        let settings = settings();
        assert_eq!(settings.decimal_places_for(Some("JPY")), 0);
        assert_eq!(settings.decimal_places_for(Some("kwd")), 3);
        assert_eq!(settings.decimal_places_for(Some("USD")), 2);
        assert_eq!(settings.decimal_places_for(None), 2);
    }
}
