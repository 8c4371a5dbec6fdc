//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! settings and rule sets from YAML files.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{EngineError, EngineResult};
use crate::models::RuleSet;

use super::types::{EngineConfig, EngineSettings};

/// Loads and provides access to engine configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory and
/// provides lookups of rule sets by name.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml                # Engine settings
/// └── rule_sets/
///     └── annual_cycle_2025.yaml # One rule set per file
/// ```
///
/// # Example
///
/// ```no_run
/// use comp_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
///
/// let rule_set = loader.get_rule_set("annual_cycle_2025").unwrap();
/// println!("{} has {} rules", rule_set.name, rule_set.rules.len());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/default")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `engine.yaml` or the `rule_sets` directory is missing
    /// - Any file contains invalid YAML
    /// - Any rule set fails validation or two files share a rule set name
    ///
    /// # Example
    ///
    /// ```no_run
    /// use comp_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/default")?;
    /// # Ok::<(), comp_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<EngineSettings>(&path.join("engine.yaml"))?;
        let rule_sets = Self::load_rule_sets(&path.join("rule_sets"))?;

        Self::from_parts(settings, rule_sets)
    }

    /// Builds a loader from already-parsed parts, applying the same
    /// validation as [`ConfigLoader::load`].
    pub fn from_parts(settings: EngineSettings, rule_sets: Vec<RuleSet>) -> EngineResult<Self> {
        let mut names = BTreeSet::new();
        for rule_set in &rule_sets {
            rule_set.validate()?;
            if !names.insert(rule_set.name.as_str()) {
                return Err(EngineError::InvalidRuleSet {
                    rule_set: rule_set.name.clone(),
                    message: "rule set name is defined more than once".to_string(),
                });
            }
        }

        Ok(Self {
            config: EngineConfig::new(settings, rule_sets),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads every rule set file in the directory, in file name order.
    fn load_rule_sets(dir: &Path) -> EngineResult<Vec<RuleSet>> {
        let dir_str = dir.display().to_string();

        let entries = fs::read_dir(dir).map_err(|_| EngineError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let path = entry.path();
            if path
                .extension()
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
            {
                paths.push(path);
            }
        }
        paths.sort();

        paths
            .iter()
            .map(|path| Self::load_yaml::<RuleSet>(path))
            .collect()
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &EngineSettings {
        self.config.settings()
    }

    /// Gets a rule set by name.
    ///
    /// # Arguments
    ///
    /// * `name` - The rule set name (e.g., "annual_cycle_2025")
    ///
    /// # Returns
    ///
    /// Returns the rule set if found, or `RuleSetNotFound` error.
    pub fn get_rule_set(&self, name: &str) -> EngineResult<&RuleSet> {
        self.config
            .rule_sets()
            .get(name)
            .ok_or_else(|| EngineError::RuleSetNotFound {
                name: name.to_string(),
            })
    }

    /// Names of all loaded rule sets in sorted order.
    pub fn rule_set_names(&self) -> Vec<&str> {
        self.config.rule_sets().keys().map(String::as_str).collect()
    }

    /// Decimal places for a currency per the engine settings.
    pub fn decimal_places_for(&self, currency: Option<&str>) -> u32 {
        self.settings().decimal_places_for(currency)
    }
}
