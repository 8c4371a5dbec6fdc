//! Error types for the compensation rules engine.
//!
//! Only structural problems surface as errors. Condition mismatches, failed
//! actions and invalid date ranges are recorded as data in the decision
//! rather than returned through this type.

use thiserror::Error;

/// The main error type for the compensation rules engine.
///
/// # Example
///
/// ```
/// use comp_engine::error::EngineError;
///
/// let error = EngineError::RuleSetNotFound {
///     name: "annual_cycle_2025".to_string(),
/// };
/// assert_eq!(error.to_string(), "Rule set not found: annual_cycle_2025");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No rule set with the requested name is loaded.
    #[error("Rule set not found: {name}")]
    RuleSetNotFound {
        /// The requested rule set name.
        name: String,
    },

    /// A rule set is structurally invalid and cannot be evaluated.
    #[error("Invalid rule set '{rule_set}': {message}")]
    InvalidRuleSet {
        /// The name of the offending rule set.
        rule_set: String,
        /// A description of the structural problem.
        message: String,
    },

    /// An employee record was invalid or contained inconsistent data.
    #[error("Invalid employee field '{field}': {message}")]
    InvalidEmployee {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/engine.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/engine.yaml"
        );
    }

    #[test]
    fn test_config_parse_error_displays_path_and_message() {
        let error = EngineError::ConfigParseError {
            path: "/config/rule_sets/bad.yaml".to_string(),
            message: "invalid YAML syntax".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to parse configuration file '/config/rule_sets/bad.yaml': invalid YAML syntax"
        );
    }

    #[test]
    fn test_invalid_rule_set_displays_name_and_message() {
        let error = EngineError::InvalidRuleSet {
            rule_set: "cycle".to_string(),
            message: "duplicate rule name 'merit'".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid rule set 'cycle': duplicate rule name 'merit'"
        );
    }

    #[test]
    fn test_invalid_employee_displays_field_and_message() {
        let error = EngineError::InvalidEmployee {
            field: "id".to_string(),
            message: "must not be empty".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid employee field 'id': must not be empty"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn lookup() -> EngineResult<()> {
            Err(EngineError::RuleSetNotFound {
                name: "missing".to_string(),
            })
        }

        fn propagates() -> EngineResult<()> {
            lookup()?;
            Ok(())
        }

        assert!(matches!(
            propagates(),
            Err(EngineError::RuleSetNotFound { .. })
        ));
    }
}
