//! Response types for the compensation rules engine API.
//!
//! This module defines the success envelopes, the error response
//! structures and the mapping from [`EngineError`] to HTTP errors.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::RuleDecision;

/// Response body for the `/evaluate` endpoint.
///
/// The identifier and timestamp live on the envelope so the decision itself
/// stays reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResponse {
    /// Unique identifier for this evaluation.
    pub evaluation_id: Uuid,
    /// Version of the engine that produced the decision.
    pub engine_version: String,
    /// When the evaluation ran.
    pub evaluated_at: DateTime<Utc>,
    /// The decision.
    pub decision: RuleDecision,
}

/// Response body for the `/rule-sets` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSetsResponse {
    /// Names of the loaded rule sets in sorted order.
    pub rule_sets: Vec<String>,
}

/// Response body for the `/health` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` when the server is answering.
    pub status: String,
    /// Version of the engine binary.
    pub engine_version: String,
    /// Version of the loaded configuration bundle.
    pub config_version: String,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates the error for a request naming no rule set.
    pub fn missing_rule_set() -> Self {
        Self::with_details(
            "VALIDATION_ERROR",
            "missing field: rule_set or rule_set_name",
            "Provide an inline rule set or the name of a loaded one",
        )
    }

    /// Creates the error for a retro request with no pay periods.
    pub fn missing_pay_periods() -> Self {
        Self::with_details(
            "VALIDATION_ERROR",
            "missing field: pay_periods or schedule",
            "Provide explicit pay periods or a schedule to generate them from",
        )
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response with the given body.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            EngineError::RuleSetNotFound { name } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::with_details(
                    "RULE_SET_NOT_FOUND",
                    format!("Rule set not found: {}", name),
                    format!("No rule set named '{}' is loaded by this engine", name),
                ),
            },
            EngineError::InvalidRuleSet { rule_set, message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_RULE_SET",
                    format!("Invalid rule set '{}': {}", rule_set, message),
                    "The rule set is structurally invalid and cannot be evaluated",
                ),
            },
            EngineError::InvalidEmployee { field, message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_EMPLOYEE",
                    format!("Invalid employee field '{}': {}", field, message),
                    "The employee data contains invalid information",
                ),
            },
            EngineError::CalculationError { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CALCULATION_ERROR",
                    "Calculation failed",
                    message,
                ),
            },
        }
    }
}
