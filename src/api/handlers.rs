//! HTTP request handlers for the compensation rules engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    ProrationOptions, calculate_proration, calculate_retro_adjustment_with_precision,
    pay_periods_covering,
};
use crate::engine::{evaluate_rule_set, simulate_population};
use crate::error::EngineError;
use crate::models::RuleSet;

use super::request::{EvaluateRequest, ProrationRequest, RetroRequest, SimulateRequest};
use super::response::{
    ApiError, ApiErrorResponse, EvaluationResponse, HealthResponse, RuleSetsResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/evaluate", post(evaluate_handler))
        .route("/simulate", post(simulate_handler))
        .route("/proration", post(proration_handler))
        .route("/retro", post(retro_handler))
        .route("/rule-sets", get(rule_sets_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(error: ApiErrorResponse) -> Response {
    json_response(error.status, error.error)
}

/// Maps a JSON extraction failure to a 400 response.
fn rejection_error(correlation_id: Uuid, rejection: JsonRejection) -> ApiErrorResponse {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's description of the problem
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    ApiErrorResponse::bad_request(error)
}

/// Picks the inline rule set, or looks one up by name.
fn resolve_rule_set(
    state: &AppState,
    inline: Option<RuleSet>,
    name: Option<String>,
) -> Result<RuleSet, ApiErrorResponse> {
    match (inline, name) {
        (Some(rule_set), _) => Ok(rule_set),
        (None, Some(name)) => state
            .config()
            .get_rule_set(&name)
            .cloned()
            .map_err(ApiErrorResponse::from),
        (None, None) => Err(ApiErrorResponse::bad_request(ApiError::missing_rule_set())),
    }
}

/// Handler for POST /evaluate endpoint.
///
/// Evaluates a rule set against one employee and wraps the decision in an
/// envelope carrying the evaluation id and timestamp.
async fn evaluate_handler(
    State(state): State<AppState>,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Response {
    // Generate correlation ID for request tracking
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing evaluation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return error_response(rejection_error(correlation_id, rejection)),
    };

    let rule_set = match resolve_rule_set(&state, request.rule_set, request.rule_set_name) {
        Ok(rule_set) => rule_set,
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err.error.message,
                "Rule set could not be resolved"
            );
            return error_response(err);
        }
    };

    let employee = request.employee;
    let mut context = request.context.with_handlers(state.handlers().clone());
    if context.decimal_places.is_none() {
        context.decimal_places = Some(
            state
                .config()
                .decimal_places_for(employee.currency.as_deref()),
        );
    }

    let start_time = Instant::now();
    match employee
        .validate()
        .and_then(|()| evaluate_rule_set(&rule_set, &employee, &context))
    {
        Ok(decision) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %employee.id,
                rule_set = %rule_set.name,
                rules_fired = decision.fired_rules().len(),
                total_cost_delta = %decision.resolved.total_cost_delta,
                duration_us = start_time.elapsed().as_micros(),
                "Evaluation completed successfully"
            );
            json_response(
                StatusCode::OK,
                EvaluationResponse {
                    evaluation_id: correlation_id,
                    engine_version: env!("CARGO_PKG_VERSION").to_string(),
                    evaluated_at: Utc::now(),
                    decision,
                },
            )
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Evaluation failed"
            );
            error_response(err.into())
        }
    }
}

/// Handler for POST /simulate endpoint.
///
/// The population is evaluated on a blocking worker so large batches do not
/// stall the async runtime.
async fn simulate_handler(
    State(state): State<AppState>,
    payload: Result<Json<SimulateRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing simulation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return error_response(rejection_error(correlation_id, rejection)),
    };

    let rule_set = match resolve_rule_set(&state, request.rule_set, request.rule_set_name) {
        Ok(rule_set) => rule_set,
        Err(err) => return error_response(err),
    };

    let employees = request.employees;
    let mut context = request.context.with_handlers(state.handlers().clone());
    if context.decimal_places.is_none() {
        context.decimal_places = Some(state.config().settings().default_decimal_places);
    }

    let start_time = Instant::now();
    let worker =
        tokio::task::spawn_blocking(move || simulate_population(&rule_set, &employees, &context));

    match worker.await {
        Ok(Ok(summary)) => {
            info!(
                correlation_id = %correlation_id,
                rule_set = %summary.rule_set,
                employees = summary.employees_evaluated,
                total_cost_delta = %summary.total_cost_delta,
                duration_us = start_time.elapsed().as_micros(),
                "Simulation completed successfully"
            );
            json_response(StatusCode::OK, summary)
        }
        Ok(Err(err)) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Simulation failed"
            );
            error_response(err.into())
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "Simulation worker failed"
            );
            error_response(
                EngineError::CalculationError {
                    message: format!("simulation worker failed: {}", err),
                }
                .into(),
            )
        }
    }
}

/// Handler for POST /proration endpoint.
async fn proration_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProrationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return error_response(rejection_error(correlation_id, rejection)),
    };

    let options = ProrationOptions {
        loa_days: request.loa_days,
        transfer_date: request.transfer_date,
        decimal_places: request.decimal_places.unwrap_or_else(|| {
            state
                .config()
                .decimal_places_for(request.employee.currency.as_deref())
        }),
    };

    let result = calculate_proration(
        &request.employee,
        request.base_amount,
        request.period_start,
        request.period_end,
        &options,
    );

    info!(
        correlation_id = %correlation_id,
        employee_id = %request.employee.id,
        eligible_days = result.eligible_days,
        total_days = result.total_days,
        prorated_amount = %result.prorated_amount,
        "Proration completed"
    );
    json_response(StatusCode::OK, result)
}

/// Handler for POST /retro endpoint.
async fn retro_handler(
    State(state): State<AppState>,
    payload: Result<Json<RetroRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return error_response(rejection_error(correlation_id, rejection)),
    };

    let periods = match (request.pay_periods, request.schedule) {
        (Some(periods), _) => periods,
        (None, Some(schedule)) => {
            pay_periods_covering(&schedule, request.effective_date, request.calculation_date)
        }
        (None, None) => {
            warn!(correlation_id = %correlation_id, "Retro request has no pay periods");
            return error_response(ApiErrorResponse::bad_request(
                ApiError::missing_pay_periods(),
            ));
        }
    };

    let decimal_places = request
        .decimal_places
        .unwrap_or(state.config().settings().default_decimal_places);

    let result = calculate_retro_adjustment_with_precision(
        request.old_amount,
        request.new_amount,
        request.effective_date,
        request.calculation_date,
        &periods,
        decimal_places,
    );

    info!(
        correlation_id = %correlation_id,
        periods = result.breakdown.len(),
        total = %result.total,
        "Retro calculation completed"
    );
    json_response(StatusCode::OK, result)
}

/// Handler for GET /rule-sets endpoint.
async fn rule_sets_handler(State(state): State<AppState>) -> Response {
    let rule_sets = state
        .config()
        .rule_set_names()
        .into_iter()
        .map(str::to_string)
        .collect();
    json_response(StatusCode::OK, RuleSetsResponse { rule_sets })
}

/// Handler for GET /health endpoint.
async fn health_handler(State(state): State<AppState>) -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "ok".to_string(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            config_version: state.config().settings().version.clone(),
        },
    )
}
