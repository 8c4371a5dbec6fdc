//! HTTP API module for the compensation rules engine.
//!
//! This module provides the REST API endpoints for evaluating rule sets,
//! simulating populations and running the proration and retro calculators.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{EvaluateRequest, ProrationRequest, RetroRequest, SimulateRequest};
pub use response::{ApiError, EvaluationResponse, HealthResponse, RuleSetsResponse};
pub use state::AppState;
