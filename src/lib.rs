//! Deterministic compensation rules engine.
//!
//! This crate evaluates prioritized, condition-gated rule sets against
//! employee records to produce auditable compensation decisions (merit,
//! bonus and LTI awards, eligibility, caps and floors), and provides the
//! proration and retro back-pay calculators those decisions rely on.
//!
//! - [`engine`] evaluates rule sets and simulates populations.
//! - [`calculation`] holds the proration, retro and pay schedule calculators.
//! - [`models`] defines rules, employee records and decisions.
//! - [`config`] loads engine settings and rule sets from YAML.
//! - [`api`] exposes everything over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
