//! Calculation logic for the compensation rules engine.
//!
//! This module contains the date and money arithmetic the rule evaluator
//! builds on: calendar day counting, currency rounding, proration of an
//! amount over an eligibility window, pay period generation from a pay
//! schedule, and retroactive back-pay broken out by pay period.

mod days;
mod proration;
mod retro;
mod schedule;

pub use days::{DEFAULT_DECIMAL_PLACES, days_between, percent_of, round_amount};
pub use proration::{ProrationOptions, calculate_proration};
pub use retro::{calculate_retro_adjustment, calculate_retro_adjustment_with_precision};
pub use schedule::pay_periods_covering;
