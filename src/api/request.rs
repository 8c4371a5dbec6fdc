//! Request types for the compensation rules engine API.
//!
//! This module defines the JSON request structures for each endpoint.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::EvaluationContext;
use crate::models::{EmployeeData, PayPeriod, PaySchedule, RuleSet};

/// Request body for the `/evaluate` endpoint.
///
/// Either an inline `rule_set` or the name of a loaded one must be given.
/// An inline rule set wins when both are present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    /// Inline rule set.
    #[serde(default, alias = "ruleSet", skip_serializing_if = "Option::is_none")]
    pub rule_set: Option<RuleSet>,
    /// Name of a rule set loaded from configuration.
    #[serde(default, alias = "ruleSetName", skip_serializing_if = "Option::is_none")]
    pub rule_set_name: Option<String>,
    /// The employee to evaluate.
    pub employee: EmployeeData,
    /// Cycle data for the evaluation.
    #[serde(default)]
    pub context: EvaluationContext,
}

/// Request body for the `/simulate` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateRequest {
    /// Inline rule set.
    #[serde(default, alias = "ruleSet", skip_serializing_if = "Option::is_none")]
    pub rule_set: Option<RuleSet>,
    /// Name of a rule set loaded from configuration.
    #[serde(default, alias = "ruleSetName", skip_serializing_if = "Option::is_none")]
    pub rule_set_name: Option<String>,
    /// The population to evaluate.
    pub employees: Vec<EmployeeData>,
    /// Cycle data shared by every evaluation.
    #[serde(default)]
    pub context: EvaluationContext,
}

/// Request body for the `/proration` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProrationRequest {
    /// Supplies hire and termination dates.
    pub employee: EmployeeData,
    /// The full-period amount.
    #[serde(alias = "baseAmount")]
    pub base_amount: Decimal,
    /// First day of the period.
    #[serde(alias = "periodStart")]
    pub period_start: NaiveDate,
    /// First day after the period.
    #[serde(alias = "periodEnd")]
    pub period_end: NaiveDate,
    /// Days of unpaid leave inside the period.
    #[serde(default, alias = "loaDays")]
    pub loa_days: i64,
    /// Date the employee transferred into the eligible population.
    #[serde(default, alias = "transferDate")]
    pub transfer_date: Option<NaiveDate>,
    /// Rounding precision; defaults to the employee's currency.
    #[serde(default, alias = "decimalPlaces")]
    pub decimal_places: Option<u32>,
}

/// Request body for the `/retro` endpoint.
///
/// Pay periods are taken from `pay_periods` when given, otherwise generated
/// from `schedule` over the retro window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetroRequest {
    /// Pay per period under the old rate.
    #[serde(alias = "oldAmount")]
    pub old_amount: Decimal,
    /// Pay per period under the new rate.
    #[serde(alias = "newAmount")]
    pub new_amount: Decimal,
    /// First day the new rate applies.
    #[serde(alias = "effectiveDate")]
    pub effective_date: NaiveDate,
    /// Date the change is processed.
    #[serde(alias = "calculationDate")]
    pub calculation_date: NaiveDate,
    /// Explicit pay periods.
    #[serde(default, alias = "payPeriods")]
    pub pay_periods: Option<Vec<PayPeriod>>,
    /// Schedule to generate pay periods from.
    #[serde(default)]
    pub schedule: Option<PaySchedule>,
    /// Rounding precision; defaults to the configured default.
    #[serde(default, alias = "decimalPlaces")]
    pub decimal_places: Option<u32>,
}
