//! Cycle-level data and extension points available to actions.
//!
//! The executor performs no lookups of its own. Everything an action needs
//! beyond the employee record (salary overrides, the cycle period, the
//! calculation date, caller-registered handlers) is resolved by the caller
//! and passed in through [`EvaluationContext`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::calculation::{DEFAULT_DECIMAL_PLACES, ProrationOptions};
use crate::models::{CompTarget, CurrentAmounts, EmployeeData, FieldValue, PayPeriod, PaySchedule};

/// Pre-resolved cycle data for one evaluation.
///
/// Every field is optional. Actions that need a missing value fail with an
/// explanation rather than guessing.
///
/// # Example
///
/// ```
/// use comp_engine::engine::EvaluationContext;
///
/// let context: EvaluationContext = serde_json::from_str(r#"{
///     "cyclePeriod": {"start_date": "2025-01-01", "end_date": "2026-01-01"},
///     "calculationDate": "2025-06-15",
///     "paySchedule": {"frequency": "monthly", "anchor": "2025-01-01"}
/// }"#).unwrap();
///
/// assert_eq!(context.decimal_places(), 2);
/// assert!(context.handlers.is_empty());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationContext {
    /// Salary to use instead of the employee record's `base_salary`.
    #[serde(default, alias = "currentSalary")]
    pub current_salary: Option<Decimal>,
    /// The cycle period proration actions default to.
    #[serde(default, alias = "cyclePeriod")]
    pub cycle_period: Option<PayPeriod>,
    /// Date the decision is processed; enables retro calculation.
    #[serde(default, alias = "calculationDate")]
    pub calculation_date: Option<NaiveDate>,
    /// Payroll schedule used to break back-pay into pay periods.
    #[serde(default, alias = "paySchedule")]
    pub pay_schedule: Option<PaySchedule>,
    /// Days of unpaid leave inside the cycle period.
    #[serde(default, alias = "loaDays")]
    pub loa_days: i64,
    /// Date the employee transferred into the eligible population.
    #[serde(default, alias = "transferDate")]
    pub transfer_date: Option<NaiveDate>,
    /// Precision of resolved amounts; defaults to two decimal places.
    #[serde(default, alias = "decimalPlaces")]
    pub decimal_places: Option<u32>,
    /// Cycle facts for custom handlers, e.g. department compa-ratio averages.
    #[serde(default)]
    pub facts: BTreeMap<String, FieldValue>,
    /// Caller-registered custom handlers.
    #[serde(skip)]
    pub handlers: HandlerRegistry,
}

impl EvaluationContext {
    /// Replaces the handler registry.
    pub fn with_handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    /// The salary percentage actions apply to: the override if present,
    /// otherwise the employee's base salary.
    pub fn base_salary(&self, employee: &EmployeeData) -> Option<Decimal> {
        self.current_salary.or(employee.base_salary)
    }

    /// Decimal places resolved amounts are rounded to.
    pub fn decimal_places(&self) -> u32 {
        self.decimal_places.unwrap_or(DEFAULT_DECIMAL_PLACES)
    }

    /// Proration options derived from the context.
    pub fn proration_options(&self) -> ProrationOptions {
        ProrationOptions {
            loa_days: self.loa_days,
            transfer_date: self.transfer_date,
            decimal_places: self.decimal_places(),
        }
    }
}

/// Everything a custom handler may read.
#[derive(Debug, Clone, Copy)]
pub struct CustomRequest<'a> {
    /// The employee being evaluated.
    pub employee: &'a EmployeeData,
    /// The action's raw params.
    pub params: &'a Map<String, Value>,
    /// The running amounts, including earlier actions in the same rule.
    pub amounts: &'a CurrentAmounts,
    /// The evaluation context.
    pub context: &'a EvaluationContext,
}

/// What a custom handler produced.
///
/// When both `target` and `amount` are set the amount is written to that
/// component, exactly as a MERIT, BONUS or LTI action would.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomOutput {
    /// Component to write.
    pub target: Option<CompTarget>,
    /// Amount to write.
    pub amount: Option<Decimal>,
    /// Handler-specific detail recorded in the audit trail.
    pub detail: Value,
}

/// A caller-supplied action implementation keyed by `params.customHandler`.
///
/// Handlers must be pure: the same request must produce the same output, or
/// evaluations stop being reproducible.
pub trait CustomHandler: Send + Sync {
    /// Runs the handler. An `Err` fails the action with that message.
    fn handle(&self, request: &CustomRequest<'_>) -> Result<CustomOutput, String>;
}

/// Custom handlers by name.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Arc<dyn CustomHandler>>,
}

impl HandlerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler, replacing any previous handler of the same name.
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn CustomHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    /// Builder form of [`HandlerRegistry::register`].
    pub fn with(mut self, name: impl Into<String>, handler: Arc<dyn CustomHandler>) -> Self {
        self.register(name, handler);
        self
    }

    /// Looks up a handler.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn CustomHandler>> {
        self.handlers.get(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    /// True if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}
