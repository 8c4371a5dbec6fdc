//! Core data models for the compensation rules engine.
//!
//! This module contains all the domain models used throughout the engine.

mod adjustment;
mod amounts;
mod decision;
mod employee;
mod field;
mod pay_period;
mod rule;

pub use adjustment::{ProratedAmount, RetroAdjustment, RetroBreakdown};
pub use amounts::{CompTarget, CurrentAmounts, SalaryChange};
pub use decision::{
    ActionOutcome, ActionStatus, AppliedAction, AuditEntry, AuditStatus, BoundKind,
    ConditionResult, ExecuteActionResult, ResolvedCompensation, RuleDecision,
};
pub use employee::EmployeeData;
pub use field::FieldValue;
pub use pay_period::{PayFrequency, PayPeriod, PaySchedule};
pub use rule::{
    ActionKind, ActionType, BoundLimit, BoundParams, CompensationParams, ConditionOperator,
    CustomParams, EligibilityParams, Pattern, ProrationParams, Rule, RuleAction, RuleCondition,
    RuleSet, RuleType, ValueChange,
};
