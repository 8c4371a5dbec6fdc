//! Decision and audit models produced by a rule set evaluation.
//!
//! A [`RuleDecision`] holds three views of one evaluation: the ordered list of
//! actions that took effect, the resolved compensation values after conflict
//! resolution, and an audit entry for every rule that was evaluated.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ActionType, CompTarget, FieldValue, ProratedAmount, RetroAdjustment, RuleType};

/// The outcome of testing one condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionResult {
    /// The field that was tested.
    pub field: String,
    /// The operator name.
    pub operator: String,
    /// The condition's operand.
    pub expected: Value,
    /// The resolved field value; `None` when the field is absent.
    pub actual: Option<FieldValue>,
    /// Whether the condition passed.
    pub passed: bool,
    /// Why the condition failed, when it did not fail on value alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Whether a CAP or FLOOR produced a bounded outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundKind {
    /// Upper bound.
    Cap,
    /// Lower bound.
    Floor,
}

/// The realized effect of one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// A MERIT, BONUS or LTI amount.
    Compensation {
        /// Component written.
        target: CompTarget,
        /// The base the percentage was applied to, for percentage changes.
        basis: Option<Decimal>,
        /// The increase or payout.
        amount: Decimal,
        /// Base plus increase for merit; the payout itself otherwise.
        new_value: Decimal,
        /// Back-pay owed for a retroactive merit change.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        retro: Option<RetroAdjustment>,
    },
    /// A component scaled by the eligible share of a period.
    Prorated {
        /// Component prorated.
        target: CompTarget,
        /// Amount before proration.
        original: Decimal,
        /// Proration detail; `prorated_amount` is the new component value.
        proration: ProratedAmount,
    },
    /// A component clamped by CAP or FLOOR.
    Bounded {
        /// Component clamped.
        target: CompTarget,
        /// Cap or floor.
        bound: BoundKind,
        /// The bound as an amount.
        limit: Decimal,
        /// Value before clamping; `None` when the component was never set.
        before: Option<Decimal>,
        /// Value after clamping; `None` when the component was never set.
        after: Option<Decimal>,
        /// Whether clamping changed the value.
        adjusted: bool,
    },
    /// An eligibility determination.
    Eligibility {
        /// Whether the employee is eligible.
        eligible: bool,
        /// Why.
        reason: String,
    },
    /// The result of a caller-supplied handler.
    Custom {
        /// Registry key of the handler.
        handler: String,
        /// Component written, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<CompTarget>,
        /// Amount written to `target`, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amount: Option<Decimal>,
        /// Handler-specific detail.
        #[serde(default)]
        detail: Value,
    },
}

/// Execution status of one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// The action produced an outcome.
    Succeeded,
    /// The action could not run; its rule contributes nothing.
    Failed,
    /// The action was skipped because the employee is ineligible.
    Suppressed,
    /// The action never ran because an earlier action in its rule failed.
    Skipped,
}

/// The result of executing one action. Failures are data, not errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteActionResult {
    /// The action's type tag as written.
    pub action_type: String,
    /// Execution status.
    pub status: ActionStatus,
    /// The outcome, when the action succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ActionOutcome>,
    /// Why the action failed, was suppressed or was skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecuteActionResult {
    /// A successful result.
    pub fn succeeded(action_type: impl Into<String>, outcome: ActionOutcome) -> Self {
        Self {
            action_type: action_type.into(),
            status: ActionStatus::Succeeded,
            value: Some(outcome),
            error: None,
        }
    }

    /// A failed result.
    pub fn failed(action_type: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            status: ActionStatus::Failed,
            value: None,
            error: Some(error.into()),
        }
    }

    /// A result for an action skipped on an ineligible employee.
    pub fn suppressed(action_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            status: ActionStatus::Suppressed,
            value: None,
            error: Some(reason.into()),
        }
    }

    /// A result for an action left unexecuted because its rule failed.
    pub fn skipped(action_type: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            status: ActionStatus::Skipped,
            value: None,
            error: Some(reason.into()),
        }
    }

    /// True if the action produced an outcome.
    pub fn success(&self) -> bool {
        self.status == ActionStatus::Succeeded
    }
}

/// An action that took effect, tagged with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedAction {
    /// Name of the producing rule.
    pub rule_name: String,
    /// Priority of the producing rule.
    pub priority: i32,
    /// The action's type.
    pub action_type: ActionType,
    /// What the action did.
    pub outcome: ActionOutcome,
}

/// What happened to a rule during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    /// All conditions passed and every action ran or was suppressed.
    Fired,
    /// All conditions passed but an action failed; the rule had no effect.
    Failed,
    /// A condition failed.
    Skipped,
}

/// The audit record for one evaluated rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// 1-based position in evaluation order.
    pub sequence: u32,
    /// Rule name.
    pub rule_name: String,
    /// Rule classification.
    pub rule_type: RuleType,
    /// Rule priority.
    pub priority: i32,
    /// Outcome.
    pub status: AuditStatus,
    /// Human-readable explanation of the outcome.
    pub reason: String,
    /// Every condition result, in declaration order.
    pub conditions: Vec<ConditionResult>,
    /// Every action result, in declaration order. Empty for skipped rules.
    pub actions: Vec<ExecuteActionResult>,
}

/// Final compensation values after conflict resolution, rounded to the
/// currency's minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCompensation {
    /// Whether the employee is eligible for any award this cycle.
    pub eligible: bool,
    /// Reason given by the first rule that made the employee ineligible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ineligibility_reason: Option<String>,
    /// Currency of every amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Base salary before the cycle.
    pub base_salary: Option<Decimal>,
    /// Merit increase amount.
    pub merit_increase: Decimal,
    /// Merit increase as a percent of base salary.
    pub merit_percentage: Option<Decimal>,
    /// Base salary after the merit increase.
    pub new_base_salary: Option<Decimal>,
    /// Bonus payout.
    pub bonus: Decimal,
    /// Long-term incentive grant value.
    pub lti: Decimal,
    /// Back-pay owed for a retroactive merit increase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retro_adjustment: Option<RetroAdjustment>,
    /// `merit_increase + bonus + lti`.
    pub total_cost_delta: Decimal,
}

/// The complete result of evaluating one rule set against one employee.
///
/// Decisions contain no timestamps or generated ids, so evaluating the same
/// inputs twice yields identical serialized output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDecision {
    /// The employee evaluated.
    pub employee_id: String,
    /// Name of the rule set.
    pub rule_set: String,
    /// Effective date of the rule set.
    pub effective_date: NaiveDate,
    /// Actions that took effect, in evaluation order.
    pub applied_actions: Vec<AppliedAction>,
    /// Values after conflict resolution.
    pub resolved: ResolvedCompensation,
    /// One entry per evaluated rule, in evaluation order.
    pub audit: Vec<AuditEntry>,
}

impl RuleDecision {
    /// Names of rules that fired, in evaluation order.
    pub fn fired_rules(&self) -> Vec<&str> {
        self.audit
            .iter()
            .filter(|entry| entry.status == AuditStatus::Fired)
            .map(|entry| entry.rule_name.as_str())
            .collect()
    }

    /// The audit entry for a rule.
    pub fn audit_for(&self, rule_name: &str) -> Option<&AuditEntry> {
        self.audit.iter().find(|entry| entry.rule_name == rule_name)
    }
}
