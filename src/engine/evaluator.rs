//! Rule set evaluation.
//!
//! Evaluation runs in three phases:
//!
//! 1. Enabled rules run in ascending priority order (ties keep declaration
//!    order). A rule whose conditions all pass executes its actions against a
//!    scratch copy of the running amounts; if any action fails, the scratch
//!    copy is discarded and the rule contributes nothing. CAP and FLOOR
//!    actions have their limits checked but are deferred.
//! 2. Deferred CAP and FLOOR actions run in the order they were deferred,
//!    each narrowing the result of the previous one.
//! 3. Amounts are resolved: an ineligible employee has every component
//!    zeroed, and amounts are rounded to the currency's minor units.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use super::actions::{apply_outcome, bound_limit, execute_action, merit_retro};
use super::conditions::evaluate_condition;
use super::context::EvaluationContext;
use crate::calculation::round_amount;
use crate::error::EngineResult;
use crate::models::{
    ActionKind, ActionOutcome, AppliedAction, AuditEntry, AuditStatus, CompTarget,
    ConditionResult, CurrentAmounts, EmployeeData, ExecuteActionResult, ResolvedCompensation,
    Rule, RuleAction, RuleDecision, RuleSet, SalaryChange,
};

const DEFERRED: &str = "deferred until value actions complete";
const NOT_RUN: &str = "not run: an earlier action in the rule failed";
const INELIGIBLE: &str = "suppressed: employee is ineligible";

/// A CAP or FLOOR waiting for phase two.
struct PendingBound<'r> {
    audit_index: usize,
    action_index: usize,
    rule: &'r Rule,
    action: &'r RuleAction,
}

/// Everything committed so far.
struct EvaluationState<'r> {
    amounts: CurrentAmounts,
    ineligibility: Option<String>,
    merit_effective_date: Option<NaiveDate>,
    applied: Vec<AppliedAction>,
    pending_bounds: Vec<PendingBound<'r>>,
}

/// Evaluates a rule set against one employee.
///
/// # Arguments
///
/// * `rule_set` - The rules to apply
/// * `employee` - The employee record; never modified
/// * `context` - Pre-resolved cycle data and custom handlers
///
/// # Returns
///
/// A [`RuleDecision`] with the applied actions, resolved compensation and one
/// audit entry per enabled rule. Failing conditions and actions are recorded
/// in the audit trail rather than returned as errors.
///
/// # Errors
///
/// Returns [`InvalidRuleSet`](crate::error::EngineError::InvalidRuleSet) when
/// the rule set has an empty name or empty or duplicate rule names. Employee
/// data is never rejected here; callers that require an id check
/// [`EmployeeData::validate`] first.
///
/// # Example
///
/// ```
/// use comp_engine::engine::{EvaluationContext, evaluate_rule_set};
/// use comp_engine::models::{EmployeeData, RuleSet};
/// use rust_decimal::Decimal;
///
/// let rule_set: RuleSet = serde_json::from_str(r#"{
///     "name": "cycle_2025",
///     "effective_date": "2025-04-01",
///     "rules": [{
///         "name": "strong_performers",
///         "rule_type": "MERIT",
///         "priority": 10,
///         "conditions": [{"field": "performance_rating", "operator": "gte", "value": 4}],
///         "actions": [{"type": "MERIT", "params": {"percentage": 4}}]
///     }]
/// }"#).unwrap();
///
/// let mut employee = EmployeeData::new("emp_001");
/// employee.base_salary = Some(Decimal::new(75000, 0));
/// employee.performance_rating = Some(Decimal::new(4, 0));
///
/// let decision = evaluate_rule_set(&rule_set, &employee, &EvaluationContext::default()).unwrap();
/// assert_eq!(decision.resolved.merit_increase, Decimal::new(3000, 0));
/// assert_eq!(decision.fired_rules(), vec!["strong_performers"]);
/// ```
pub fn evaluate_rule_set(
    rule_set: &RuleSet,
    employee: &EmployeeData,
    context: &EvaluationContext,
) -> EngineResult<RuleDecision> {
    rule_set.validate()?;

    let mut state = EvaluationState {
        amounts: CurrentAmounts::new(context.base_salary(employee)),
        ineligibility: None,
        merit_effective_date: None,
        applied: Vec::new(),
        pending_bounds: Vec::new(),
    };
    let mut audit: Vec<AuditEntry> = Vec::new();

    for rule in rule_set.ordered_rules() {
        let sequence = audit.len() as u32 + 1;
        let entry = evaluate_rule(rule, sequence, audit.len(), employee, context, &mut state);
        debug!(
            rule_set = %rule_set.name,
            employee_id = %employee.id,
            rule = %rule.name,
            priority = rule.priority,
            status = ?entry.status,
            "Rule evaluated"
        );
        audit.push(entry);
    }

    apply_pending_bounds(employee, context, &mut state, &mut audit);
    let resolved = resolve(employee, context, &state);

    debug!(
        rule_set = %rule_set.name,
        employee_id = %employee.id,
        rules_evaluated = audit.len(),
        eligible = resolved.eligible,
        total_cost_delta = %resolved.total_cost_delta,
        "Rule set evaluated"
    );

    Ok(RuleDecision {
        employee_id: employee.id.clone(),
        rule_set: rule_set.name.clone(),
        effective_date: rule_set.effective_date,
        applied_actions: state.applied,
        resolved,
        audit,
    })
}

/// Phase one for a single rule.
fn evaluate_rule<'r>(
    rule: &'r Rule,
    sequence: u32,
    audit_index: usize,
    employee: &EmployeeData,
    context: &EvaluationContext,
    state: &mut EvaluationState<'r>,
) -> AuditEntry {
    let conditions: Vec<ConditionResult> = rule
        .conditions
        .iter()
        .map(|condition| evaluate_condition(employee, condition))
        .collect();

    let entry =
        |status: AuditStatus, reason: String, actions: Vec<ExecuteActionResult>| AuditEntry {
            sequence,
            rule_name: rule.name.clone(),
            rule_type: rule.rule_type,
            priority: rule.priority,
            status,
            reason,
            conditions: conditions.clone(),
            actions,
        };

    if let Some(failed) = conditions.iter().find(|c| !c.passed) {
        return entry(AuditStatus::Skipped, describe_failure(failed), Vec::new());
    }

    let mut scratch = state.amounts.clone();
    let mut ineligibility = state.ineligibility.clone();
    let mut merit_effective_date = state.merit_effective_date;
    let mut applied = Vec::new();
    let mut deferred = Vec::new();
    let mut results = Vec::with_capacity(rule.actions.len());
    let mut failure: Option<String> = None;

    for (action_index, action) in rule.actions.iter().enumerate() {
        if failure.is_some() {
            results.push(ExecuteActionResult::skipped(action.tag(), NOT_RUN));
            continue;
        }
        let is_eligibility = matches!(action.kind(), ActionKind::Eligibility(_));
        if ineligibility.is_some() && !is_eligibility {
            results.push(ExecuteActionResult::suppressed(action.tag(), INELIGIBLE));
            continue;
        }

        if let ActionKind::Cap(params) | ActionKind::Floor(params) = action.kind() {
            match bound_limit(params, &scratch) {
                Ok(_) => {
                    results.push(ExecuteActionResult::skipped(action.tag(), DEFERRED));
                    deferred.push(action_index);
                }
                Err(error) => {
                    results.push(ExecuteActionResult::failed(action.tag(), error.clone()));
                    failure = Some(error);
                }
            }
            continue;
        }

        let result = execute_action(employee, action, &scratch, context);
        match (&result.value, action.action_type()) {
            (Some(outcome), Some(action_type)) if result.success() => {
                apply_outcome(&mut scratch, outcome);
                match (action.kind(), outcome) {
                    (ActionKind::Merit(params), _) => merit_effective_date = params.effective_date,
                    (
                        _,
                        ActionOutcome::Custom {
                            target: Some(CompTarget::Merit),
                            amount: Some(_),
                            ..
                        },
                    ) => merit_effective_date = None,
                    (
                        _,
                        ActionOutcome::Eligibility {
                            eligible: false,
                            reason,
                        },
                    ) => {
                        ineligibility.get_or_insert_with(|| reason.clone());
                    }
                    _ => {}
                }
                applied.push(AppliedAction {
                    rule_name: rule.name.clone(),
                    priority: rule.priority,
                    action_type,
                    outcome: outcome.clone(),
                });
            }
            _ => {
                failure = Some(
                    result
                        .error
                        .clone()
                        .unwrap_or_else(|| "action failed".to_string()),
                );
            }
        }
        results.push(result);
    }

    if let Some(error) = failure {
        for index in deferred {
            results[index] = ExecuteActionResult::skipped(rule.actions[index].tag(), NOT_RUN);
        }
        return entry(
            AuditStatus::Failed,
            format!("action failed, rule not applied: {}", error),
            results,
        );
    }

    let suppressed = rule.actions.len() - applied.len() - deferred.len();
    state.amounts = scratch;
    state.ineligibility = ineligibility;
    state.merit_effective_date = merit_effective_date;
    state.applied.extend(applied);
    state
        .pending_bounds
        .extend(deferred.into_iter().map(|action_index| PendingBound {
            audit_index,
            action_index,
            rule,
            action: &rule.actions[action_index],
        }));

    let mut reason = if conditions.is_empty() {
        "no conditions".to_string()
    } else {
        format!("all {} conditions passed", conditions.len())
    };
    if suppressed > 0 {
        reason.push_str(&format!(
            "; {} actions suppressed because the employee is ineligible",
            suppressed
        ));
    }
    entry(AuditStatus::Fired, reason, results)
}

/// Phase two: deferred CAP and FLOOR actions in priority order.
fn apply_pending_bounds(
    employee: &EmployeeData,
    context: &EvaluationContext,
    state: &mut EvaluationState<'_>,
    audit: &mut [AuditEntry],
) {
    for pending in std::mem::take(&mut state.pending_bounds) {
        let result = execute_action(employee, pending.action, &state.amounts, context);
        if let (Some(outcome), Some(action_type)) = (&result.value, pending.action.action_type())
        {
            apply_outcome(&mut state.amounts, outcome);
            state.applied.push(AppliedAction {
                rule_name: pending.rule.name.clone(),
                priority: pending.rule.priority,
                action_type,
                outcome: outcome.clone(),
            });
        }
        audit[pending.audit_index].actions[pending.action_index] = result;
    }
}

/// Phase three: eligibility override and rounding.
fn resolve(
    employee: &EmployeeData,
    context: &EvaluationContext,
    state: &EvaluationState<'_>,
) -> ResolvedCompensation {
    let decimal_places = context.decimal_places();
    let eligible = state.ineligibility.is_none();

    let mut amounts = state.amounts.clone();
    if !eligible {
        amounts.clear_components();
    }
    let rounded = |value: Option<Decimal>| round_amount(value.unwrap_or_default(), decimal_places);

    let base_salary = amounts.base_salary;
    let merit_increase = rounded(amounts.merit);
    let bonus = rounded(amounts.bonus);
    let lti = rounded(amounts.lti);

    let merit_percentage = base_salary
        .filter(|base| !base.is_zero())
        .and_then(|base| {
            merit_increase
                .checked_mul(Decimal::ONE_HUNDRED)
                .and_then(|scaled| scaled.checked_div(base))
        })
        .map(|pct| round_amount(pct, 4));

    // None when the new salary is not representable.
    let salary_change = base_salary.and_then(|base| SalaryChange::apply(base, merit_increase));

    let retro_adjustment = match (&salary_change, state.merit_effective_date) {
        (Some(change), Some(effective_date)) if eligible && !merit_increase.is_zero() => {
            merit_retro(change, effective_date, context)
        }
        _ => None,
    };

    ResolvedCompensation {
        eligible,
        ineligibility_reason: state.ineligibility.clone(),
        currency: employee.currency.clone(),
        base_salary,
        merit_increase,
        merit_percentage,
        new_base_salary: salary_change.map(|change| change.new_amount),
        bonus,
        lti,
        retro_adjustment,
        total_cost_delta: merit_increase.saturating_add(bonus).saturating_add(lti),
    }
}

fn describe_failure(condition: &ConditionResult) -> String {
    let detail = match (&condition.reason, &condition.actual) {
        (Some(reason), _) => reason.clone(),
        (None, Some(actual)) => format!("actual {}", actual),
        (None, None) => "no value".to_string(),
    };
    format!(
        "condition failed: {} {} {} ({})",
        condition.field, condition.operator, condition.expected, detail
    )
}
