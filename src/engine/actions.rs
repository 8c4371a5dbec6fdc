//! Action execution.
//!
//! Each action is executed against the running [`CurrentAmounts`] and returns
//! an [`ExecuteActionResult`]; applying the outcome to the amounts is a
//! separate step so the evaluator can decide whether a rule commits. Action
//! failures are returned as data, never as errors.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::context::{CustomRequest, EvaluationContext};
use crate::calculation::{
    calculate_proration, calculate_retro_adjustment_with_precision, pay_periods_covering,
    percent_of,
};
use crate::models::{
    ActionKind, ActionOutcome, BoundKind, BoundLimit, BoundParams, CompTarget,
    CompensationParams, CurrentAmounts, EligibilityParams, EmployeeData, ExecuteActionResult,
    ProrationParams, RetroAdjustment, RuleAction, SalaryChange, ValueChange,
};

/// Executes one action.
///
/// # Arguments
///
/// * `employee` - The employee being evaluated
/// * `action` - The parsed action
/// * `amounts` - Running amounts, including earlier actions' outcomes
/// * `context` - Pre-resolved cycle data and custom handlers
///
/// # Returns
///
/// A succeeded result carrying an [`ActionOutcome`], or a failed result with
/// an explanation: a malformed action, a percentage with no base salary, an
/// amount too large to represent, a proration with no amount or period, or an
/// unknown custom handler.
///
/// # Example
///
/// ```
/// use comp_engine::engine::{EvaluationContext, execute_action};
/// use comp_engine::models::{ActionOutcome, CurrentAmounts, EmployeeData, RuleAction};
/// use rust_decimal::Decimal;
/// use serde_json::json;
///
/// let employee = EmployeeData::new("emp_001");
/// let amounts = CurrentAmounts::new(Some(Decimal::new(80000, 0)));
/// let action = RuleAction::new("MERIT", json!({"percentage": 3}));
///
/// let result = execute_action(&employee, &action, &amounts, &EvaluationContext::default());
/// match result.value {
///     Some(ActionOutcome::Compensation { amount, new_value, .. }) => {
///         assert_eq!(amount, Decimal::new(2400, 0));
///         assert_eq!(new_value, Decimal::new(82400, 0));
///     }
///     other => panic!("unexpected outcome {:?}", other),
/// }
/// ```
pub fn execute_action(
    employee: &EmployeeData,
    action: &RuleAction,
    amounts: &CurrentAmounts,
    context: &EvaluationContext,
) -> ExecuteActionResult {
    let outcome = match action.kind() {
        ActionKind::Merit(params) => compensation(CompTarget::Merit, params, amounts, context),
        ActionKind::Bonus(params) => compensation(CompTarget::Bonus, params, amounts, context),
        ActionKind::Lti(params) => compensation(CompTarget::Lti, params, amounts, context),
        ActionKind::Proration(params) => proration(params, employee, amounts, context),
        ActionKind::Cap(params) => bound(BoundKind::Cap, params, amounts),
        ActionKind::Floor(params) => bound(BoundKind::Floor, params, amounts),
        ActionKind::Eligibility(params) => Ok(eligibility(params)),
        ActionKind::Custom(params) => custom(&params.handler, action, employee, amounts, context),
        ActionKind::Malformed { reason, .. } => Err(format!("malformed action: {}", reason)),
    };

    match outcome {
        Ok(outcome) => ExecuteActionResult::succeeded(action.tag(), outcome),
        Err(error) => ExecuteActionResult::failed(action.tag(), error),
    }
}

/// Writes an outcome into the running amounts.
///
/// Eligibility outcomes do not touch amounts; the evaluator tracks them.
pub fn apply_outcome(amounts: &mut CurrentAmounts, outcome: &ActionOutcome) {
    match outcome {
        ActionOutcome::Compensation { target, amount, .. } => amounts.set(*target, *amount),
        ActionOutcome::Prorated {
            target, proration, ..
        } => amounts.set(*target, proration.prorated_amount),
        ActionOutcome::Bounded {
            target,
            after: Some(after),
            ..
        } => amounts.set(*target, *after),
        ActionOutcome::Custom {
            target: Some(target),
            amount: Some(amount),
            ..
        } => amounts.set(*target, *amount),
        ActionOutcome::Bounded { .. }
        | ActionOutcome::Custom { .. }
        | ActionOutcome::Eligibility { .. } => {}
    }
}

/// Resolves a CAP or FLOOR limit to an amount.
///
/// Percentage limits are taken of the base salary, so they fail when the base
/// is unknown or the limit overflows.
pub fn bound_limit(params: &BoundParams, amounts: &CurrentAmounts) -> Result<Decimal, String> {
    match params.limit {
        BoundLimit::Amount(amount) => Ok(amount),
        BoundLimit::Percentage(pct) => {
            let base = amounts
                .base_salary
                .ok_or_else(|| "percentage bound requires a base salary".to_string())?;
            percent_of(base, pct)
                .ok_or_else(|| format!("{}% of {} overflows", pct, base))
        }
    }
}

/// Computes the back-pay owed for an annual salary change effective before
/// the calculation date.
///
/// Returns `None` unless the context has both a calculation date and a pay
/// schedule. Per-period pay is the annual amount divided by the schedule's
/// periods per year.
pub fn merit_retro(
    change: &SalaryChange,
    effective_date: NaiveDate,
    context: &EvaluationContext,
) -> Option<RetroAdjustment> {
    let calculation_date = context.calculation_date?;
    let schedule = context.pay_schedule?;

    let periods_per_year = Decimal::from(schedule.frequency.periods_per_year());
    let periods = pay_periods_covering(&schedule, effective_date, calculation_date);

    Some(calculate_retro_adjustment_with_precision(
        change.old_amount / periods_per_year,
        change.new_amount / periods_per_year,
        effective_date,
        calculation_date,
        &periods,
        context.decimal_places(),
    ))
}

fn compensation(
    target: CompTarget,
    params: &CompensationParams,
    amounts: &CurrentAmounts,
    context: &EvaluationContext,
) -> Result<ActionOutcome, String> {
    let base = amounts.base_salary;
    let (basis, amount) = match params.change {
        ValueChange::Percentage(pct) => {
            let base = base.ok_or_else(|| {
                format!("{} percentage requires a base salary", target.as_str())
            })?;
            let amount = percent_of(base, pct).ok_or_else(|| {
                format!("{} of {}% of {} overflows", target.as_str(), pct, base)
            })?;
            (Some(base), amount)
        }
        ValueChange::Amount(amount) => (None, amount),
    };

    let (new_value, retro) = match target {
        CompTarget::Merit => match base {
            Some(base) => {
                let change = SalaryChange::apply(base, amount)
                    .ok_or_else(|| format!("merit of {} overflows base salary {}", amount, base))?;
                let retro = params
                    .effective_date
                    .and_then(|effective_date| merit_retro(&change, effective_date, context));
                (change.new_amount, retro)
            }
            None => (amount, None),
        },
        _ => (amount, None),
    };

    Ok(ActionOutcome::Compensation {
        target,
        basis,
        amount,
        new_value,
        retro,
    })
}

fn proration(
    params: &ProrationParams,
    employee: &EmployeeData,
    amounts: &CurrentAmounts,
    context: &EvaluationContext,
) -> Result<ActionOutcome, String> {
    let original = amounts
        .get(params.target)
        .ok_or_else(|| format!("no {} amount to prorate", params.target.as_str()))?;

    let cycle = context.cycle_period;
    let start = params.period_start.or(cycle.map(|p| p.start_date));
    let end = params.period_end.or(cycle.map(|p| p.end_date));
    let (Some(start), Some(end)) = (start, end) else {
        return Err("proration requires a period in params or context".to_string());
    };

    let proration = calculate_proration(
        employee,
        original,
        start,
        end,
        &context.proration_options(),
    );

    Ok(ActionOutcome::Prorated {
        target: params.target,
        original,
        proration,
    })
}

fn bound(
    kind: BoundKind,
    params: &BoundParams,
    amounts: &CurrentAmounts,
) -> Result<ActionOutcome, String> {
    let limit = bound_limit(params, amounts)?;
    let before = amounts.get(params.target);
    let after = before.map(|value| match kind {
        BoundKind::Cap => value.min(limit),
        BoundKind::Floor => value.max(limit),
    });

    Ok(ActionOutcome::Bounded {
        target: params.target,
        bound: kind,
        limit,
        before,
        after,
        adjusted: before != after,
    })
}

fn eligibility(params: &EligibilityParams) -> ActionOutcome {
    let reason = params.reason.clone().unwrap_or_else(|| {
        if params.eligible {
            "eligible".to_string()
        } else {
            "ineligible".to_string()
        }
    });
    ActionOutcome::Eligibility {
        eligible: params.eligible,
        reason,
    }
}

fn custom(
    handler_name: &str,
    action: &RuleAction,
    employee: &EmployeeData,
    amounts: &CurrentAmounts,
    context: &EvaluationContext,
) -> Result<ActionOutcome, String> {
    let handler = context
        .handlers
        .get(handler_name)
        .ok_or_else(|| format!("unknown custom handler '{}'", handler_name))?;

    let request = CustomRequest {
        employee,
        params: action.params(),
        amounts,
        context,
    };
    let output = handler
        .handle(&request)
        .map_err(|err| format!("custom handler '{}' failed: {}", handler_name, err))?;

    Ok(ActionOutcome::Custom {
        handler: handler_name.to_string(),
        target: output.target,
        amount: output.amount,
        detail: output.detail,
    })
}
