//! What-if simulation of a rule set over an employee population.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::context::EvaluationContext;
use super::evaluator::evaluate_rule_set;
use crate::error::EngineResult;
use crate::models::{AuditStatus, EmployeeData, RuleDecision, RuleSet};

/// Department label for employees with no department.
pub const UNASSIGNED_DEPARTMENT: &str = "Unassigned";

/// Currency label for employees with no currency.
pub const UNSPECIFIED_CURRENCY: &str = "UNSPECIFIED";

/// Cost totals for one department.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentSummary {
    /// Department name.
    pub department: String,
    /// Employees evaluated.
    pub employees: usize,
    /// Employees eligible for an award.
    pub eligible: usize,
    /// Sum of merit increases.
    pub total_merit: Decimal,
    /// Sum of bonuses.
    pub total_bonus: Decimal,
    /// Sum of LTI grants.
    pub total_lti: Decimal,
    /// Sum of cost deltas.
    pub total_cost_delta: Decimal,
}

/// Cost totals for one currency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySummary {
    /// ISO currency code, or [`UNSPECIFIED_CURRENCY`].
    pub currency: String,
    /// Employees evaluated.
    pub employees: usize,
    /// Sum of merit increases.
    pub total_merit: Decimal,
    /// Sum of bonuses.
    pub total_bonus: Decimal,
    /// Sum of LTI grants.
    pub total_lti: Decimal,
    /// Sum of retro back-pay.
    pub total_retro: Decimal,
    /// Sum of cost deltas.
    pub total_cost_delta: Decimal,
}

/// How often one rule fired, was skipped or failed across the population.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleStats {
    /// Rule name.
    pub rule_name: String,
    /// Times the rule fired.
    pub fired: usize,
    /// Times a condition failed.
    pub skipped: usize,
    /// Times an action failed.
    pub failed: usize,
}

/// Aggregate result of simulating a rule set.
///
/// The top-level and department totals add amounts as-is and are only
/// meaningful for a single-currency population. `currencies` always keeps
/// each currency apart. Every total saturates at the decimal range instead of
/// overflowing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSummary {
    /// Rule set simulated.
    pub rule_set: String,
    /// Employees evaluated.
    pub employees_evaluated: usize,
    /// Records rejected as invalid (e.g. no id).
    pub employees_rejected: usize,
    /// Employees eligible for an award.
    pub eligible: usize,
    /// Employees made ineligible by a rule.
    pub ineligible: usize,
    /// Rule firings across all employees.
    pub rules_fired: usize,
    /// Rule failures across all employees.
    pub rules_failed: usize,
    /// Sum of merit increases.
    pub total_merit: Decimal,
    /// Sum of bonuses.
    pub total_bonus: Decimal,
    /// Sum of LTI grants.
    pub total_lti: Decimal,
    /// Sum of retro back-pay.
    pub total_retro: Decimal,
    /// Sum of cost deltas.
    pub total_cost_delta: Decimal,
    /// Per-currency totals ordered by currency code.
    pub currencies: Vec<CurrencySummary>,
    /// Per-department totals ordered by department name.
    pub departments: Vec<DepartmentSummary>,
    /// Per-rule counts ordered by rule name.
    pub rules: Vec<RuleStats>,
}

impl SimulationSummary {
    fn record(&mut self, decision: &RuleDecision) {
        let resolved = &decision.resolved;
        let retro = retro_total(decision);

        self.employees_evaluated += 1;
        if resolved.eligible {
            self.eligible += 1;
        } else {
            self.ineligible += 1;
        }
        self.total_merit = self.total_merit.saturating_add(resolved.merit_increase);
        self.total_bonus = self.total_bonus.saturating_add(resolved.bonus);
        self.total_lti = self.total_lti.saturating_add(resolved.lti);
        self.total_retro = self.total_retro.saturating_add(retro);
        self.total_cost_delta = self
            .total_cost_delta
            .saturating_add(resolved.total_cost_delta);

        for entry in &decision.audit {
            match entry.status {
                AuditStatus::Fired => self.rules_fired += 1,
                AuditStatus::Failed => self.rules_failed += 1,
                AuditStatus::Skipped => {}
            }
        }
    }
}

impl CurrencySummary {
    fn record(&mut self, decision: &RuleDecision) {
        let resolved = &decision.resolved;
        self.employees += 1;
        self.total_merit = self.total_merit.saturating_add(resolved.merit_increase);
        self.total_bonus = self.total_bonus.saturating_add(resolved.bonus);
        self.total_lti = self.total_lti.saturating_add(resolved.lti);
        self.total_retro = self.total_retro.saturating_add(retro_total(decision));
        self.total_cost_delta = self
            .total_cost_delta
            .saturating_add(resolved.total_cost_delta);
    }
}

fn retro_total(decision: &RuleDecision) -> Decimal {
    decision
        .resolved
        .retro_adjustment
        .as_ref()
        .map_or(Decimal::ZERO, |retro| retro.total)
}

/// Evaluates a rule set against every employee and aggregates the results.
///
/// Each employee is evaluated independently with the same context. Records
/// without an id are counted as rejected and skipped.
///
/// # Errors
///
/// Returns [`crate::error::EngineError::InvalidRuleSet`] if the rule set is
/// structurally invalid.
///
/// # Example
///
/// ```
/// use comp_engine::engine::{EvaluationContext, simulate_population};
/// use comp_engine::models::{EmployeeData, RuleSet};
/// use rust_decimal::Decimal;
///
/// let rule_set: RuleSet = serde_json::from_str(r#"{
///     "name": "flat_bonus",
///     "effective_date": "2025-04-01",
///     "rules": [{"name": "bonus", "actions": [{"type": "BONUS", "params": {"amount": 1000}}]}]
/// }"#).unwrap();
/// let employees = vec![EmployeeData::new("a"), EmployeeData::new("b")];
///
/// let summary = simulate_population(&rule_set, &employees, &EvaluationContext::default()).unwrap();
/// assert_eq!(summary.employees_evaluated, 2);
/// assert_eq!(summary.total_bonus, Decimal::new(2000, 0));
/// ```
pub fn simulate_population(
    rule_set: &RuleSet,
    employees: &[EmployeeData],
    context: &EvaluationContext,
) -> EngineResult<SimulationSummary> {
    rule_set.validate()?;

    let mut summary = SimulationSummary {
        rule_set: rule_set.name.clone(),
        ..SimulationSummary::default()
    };
    let mut currencies: BTreeMap<String, CurrencySummary> = BTreeMap::new();
    let mut departments: BTreeMap<String, DepartmentSummary> = BTreeMap::new();
    let mut rules: BTreeMap<String, RuleStats> = BTreeMap::new();

    for employee in employees {
        if let Err(err) = employee.validate() {
            warn!(
                rule_set = %rule_set.name,
                employee_id = %employee.id,
                error = %err,
                "Employee rejected from simulation"
            );
            summary.employees_rejected += 1;
            continue;
        }
        let decision = evaluate_rule_set(rule_set, employee, context)?;

        summary.record(&decision);

        let code = employee
            .currency
            .clone()
            .unwrap_or_else(|| UNSPECIFIED_CURRENCY.to_string());
        currencies
            .entry(code.clone())
            .or_insert_with(|| CurrencySummary {
                currency: code,
                ..CurrencySummary::default()
            })
            .record(&decision);

        let name = employee
            .department
            .clone()
            .unwrap_or_else(|| UNASSIGNED_DEPARTMENT.to_string());
        let department = departments
            .entry(name.clone())
            .or_insert_with(|| DepartmentSummary {
                department: name,
                ..DepartmentSummary::default()
            });
        let resolved = &decision.resolved;
        department.employees += 1;
        if resolved.eligible {
            department.eligible += 1;
        }
        department.total_merit = department.total_merit.saturating_add(resolved.merit_increase);
        department.total_bonus = department.total_bonus.saturating_add(resolved.bonus);
        department.total_lti = department.total_lti.saturating_add(resolved.lti);
        department.total_cost_delta = department
            .total_cost_delta
            .saturating_add(resolved.total_cost_delta);

        for entry in &decision.audit {
            let stats = rules
                .entry(entry.rule_name.clone())
                .or_insert_with(|| RuleStats {
                    rule_name: entry.rule_name.clone(),
                    ..RuleStats::default()
                });
            match entry.status {
                AuditStatus::Fired => stats.fired += 1,
                AuditStatus::Skipped => stats.skipped += 1,
                AuditStatus::Failed => stats.failed += 1,
            }
        }
    }

    summary.currencies = currencies.into_values().collect();
    summary.departments = departments.into_values().collect();
    summary.rules = rules.into_values().collect();

    info!(
        rule_set = %summary.rule_set,
        employees = summary.employees_evaluated,
        rejected = summary.employees_rejected,
        total_cost_delta = %summary.total_cost_delta,
        "Simulation completed"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn employee(id: &str, department: Option<&str>, salary: &str, rating: &str) -> EmployeeData {
        let mut employee = EmployeeData::new(id);
        employee.department = department.map(str::to_string);
        employee.base_salary = Some(dec(salary));
        employee.performance_rating = Some(dec(rating));
        employee
    }

    fn create_test_rule_set() -> RuleSet {
        serde_json::from_value(json!({
            "name": "annual_cycle_2025",
            "effective_date": "2025-04-01",
            "rules": [
                {
                    "name": "low_performer",
                    "rule_type": "ELIGIBILITY",
                    "priority": 0,
                    "conditions": [{"field": "performance_rating", "operator": "lt", "value": 2}],
                    "actions": [{"type": "ELIGIBILITY", "params": {"eligible": false}}]
                },
                {
                    "name": "merit",
                    "rule_type": "MERIT",
                    "priority": 10,
                    "conditions": [{"field": "performance_rating", "operator": "gte", "value": 3}],
                    "actions": [{"type": "MERIT", "params": {"percentage": 3}}]
                },
                {
                    "name": "bonus",
                    "rule_type": "BONUS",
                    "priority": 20,
                    "actions": [{"type": "BONUS", "params": {"amount": 1000}}]
                }
            ]
        }))
        .unwrap()
    }

    fn population() -> Vec<EmployeeData> {
        vec![
            employee("e1", Some("Sales"), "50000", "4"),
            employee("e2", Some("Engineering"), "100000", "3"),
            employee("e3", Some("Engineering"), "80000", "1"),
            employee("e4", None, "60000", "2"),
        ]
    }

    #[test]
    fn test_totals_and_counts() {
        let summary = simulate_population(
            &create_test_rule_set(),
            &population(),
            &EvaluationContext::default(),
        )
        .unwrap();

        assert_eq!(summary.employees_evaluated, 4);
        assert_eq!(summary.eligible, 3);
        assert_eq!(summary.ineligible, 1);
        // e1 1500, e2 3000; e3 is ineligible; e4 is below the merit threshold.
        assert_eq!(summary.total_merit, dec("4500"));
        assert_eq!(summary.total_bonus, dec("3000"));
        assert_eq!(summary.total_cost_delta, dec("7500"));
        // e1: merit+bonus, e2: merit+bonus, e3: low_performer+bonus, e4: bonus.
        assert_eq!(summary.rules_fired, 7);
        assert_eq!(summary.rules_failed, 0);
    }

    #[test]
    fn test_departments_ordered_by_name() {
        let summary = simulate_population(
            &create_test_rule_set(),
            &population(),
            &EvaluationContext::default(),
        )
        .unwrap();

        let names: Vec<&str> = summary
            .departments
            .iter()
            .map(|d| d.department.as_str())
            .collect();
        assert_eq!(names, vec!["Engineering", "Sales", UNASSIGNED_DEPARTMENT]);

        let engineering = &summary.departments[0];
        assert_eq!(engineering.employees, 2);
        assert_eq!(engineering.eligible, 1);
        assert_eq!(engineering.total_cost_delta, dec("4000"));
    }

    #[test]
    fn test_rule_stats() {
        let summary = simulate_population(
            &create_test_rule_set(),
            &population(),
            &EvaluationContext::default(),
        )
        .unwrap();

        let merit = summary
            .rules
            .iter()
            .find(|r| r.rule_name == "merit")
            .unwrap();
        assert_eq!(merit.fired, 2);
        assert_eq!(merit.skipped, 2);
    }

    #[test]
    fn test_invalid_employee_is_rejected_not_fatal() {
        let mut employees = population();
        employees.push(EmployeeData::new(""));

        let summary = simulate_population(
            &create_test_rule_set(),
            &employees,
            &EvaluationContext::default(),
        )
        .unwrap();
        assert_eq!(summary.employees_evaluated, 4);
        assert_eq!(summary.employees_rejected, 1);
    }

    #[test]
    fn test_totals_are_kept_per_currency() {
        let mut employees = population();
        employees[0].currency = Some("USD".to_string());
        employees[1].currency = Some("JPY".to_string());
        employees[2].currency = Some("USD".to_string());

        let summary = simulate_population(
            &create_test_rule_set(),
            &employees,
            &EvaluationContext::default(),
        )
        .unwrap();

        let codes: Vec<&str> = summary
            .currencies
            .iter()
            .map(|c| c.currency.as_str())
            .collect();
        assert_eq!(codes, vec!["JPY", "USD", UNSPECIFIED_CURRENCY]);

        let jpy = &summary.currencies[0];
        assert_eq!(jpy.employees, 1);
        assert_eq!(jpy.total_merit, dec("3000"));
        assert_eq!(jpy.total_cost_delta, dec("4000"));

        // e1 is eligible; e3 is not.
        let usd = &summary.currencies[1];
        assert_eq!(usd.employees, 2);
        assert_eq!(usd.total_cost_delta, dec("2500"));

        let total: Decimal = summary.currencies.iter().map(|c| c.total_cost_delta).sum();
        assert_eq!(total, summary.total_cost_delta);
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let rule_set: RuleSet = serde_json::from_value(json!({
            "name": "huge_bonus",
            "effective_date": "2025-04-01",
            "rules": [{
                "name": "bonus",
                "actions": [{"type": "BONUS", "params": {"amount": "50000000000000000000000000000"}}]
            }]
        }))
        .unwrap();
        let employees = vec![EmployeeData::new("a"), EmployeeData::new("b")];

        let summary =
            simulate_population(&rule_set, &employees, &EvaluationContext::default()).unwrap();
        assert_eq!(summary.employees_evaluated, 2);
        assert_eq!(summary.total_bonus, Decimal::MAX);
        assert_eq!(summary.total_cost_delta, Decimal::MAX);
        assert_eq!(summary.currencies[0].total_bonus, Decimal::MAX);
        assert_eq!(summary.departments[0].total_bonus, Decimal::MAX);
    }

    #[test]
    fn test_simulation_is_deterministic() {
        let run = || {
            serde_json::to_string(
                &simulate_population(
                    &create_test_rule_set(),
                    &population(),
                    &EvaluationContext::default(),
                )
                .unwrap(),
            )
            .unwrap()
        };
        assert_eq!(run(), run());
    }
}
