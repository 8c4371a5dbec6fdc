//! The rules engine: condition evaluation, action execution, rule set
//! evaluation and population simulation.
//!
//! # Example
//!
//! ```
//! use comp_engine::engine::{EvaluationContext, evaluate_rule_set};
//! use comp_engine::models::{EmployeeData, RuleSet};
//! use rust_decimal::Decimal;
//!
//! let rule_set: RuleSet = serde_json::from_str(r#"{
//!     "name": "merit_2025",
//!     "effective_date": "2025-04-01",
//!     "rules": [{
//!         "name": "strong_performers",
//!         "rule_type": "MERIT",
//!         "conditions": [{"field": "performance_rating", "operator": "gte", "value": 4}],
//!         "actions": [{"type": "MERIT", "params": {"percentage": 4}}]
//!     }]
//! }"#).unwrap();
//!
//! let mut employee = EmployeeData::new("emp_001");
//! employee.base_salary = Some(Decimal::new(80000, 0));
//! employee.performance_rating = Some(Decimal::new(4, 0));
//!
//! let decision = evaluate_rule_set(&rule_set, &employee, &EvaluationContext::default()).unwrap();
//! assert_eq!(decision.resolved.merit_increase, Decimal::new(3200, 0));
//! ```

mod actions;
mod conditions;
mod context;
mod evaluator;
mod handlers;
mod simulation;

pub use actions::{apply_outcome, bound_limit, execute_action, merit_retro};
pub use conditions::{evaluate_condition, get_field_value};
pub use context::{CustomHandler, CustomOutput, CustomRequest, EvaluationContext, HandlerRegistry};
pub use evaluator::evaluate_rule_set;
pub use handlers::{MERIT_MATRIX_HANDLER, MeritMatrixHandler, builtin_handlers};
pub use simulation::{
    CurrencySummary, DepartmentSummary, RuleStats, SimulationSummary, UNASSIGNED_DEPARTMENT,
    UNSPECIFIED_CURRENCY, simulate_population,
};
