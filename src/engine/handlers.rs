//! Built-in custom handlers.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use super::context::{CustomHandler, CustomOutput, CustomRequest, HandlerRegistry};
use crate::calculation::percent_of;
use crate::models::CompTarget;

/// Name the merit matrix handler is registered under.
pub const MERIT_MATRIX_HANDLER: &str = "merit_matrix";

/// One cell of a merit matrix.
///
/// A cell matches when the rating is at least `rating_min` and the
/// compa-ratio is below `compa_ratio_max`. Omitted bounds match anything.
#[derive(Debug, Clone, Deserialize)]
struct MatrixCell {
    #[serde(default)]
    rating_min: Option<Decimal>,
    #[serde(default)]
    compa_ratio_max: Option<Decimal>,
    percentage: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
struct MeritMatrixParams {
    matrix: Vec<MatrixCell>,
    #[serde(default)]
    target: Option<String>,
}

/// Looks up a percentage by performance rating and compa-ratio and applies
/// it to the base salary.
///
/// Params: `matrix` is a list of cells checked in order; the first match
/// wins. `target` selects the component written (default `merit`).
///
/// ```yaml
/// type: CUSTOM
/// params:
///   customHandler: merit_matrix
///   matrix:
///     - { rating_min: 4, compa_ratio_max: 0.9, percentage: 6 }
///     - { rating_min: 4, percentage: 4 }
///     - { rating_min: 3, percentage: 3 }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MeritMatrixHandler;

impl CustomHandler for MeritMatrixHandler {
    fn handle(&self, request: &CustomRequest<'_>) -> Result<CustomOutput, String> {
        let params: MeritMatrixParams =
            serde_json::from_value(Value::Object(request.params.clone()))
                .map_err(|err| format!("invalid matrix params: {}", err))?;

        let target = match params.target.as_deref() {
            Some(name) => {
                CompTarget::parse(name).ok_or_else(|| format!("unknown target '{}'", name))?
            }
            None => CompTarget::Merit,
        };

        let employee = request.employee;
        let rating = employee
            .performance_rating
            .ok_or_else(|| "performance_rating is required".to_string())?;
        let compa_ratio = employee.effective_compa_ratio();
        let base = request
            .context
            .base_salary(employee)
            .or(request.amounts.base_salary)
            .ok_or_else(|| "base salary is required".to_string())?;

        let (index, cell) = params
            .matrix
            .iter()
            .enumerate()
            .find(|(_, cell)| {
                let rating_ok = cell.rating_min.is_none_or(|min| rating >= min);
                let ratio_ok = match (cell.compa_ratio_max, compa_ratio) {
                    (None, _) => true,
                    (Some(max), Some(ratio)) => ratio < max,
                    (Some(_), None) => false,
                };
                rating_ok && ratio_ok
            })
            .ok_or_else(|| format!("no matrix cell matches rating {}", rating))?;

        let amount = percent_of(base, cell.percentage).ok_or_else(|| {
            format!("{}% of base salary {} overflows", cell.percentage, base)
        })?;

        Ok(CustomOutput {
            target: Some(target),
            amount: Some(amount),
            detail: json!({
                "cell": index,
                "percentage": cell.percentage.to_string(),
                "rating": rating.to_string(),
                "compa_ratio": compa_ratio.map(|ratio| ratio.to_string()),
            }),
        })
    }
}

/// A registry holding every built-in handler.
pub fn builtin_handlers() -> HandlerRegistry {
    HandlerRegistry::new().with(MERIT_MATRIX_HANDLER, Arc::new(MeritMatrixHandler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EvaluationContext;
    use crate::models::{CurrentAmounts, EmployeeData};
    use serde_json::Map;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn matrix_params() -> Map<String, Value> {
        match json!({
            "customHandler": "merit_matrix",
            "matrix": [
                {"rating_min": 4, "compa_ratio_max": "0.9", "percentage": 6},
                {"rating_min": 4, "percentage": 4},
                {"rating_min": 3, "percentage": 3}
            ]
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn employee(rating: &str, midpoint: &str) -> EmployeeData {
        let mut employee = EmployeeData::new("emp_001");
        employee.base_salary = Some(dec("80000"));
        employee.performance_rating = Some(dec(rating));
        employee.range_midpoint = Some(dec(midpoint));
        employee
    }

    fn run(employee: &EmployeeData, params: &Map<String, Value>) -> Result<CustomOutput, String> {
        let amounts = CurrentAmounts::new(employee.base_salary);
        let context = EvaluationContext::default();
        MeritMatrixHandler.handle(&CustomRequest {
            employee,
            params,
            amounts: &amounts,
            context: &context,
        })
    }

    #[test]
    fn test_low_compa_ratio_gets_top_cell() {
        // 80000 / 100000 = 0.8
        let output = run(&employee("4", "100000"), &matrix_params()).unwrap();
        assert_eq!(output.target, Some(CompTarget::Merit));
        assert_eq!(output.amount, Some(dec("4800")));
        assert_eq!(output.detail["cell"], json!(0));
    }

    #[test]
    fn test_first_matching_cell_wins() {
        // 80000 / 80000 = 1.0, falls through to the second cell
        let output = run(&employee("4.5", "80000"), &matrix_params()).unwrap();
        assert_eq!(output.amount, Some(dec("3200")));
        assert_eq!(output.detail["cell"], json!(1));
    }

    #[test]
    fn test_no_matching_cell_fails() {
        let result = run(&employee("2", "80000"), &matrix_params());
        assert_eq!(result.unwrap_err(), "no matrix cell matches rating 2");
    }

    #[test]
    fn test_overflowing_cell_fails() {
        let mut employee = employee("4", "80000");
        employee.base_salary = Some(Decimal::MAX);
        let params = match json!({"matrix": [{"percentage": 200}]}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let result = run(&employee, &params);
        assert!(result.unwrap_err().contains("overflows"));
    }

    #[test]
    fn test_missing_rating_fails() {
        let mut employee = employee("4", "80000");
        employee.performance_rating = None;
        assert_eq!(
            run(&employee, &matrix_params()).unwrap_err(),
            "performance_rating is required"
        );
    }

    #[test]
    fn test_missing_matrix_fails() {
        let params = Map::new();
        let result = run(&employee("4", "80000"), &params);
        assert!(result.unwrap_err().starts_with("invalid matrix params"));
    }

    #[test]
    fn test_builtin_registry_contains_merit_matrix() {
        let registry = builtin_handlers();
        assert_eq!(registry.names(), vec![MERIT_MATRIX_HANDLER]);
    }
}
