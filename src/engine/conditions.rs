//! Condition evaluation.
//!
//! Resolves a named field on an employee record and tests it against a
//! condition's operator. Evaluation never fails: an absent field, a type
//! mismatch or an unparseable operator all produce `passed = false` with a
//! reason, so a malformed rule fails closed instead of aborting the rule set.

use std::borrow::Cow;

use rust_decimal::Decimal;

use crate::models::{ConditionOperator, ConditionResult, EmployeeData, FieldValue, RuleCondition};

/// Resolves a field on an employee record by name.
///
/// Known fields are matched first under either their snake_case or camelCase
/// spelling; any other name is looked up in the employee's `attributes` map.
/// `compa_ratio` is derived from `base_salary / range_midpoint` when it was
/// not supplied. Unknown names resolve to `None`.
///
/// # Example
///
/// ```
/// use comp_engine::engine::get_field_value;
/// use comp_engine::models::{EmployeeData, FieldValue};
///
/// let mut employee = EmployeeData::new("emp_001");
/// employee.department = Some("Sales".to_string());
/// employee.attributes.insert("region".to_string(), FieldValue::from("EMEA"));
///
/// assert_eq!(get_field_value(&employee, "department"), Some(FieldValue::from("Sales")));
/// assert_eq!(get_field_value(&employee, "region"), Some(FieldValue::from("EMEA")));
/// assert_eq!(get_field_value(&employee, "shoe_size"), None);
/// ```
pub fn get_field_value(employee: &EmployeeData, name: &str) -> Option<FieldValue> {
    let text = |value: &Option<String>| value.clone().map(FieldValue::Text);

    match name {
        "id" => Some(FieldValue::Text(employee.id.clone())),
        "department" => text(&employee.department),
        "level" => text(&employee.level),
        "title" => text(&employee.title),
        "location" => text(&employee.location),
        "currency" => text(&employee.currency),
        "employment_type" | "employmentType" => text(&employee.employment_type),
        "manager_id" | "managerId" => text(&employee.manager_id),
        "base_salary" | "baseSalary" => employee.base_salary.map(FieldValue::Number),
        "performance_rating" | "performanceRating" => {
            employee.performance_rating.map(FieldValue::Number)
        }
        "range_midpoint" | "rangeMidpoint" => employee.range_midpoint.map(FieldValue::Number),
        "compa_ratio" | "compaRatio" => employee.effective_compa_ratio().map(FieldValue::Number),
        "hire_date" | "hireDate" => employee.hire_date.map(FieldValue::Date),
        "termination_date" | "terminationDate" => employee.termination_date.map(FieldValue::Date),
        other => employee.attributes.get(other).cloned(),
    }
}

/// Tests one condition against an employee record.
///
/// # Arguments
///
/// * `employee` - The record the field is resolved on
/// * `condition` - The field, operator and operand to test
///
/// # Returns
///
/// A [`ConditionResult`] recording the operand, the resolved value and whether
/// the condition passed. Failures caused by anything other than the value
/// itself (absent field, wrong type, invalid operator) carry a reason.
///
/// # Example
///
/// ```
/// use comp_engine::engine::evaluate_condition;
/// use comp_engine::models::{EmployeeData, RuleCondition};
/// use rust_decimal::Decimal;
/// use serde_json::json;
///
/// let mut employee = EmployeeData::new("emp_001");
/// employee.performance_rating = Some(Decimal::new(4, 0));
///
/// let condition = RuleCondition::new("performance_rating", "between", json!([3, 4]));
/// assert!(!evaluate_condition(&employee, &condition).passed);
///
/// let condition = RuleCondition::new("performance_rating", "gte", json!(4));
/// assert!(evaluate_condition(&employee, &condition).passed);
/// ```
pub fn evaluate_condition(employee: &EmployeeData, condition: &RuleCondition) -> ConditionResult {
    let actual = get_field_value(employee, &condition.field);
    let outcome = match &actual {
        Some(value) => test_operator(&condition.operator, value),
        None => match &condition.operator {
            ConditionOperator::Invalid { reason, .. } => Err(reason.clone()),
            _ => Err(format!("field '{}' is absent", condition.field)),
        },
    };

    let (passed, reason) = match outcome {
        Ok(passed) => (passed, None),
        Err(reason) => (false, Some(reason)),
    };

    ConditionResult {
        field: condition.field.clone(),
        operator: condition.operator.name().to_string(),
        expected: condition.operator.operand(),
        actual,
        passed,
        reason,
    }
}

/// Applies an operator to a present value. `Err` means the test could not be
/// made at all.
fn test_operator(operator: &ConditionOperator, actual: &FieldValue) -> Result<bool, String> {
    match operator {
        ConditionOperator::Eq(expected) => {
            same_type(actual, expected)?;
            Ok(actual == expected)
        }
        ConditionOperator::Neq(expected) => {
            same_type(actual, expected)?;
            Ok(actual != expected)
        }
        ConditionOperator::Gt(bound) => numeric(operator, actual).map(|n| n > *bound),
        ConditionOperator::Gte(bound) => numeric(operator, actual).map(|n| n >= *bound),
        ConditionOperator::Lt(bound) => numeric(operator, actual).map(|n| n < *bound),
        ConditionOperator::Lte(bound) => numeric(operator, actual).map(|n| n <= *bound),
        ConditionOperator::Between { low, high } => {
            numeric(operator, actual).map(|n| *low <= n && n < *high)
        }
        ConditionOperator::In(items) => Ok(items.contains(actual)),
        ConditionOperator::NotIn(items) => Ok(!items.contains(actual)),
        ConditionOperator::Contains(needle) => {
            textual(operator, actual).map(|text| text.contains(needle.as_str()))
        }
        ConditionOperator::StartsWith(prefix) => {
            textual(operator, actual).map(|text| text.starts_with(prefix.as_str()))
        }
        ConditionOperator::Matches(pattern) => {
            textual(operator, actual).map(|text| pattern.is_match(&text))
        }
        ConditionOperator::Invalid { reason, .. } => Err(reason.clone()),
    }
}

fn same_type(actual: &FieldValue, expected: &FieldValue) -> Result<(), String> {
    if actual.type_name() == expected.type_name() {
        Ok(())
    } else {
        Err(format!(
            "type mismatch: expected {}, found {}",
            expected.type_name(),
            actual.type_name()
        ))
    }
}

fn numeric(operator: &ConditionOperator, actual: &FieldValue) -> Result<Decimal, String> {
    actual.as_number().ok_or_else(|| {
        format!(
            "'{}' requires a number, found {}",
            operator.name(),
            actual.type_name()
        )
    })
}

/// Text view of a value for the string operators. Dates use their ISO form.
fn textual<'a>(operator: &ConditionOperator, actual: &'a FieldValue) -> Result<Cow<'a, str>, String> {
    match actual {
        FieldValue::Text(s) => Ok(Cow::Borrowed(s.as_str())),
        FieldValue::Date(d) => Ok(Cow::Owned(d.format("%Y-%m-%d").to_string())),
        other => Err(format!(
            "'{}' requires text, found {}",
            operator.name(),
            other.type_name()
        )),
    }
}
