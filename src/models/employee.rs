//! Employee record evaluated by rule sets.
//!
//! Known attributes are typed struct fields. Anything else a rule set wants to
//! reference lives in the `attributes` extension map and is looked up by name.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::FieldValue;
use crate::error::{EngineError, EngineResult};

/// An employee record supplied by the caller for one evaluation.
///
/// # Example
///
/// ```
/// use comp_engine::models::EmployeeData;
///
/// let employee: EmployeeData = serde_json::from_str(r#"{
///     "id": "emp_001",
///     "department": "Engineering",
///     "base_salary": "85000",
///     "hire_date": "2021-03-01",
///     "attributes": { "union_member": false }
/// }"#).unwrap();
///
/// assert_eq!(employee.department.as_deref(), Some("Engineering"));
/// assert!(employee.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmployeeData {
    /// Unique identifier for the employee.
    pub id: String,
    /// Department or cost-centre name.
    #[serde(default)]
    pub department: Option<String>,
    /// Job level or grade (e.g. "L4").
    #[serde(default)]
    pub level: Option<String>,
    /// Job title.
    #[serde(default)]
    pub title: Option<String>,
    /// Work location.
    #[serde(default)]
    pub location: Option<String>,
    /// Employment type (e.g. "full_time", "part_time").
    #[serde(default)]
    pub employment_type: Option<String>,
    /// Current annual base salary.
    #[serde(default)]
    pub base_salary: Option<Decimal>,
    /// ISO currency code for all monetary fields.
    #[serde(default)]
    pub currency: Option<String>,
    /// First day of employment.
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
    /// First day the employee is no longer employed.
    #[serde(default)]
    pub termination_date: Option<NaiveDate>,
    /// Most recent performance rating.
    #[serde(default)]
    pub performance_rating: Option<Decimal>,
    /// Identifier of the employee's manager.
    #[serde(default)]
    pub manager_id: Option<String>,
    /// Midpoint of the employee's salary range.
    #[serde(default)]
    pub range_midpoint: Option<Decimal>,
    /// Pre-computed compa-ratio; derived from the range midpoint when absent.
    #[serde(default)]
    pub compa_ratio: Option<Decimal>,
    /// Additional named attributes referenced by rule conditions.
    #[serde(default)]
    pub attributes: BTreeMap<String, FieldValue>,
}

impl EmployeeData {
    /// Creates a record with only an id set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Returns the compa-ratio, computing `base_salary / range_midpoint` when
    /// it was not supplied.
    pub fn effective_compa_ratio(&self) -> Option<Decimal> {
        if let Some(ratio) = self.compa_ratio {
            return Some(ratio);
        }
        match (self.base_salary, self.range_midpoint) {
            (Some(salary), Some(midpoint)) if !midpoint.is_zero() => salary.checked_div(midpoint),
            _ => None,
        }
    }

    /// Checks that the record can be reported on.
    ///
    /// Evaluation itself accepts any record; callers that key results by
    /// employee (the API and population simulation) reject records without an
    /// id.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidEmployee`] when the id is empty or blank.
    pub fn validate(&self) -> EngineResult<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::InvalidEmployee {
                field: "id".to_string(),
                message: "employee id must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_deserialize_minimal_employee() {
        let employee: EmployeeData = serde_json::from_str(r#"{"id": "emp_001"}"#).unwrap();
        assert_eq!(employee.id, "emp_001");
        assert!(employee.base_salary.is_none());
        assert!(employee.attributes.is_empty());
    }

    #[test]
    fn test_deserialize_full_employee() {
        let json = r#"{
            "id": "emp_002",
            "department": "Sales",
            "level": "L3",
            "base_salary": "72000.00",
            "currency": "USD",
            "hire_date": "2025-07-01",
            "termination_date": "2026-02-01",
            "performance_rating": "4",
            "attributes": { "region": "EMEA", "tenure_years": 3 }
        }"#;

        let employee: EmployeeData = serde_json::from_str(json).unwrap();
        assert_eq!(employee.base_salary, Some(dec("72000")));
        assert_eq!(
            employee.hire_date,
            Some(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap())
        );
        assert_eq!(
            employee.attributes.get("tenure_years"),
            Some(&FieldValue::Number(dec("3")))
        );
    }

    #[test]
    fn test_compa_ratio_derived_from_midpoint() {
        let mut employee = EmployeeData::new("emp_001");
        employee.base_salary = Some(dec("90000"));
        employee.range_midpoint = Some(dec("100000"));
        assert_eq!(employee.effective_compa_ratio(), Some(dec("0.9")));
    }

    #[test]
    fn test_supplied_compa_ratio_wins() {
        let mut employee = EmployeeData::new("emp_001");
        employee.base_salary = Some(dec("90000"));
        employee.range_midpoint = Some(dec("100000"));
        employee.compa_ratio = Some(dec("1.1"));
        assert_eq!(employee.effective_compa_ratio(), Some(dec("1.1")));
    }

    #[test]
    fn test_compa_ratio_absent_with_zero_midpoint() {
        let mut employee = EmployeeData::new("emp_001");
        employee.base_salary = Some(dec("90000"));
        employee.range_midpoint = Some(Decimal::ZERO);
        assert_eq!(employee.effective_compa_ratio(), None);
    }

    #[test]
    fn test_blank_id_is_invalid() {
        assert!(EmployeeData::new("emp_001").validate().is_ok());
        for id in ["", "   "] {
            assert!(matches!(
                EmployeeData::new(id).validate(),
                Err(EngineError::InvalidEmployee { ref field, .. }) if field == "id"
            ));
        }
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut employee = EmployeeData::new("emp_003");
        employee.department = Some("Finance".to_string());
        employee
            .attributes
            .insert("remote".to_string(), FieldValue::Bool(true));

        let json = serde_json::to_string(&employee).unwrap();
        let back: EmployeeData = serde_json::from_str(&json).unwrap();
        assert_eq!(employee, back);
    }
}
