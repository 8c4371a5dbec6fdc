//! Scalar values resolved from employee records and rule conditions.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A single typed value that a rule condition can test.
///
/// JSON numbers become [`FieldValue::Number`], ISO `YYYY-MM-DD` strings become
/// [`FieldValue::Date`], other strings become [`FieldValue::Text`].
///
/// # Example
///
/// ```
/// use comp_engine::models::FieldValue;
/// use rust_decimal::Decimal;
///
/// let value: FieldValue = serde_json::from_str("85000").unwrap();
/// assert_eq!(value, FieldValue::Number(Decimal::new(85000, 0)));
///
/// let value: FieldValue = serde_json::from_str("\"2025-07-01\"").unwrap();
/// assert!(matches!(value, FieldValue::Date(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    /// A numeric value. Equality is by value, so `5` equals `5.0`.
    Number(Decimal),
    /// A free-form string.
    Text(String),
    /// A boolean flag.
    Bool(bool),
    /// A calendar date.
    Date(NaiveDate),
}

impl FieldValue {
    /// Converts a JSON scalar into a field value.
    ///
    /// Arrays, objects and `null` are rejected with a description of the
    /// offending type.
    pub fn from_json(value: &Value) -> Result<Self, String> {
        match value {
            Value::Number(n) => decimal_from_json_number(n)
                .map(FieldValue::Number)
                .ok_or_else(|| format!("number {} is out of decimal range", n)),
            Value::String(s) => Ok(match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                Ok(date) => FieldValue::Date(date),
                Err(_) => FieldValue::Text(s.clone()),
            }),
            Value::Bool(b) => Ok(FieldValue::Bool(*b)),
            Value::Null => Err("null is not a comparable value".to_string()),
            Value::Array(_) => Err("expected a scalar, found an array".to_string()),
            Value::Object(_) => Err("expected a scalar, found an object".to_string()),
        }
    }

    /// Converts the value back into its JSON form.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Number(d) => decimal_to_json(*d),
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
        }
    }

    /// Returns the numeric value, if this is a number.
    pub fn as_number(&self) -> Option<Decimal> {
        match self {
            FieldValue::Number(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the string value, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// A short name for the value's type, used in audit reasons.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Number(_) => "number",
            FieldValue::Text(_) => "text",
            FieldValue::Bool(_) => "bool",
            FieldValue::Date(_) => "date",
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(d) => write!(f, "{}", d.normalize()),
            FieldValue::Text(s) => write!(f, "\"{}\"", s),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Date(d) => write!(f, "{}", d),
        }
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        FieldValue::from_json(&value).map_err(serde::de::Error::custom)
    }
}

/// Parses a JSON number into a `Decimal` without passing through `f64` math.
pub(crate) fn decimal_from_json_number(n: &serde_json::Number) -> Option<Decimal> {
    let text = n.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Reads a JSON value as a decimal, accepting numbers and numeric strings.
pub(crate) fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => decimal_from_json_number(n),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

pub(crate) fn decimal_to_json(value: Decimal) -> Value {
    let text = value.normalize().to_string();
    serde_json::Number::from_str(&text)
        .map(Value::Number)
        .unwrap_or(Value::String(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_json_number_becomes_decimal() {
        let value = FieldValue::from_json(&json!(3.5)).unwrap();
        assert_eq!(value, FieldValue::Number(dec("3.5")));
    }

    #[test]
    fn test_numbers_compare_by_value() {
        assert_eq!(
            FieldValue::Number(dec("5")),
            FieldValue::Number(dec("5.00"))
        );
    }

    #[test]
    fn test_iso_string_becomes_date() {
        let value = FieldValue::from_json(&json!("2024-02-29")).unwrap();
        assert_eq!(
            value,
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
    }

    #[test]
    fn test_non_date_string_stays_text() {
        let value = FieldValue::from_json(&json!("Engineering")).unwrap();
        assert_eq!(value.as_text(), Some("Engineering"));
    }

    #[test]
    fn test_null_and_containers_are_rejected() {
        assert!(FieldValue::from_json(&Value::Null).is_err());
        assert!(FieldValue::from_json(&json!([1, 2])).is_err());
        assert!(FieldValue::from_json(&json!({"a": 1})).is_err());
    }

    #[test]
    fn test_number_serializes_as_json_number() {
        let json = serde_json::to_string(&FieldValue::Number(dec("85000.00"))).unwrap();
        assert_eq!(json, "85000");
    }

    #[test]
    fn test_decimal_from_json_accepts_numeric_strings() {
        assert_eq!(decimal_from_json(&json!("12.5")), Some(dec("12.5")));
        assert_eq!(decimal_from_json(&json!(7)), Some(dec("7")));
        assert_eq!(decimal_from_json(&json!("abc")), None);
        assert_eq!(decimal_from_json(&json!(true)), None);
    }

    #[test]
    fn test_display_is_readable() {
        assert_eq!(FieldValue::Number(dec("4.50")).to_string(), "4.5");
        assert_eq!(FieldValue::from("Sales").to_string(), "\"Sales\"");
    }
}
