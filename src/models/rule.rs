//! Rule set, rule, condition and action models.
//!
//! Conditions and actions arrive in a loose JSON shape (`{field, operator,
//! value}` and `{type, params}`). They are parsed once, when the rule set is
//! deserialized, into closed enums with typed operands. Anything that cannot be
//! parsed becomes an `Invalid` operator or a `Malformed` action which fails at
//! evaluation time, so one bad rule never prevents a rule set from loading.

use std::collections::HashSet;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::field::{decimal_from_json, decimal_to_json};
use super::{CompTarget, FieldValue};
use crate::error::{EngineError, EngineResult};

/// A compiled regular expression that remembers its source pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles a pattern.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            source: source.to_string(),
            regex: Regex::new(source)?,
        })
    }

    /// The pattern text as written in the rule.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Tests the pattern against a string.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// A condition operator with its typed operand.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionOperator {
    /// Deep equality.
    Eq(FieldValue),
    /// Deep inequality.
    Neq(FieldValue),
    /// Numeric greater-than.
    Gt(Decimal),
    /// Numeric greater-than-or-equal.
    Gte(Decimal),
    /// Numeric less-than.
    Lt(Decimal),
    /// Numeric less-than-or-equal.
    Lte(Decimal),
    /// Membership in a list.
    In(Vec<FieldValue>),
    /// Non-membership in a list.
    NotIn(Vec<FieldValue>),
    /// Half-open numeric range `[low, high)`.
    Between {
        /// Inclusive lower bound.
        low: Decimal,
        /// Exclusive upper bound.
        high: Decimal,
    },
    /// Substring test.
    Contains(String),
    /// Prefix test.
    StartsWith(String),
    /// Regular-expression test.
    Matches(Pattern),
    /// An operator that could not be parsed. Always fails.
    Invalid {
        /// The operator as written.
        operator: String,
        /// The operand as written.
        value: Value,
        /// Why it could not be parsed.
        reason: String,
    },
}

impl ConditionOperator {
    /// Parses an operator name and its raw operand.
    pub fn parse(operator: &str, value: Value) -> Self {
        let invalid = |reason: String, value: Value| ConditionOperator::Invalid {
            operator: operator.to_string(),
            value,
            reason,
        };

        match operator {
            "eq" | "neq" => match FieldValue::from_json(&value) {
                Ok(v) if operator == "eq" => ConditionOperator::Eq(v),
                Ok(v) => ConditionOperator::Neq(v),
                Err(reason) => invalid(reason, value),
            },
            "gt" | "gte" | "lt" | "lte" => match decimal_from_json(&value) {
                Some(n) => match operator {
                    "gt" => ConditionOperator::Gt(n),
                    "gte" => ConditionOperator::Gte(n),
                    "lt" => ConditionOperator::Lt(n),
                    _ => ConditionOperator::Lte(n),
                },
                None => invalid(format!("'{}' requires a numeric value", operator), value),
            },
            "in" | "notIn" => {
                let items = match &value {
                    Value::Array(items) => items
                        .iter()
                        .map(FieldValue::from_json)
                        .collect::<Result<Vec<_>, _>>(),
                    _ => Err(format!("'{}' requires an array value", operator)),
                };
                match items {
                    Ok(items) if operator == "in" => ConditionOperator::In(items),
                    Ok(items) => ConditionOperator::NotIn(items),
                    Err(reason) => invalid(reason, value),
                }
            }
            "between" => {
                let bounds = match &value {
                    Value::Array(items) if items.len() == 2 => {
                        decimal_from_json(&items[0]).zip(decimal_from_json(&items[1]))
                    }
                    _ => None,
                };
                match bounds {
                    Some((low, high)) => ConditionOperator::Between { low, high },
                    None => invalid(
                        "'between' requires an array of two numbers".to_string(),
                        value,
                    ),
                }
            }
            "contains" | "startsWith" => match value.as_str() {
                Some(s) if operator == "contains" => ConditionOperator::Contains(s.to_string()),
                Some(s) => ConditionOperator::StartsWith(s.to_string()),
                None => invalid(format!("'{}' requires a string value", operator), value),
            },
            "matches" => match value.as_str().map(Pattern::new) {
                Some(Ok(pattern)) => ConditionOperator::Matches(pattern),
                Some(Err(err)) => invalid(format!("invalid pattern: {}", err), value),
                None => invalid("'matches' requires a pattern string".to_string(), value),
            },
            other => invalid(format!("unsupported operator '{}'", other), value),
        }
    }

    /// The operator name as written in rule definitions.
    pub fn name(&self) -> &str {
        match self {
            ConditionOperator::Eq(_) => "eq",
            ConditionOperator::Neq(_) => "neq",
            ConditionOperator::Gt(_) => "gt",
            ConditionOperator::Gte(_) => "gte",
            ConditionOperator::Lt(_) => "lt",
            ConditionOperator::Lte(_) => "lte",
            ConditionOperator::In(_) => "in",
            ConditionOperator::NotIn(_) => "notIn",
            ConditionOperator::Between { .. } => "between",
            ConditionOperator::Contains(_) => "contains",
            ConditionOperator::StartsWith(_) => "startsWith",
            ConditionOperator::Matches(_) => "matches",
            ConditionOperator::Invalid { operator, .. } => operator,
        }
    }

    /// The operand in its JSON form, as recorded in audit entries.
    pub fn operand(&self) -> Value {
        match self {
            ConditionOperator::Eq(v) | ConditionOperator::Neq(v) => v.to_json(),
            ConditionOperator::Gt(n)
            | ConditionOperator::Gte(n)
            | ConditionOperator::Lt(n)
            | ConditionOperator::Lte(n) => decimal_to_json(*n),
            ConditionOperator::In(items) | ConditionOperator::NotIn(items) => {
                Value::Array(items.iter().map(FieldValue::to_json).collect())
            }
            ConditionOperator::Between { low, high } => {
                Value::Array(vec![decimal_to_json(*low), decimal_to_json(*high)])
            }
            ConditionOperator::Contains(s) | ConditionOperator::StartsWith(s) => {
                Value::String(s.clone())
            }
            ConditionOperator::Matches(pattern) => Value::String(pattern.as_str().to_string()),
            ConditionOperator::Invalid { value, .. } => value.clone(),
        }
    }
}

/// A single `{field, operator, value}` test against an employee record.
///
/// # Example
///
/// ```
/// use comp_engine::models::{ConditionOperator, RuleCondition};
///
/// let condition: RuleCondition = serde_json::from_str(
///     r#"{"field": "performance_rating", "operator": "between", "value": [3, 5]}"#,
/// ).unwrap();
/// assert!(matches!(condition.operator, ConditionOperator::Between { .. }));
///
/// let unknown: RuleCondition = serde_json::from_str(
///     r#"{"field": "level", "operator": "near", "value": "L4"}"#,
/// ).unwrap();
/// assert!(matches!(unknown.operator, ConditionOperator::Invalid { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCondition", into = "RawCondition")]
pub struct RuleCondition {
    /// Name of the employee field to test.
    pub field: String,
    /// Operator and typed operand.
    pub operator: ConditionOperator,
}

impl RuleCondition {
    /// Builds a condition from its loose form.
    pub fn new(field: impl Into<String>, operator: &str, value: Value) -> Self {
        Self {
            field: field.into(),
            operator: ConditionOperator::parse(operator, value),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawCondition {
    field: String,
    operator: String,
    #[serde(default)]
    value: Value,
}

impl From<RawCondition> for RuleCondition {
    fn from(raw: RawCondition) -> Self {
        RuleCondition::new(raw.field, &raw.operator, raw.value)
    }
}

impl From<RuleCondition> for RawCondition {
    fn from(condition: RuleCondition) -> Self {
        RawCondition {
            operator: condition.operator.name().to_string(),
            value: condition.operator.operand(),
            field: condition.field,
        }
    }
}

/// The type tag of a rule action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    /// Merit increase to base salary.
    Merit,
    /// Cash bonus.
    Bonus,
    /// Long-term incentive grant.
    Lti,
    /// Prorate a previously computed amount.
    Proration,
    /// Clamp an amount to a maximum.
    Cap,
    /// Clamp an amount to a minimum.
    Floor,
    /// Eligible / ineligible determination.
    Eligibility,
    /// Caller-supplied handler.
    Custom,
}

impl ActionType {
    /// Parses a type tag, ignoring case.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "MERIT" => Some(ActionType::Merit),
            "BONUS" => Some(ActionType::Bonus),
            "LTI" => Some(ActionType::Lti),
            "PRORATION" => Some(ActionType::Proration),
            "CAP" => Some(ActionType::Cap),
            "FLOOR" => Some(ActionType::Floor),
            "ELIGIBILITY" => Some(ActionType::Eligibility),
            "CUSTOM" => Some(ActionType::Custom),
            _ => None,
        }
    }

    /// The canonical type tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Merit => "MERIT",
            ActionType::Bonus => "BONUS",
            ActionType::Lti => "LTI",
            ActionType::Proration => "PRORATION",
            ActionType::Cap => "CAP",
            ActionType::Floor => "FLOOR",
            ActionType::Eligibility => "ELIGIBILITY",
            ActionType::Custom => "CUSTOM",
        }
    }
}

/// How a value-producing action computes its amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueChange {
    /// Percent of the current base salary (`3` means 3%).
    Percentage(Decimal),
    /// Flat amount.
    Amount(Decimal),
}

/// Parameters for MERIT, BONUS and LTI actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompensationParams {
    /// How the amount is computed.
    pub change: ValueChange,
    /// Effective date of the change; earlier than the calculation date means
    /// back-pay is owed.
    pub effective_date: Option<NaiveDate>,
}

/// Parameters for PRORATION actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProrationParams {
    /// The amount to prorate.
    pub target: CompTarget,
    /// Period start; defaults to the cycle period from the context.
    pub period_start: Option<NaiveDate>,
    /// Period end; defaults to the cycle period from the context.
    pub period_end: Option<NaiveDate>,
}

/// The limit of a CAP or FLOOR action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundLimit {
    /// Absolute amount.
    Amount(Decimal),
    /// Percent of the current base salary.
    Percentage(Decimal),
}

/// Parameters for CAP and FLOOR actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundParams {
    /// The amount being clamped.
    pub target: CompTarget,
    /// The bound.
    pub limit: BoundLimit,
}

/// Parameters for ELIGIBILITY actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityParams {
    /// Whether the employee is eligible.
    pub eligible: bool,
    /// Explanation recorded in the decision.
    pub reason: Option<String>,
}

/// Parameters for CUSTOM actions.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomParams {
    /// Registry key of the handler.
    pub handler: String,
}

/// The parsed form of a rule action.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionKind {
    /// Merit increase.
    Merit(CompensationParams),
    /// Bonus.
    Bonus(CompensationParams),
    /// Long-term incentive.
    Lti(CompensationParams),
    /// Proration of a computed amount.
    Proration(ProrationParams),
    /// Maximum bound.
    Cap(BoundParams),
    /// Minimum bound.
    Floor(BoundParams),
    /// Eligibility determination.
    Eligibility(EligibilityParams),
    /// Custom handler.
    Custom(CustomParams),
    /// An action that could not be parsed. Always fails.
    Malformed {
        /// Parsed type, when the tag itself was recognized.
        action_type: Option<ActionType>,
        /// Why it could not be parsed.
        reason: String,
    },
}

/// A `{type, params}` action attached to a rule.
///
/// The raw tag and params are kept alongside the parsed form so custom
/// handlers can read their own keys and the action serializes as written.
///
/// # Example
///
/// ```
/// use comp_engine::models::{ActionKind, RuleAction};
/// use serde_json::json;
///
/// let action = RuleAction::new("MERIT", json!({"percentage": 3.5}));
/// assert!(matches!(action.kind(), ActionKind::Merit(_)));
///
/// let broken = RuleAction::new("CAP", json!({}));
/// assert!(matches!(broken.kind(), ActionKind::Malformed { .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawAction", into = "RawAction")]
pub struct RuleAction {
    tag: String,
    params: Map<String, Value>,
    kind: ActionKind,
}

impl RuleAction {
    /// Builds an action from its type tag and params object.
    ///
    /// Params that are not a JSON object are treated as empty.
    pub fn new(tag: &str, params: Value) -> Self {
        let params = match params {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let kind = parse_action(tag, &params);
        Self {
            tag: tag.to_string(),
            params,
            kind,
        }
    }

    /// The parsed action.
    pub fn kind(&self) -> &ActionKind {
        &self.kind
    }

    /// The raw params object.
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// The type tag as written.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The recognized action type, if any.
    pub fn action_type(&self) -> Option<ActionType> {
        match &self.kind {
            ActionKind::Merit(_) => Some(ActionType::Merit),
            ActionKind::Bonus(_) => Some(ActionType::Bonus),
            ActionKind::Lti(_) => Some(ActionType::Lti),
            ActionKind::Proration(_) => Some(ActionType::Proration),
            ActionKind::Cap(_) => Some(ActionType::Cap),
            ActionKind::Floor(_) => Some(ActionType::Floor),
            ActionKind::Eligibility(_) => Some(ActionType::Eligibility),
            ActionKind::Custom(_) => Some(ActionType::Custom),
            ActionKind::Malformed { action_type, .. } => *action_type,
        }
    }

    /// True for CAP and FLOOR, which run after all value-producing actions.
    pub fn is_bound(&self) -> bool {
        matches!(self.kind, ActionKind::Cap(_) | ActionKind::Floor(_))
    }
}

#[derive(Serialize, Deserialize)]
struct RawAction {
    #[serde(rename = "type")]
    action_type: String,
    #[serde(default)]
    params: Value,
}

impl From<RawAction> for RuleAction {
    fn from(raw: RawAction) -> Self {
        RuleAction::new(&raw.action_type, raw.params)
    }
}

impl From<RuleAction> for RawAction {
    fn from(action: RuleAction) -> Self {
        RawAction {
            action_type: action.tag,
            params: Value::Object(action.params),
        }
    }
}

/// Looks up a param under its snake_case or camelCase spelling.
fn param<'a>(params: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| params.get(*name))
}

fn date_param(params: &Map<String, Value>, names: &[&str]) -> Result<Option<NaiveDate>, String> {
    match param(params, names) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| format!("'{}' must be a YYYY-MM-DD date", names[0])),
        Some(_) => Err(format!("'{}' must be a YYYY-MM-DD date", names[0])),
    }
}

fn decimal_param(params: &Map<String, Value>, names: &[&str]) -> Result<Option<Decimal>, String> {
    match param(params, names) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => decimal_from_json(value)
            .map(Some)
            .ok_or_else(|| format!("'{}' must be numeric", names[0])),
    }
}

fn target_param(params: &Map<String, Value>, default: CompTarget) -> Result<CompTarget, String> {
    match param(params, &["target"]) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::String(s)) => {
            CompTarget::parse(s).ok_or_else(|| format!("unknown target '{}'", s))
        }
        Some(_) => Err("'target' must be a string".to_string()),
    }
}

fn parse_compensation(params: &Map<String, Value>) -> Result<CompensationParams, String> {
    let percentage = decimal_param(params, &["percentage"])?;
    let amount = decimal_param(params, &["amount"])?;
    let change = match (percentage, amount) {
        (Some(pct), _) => ValueChange::Percentage(pct),
        (None, Some(amount)) => ValueChange::Amount(amount),
        (None, None) => return Err("missing 'percentage' or 'amount'".to_string()),
    };
    Ok(CompensationParams {
        change,
        effective_date: date_param(params, &["effective_date", "effectiveDate"])?,
    })
}

fn parse_proration(params: &Map<String, Value>) -> Result<ProrationParams, String> {
    Ok(ProrationParams {
        target: target_param(params, CompTarget::Bonus)?,
        period_start: date_param(params, &["period_start", "periodStart"])?,
        period_end: date_param(params, &["period_end", "periodEnd"])?,
    })
}

fn parse_bound(
    params: &Map<String, Value>,
    amount_key: &str,
    percentage_keys: &[&str],
) -> Result<BoundParams, String> {
    let limit = match (
        decimal_param(params, &[amount_key])?,
        decimal_param(params, percentage_keys)?,
    ) {
        (Some(amount), _) => BoundLimit::Amount(amount),
        (None, Some(pct)) => BoundLimit::Percentage(pct),
        (None, None) => {
            return Err(format!(
                "missing '{}' or '{}'",
                amount_key, percentage_keys[1]
            ));
        }
    };
    Ok(BoundParams {
        target: target_param(params, CompTarget::Merit)?,
        limit,
    })
}

fn parse_action(tag: &str, params: &Map<String, Value>) -> ActionKind {
    let Some(action_type) = ActionType::parse(tag) else {
        return ActionKind::Malformed {
            action_type: None,
            reason: format!("unknown action type '{}'", tag),
        };
    };

    let parsed = match action_type {
        ActionType::Merit => parse_compensation(params).map(ActionKind::Merit),
        ActionType::Bonus => parse_compensation(params).map(ActionKind::Bonus),
        ActionType::Lti => parse_compensation(params).map(ActionKind::Lti),
        ActionType::Proration => parse_proration(params).map(ActionKind::Proration),
        ActionType::Cap => {
            parse_bound(params, "max", &["max_percentage", "maxPercentage"]).map(ActionKind::Cap)
        }
        ActionType::Floor => {
            parse_bound(params, "min", &["min_percentage", "minPercentage"]).map(ActionKind::Floor)
        }
        ActionType::Eligibility => match param(params, &["eligible"]) {
            Some(Value::Bool(eligible)) => Ok(ActionKind::Eligibility(EligibilityParams {
                eligible: *eligible,
                reason: param(params, &["reason"])
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })),
            Some(_) => Err("'eligible' must be a boolean".to_string()),
            None => Err("missing 'eligible'".to_string()),
        },
        ActionType::Custom => match param(params, &["custom_handler", "customHandler"]) {
            Some(Value::String(handler)) => Ok(ActionKind::Custom(CustomParams {
                handler: handler.clone(),
            })),
            _ => Err("missing 'customHandler'".to_string()),
        },
    };

    parsed.unwrap_or_else(|reason| ActionKind::Malformed {
        action_type: Some(action_type),
        reason,
    })
}

/// Classification of a rule, used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    /// Merit increase rules.
    Merit,
    /// Bonus rules.
    Bonus,
    /// Long-term incentive rules.
    Lti,
    /// Proration rules.
    Proration,
    /// Cap rules.
    Cap,
    /// Floor rules.
    Floor,
    /// Eligibility rules.
    Eligibility,
    /// Anything else, including classifications this engine does not know.
    #[default]
    #[serde(other)]
    Custom,
}

fn default_enabled() -> bool {
    true
}

/// A prioritized rule: AND-combined conditions and ordered actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique name within the rule set.
    pub name: String,
    /// Reporting classification.
    #[serde(default, alias = "ruleType")]
    pub rule_type: RuleType,
    /// Lower priorities are evaluated first.
    #[serde(default)]
    pub priority: i32,
    /// Conditions that must all pass for the rule to fire.
    #[serde(default)]
    pub conditions: Vec<RuleCondition>,
    /// Actions executed in order when the rule fires.
    #[serde(default)]
    pub actions: Vec<RuleAction>,
    /// Disabled rules are not evaluated.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// A named, dated collection of rules.
///
/// # Example
///
/// ```
/// use comp_engine::models::RuleSet;
///
/// let rule_set: RuleSet = serde_json::from_str(r#"{
///     "name": "cycle_2025",
///     "effectiveDate": "2025-04-01",
///     "rules": [
///         {"name": "late", "priority": 10, "actions": []},
///         {"name": "early", "priority": 0, "actions": []},
///         {"name": "off", "priority": 0, "enabled": false}
///     ]
/// }"#).unwrap();
///
/// let order: Vec<&str> = rule_set.ordered_rules().iter().map(|r| r.name.as_str()).collect();
/// assert_eq!(order, vec!["early", "late"]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Rule set name.
    pub name: String,
    /// Date the rule set takes effect.
    #[serde(alias = "effectiveDate")]
    pub effective_date: NaiveDate,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Rules in declaration order.
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Checks the structural invariants evaluation relies on: a non-empty
    /// rule set name and unique, non-empty rule names.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: String| EngineError::InvalidRuleSet {
            rule_set: self.name.clone(),
            message,
        };

        if self.name.trim().is_empty() {
            return Err(invalid("rule set name must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.name.trim().is_empty() {
                return Err(invalid(format!("rule at index {} has no name", index)));
            }
            if !seen.insert(rule.name.as_str()) {
                return Err(invalid(format!("duplicate rule name '{}'", rule.name)));
            }
        }
        Ok(())
    }

    /// Enabled rules sorted by ascending priority. Ties keep declaration order.
    pub fn ordered_rules(&self) -> Vec<&Rule> {
        let mut rules: Vec<&Rule> = self.rules.iter().filter(|r| r.enabled).collect();
        rules.sort_by_key(|r| r.priority);
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn rule(name: &str, priority: i32) -> Rule {
        Rule {
            name: name.to_string(),
            rule_type: RuleType::Merit,
            priority,
            conditions: vec![],
            actions: vec![],
            enabled: true,
        }
    }

    #[test]
    fn test_parse_scalar_operators() {
        assert_eq!(
            ConditionOperator::parse("eq", json!("Sales")),
            ConditionOperator::Eq(FieldValue::Text("Sales".to_string()))
        );
        assert_eq!(
            ConditionOperator::parse("gte", json!(3)),
            ConditionOperator::Gte(dec("3"))
        );
        assert_eq!(
            ConditionOperator::parse("lt", json!("4.5")),
            ConditionOperator::Lt(dec("4.5"))
        );
    }

    #[test]
    fn test_parse_between_requires_two_numbers() {
        assert_eq!(
            ConditionOperator::parse("between", json!([0.8, 1.2])),
            ConditionOperator::Between {
                low: dec("0.8"),
                high: dec("1.2")
            }
        );
        assert!(matches!(
            ConditionOperator::parse("between", json!([1])),
            ConditionOperator::Invalid { .. }
        ));
    }

    #[test]
    fn test_parse_in_requires_array() {
        assert!(matches!(
            ConditionOperator::parse("in", json!("Sales")),
            ConditionOperator::Invalid { .. }
        ));
        assert_eq!(
            ConditionOperator::parse("notIn", json!(["L1", "L2"])),
            ConditionOperator::NotIn(vec!["L1".into(), "L2".into()])
        );
    }

    #[test]
    fn test_bad_regex_is_invalid_not_error() {
        let operator = ConditionOperator::parse("matches", json!("(unclosed"));
        match operator {
            ConditionOperator::Invalid { reason, .. } => assert!(reason.contains("pattern")),
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_operator_keeps_raw_form() {
        let condition: RuleCondition =
            serde_json::from_str(r#"{"field": "level", "operator": "near", "value": "L4"}"#)
                .unwrap();
        assert_eq!(condition.operator.name(), "near");
        assert_eq!(condition.operator.operand(), json!("L4"));
    }

    #[test]
    fn test_condition_serializes_in_loose_shape() {
        let condition = RuleCondition::new("level", "in", json!(["L3", "L4"]));
        let json = serde_json::to_value(&condition).unwrap();
        assert_eq!(
            json,
            json!({"field": "level", "operator": "in", "value": ["L3", "L4"]})
        );
    }

    #[test]
    fn test_parse_merit_percentage_and_amount() {
        let action = RuleAction::new("MERIT", json!({"percentage": 3}));
        assert_eq!(
            action.kind(),
            &ActionKind::Merit(CompensationParams {
                change: ValueChange::Percentage(dec("3")),
                effective_date: None,
            })
        );

        let action = RuleAction::new(
            "bonus",
            json!({"amount": "1500", "effectiveDate": "2025-01-01"}),
        );
        assert_eq!(
            action.kind(),
            &ActionKind::Bonus(CompensationParams {
                change: ValueChange::Amount(dec("1500")),
                effective_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            })
        );
    }

    #[test]
    fn test_missing_required_param_is_malformed() {
        let action = RuleAction::new("MERIT", json!({"pct": 3}));
        match action.kind() {
            ActionKind::Malformed {
                action_type,
                reason,
            } => {
                assert_eq!(*action_type, Some(ActionType::Merit));
                assert!(reason.contains("percentage"));
            }
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_action_type_is_malformed() {
        let action = RuleAction::new("RAISE", json!({}));
        assert_eq!(action.action_type(), None);
        assert!(matches!(action.kind(), ActionKind::Malformed { .. }));
    }

    #[test]
    fn test_parse_cap_variants() {
        let cap = RuleAction::new("CAP", json!({"max": 5000, "target": "merit"}));
        assert_eq!(
            cap.kind(),
            &ActionKind::Cap(BoundParams {
                target: CompTarget::Merit,
                limit: BoundLimit::Amount(dec("5000")),
            })
        );

        let floor = RuleAction::new("FLOOR", json!({"minPercentage": 2, "target": "bonus"}));
        assert_eq!(
            floor.kind(),
            &ActionKind::Floor(BoundParams {
                target: CompTarget::Bonus,
                limit: BoundLimit::Percentage(dec("2")),
            })
        );
        assert!(floor.is_bound());
    }

    #[test]
    fn test_parse_custom_handler_key() {
        let action = RuleAction::new("CUSTOM", json!({"customHandler": "equity_refresh"}));
        assert_eq!(
            action.kind(),
            &ActionKind::Custom(CustomParams {
                handler: "equity_refresh".to_string()
            })
        );
    }

    #[test]
    fn test_unrecognized_params_are_ignored() {
        let action = RuleAction::new("BONUS", json!({"percentage": 10, "note": "spot"}));
        assert!(matches!(action.kind(), ActionKind::Bonus(_)));
        assert_eq!(action.params().get("note"), Some(&json!("spot")));
    }

    #[test]
    fn test_action_serializes_as_written() {
        let action = RuleAction::new("MERIT", json!({"percentage": 3, "extra": true}));
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(
            json,
            json!({"type": "MERIT", "params": {"percentage": 3, "extra": true}})
        );
    }

    #[test]
    fn test_ordered_rules_stable_by_priority() {
        let rule_set = RuleSet {
            name: "cycle".to_string(),
            effective_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            description: None,
            rules: vec![rule("b", 5), rule("a", 1), rule("c", 5), rule("d", -1)],
        };
        let names: Vec<&str> = rule_set
            .ordered_rules()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["d", "a", "b", "c"]);
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let rule_set = RuleSet {
            name: "cycle".to_string(),
            effective_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            description: None,
            rules: vec![rule("a", 1), rule("a", 2)],
        };
        assert!(matches!(
            rule_set.validate(),
            Err(EngineError::InvalidRuleSet { .. })
        ));
    }

    #[test]
    fn test_empty_rule_is_valid() {
        let rule_set = RuleSet {
            name: "cycle".to_string(),
            effective_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            description: None,
            rules: vec![rule("noop", 0)],
        };
        assert!(rule_set.validate().is_ok());
    }

    #[test]
    fn test_rule_accepts_camel_case_rule_type() {
        let rule: Rule = serde_json::from_str(
            r#"{"name": "deny", "ruleType": "ELIGIBILITY", "priority": 1}"#,
        )
        .unwrap();
        assert_eq!(rule.rule_type, RuleType::Eligibility);
        assert!(rule.enabled);
    }

    #[test]
    fn test_unknown_rule_type_is_custom() {
        let rule_set: RuleSet = serde_json::from_value(json!({
            "name": "cycle",
            "effective_date": "2025-04-01",
            "rules": [
                {"name": "promotion", "rule_type": "PROMOTION"},
                {"name": "merit", "ruleType": "MERIT", "priority": 1}
            ]
        }))
        .unwrap();
        assert_eq!(rule_set.rules.len(), 2);
        assert_eq!(rule_set.rules[0].rule_type, RuleType::Custom);
        assert_eq!(rule_set.rules[1].rule_type, RuleType::Merit);
    }

    #[test]
    fn test_null_params_are_empty() {
        let action: RuleAction =
            serde_json::from_value(json!({"type": "ELIGIBILITY", "params": null})).unwrap();
        assert!(action.params().is_empty());
        assert_eq!(action.action_type(), Some(ActionType::Eligibility));
        assert!(matches!(action.kind(), ActionKind::Malformed { .. }));

        let action: RuleAction = serde_json::from_value(json!({"type": "BONUS"})).unwrap();
        assert_eq!(action.tag(), "BONUS");
        assert!(action.params().is_empty());
    }
}
