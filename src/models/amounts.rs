//! Running compensation amounts carried through an evaluation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A compensation component that value-producing actions write to and
/// CAP/FLOOR/PRORATION actions read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompTarget {
    /// Merit increase to base salary.
    Merit,
    /// Cash bonus.
    Bonus,
    /// Long-term incentive.
    Lti,
}

impl CompTarget {
    /// Parses a target name, ignoring case.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "merit" => Some(CompTarget::Merit),
            "bonus" => Some(CompTarget::Bonus),
            "lti" => Some(CompTarget::Lti),
            _ => None,
        }
    }

    /// The target's name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompTarget::Merit => "merit",
            CompTarget::Bonus => "bonus",
            CompTarget::Lti => "lti",
        }
    }
}

/// The running state of an employee's compensation during one evaluation.
///
/// `base_salary` is the salary before any change. Component amounts are
/// `None` until an action sets them.
///
/// # Example
///
/// ```
/// use comp_engine::models::{CompTarget, CurrentAmounts};
/// use rust_decimal::Decimal;
///
/// let mut amounts = CurrentAmounts::new(Some(Decimal::new(80000, 0)));
/// amounts.set(CompTarget::Merit, Decimal::new(2400, 0));
/// assert_eq!(amounts.get(CompTarget::Merit), Some(Decimal::new(2400, 0)));
/// assert_eq!(amounts.get(CompTarget::Bonus), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAmounts {
    /// Base salary before the cycle's changes.
    pub base_salary: Option<Decimal>,
    /// Merit increase amount.
    pub merit: Option<Decimal>,
    /// Bonus payout.
    pub bonus: Option<Decimal>,
    /// Long-term incentive grant value.
    pub lti: Option<Decimal>,
}

impl CurrentAmounts {
    /// Starts from a base salary with no components set.
    pub fn new(base_salary: Option<Decimal>) -> Self {
        Self {
            base_salary,
            ..Self::default()
        }
    }

    /// Reads a component.
    pub fn get(&self, target: CompTarget) -> Option<Decimal> {
        match target {
            CompTarget::Merit => self.merit,
            CompTarget::Bonus => self.bonus,
            CompTarget::Lti => self.lti,
        }
    }

    /// Overwrites a component.
    pub fn set(&mut self, target: CompTarget, amount: Decimal) {
        match target {
            CompTarget::Merit => self.merit = Some(amount),
            CompTarget::Bonus => self.bonus = Some(amount),
            CompTarget::Lti => self.lti = Some(amount),
        }
    }

    /// Clears every component, keeping the base salary.
    pub fn clear_components(&mut self) {
        self.merit = None;
        self.bonus = None;
        self.lti = None;
    }
}

/// A before/after pair for one compensation value.
///
/// Merit retro pay is computed from the salary change a merit increase
/// produces.
///
/// # Example
///
/// ```
/// use comp_engine::models::SalaryChange;
/// use rust_decimal::Decimal;
///
/// let change = SalaryChange::apply(Decimal::new(60000, 0), Decimal::new(1800, 0)).unwrap();
/// assert_eq!(change.new_amount, Decimal::new(61800, 0));
/// assert!(SalaryChange::apply(Decimal::MAX, Decimal::ONE).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryChange {
    /// Value before the change.
    pub old_amount: Decimal,
    /// Value after the change.
    pub new_amount: Decimal,
}

impl SalaryChange {
    /// Applies an increase to a value. `None` if the result overflows.
    pub fn apply(old_amount: Decimal, increase: Decimal) -> Option<Self> {
        Some(Self {
            old_amount,
            new_amount: old_amount.checked_add(increase)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_parse_ignores_case() {
        assert_eq!(CompTarget::parse("MERIT"), Some(CompTarget::Merit));
        assert_eq!(CompTarget::parse("Lti"), Some(CompTarget::Lti));
        assert_eq!(CompTarget::parse("equity"), None);
    }

    #[test]
    fn test_set_overwrites_component() {
        let mut amounts = CurrentAmounts::new(Some(Decimal::new(50000, 0)));
        amounts.set(CompTarget::Bonus, Decimal::new(1000, 0));
        amounts.set(CompTarget::Bonus, Decimal::new(2500, 0));
        assert_eq!(amounts.get(CompTarget::Bonus), Some(Decimal::new(2500, 0)));
        assert_eq!(amounts.get(CompTarget::Merit), None);
    }

    #[test]
    fn test_salary_change_applies_increase() {
        let change = SalaryChange::apply(Decimal::new(60000, 0), Decimal::new(1800, 0)).unwrap();
        assert_eq!(change.old_amount, Decimal::new(60000, 0));
        assert_eq!(change.new_amount, Decimal::new(61800, 0));
    }

    #[test]
    fn test_salary_change_overflow_is_none() {
        assert!(SalaryChange::apply(Decimal::MAX, Decimal::new(1, 0)).is_none());
        assert!(SalaryChange::apply(Decimal::MIN, Decimal::new(-1, 0)).is_none());
    }

    #[test]
    fn test_clear_components_keeps_base() {
        let mut amounts = CurrentAmounts::new(Some(Decimal::new(60000, 0)));
        amounts.set(CompTarget::Merit, Decimal::new(1800, 0));
        amounts.set(CompTarget::Lti, Decimal::new(9000, 0));
        amounts.clear_components();
        assert_eq!(amounts, CurrentAmounts::new(Some(Decimal::new(60000, 0))));
    }
}
