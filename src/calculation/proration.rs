//! Proration calculation.
//!
//! Scales a full-period amount by the share of the period an employee was
//! eligible for it, given hire, termination, transfer and leave facts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DEFAULT_DECIMAL_PLACES, days_between, round_amount};
use crate::models::{EmployeeData, ProratedAmount};

/// Optional facts that shrink the eligibility window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProrationOptions {
    /// Days of unpaid leave inside the period. Negative values count as zero.
    #[serde(default, alias = "loaDays")]
    pub loa_days: i64,
    /// Date the employee transferred into the eligible population.
    #[serde(default, alias = "transferDate")]
    pub transfer_date: Option<NaiveDate>,
    /// Decimal places the prorated amount is rounded to.
    #[serde(default = "default_decimal_places", alias = "decimalPlaces")]
    pub decimal_places: u32,
}

fn default_decimal_places() -> u32 {
    DEFAULT_DECIMAL_PLACES
}

impl Default for ProrationOptions {
    fn default() -> Self {
        Self {
            loa_days: 0,
            transfer_date: None,
            decimal_places: DEFAULT_DECIMAL_PLACES,
        }
    }
}

/// Calculates the eligible share of `[period_start, period_end)` and the
/// amount it scales `base_amount` to.
///
/// The eligibility window runs from the latest of the period start, hire date
/// and transfer date to the earliest of the period end and termination date.
/// Leave days are subtracted from the window, clamped at zero.
///
/// # Arguments
///
/// * `employee` - Supplies hire and termination dates
/// * `base_amount` - The full-period amount
/// * `period_start` - First day of the period
/// * `period_end` - First day after the period
/// * `options` - Leave days, transfer date and rounding
///
/// # Returns
///
/// A [`ProratedAmount`]. An inverted or empty period yields an all-zero
/// result; an empty eligibility window yields zero eligible days but still
/// reports the period's total days. Only `prorated_amount` is rounded.
///
/// # Example
///
/// ```
/// use comp_engine::calculation::{calculate_proration, ProrationOptions};
/// use comp_engine::models::EmployeeData;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let mut employee = EmployeeData::new("emp_001");
/// employee.hire_date = NaiveDate::from_ymd_opt(2025, 7, 1);
///
/// let result = calculate_proration(
///     &employee,
///     Decimal::new(10000, 0),
///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
///     &ProrationOptions::default(),
/// );
///
/// assert_eq!(result.eligible_days, 184);
/// assert_eq!(result.total_days, 365);
/// assert_eq!(result.prorated_amount, Decimal::new(504110, 2));
/// ```
pub fn calculate_proration(
    employee: &EmployeeData,
    base_amount: Decimal,
    period_start: NaiveDate,
    period_end: NaiveDate,
    options: &ProrationOptions,
) -> ProratedAmount {
    let total_days = days_between(period_start, period_end);
    if total_days == 0 {
        return ProratedAmount::zero(0);
    }

    let window_start = [employee.hire_date, options.transfer_date]
        .into_iter()
        .flatten()
        .fold(period_start, NaiveDate::max);
    let window_end = employee
        .termination_date
        .map_or(period_end, |termination| termination.min(period_end));

    let eligible_days = (days_between(window_start, window_end) - options.loa_days.max(0)).max(0);
    if eligible_days == 0 {
        return ProratedAmount::zero(total_days);
    }

    let proration_factor = Decimal::from(eligible_days) / Decimal::from(total_days);
    let prorated_amount = round_amount(base_amount * proration_factor, options.decimal_places);

    ProratedAmount {
        eligible_days,
        total_days,
        proration_factor,
        prorated_amount,
    }
}
