//! Retroactive adjustment calculation.
//!
//! When a change is processed after its effective date, the employee is owed
//! the difference for every pay period already paid at the old amount. The
//! difference is computed and rounded per pay period so each row matches the
//! correcting entry a payroll system would issue.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{DEFAULT_DECIMAL_PLACES, days_between, round_amount};
use crate::models::{PayPeriod, RetroAdjustment, RetroBreakdown};

/// Calculates back-pay with the default currency precision.
///
/// See [`calculate_retro_adjustment_with_precision`].
///
/// # Example
///
/// ```
/// use comp_engine::calculation::calculate_retro_adjustment;
/// use comp_engine::models::PayPeriod;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let date = |m, d| NaiveDate::from_ymd_opt(2025, m, d).unwrap();
/// let periods = vec![
///     PayPeriod::new(date(1, 1), date(2, 1)),
///     PayPeriod::new(date(2, 1), date(3, 1)),
///     PayPeriod::new(date(3, 1), date(4, 1)),
/// ];
///
/// let retro = calculate_retro_adjustment(
///     Decimal::new(5000, 0),
///     Decimal::new(5300, 0),
///     date(1, 1),
///     date(3, 1),
///     &periods,
/// );
///
/// assert_eq!(retro.breakdown.len(), 2);
/// assert_eq!(retro.total, Decimal::new(600, 0));
/// ```
pub fn calculate_retro_adjustment(
    old_amount: Decimal,
    new_amount: Decimal,
    effective_date: NaiveDate,
    calculation_date: NaiveDate,
    pay_periods: &[PayPeriod],
) -> RetroAdjustment {
    calculate_retro_adjustment_with_precision(
        old_amount,
        new_amount,
        effective_date,
        calculation_date,
        pay_periods,
        DEFAULT_DECIMAL_PLACES,
    )
}

/// Calculates the back-pay owed for the retro window
/// `[effective_date, calculation_date)`.
///
/// # Arguments
///
/// * `old_amount` - Pay per period under the old rate
/// * `new_amount` - Pay per period under the new rate
/// * `effective_date` - First day the new rate applies
/// * `calculation_date` - Date the change is processed
/// * `pay_periods` - Candidate pay periods, in any order
/// * `decimal_places` - Precision each period's amounts are rounded to
///
/// # Returns
///
/// A [`RetroAdjustment`] with one breakdown row per pay period overlapping the
/// window, ordered by period start. Each period's old and new amounts are
/// prorated by the covered share of the period and rounded before the delta is
/// taken; the total is the sum of the deltas. When `effective_date` is on or
/// after `calculation_date` the breakdown is empty and the total is zero.
/// Empty or inverted periods and duplicate periods are ignored.
pub fn calculate_retro_adjustment_with_precision(
    old_amount: Decimal,
    new_amount: Decimal,
    effective_date: NaiveDate,
    calculation_date: NaiveDate,
    pay_periods: &[PayPeriod],
    decimal_places: u32,
) -> RetroAdjustment {
    let mut adjustment = RetroAdjustment::empty(effective_date, calculation_date);
    if effective_date >= calculation_date {
        return adjustment;
    }

    let mut periods: Vec<PayPeriod> = pay_periods
        .iter()
        .copied()
        .filter(|period| !period.is_empty())
        .collect();
    periods.sort();
    periods.dedup();

    for period in periods {
        let covered_start = period.start_date.max(effective_date);
        let covered_end = period.end_date.min(calculation_date);
        let days_covered = days_between(covered_start, covered_end);
        if days_covered == 0 {
            continue;
        }

        let days_in_period = period.days();
        let share = Decimal::from(days_covered) / Decimal::from(days_in_period);
        let old_part = round_amount(old_amount * share, decimal_places);
        let new_part = round_amount(new_amount * share, decimal_places);
        let delta = new_part.saturating_sub(old_part);

        adjustment.total = adjustment.total.saturating_add(delta);
        adjustment.breakdown.push(RetroBreakdown {
            period_start: period.start_date,
            period_end: period.end_date,
            days_in_period,
            days_covered,
            old_amount: old_part,
            new_amount: new_part,
            delta,
        });
    }

    adjustment
}
