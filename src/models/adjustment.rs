//! Results of the proration and retro calculators.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The eligible share of a period and the amount it scales to.
///
/// `proration_factor` is kept at full precision; only `prorated_amount` is
/// rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProratedAmount {
    /// Days the employee was eligible.
    pub eligible_days: i64,
    /// Days in the period.
    pub total_days: i64,
    /// `eligible_days / total_days`, between 0 and 1.
    pub proration_factor: Decimal,
    /// `base_amount × proration_factor`, rounded.
    pub prorated_amount: Decimal,
}

impl ProratedAmount {
    /// The result for an invalid or fully ineligible period.
    pub fn zero(total_days: i64) -> Self {
        Self {
            eligible_days: 0,
            total_days,
            proration_factor: Decimal::ZERO,
            prorated_amount: Decimal::ZERO,
        }
    }
}

/// Back-pay for one pay period touched by a retroactive change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetroBreakdown {
    /// First day of the pay period.
    pub period_start: NaiveDate,
    /// First day after the pay period.
    pub period_end: NaiveDate,
    /// Days in the whole pay period.
    pub days_in_period: i64,
    /// Days of the period inside the retro window.
    pub days_covered: i64,
    /// Amount paid under the old rate for the covered days.
    pub old_amount: Decimal,
    /// Amount owed under the new rate for the covered days.
    pub new_amount: Decimal,
    /// `new_amount - old_amount`.
    pub delta: Decimal,
}

/// Total back-pay owed and its per-period breakdown.
///
/// `total` always equals the sum of the breakdown deltas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetroAdjustment {
    /// First day the new amount applies.
    pub effective_date: NaiveDate,
    /// Date the change is processed; back-pay runs up to the day before.
    pub calculation_date: NaiveDate,
    /// Sum of all period deltas.
    pub total: Decimal,
    /// Per-period rows ordered by period start.
    pub breakdown: Vec<RetroBreakdown>,
}

impl RetroAdjustment {
    /// An adjustment with nothing owed.
    pub fn empty(effective_date: NaiveDate, calculation_date: NaiveDate) -> Self {
        Self {
            effective_date,
            calculation_date,
            total: Decimal::ZERO,
            breakdown: Vec::new(),
        }
    }
}
