//! Pay period and pay schedule models.
//!
//! Periods are half-open: `start_date` is the first day covered and
//! `end_date` is the first day *not* covered, matching the day-counting used
//! by the proration and retro calculators.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calculation::days_between;

/// A single payroll period `[start_date, end_date)`.
///
/// # Example
///
/// ```
/// use comp_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period = PayPeriod::new(
///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
/// );
///
/// assert_eq!(period.days(), 31);
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 1, 31).unwrap()));
/// assert!(!period.contains_date(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PayPeriod {
    /// First day of the period.
    pub start_date: NaiveDate,
    /// First day after the period.
    pub end_date: NaiveDate,
}

impl PayPeriod {
    /// Creates a period.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// Checks if a date falls within `[start_date, end_date)`.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date < self.end_date
    }

    /// Number of days in the period; zero when the period is inverted.
    pub fn days(&self) -> i64 {
        days_between(self.start_date, self.end_date)
    }

    /// A period with no days is skipped by every calculator.
    pub fn is_empty(&self) -> bool {
        self.days() == 0
    }
}

/// How often payroll runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayFrequency {
    /// Every 7 days from the anchor.
    Weekly,
    /// Every 14 days from the anchor.
    Biweekly,
    /// 1st to 15th and 16th to month end.
    SemiMonthly,
    /// Calendar months.
    Monthly,
}

impl PayFrequency {
    /// Number of pay periods in a year, used to convert annual amounts.
    pub fn periods_per_year(&self) -> u32 {
        match self {
            PayFrequency::Weekly => 52,
            PayFrequency::Biweekly => 26,
            PayFrequency::SemiMonthly => 24,
            PayFrequency::Monthly => 12,
        }
    }
}

/// A pay frequency plus the date one period starts on.
///
/// The anchor only matters for weekly and biweekly schedules; calendar-based
/// schedules ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaySchedule {
    /// Payroll frequency.
    pub frequency: PayFrequency,
    /// The start date of any one period.
    pub anchor: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_contains_date_on_start_date() {
        let period = PayPeriod::new(date(2026, 1, 12), date(2026, 1, 26));
        assert!(period.contains_date(period.start_date));
    }

    #[test]
    fn test_end_date_is_exclusive() {
        let period = PayPeriod::new(date(2026, 1, 12), date(2026, 1, 26));
        assert!(!period.contains_date(period.end_date));
        assert!(period.contains_date(date(2026, 1, 25)));
    }

    #[test]
    fn test_days_in_leap_february() {
        let period = PayPeriod::new(date(2024, 2, 1), date(2024, 3, 1));
        assert_eq!(period.days(), 29);
    }

    #[test]
    fn test_inverted_period_is_empty() {
        let period = PayPeriod::new(date(2025, 3, 1), date(2025, 2, 1));
        assert_eq!(period.days(), 0);
        assert!(period.is_empty());
    }

    #[test]
    fn test_deserialize_pay_period() {
        let json = r#"{"start_date": "2026-01-13", "end_date": "2026-01-27"}"#;
        let period: PayPeriod = serde_json::from_str(json).unwrap();
        assert_eq!(period.days(), 14);
    }

    #[test]
    fn test_frequency_serialization() {
        assert_eq!(
            serde_json::to_string(&PayFrequency::SemiMonthly).unwrap(),
            "\"semi_monthly\""
        );
        let schedule: PaySchedule =
            serde_json::from_str(r#"{"frequency": "biweekly", "anchor": "2025-01-06"}"#).unwrap();
        assert_eq!(schedule.frequency.periods_per_year(), 26);
    }
}
