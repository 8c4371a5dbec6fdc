//! Day counting, percentages and currency rounding shared by every
//! calculator.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Minor units used when no currency-specific precision is configured.
pub const DEFAULT_DECIMAL_PLACES: u32 = 2;

/// Counts the days in `[start, end)`.
///
/// Uses actual calendar differences, so a calendar year is 365 or 366 days.
/// An inverted range counts as zero days rather than a negative number.
///
/// # Example
///
/// ```
/// use comp_engine::calculation::days_between;
/// use chrono::NaiveDate;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// assert_eq!(days_between(start, end), 366);
/// assert_eq!(days_between(end, start), 0);
/// ```
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days().max(0)
}

/// Rounds a monetary amount to the given number of decimal places.
///
/// Midpoints round away from zero, which is how payroll systems issue
/// correcting entries.
pub fn round_amount(amount: Decimal, decimal_places: u32) -> Decimal {
    amount.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero)
}

/// Takes `percentage` percent of `base`.
///
/// Returns `None` when the result does not fit in a [`Decimal`].
///
/// # Example
///
/// ```
/// use comp_engine::calculation::percent_of;
/// use rust_decimal::Decimal;
///
/// assert_eq!(percent_of(Decimal::new(80000, 0), Decimal::new(3, 0)), Some(Decimal::new(2400, 0)));
/// assert_eq!(percent_of(Decimal::MAX, Decimal::new(200, 0)), None);
/// ```
pub fn percent_of(base: Decimal, percentage: Decimal) -> Option<Decimal> {
    base.checked_mul(percentage)
        .and_then(|product| product.checked_div(Decimal::ONE_HUNDRED))
        .or_else(|| {
            // The product alone can overflow when the result itself fits.
            let rate = percentage.checked_div(Decimal::ONE_HUNDRED)?;
            base.checked_mul(rate)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_between_excludes_end_date() {
        assert_eq!(days_between(date(2025, 1, 1), date(2025, 1, 2)), 1);
        assert_eq!(days_between(date(2025, 1, 1), date(2025, 1, 1)), 0);
    }

    #[test]
    fn test_days_between_common_year() {
        assert_eq!(days_between(date(2025, 1, 1), date(2026, 1, 1)), 365);
    }

    #[test]
    fn test_round_amount_midpoint_away_from_zero() {
        assert_eq!(
            round_amount(Decimal::from_str("10.005").unwrap(), 2),
            Decimal::from_str("10.01").unwrap()
        );
        assert_eq!(
            round_amount(Decimal::from_str("-10.005").unwrap(), 2),
            Decimal::from_str("-10.01").unwrap()
        );
    }

    #[test]
    fn test_percent_of_overflow_is_none() {
        assert_eq!(percent_of(Decimal::MAX, Decimal::new(200, 0)), None);
        assert!(percent_of(Decimal::MAX, Decimal::new(50, 0)).is_some());
    }

    #[test]
    fn test_round_amount_zero_places() {
        assert_eq!(
            round_amount(Decimal::from_str("1234.5").unwrap(), 0),
            Decimal::from_str("1235").unwrap()
        );
    }
}
