//! Pay period generation from a pay schedule.

use chrono::{Datelike, Duration, Months, NaiveDate};

use crate::models::{PayFrequency, PayPeriod, PaySchedule};

/// Generates the pay periods of a schedule that overlap `[start, end)`.
///
/// The first period is the one containing `start`; the last is the one
/// containing the day before `end`. Periods are ordered by start date. An
/// empty or inverted range yields no periods.
///
/// # Example
///
/// ```
/// use comp_engine::calculation::pay_periods_covering;
/// use comp_engine::models::{PayFrequency, PaySchedule};
/// use chrono::NaiveDate;
///
/// let schedule = PaySchedule {
///     frequency: PayFrequency::Monthly,
///     anchor: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
/// };
/// let periods = pay_periods_covering(
///     &schedule,
///     NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
/// );
///
/// assert_eq!(periods.len(), 2);
/// assert_eq!(periods[0].start_date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
/// assert_eq!(periods[1].end_date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
/// ```
pub fn pay_periods_covering(
    schedule: &PaySchedule,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<PayPeriod> {
    let mut periods = Vec::new();
    if start >= end {
        return periods;
    }

    let mut current = first_period_start(schedule, start);
    while current < end {
        let Some(next) = next_period_start(schedule.frequency, current) else {
            break;
        };
        periods.push(PayPeriod::new(current, next));
        current = next;
    }
    periods
}

fn first_period_start(schedule: &PaySchedule, date: NaiveDate) -> NaiveDate {
    match schedule.frequency {
        PayFrequency::Weekly | PayFrequency::Biweekly => {
            let step = fixed_step_days(schedule.frequency);
            let offset = (date - schedule.anchor).num_days();
            schedule.anchor + Duration::days(offset.div_euclid(step) * step)
        }
        PayFrequency::SemiMonthly => {
            let day = if date.day() < 16 { 1 } else { 16 };
            date.with_day(day).unwrap_or(date)
        }
        PayFrequency::Monthly => date.with_day(1).unwrap_or(date),
    }
}

fn next_period_start(frequency: PayFrequency, start: NaiveDate) -> Option<NaiveDate> {
    match frequency {
        PayFrequency::Weekly | PayFrequency::Biweekly => {
            start.checked_add_signed(Duration::days(fixed_step_days(frequency)))
        }
        PayFrequency::SemiMonthly if start.day() < 16 => start.with_day(16),
        PayFrequency::SemiMonthly | PayFrequency::Monthly => start
            .with_day(1)
            .and_then(|first| first.checked_add_months(Months::new(1))),
    }
}

fn fixed_step_days(frequency: PayFrequency) -> i64 {
    match frequency {
        PayFrequency::Weekly => 7,
        _ => 14,
    }
}
