//! Property tests for the calculators and the evaluator.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use proptest::test_runner::Config;
use rust_decimal::Decimal;
use serde_json::json;

use comp_engine::calculation::{
    ProrationOptions, calculate_proration, calculate_retro_adjustment, pay_periods_covering,
};
use comp_engine::engine::{EvaluationContext, evaluate_condition, evaluate_rule_set};
use comp_engine::models::{EmployeeData, PayFrequency, PaySchedule, RuleCondition, RuleSet};

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 1).unwrap() + Duration::days(offset)
}

fn frequency() -> impl Strategy<Value = PayFrequency> {
    prop_oneof![
        Just(PayFrequency::Weekly),
        Just(PayFrequency::Biweekly),
        Just(PayFrequency::SemiMonthly),
        Just(PayFrequency::Monthly),
    ]
}

fn cycle_rule_set() -> RuleSet {
    serde_json::from_value(json!({
        "name": "property_cycle",
        "effective_date": "2025-04-01",
        "rules": [
            {
                "name": "exclude",
                "rule_type": "ELIGIBILITY",
                "conditions": [{"field": "performance_rating", "operator": "lt", "value": 2}],
                "actions": [{"type": "ELIGIBILITY", "params": {"eligible": false, "reason": "rating below 2"}}]
            },
            {
                "name": "merit",
                "priority": 10,
                "conditions": [{"field": "performance_rating", "operator": "gte", "value": 3}],
                "actions": [{"type": "MERIT", "params": {"percentage": 4}}]
            },
            {
                "name": "cap",
                "priority": 20,
                "actions": [{"type": "CAP", "params": {"target": "merit", "max": 3000}}]
            },
            {
                "name": "bonus",
                "priority": 30,
                "actions": [{"type": "BONUS", "params": {"percentage": 10}}]
            }
        ]
    }))
    .unwrap()
}

proptest! {
    #![proptest_config(Config::with_cases(256))]

    #[test]
    fn proration_stays_within_the_base(
        cents in 0_i64..100_000_000,
        hire_offset in -400_i64..400,
        tenure in 0_i64..800,
        loa_days in -10_i64..400,
    ) {
        let base = Decimal::new(cents, 2);
        let mut employee = EmployeeData::new("emp_prop");
        employee.hire_date = Some(day(hire_offset));
        employee.termination_date = Some(day(hire_offset + tenure));
        let options = ProrationOptions { loa_days, ..ProrationOptions::default() };

        let result = calculate_proration(&employee, base, day(0), day(365), &options);

        prop_assert_eq!(result.total_days, 365);
        prop_assert!(result.eligible_days >= 0);
        prop_assert!(result.eligible_days <= result.total_days);
        prop_assert!(result.proration_factor >= Decimal::ZERO);
        prop_assert!(result.proration_factor <= Decimal::ONE);
        prop_assert!(result.prorated_amount >= Decimal::ZERO);
        prop_assert!(result.prorated_amount <= base);
    }

    #[test]
    fn schedule_periods_are_contiguous_and_cover_the_window(
        freq in frequency(),
        anchor_offset in -60_i64..60,
        start_offset in 0_i64..365,
        length in 1_i64..200,
    ) {
        let schedule = PaySchedule { frequency: freq, anchor: day(anchor_offset) };
        let start = day(start_offset);
        let end = day(start_offset + length);

        let periods = pay_periods_covering(&schedule, start, end);

        prop_assert!(!periods.is_empty());
        prop_assert!(periods[0].contains_date(start));
        prop_assert!(periods[periods.len() - 1].end_date >= end);
        for pair in periods.windows(2) {
            prop_assert_eq!(pair[0].end_date, pair[1].start_date);
        }
        prop_assert!(periods.iter().all(|period| !period.is_empty()));
    }

    #[test]
    fn retro_total_is_the_sum_of_its_rows(
        old_cents in 0_i64..2_000_000,
        raise_cents in -100_000_i64..500_000,
        effective_offset in 0_i64..300,
        window in 0_i64..200,
        freq in frequency(),
    ) {
        let old_amount = Decimal::new(old_cents, 2);
        let new_amount = old_amount + Decimal::new(raise_cents, 2);
        let effective_date = day(effective_offset);
        let calculation_date = day(effective_offset + window);
        let schedule = PaySchedule { frequency: freq, anchor: day(0) };
        let periods = pay_periods_covering(&schedule, effective_date, calculation_date);

        let retro = calculate_retro_adjustment(
            old_amount,
            new_amount,
            effective_date,
            calculation_date,
            &periods,
        );

        let sum: Decimal = retro.breakdown.iter().map(|row| row.delta).sum();
        prop_assert_eq!(sum, retro.total);
        prop_assert_eq!(retro.breakdown.len(), periods.len());
        for row in &retro.breakdown {
            prop_assert!(row.days_covered > 0);
            prop_assert!(row.days_covered <= row.days_in_period);
            prop_assert_eq!(row.delta, row.new_amount - row.old_amount);
        }
        let covered: i64 = retro.breakdown.iter().map(|row| row.days_covered).sum();
        prop_assert_eq!(covered, window);
    }

    #[test]
    fn between_is_half_open(
        rating_tenths in 0_i64..60,
        low_tenths in 0_i64..60,
        width_tenths in 0_i64..30,
    ) {
        let rating = Decimal::new(rating_tenths, 1);
        let low = Decimal::new(low_tenths, 1);
        let high = Decimal::new(low_tenths + width_tenths, 1);
        let mut employee = EmployeeData::new("emp_prop");
        employee.performance_rating = Some(rating);
        let condition = RuleCondition::new(
            "performance_rating",
            "between",
            json!([low.to_string(), high.to_string()]),
        );

        let result = evaluate_condition(&employee, &condition);

        prop_assert_eq!(result.passed, rating >= low && rating < high);
    }

    #[test]
    fn evaluation_is_deterministic_and_consistent(
        rating_tenths in 0_i64..50,
        salary in 30_000_i64..250_000,
    ) {
        let rule_set = cycle_rule_set();
        let mut employee = EmployeeData::new("emp_prop");
        employee.base_salary = Some(Decimal::from(salary));
        employee.performance_rating = Some(Decimal::new(rating_tenths, 1));
        let context = EvaluationContext::default();

        let first = evaluate_rule_set(&rule_set, &employee, &context).unwrap();
        let second = evaluate_rule_set(&rule_set, &employee, &context).unwrap();

        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );

        let resolved = &first.resolved;
        prop_assert_eq!(
            resolved.total_cost_delta,
            resolved.merit_increase + resolved.bonus + resolved.lti
        );
        prop_assert!(resolved.merit_increase <= Decimal::from(3000));
        if resolved.eligible {
            prop_assert!(rating_tenths >= 20);
        } else {
            prop_assert_eq!(resolved.total_cost_delta, Decimal::ZERO);
        }
        prop_assert_eq!(first.audit.len(), rule_set.rules.len());
    }
}
