use super::types::YearProjection;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncomeAttainment {
    pub percent_achieved: f64,
    pub shortfall_surplus: f64,
}

pub fn project_target_income(
    entry: &YearProjection,
    year_index: u32,
    target_income: f64,
    inflation_rate: f64,
) -> f64 {
    match entry.manual_target_income {
        Some(manual) => manual,
        None => inflate(target_income, inflation_rate, year_index),
    }
}

pub fn inflate(amount: f64, rate_percent: f64, years: u32) -> f64 {
    amount * (1.0 + rate_percent / 100.0).powi(years as i32)
}

pub fn income_attainment(total_income: f64, inflated_target_income: f64) -> IncomeAttainment {
    let percent_achieved = if inflated_target_income > 0.0 {
        total_income / inflated_target_income * 100.0
    } else {
        0.0
    };
    IncomeAttainment {
        percent_achieved,
        shortfall_surplus: total_income - inflated_target_income,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn entry_with_manual(manual: Option<f64>) -> YearProjection {
        YearProjection {
            manual_target_income: manual,
            ..YearProjection::default()
        }
    }

    #[test]
    fn compounds_from_the_start_year() {
        let entry = entry_with_manual(None);
        assert_close(project_target_income(&entry, 3, 50_000.0, 2.0), 53_060.4, 1e-6);
        assert_close(project_target_income(&entry, 0, 50_000.0, 2.0), 50_000.0, 0.0);
    }

    #[test]
    fn manual_override_is_returned_unchanged() {
        let entry = entry_with_manual(Some(60_000.0));
        assert_eq!(project_target_income(&entry, 7, 50_000.0, 4.5), 60_000.0);
        assert_eq!(project_target_income(&entry, 0, 0.0, 0.0), 60_000.0);
    }

    #[test]
    fn manual_zero_still_overrides() {
        let entry = entry_with_manual(Some(0.0));
        assert_eq!(project_target_income(&entry, 2, 50_000.0, 2.0), 0.0);
    }

    #[test]
    fn attainment_against_positive_target() {
        let attainment = income_attainment(45_000.0, 50_000.0);
        assert_close(attainment.percent_achieved, 90.0, 1e-9);
        assert_close(attainment.shortfall_surplus, -5_000.0, 1e-9);
    }

    #[test]
    fn attainment_without_target_reports_zero_percent() {
        let attainment = income_attainment(12_000.0, 0.0);
        assert_eq!(attainment.percent_achieved, 0.0);
        assert_close(attainment.shortfall_surplus, 12_000.0, 1e-9);

        let negative = income_attainment(12_000.0, -10.0);
        assert_eq!(negative.percent_achieved, 0.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_manual_override_ignores_inflation(
            manual in -1_000_000i64..1_000_000,
            target in 0u32..500_000,
            rate_bp in -500i32..1500,
            year_index in 0u32..80
        ) {
            let entry = entry_with_manual(Some(manual as f64));
            let projected = project_target_income(
                &entry,
                year_index,
                target as f64,
                rate_bp as f64 / 100.0,
            );
            prop_assert_eq!(projected, manual as f64);
        }

        #[test]
        fn prop_positive_inflation_never_shrinks_target(
            target in 0u32..500_000,
            rate_bp in 0i32..1500,
            year_index in 0u32..80
        ) {
            let entry = entry_with_manual(None);
            let rate = rate_bp as f64 / 100.0;
            let this_year = project_target_income(&entry, year_index, target as f64, rate);
            let next_year = project_target_income(&entry, year_index + 1, target as f64, rate);
            prop_assert!(next_year >= this_year);
        }
    }
}
