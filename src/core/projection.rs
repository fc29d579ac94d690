use super::error::{CalcResult, ensure_finite, ensure_non_negative};
use super::types::TrajectoryPoint;

/// Rates this small leave `1 + rate` unchanged, so closed forms dividing by
/// the rate would collapse to zero.
fn is_zero_rate(rate: f64) -> bool {
    rate.abs() < f64::EPSILON
}

/// `(1 + rate)^periods`.
pub fn growth_factor(rate: f64, periods: u32) -> f64 {
    (1.0 + rate).powi(periods as i32)
}

/// Future value of one unit paid at the end of each period: `((1+r)^n - 1) / r`.
pub fn annuity_factor(rate: f64, periods: u32) -> f64 {
    if is_zero_rate(rate) {
        return periods as f64;
    }
    (growth_factor(rate, periods) - 1.0) / rate
}

/// Compounded value of `principal` plus an end-of-period `contribution` after `periods`.
pub fn future_value(principal: f64, contribution: f64, rate: f64, periods: u32) -> f64 {
    if is_zero_rate(rate) {
        return principal + contribution * periods as f64;
    }
    principal * growth_factor(rate, periods) + contribution * annuity_factor(rate, periods)
}

/// Level payment per period that amortizes `principal` over `periods`.
pub fn annuity_payment(principal: f64, rate: f64, periods: u32) -> f64 {
    if periods == 0 {
        return principal;
    }
    if is_zero_rate(rate) {
        return principal / periods as f64;
    }
    principal * (rate / (1.0 - (1.0 + rate).powi(-(periods as i32))))
}

/// Sum of `periods` payments starting at `first` and growing by `growth` each period.
pub fn geometric_sum(first: f64, growth: f64, periods: u32) -> f64 {
    if is_zero_rate(growth) {
        return first * periods as f64;
    }
    first * ((1.0 - growth_factor(growth, periods)) / (1.0 - (1.0 + growth)))
}

/// Future value at `rate` of a payment stream starting at `first` and growing by `growth`.
pub fn growing_annuity_future_value(first: f64, rate: f64, growth: f64, periods: u32) -> f64 {
    if periods == 0 {
        return 0.0;
    }
    if is_zero_rate(rate - growth) {
        return first * periods as f64 * growth_factor(rate, periods - 1);
    }
    first * ((growth_factor(rate, periods) - growth_factor(growth, periods)) / (rate - growth))
}

/// Value at every period `0..=periods`; index 0 is the principal.
pub fn project_values(
    principal: f64,
    contribution: f64,
    rate: f64,
    periods: u32,
) -> CalcResult<Vec<f64>> {
    ensure_non_negative("principal", principal)?;
    ensure_finite("contribution", contribution)?;
    ensure_finite("rate", rate)?;

    Ok((0..=periods)
        .map(|n| future_value(principal, contribution, rate, n))
        .collect())
}

pub fn project_trajectory(
    principal: f64,
    contribution: f64,
    rate: f64,
    periods: u32,
) -> CalcResult<Vec<TrajectoryPoint>> {
    let values = project_values(principal, contribution, rate, periods)?;
    Ok(values
        .into_iter()
        .enumerate()
        .map(|(year, value)| TrajectoryPoint {
            year: year as u32,
            value,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CalcError;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn simple_compounding_matches_hand_calculation() {
        // 100000*1.05^10 = 162889.46, 10000*(1.05^10-1)/0.05 = 125778.93
        let values = project_values(100_000.0, 10_000.0, 0.05, 10).expect("valid inputs");
        assert_eq!(values.len(), 11);
        assert_eq!(values[0], 100_000.0);
        assert_approx_tol(values[10], 288_668.39, 0.01);
    }

    #[test]
    fn zero_periods_returns_only_principal() {
        let values = project_values(5_000.0, 100.0, 0.07, 0).expect("valid inputs");
        assert_eq!(values, vec![5_000.0]);
    }

    #[test]
    fn negative_rate_shrinks_principal() {
        let values = project_values(1_000.0, 0.0, -0.10, 2).expect("valid inputs");
        assert_approx_tol(values[2], 810.0, 1e-9);
    }

    #[test]
    fn rejects_negative_principal() {
        let err = project_values(-1.0, 0.0, 0.05, 3).expect_err("must reject");
        assert!(matches!(
            err,
            CalcError::InvalidArgument {
                field: "principal",
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_finite_rate() {
        let err = project_values(1.0, 0.0, f64::NAN, 3).expect_err("must reject");
        assert!(err.to_string().contains("rate"));
    }

    #[test]
    fn trajectory_is_tagged_with_period_index() {
        let points = project_trajectory(100.0, 10.0, 0.1, 3).expect("valid inputs");
        let years: Vec<u32> = points.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![0, 1, 2, 3]);
        // ((100*1.1+10)*1.1+10)*1.1+10 = 166.2
        assert_approx_tol(points[3].value, 166.2, 1e-9);
    }

    #[test]
    fn annuity_payment_handles_zero_rate_and_amortizes() {
        assert_approx_tol(annuity_payment(1_200.0, 0.0, 12), 100.0, 1e-12);

        let payment = annuity_payment(100_000.0, 0.05, 30);
        let mut balance = 100_000.0;
        for _ in 0..30 {
            balance = balance * 1.05 - payment;
        }
        assert_approx_tol(balance, 0.0, 1e-6);
    }

    #[test]
    fn geometric_sum_matches_explicit_loop() {
        let mut expected = 0.0;
        let mut payment = 1_000.0;
        for _ in 0..5 {
            expected += payment;
            payment *= 1.03;
        }
        assert_approx_tol(geometric_sum(1_000.0, 0.03, 5), expected, 1e-9);
        assert_approx_tol(geometric_sum(1_000.0, 0.0, 5), 5_000.0, 1e-12);
    }

    #[test]
    fn growing_annuity_handles_equal_rate_and_growth() {
        let mut expected = 0.0;
        let mut payment = 100.0;
        for _ in 0..4 {
            expected = expected * 1.05 + payment;
            payment *= 1.05;
        }
        assert_approx_tol(
            growing_annuity_future_value(100.0, 0.05, 0.05, 4),
            expected,
            1e-9,
        );

        let mut expected = 0.0;
        let mut payment = 100.0;
        for _ in 0..4 {
            expected = expected * 1.08 + payment;
            payment *= 1.03;
        }
        assert_approx_tol(
            growing_annuity_future_value(100.0, 0.08, 0.03, 4),
            expected,
            1e-9,
        );
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_zero_rate_is_linear(
            principal in 0u32..10_000_000,
            contribution in -100_000i32..100_000,
            periods in 0u32..80
        ) {
            let principal = principal as f64;
            let contribution = contribution as f64;
            let values =
                project_values(principal, contribution, 0.0, periods).expect("valid inputs");
            for (n, value) in values.iter().enumerate() {
                prop_assert_eq!(*value, principal + contribution * n as f64);
            }
        }

        #[test]
        fn prop_higher_rate_gives_higher_final_value(
            principal in 1u32..5_000_000,
            contribution in 0u32..1_000_000,
            periods in 1u32..61,
            rate_bp in -500i32..2000,
            step_bp in 1i32..300
        ) {
            let principal = principal as f64;
            let contribution = contribution as f64;
            let low = future_value(principal, contribution, rate_bp as f64 / 10_000.0, periods);
            let high = future_value(
                principal,
                contribution,
                (rate_bp + step_bp) as f64 / 10_000.0,
                periods,
            );
            prop_assert!(high > low, "rate {rate_bp}bp -> {low}, +{step_bp}bp -> {high}");
        }
    }
}
