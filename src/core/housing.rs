use serde::Serialize;

use super::error::{CalcError, CalcResult, ensure_finite, ensure_non_negative};
use super::projection::{
    annuity_factor, annuity_payment, geometric_sum, growing_annuity_future_value, growth_factor,
};
use super::types::{CostComparison, CostFunctionConfig, TrajectoryPoint};

pub const DEFAULT_SWEEP_FROM: f64 = 0.005;
pub const DEFAULT_SWEEP_TO: f64 = 0.06;
pub const DEFAULT_SWEEP_POINTS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentBuyBreakdown {
    pub stay_years: u32,
    pub total_renting_cost: f64,
    pub total_buying_cost: f64,
    pub initial_rent_cost: f64,
    pub initial_buy_cost: f64,
    pub annual_recurring_rent: f64,
    pub total_recurring_rent: f64,
    pub annual_mortgage_payment: f64,
    pub annual_maintenance_cost: f64,
    pub annual_recurring_buy: f64,
    pub total_recurring_buy: f64,
    pub rent_opportunity_cost: f64,
    pub buy_initial_opportunity_cost: f64,
    pub buy_recurring_opportunity_cost: f64,
    pub net_proceeds: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheaperOption {
    Renting,
    Buying,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub cheaper: CheaperOption,
    pub savings: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateCostPoint {
    pub mortgage_rate: f64,
    pub renting_cost: f64,
    pub buying_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostPath {
    pub renting: Vec<TrajectoryPoint>,
    pub buying: Vec<TrajectoryPoint>,
}

impl RentBuyBreakdown {
    pub fn costs(&self) -> CostComparison {
        CostComparison {
            renting: self.total_renting_cost,
            buying: self.total_buying_cost,
        }
    }

    /// Ties go to buying.
    pub fn verdict(&self) -> Verdict {
        if self.total_renting_cost < self.total_buying_cost {
            Verdict {
                cheaper: CheaperOption::Renting,
                savings: self.total_buying_cost - self.total_renting_cost,
            }
        } else {
            Verdict {
                cheaper: CheaperOption::Buying,
                savings: self.total_renting_cost - self.total_buying_cost,
            }
        }
    }

    /// Total costs spread evenly over the stay, accumulated year by year.
    pub fn annualized_cost_path(&self) -> CostPath {
        let years = self.stay_years.max(1) as f64;
        let per_year_rent = self.total_renting_cost / years;
        let per_year_buy = self.total_buying_cost / years;
        let point = |per_year: f64| {
            move |year: u32| TrajectoryPoint {
                year,
                value: per_year * year as f64,
            }
        };
        CostPath {
            renting: (1..=self.stay_years).map(point(per_year_rent)).collect(),
            buying: (1..=self.stay_years).map(point(per_year_buy)).collect(),
        }
    }
}

pub fn calculate_rent_vs_buy(config: &CostFunctionConfig) -> CalcResult<RentBuyBreakdown> {
    validate_cost_config(config)?;
    Ok(breakdown(config))
}

/// Renting and buying totals at `mortgage_rate`. Expects a validated config.
pub fn total_costs(config: &CostFunctionConfig, mortgage_rate: f64) -> CostComparison {
    breakdown(&config.with_mortgage_rate(mortgage_rate)).costs()
}

/// Both totals at `points` evenly spaced mortgage rates from `from` to `to` inclusive.
pub fn costs_over_mortgage_rates(
    config: &CostFunctionConfig,
    from: f64,
    to: f64,
    points: usize,
) -> CalcResult<Vec<RateCostPoint>> {
    validate_cost_config(config)?;
    ensure_finite("sweep_from", from)?;
    ensure_finite("sweep_to", to)?;
    if to < from {
        return Err(CalcError::invalid("sweep_to", "must be >= sweep_from"));
    }
    if from <= -1.0 {
        return Err(CalcError::invalid("sweep_from", "must be > -100%"));
    }
    if points < 2 {
        return Err(CalcError::invalid("sweep_points", "at least 2 points are required"));
    }

    let step = (to - from) / (points - 1) as f64;
    Ok((0..points)
        .map(|idx| {
            let mortgage_rate = if idx == points - 1 {
                to
            } else {
                from + step * idx as f64
            };
            let costs = total_costs(config, mortgage_rate);
            RateCostPoint {
                mortgage_rate,
                renting_cost: costs.renting,
                buying_cost: costs.buying,
            }
        })
        .collect())
}

fn breakdown(config: &CostFunctionConfig) -> RentBuyBreakdown {
    let n = config.stay_years;
    let price = config.home_price;

    let initial_rent_cost = config.monthly_rent;
    let initial_buy_cost = (config.down_payment + config.buying_cost) * price;

    let annual_recurring_rent = config.monthly_rent * 12.0;
    let total_recurring_rent = geometric_sum(annual_recurring_rent, config.rental_growth, n);

    let loan = price * (1.0 - config.down_payment);
    let annual_mortgage_payment =
        annuity_payment(loan, config.mortgage_rate, config.mortgage_term_years);
    let annual_maintenance_cost = config.maintenance_cost * price;
    let annual_recurring_buy = annual_mortgage_payment + annual_maintenance_cost;
    let total_recurring_buy = annual_recurring_buy * n as f64;

    let rent_opportunity_cost = growing_annuity_future_value(
        annual_recurring_rent,
        config.investment_return,
        config.rental_growth,
        n,
    );
    let buy_initial_opportunity_cost =
        initial_buy_cost * growth_factor(config.investment_return, n);
    let buy_recurring_opportunity_cost =
        annual_recurring_buy * annuity_factor(config.investment_return, n);

    let future_home_price = price * growth_factor(config.home_price_growth, n);
    let net_proceeds = future_home_price * (1.0 - config.selling_cost);

    let total_renting_cost = initial_rent_cost + total_recurring_rent + rent_opportunity_cost;
    let total_buying_cost = initial_buy_cost
        + total_recurring_buy
        + buy_initial_opportunity_cost
        + buy_recurring_opportunity_cost
        - net_proceeds;

    RentBuyBreakdown {
        stay_years: n,
        total_renting_cost,
        total_buying_cost,
        initial_rent_cost,
        initial_buy_cost,
        annual_recurring_rent,
        total_recurring_rent,
        annual_mortgage_payment,
        annual_maintenance_cost,
        annual_recurring_buy,
        total_recurring_buy,
        rent_opportunity_cost,
        buy_initial_opportunity_cost,
        buy_recurring_opportunity_cost,
        net_proceeds,
    }
}

pub(crate) fn validate_cost_config(config: &CostFunctionConfig) -> CalcResult<()> {
    ensure_non_negative("home_price", config.home_price)?;
    ensure_non_negative("monthly_rent", config.monthly_rent)?;
    ensure_non_negative("down_payment", config.down_payment)?;
    ensure_non_negative("investment_return", config.investment_return)?;
    ensure_non_negative("home_price_growth", config.home_price_growth)?;
    ensure_non_negative("rental_growth", config.rental_growth)?;
    ensure_non_negative("buying_cost", config.buying_cost)?;
    ensure_non_negative("selling_cost", config.selling_cost)?;
    ensure_non_negative("maintenance_cost", config.maintenance_cost)?;
    ensure_finite("mortgage_rate", config.mortgage_rate)?;

    if config.mortgage_rate <= -1.0 {
        return Err(CalcError::invalid("mortgage_rate", "must be > -100%"));
    }
    if config.down_payment > 1.0 {
        return Err(CalcError::invalid("down_payment", "must be <= 100% of the price"));
    }
    if config.stay_years == 0 {
        return Err(CalcError::invalid("stay_years", "must be >= 1"));
    }
    if config.mortgage_term_years == 0 {
        return Err(CalcError::invalid("mortgage_term_years", "must be >= 1"));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn default_cost_config() -> CostFunctionConfig {
    CostFunctionConfig {
        home_price: 1_150_000.0,
        monthly_rent: 4_300.0,
        stay_years: 30,
        mortgage_rate: 0.04,
        down_payment: 0.25,
        mortgage_term_years: 30,
        investment_return: 0.09,
        home_price_growth: 0.04,
        rental_growth: 0.03,
        buying_cost: 0.045,
        selling_cost: 0.08,
        maintenance_cost: 0.02,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn default_scenario_favours_renting_at_four_percent() {
        let result = calculate_rent_vs_buy(&default_cost_config()).expect("valid config");
        assert_approx_tol(result.total_renting_cost, 11_781_949.21, 1.0);
        assert_approx_tol(result.total_buying_cost, 13_529_032.73, 1.0);
        assert_approx_tol(result.initial_buy_cost, 339_250.0, 1e-6);
        assert_approx_tol(result.annual_maintenance_cost, 23_000.0, 1e-6);

        let verdict = result.verdict();
        assert_eq!(verdict.cheaper, CheaperOption::Renting);
        assert_approx_tol(
            verdict.savings,
            result.total_buying_cost - result.total_renting_cost,
            1e-6,
        );
    }

    #[test]
    fn totals_are_sum_of_components() {
        let r = calculate_rent_vs_buy(&default_cost_config()).expect("valid config");
        assert_approx_tol(
            r.total_renting_cost,
            r.initial_rent_cost + r.total_recurring_rent + r.rent_opportunity_cost,
            1e-6,
        );
        assert_approx_tol(
            r.total_buying_cost,
            r.initial_buy_cost + r.total_recurring_buy + r.buy_initial_opportunity_cost
                + r.buy_recurring_opportunity_cost
                - r.net_proceeds,
            1e-6,
        );
    }

    #[test]
    fn zero_rates_do_not_produce_nan() {
        let mut config = default_cost_config();
        config.mortgage_rate = 0.0;
        config.investment_return = 0.0;
        config.rental_growth = 0.0;
        config.home_price_growth = 0.0;

        let r = calculate_rent_vs_buy(&config).expect("valid config");
        assert_approx_tol(r.annual_mortgage_payment, 862_500.0 / 30.0, 1e-9);
        assert_approx_tol(r.total_recurring_rent, 51_600.0 * 30.0, 1e-6);
        assert_approx_tol(r.rent_opportunity_cost, 51_600.0 * 30.0, 1e-6);
        assert_approx_tol(r.buy_initial_opportunity_cost, r.initial_buy_cost, 1e-9);
        assert!(r.total_renting_cost.is_finite());
        assert!(r.total_buying_cost.is_finite());
    }

    #[test]
    fn equal_investment_return_and_rent_growth_is_finite() {
        let mut config = default_cost_config();
        config.investment_return = 0.03;
        config.rental_growth = 0.03;
        let r = calculate_rent_vs_buy(&config).expect("valid config");
        assert!(r.rent_opportunity_cost.is_finite());
        assert!(r.rent_opportunity_cost > r.total_recurring_rent);
    }

    #[test]
    fn annualized_path_accumulates_to_totals() {
        let r = calculate_rent_vs_buy(&default_cost_config()).expect("valid config");
        let path = r.annualized_cost_path();
        assert_eq!(path.renting.len(), 30);
        assert_eq!(path.buying.len(), 30);
        assert_eq!(path.renting[0].year, 1);
        let last = path.buying.last().expect("non-empty");
        assert_eq!(last.year, 30);
        assert_approx_tol(last.value, r.total_buying_cost, 1e-3);
    }

    #[test]
    fn sweep_is_inclusive_and_evenly_spaced() {
        let config = default_cost_config();
        let points = costs_over_mortgage_rates(
            &config,
            DEFAULT_SWEEP_FROM,
            DEFAULT_SWEEP_TO,
            DEFAULT_SWEEP_POINTS,
        )
        .expect("valid sweep");
        assert_eq!(points.len(), 100);
        assert_eq!(points[0].mortgage_rate, DEFAULT_SWEEP_FROM);
        assert_eq!(points[99].mortgage_rate, DEFAULT_SWEEP_TO);
        for pair in points.windows(2) {
            assert_approx_tol(pair[0].renting_cost, pair[1].renting_cost, 1e-9);
            assert!(pair[1].buying_cost > pair[0].buying_cost);
        }
    }

    #[test]
    fn sweep_rejects_single_point_and_inverted_range() {
        let config = default_cost_config();
        assert!(costs_over_mortgage_rates(&config, 0.01, 0.05, 1).is_err());
        assert!(costs_over_mortgage_rates(&config, 0.05, 0.01, 10).is_err());
    }

    #[test]
    fn rejects_zero_stay_and_bad_down_payment() {
        let mut config = default_cost_config();
        config.stay_years = 0;
        assert!(calculate_rent_vs_buy(&config).is_err());

        let mut config = default_cost_config();
        config.down_payment = 1.5;
        let err = calculate_rent_vs_buy(&config).expect_err("must reject");
        assert!(err.to_string().contains("down_payment"));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_buying_cost_rises_with_mortgage_rate(
            rate_bp in 0u32..2000,
            step_bp in 1u32..200,
            stay in 1u32..40,
            term in 1u32..40,
            down_pct in 0u32..95
        ) {
            let mut config = default_cost_config();
            config.stay_years = stay;
            config.mortgage_term_years = term;
            config.down_payment = down_pct as f64 / 100.0;

            let low = total_costs(&config, rate_bp as f64 / 10_000.0);
            let high = total_costs(&config, (rate_bp + step_bp) as f64 / 10_000.0);
            prop_assert!(high.buying > low.buying);
            prop_assert!(high.renting == low.renting);
        }
    }
}
