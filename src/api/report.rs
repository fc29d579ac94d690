use rand::Rng;
use serde::Serialize;

use super::args::{
    BreakEvenArgs, DebtArgs, FirePlanArgs, InsuranceArgs, PortfolioArgs, ProjectArgs,
    RentVsBuyArgs, SimulateArgs, build_break_even, build_cost_config, build_debt,
    build_fire_plan, build_insurance, build_portfolio, build_projection, build_simulation,
    build_sweep,
};
use crate::core::{
    AllocationSlice, BreakEvenResult, CostPath, DebtRepayment, FinalPercentiles, FirePlan,
    InsuranceAssessment, PercentileSeries, PortfolioReview, RateCostPoint, RentBuyBreakdown,
    SensitivityRow, TrajectoryPoint, Verdict, assess_life_insurance, calculate_rent_vs_buy,
    costs_over_mortgage_rates, default_annual_returns, default_savings_rates,
    mortgage_break_even, plan_fire, project_trajectory, repay_debt, return_sensitivity,
    review_portfolio, run_seeded_monte_carlo, savings_rate_sensitivity,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub principal: f64,
    pub annual_contribution: f64,
    pub annual_return: f64,
    pub years: u32,
    pub final_value: f64,
    pub trajectory: Vec<TrajectoryPoint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateResponse {
    pub seed: u64,
    pub trials: u32,
    pub horizon_years: u32,
    pub blended_mean_return: f64,
    pub inflation_rate: f64,
    pub final_percentiles: FinalPercentiles,
    pub p10: PercentileSeries,
    pub p50: PercentileSeries,
    pub p90: PercentileSeries,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_paths: Option<Vec<Vec<TrajectoryPoint>>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentVsBuyResponse {
    pub breakdown: RentBuyBreakdown,
    pub verdict: Verdict,
    pub cost_path: CostPath,
    pub rate_sweep: Vec<RateCostPoint>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirePlanResponse {
    pub annual_return: f64,
    pub allocation: Vec<AllocationSlice>,
    pub plan: FirePlan,
    pub savings_rate_sensitivity: Vec<SensitivityRow>,
    pub return_sensitivity: Vec<SensitivityRow>,
}

pub fn project_report(args: &ProjectArgs) -> Result<ProjectResponse, String> {
    let request = build_projection(args)?;
    let trajectory = project_trajectory(
        request.principal,
        request.annual_contribution,
        request.annual_return,
        request.years,
    )
    .map_err(|e| e.to_string())?;
    let final_value = trajectory
        .last()
        .map(|point| point.value)
        .unwrap_or(request.principal);

    Ok(ProjectResponse {
        principal: request.principal,
        annual_contribution: request.annual_contribution,
        annual_return: request.annual_return,
        years: request.years,
        final_value,
        trajectory,
    })
}

pub fn simulate_report(args: &SimulateArgs) -> Result<SimulateResponse, String> {
    let request = build_simulation(args)?;
    let seed = request.seed.unwrap_or_else(|| rand::rng().random());
    let result = run_seeded_monte_carlo(&request.config, request.trials, seed)
        .map_err(|e| e.to_string())?;

    Ok(SimulateResponse {
        seed,
        trials: request.trials,
        horizon_years: request.config.horizon_years,
        blended_mean_return: request.config.blended_mean_return(),
        inflation_rate: request.config.inflation_rate,
        final_percentiles: result.final_percentiles,
        p10: result.p10,
        p50: result.p50,
        p90: result.p90,
        trial_paths: request.include_trials.then_some(result.trials),
    })
}

pub fn rent_vs_buy_report(args: &RentVsBuyArgs) -> Result<RentVsBuyResponse, String> {
    let config = build_cost_config(&args.housing)?;
    let (from, to, points) = build_sweep(args)?;
    let breakdown = calculate_rent_vs_buy(&config).map_err(|e| e.to_string())?;
    let rate_sweep =
        costs_over_mortgage_rates(&config, from, to, points).map_err(|e| e.to_string())?;

    Ok(RentVsBuyResponse {
        verdict: breakdown.verdict(),
        cost_path: breakdown.annualized_cost_path(),
        breakdown,
        rate_sweep,
    })
}

pub fn break_even_report(args: &BreakEvenArgs) -> Result<BreakEvenResult, String> {
    let cost_config = build_cost_config(&args.housing)?;
    let search = build_break_even(args)?;
    mortgage_break_even(&cost_config, search).map_err(|e| e.to_string())
}

pub fn fire_plan_report(args: &FirePlanArgs) -> Result<FirePlanResponse, String> {
    let request = build_fire_plan(args)?;
    let inputs = request.inputs;
    let plan = plan_fire(&inputs).map_err(|e| e.to_string())?;
    let savings_rate_sensitivity =
        savings_rate_sensitivity(&inputs, &default_savings_rates()).map_err(|e| e.to_string())?;
    let return_sensitivity =
        return_sensitivity(&inputs, &default_annual_returns()).map_err(|e| e.to_string())?;

    Ok(FirePlanResponse {
        annual_return: inputs.annual_return,
        allocation: request.allocation,
        plan,
        savings_rate_sensitivity,
        return_sensitivity,
    })
}

pub fn debt_report(args: &DebtArgs) -> Result<DebtRepayment, String> {
    let inputs = build_debt(args)?;
    repay_debt(&inputs).map_err(|e| e.to_string())
}

pub fn insurance_report(args: &InsuranceArgs) -> Result<InsuranceAssessment, String> {
    let inputs = build_insurance(args)?;
    assess_life_insurance(&inputs).map_err(|e| e.to_string())
}

pub fn portfolio_report(args: &PortfolioArgs) -> Result<PortfolioReview, String> {
    let request = build_portfolio(args)?;
    review_portfolio(&request.holdings, &request.new_weights).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::args::defaults;

    #[test]
    fn project_report_final_value_matches_last_point() {
        let report = project_report(&defaults()).expect("valid defaults");
        assert_eq!(report.trajectory.len(), 11);
        assert!((report.final_value - 288_668.39).abs() < 0.01);
    }

    #[test]
    fn simulate_report_echoes_seed_and_hides_trials() {
        let mut args: SimulateArgs = defaults();
        args.seed = Some(7);
        args.trials = 50;
        let report = simulate_report(&args).expect("valid inputs");
        assert_eq!(report.seed, 7);
        assert_eq!(report.p50.points.len(), 20);
        assert!(report.trial_paths.is_none());

        let again = simulate_report(&args).expect("valid inputs");
        assert_eq!(report.final_percentiles, again.final_percentiles);
    }

    #[test]
    fn simulate_report_includes_trials_on_request() {
        let mut args: SimulateArgs = defaults();
        args.seed = Some(1);
        args.trials = 5;
        args.include_trials = true;
        let report = simulate_report(&args).expect("valid inputs");
        let paths = report.trial_paths.expect("requested");
        assert_eq!(paths.len(), 5);
    }

    #[test]
    fn rent_vs_buy_report_contains_sweep_and_path() {
        let report = rent_vs_buy_report(&defaults()).expect("valid defaults");
        assert_eq!(report.rate_sweep.len(), 100);
        assert_eq!(report.cost_path.renting.len(), 30);
        assert_eq!(report.verdict, report.breakdown.verdict());
    }

    #[test]
    fn break_even_report_solves_default_housing() {
        let result = break_even_report(&defaults()).expect("valid defaults");
        assert!(result.bracketed);
        assert!(result.rate_percent > 0.0 && result.rate_percent < 20.0);
    }

    #[test]
    fn fire_plan_report_includes_default_sensitivity_tables() {
        let report = fire_plan_report(&defaults()).expect("valid defaults");
        assert_eq!(report.savings_rate_sensitivity.len(), 15);
        assert_eq!(report.return_sensitivity.len(), 19);
        assert!(report.plan.can_retire);
    }

    #[test]
    fn debt_report_maps_core_errors_to_strings() {
        let mut args: DebtArgs = defaults();
        args.balance = 1_000_000.0;
        let err = debt_report(&args).expect_err("unpayable");
        assert!(err.contains("monthly_payment"));
    }

    #[test]
    fn insurance_report_uses_table_premiums() {
        let report = insurance_report(&defaults()).expect("valid defaults");
        assert_eq!(report.coverage_need, 800_000.0);
        assert_eq!(report.premiums.premium_now, 897.68);
    }

    #[test]
    fn insurance_report_surfaces_missing_table_premium() {
        let mut args: InsuranceArgs = defaults();
        args.current_age = 150;
        let err = insurance_report(&args).expect_err("no table premium");
        assert!(err.contains("premium_now"));
    }

    #[test]
    fn portfolio_report_defaults_to_single_holding() {
        let report = portfolio_report(&defaults()).expect("valid defaults");
        assert_eq!(report.holdings.len(), 1);
        assert!((report.current.annual_return - 0.10).abs() < 1e-12);
        assert!(report.rebalanced.is_none());
    }
}
