mod debt;
mod engine;
mod error;
mod fire;
mod housing;
mod insurance;
mod portfolio;
mod projection;
mod solver;
mod types;

pub use debt::{DebtInputs, DebtRepayment, remaining_balance, repay_debt};
pub use engine::{
    DEFAULT_TRIALS, WEIGHT_SUM_TOLERANCE, percentile, run_monte_carlo, run_seeded_monte_carlo,
};
pub use error::{CalcError, CalcResult};
pub use fire::{
    AgePoint, AllocationSlice, FIRE_MULTIPLE, FirePlan, FirePlanInputs, MAX_ADDITIONAL_YEARS,
    MAX_AGE, SensitivityRow, blended_return, default_allocation, default_annual_returns,
    default_savings_rates, plan_fire, return_sensitivity, savings_rate_sensitivity,
};
pub use housing::{
    CheaperOption, CostPath, DEFAULT_SWEEP_FROM, DEFAULT_SWEEP_POINTS, DEFAULT_SWEEP_TO,
    RateCostPoint, RentBuyBreakdown, Verdict, calculate_rent_vs_buy, costs_over_mortgage_rates,
    total_costs,
};
pub use insurance::{
    CoverageCheck, CoverageStatus, DEFAULT_INSURANCE_RETURN, DEFERRAL_YEARS, Gender,
    InsuranceAssessment, InsuranceInputs, PremiumComparison, PurchaseTiming,
    assess_life_insurance, default_annual_premium,
};
pub use portfolio::{Holding, PortfolioMetrics, PortfolioReview, review_portfolio};
pub use projection::{
    annuity_factor, annuity_payment, future_value, geometric_sum, growing_annuity_future_value,
    growth_factor, project_trajectory, project_values,
};
pub use solver::{
    BreakEvenConfig, BreakEvenIteration, BreakEvenResult, DEFAULT_MAX_ITERATIONS,
    DEFAULT_SEARCH_MAX, DEFAULT_SEARCH_MIN, DEFAULT_TOLERANCE, find_break_even,
    mortgage_break_even,
};
pub use types::{
    AssetClass, CostComparison, CostFunctionConfig, FinalPercentiles, PercentileSeries,
    SimulationConfig, SimulationResult, TrajectoryPoint,
};
