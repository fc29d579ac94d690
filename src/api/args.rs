use clap::{Args, Parser};
use serde::Deserialize;
use tracing::warn;

use crate::core::{
    AllocationSlice, AssetClass, BreakEvenConfig, CostFunctionConfig, DEFAULT_TRIALS, DebtInputs,
    FirePlanInputs, Gender, Holding, InsuranceInputs, MAX_AGE, SimulationConfig,
    WEIGHT_SUM_TOLERANCE, blended_return,
};

pub const MAX_YEARS: u32 = 200;
pub const MAX_TRIALS: u32 = 100_000;
/// Trial count ceiling when every trial path is returned.
pub const MAX_REPORTED_TRIALS: u32 = 1_000;
pub const MAX_SWEEP_POINTS: usize = 10_000;

/// One `--asset-class` value, all fields in percent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetClassInput {
    pub weight: f64,
    pub mean_return: f64,
    pub std_dev: f64,
}

/// One `--holding` value, weight, return and standard deviation in percent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingInput {
    pub name: String,
    pub weight: f64,
    pub annual_return: f64,
    pub std_dev: f64,
}

/// One `--allocation` value, weight and growth in percent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationInput {
    pub name: String,
    pub weight: f64,
    pub growth_rate: f64,
}

#[derive(Parser, Debug, Clone)]
pub struct ProjectArgs {
    #[arg(long, default_value_t = 100_000.0, help = "Starting balance")]
    pub principal: f64,
    #[arg(long, default_value_t = 10_000.0, help = "Contribution added at the end of each year")]
    pub annual_contribution: f64,
    #[arg(long, default_value_t = 5.0, help = "Annual return in percent, e.g. 5")]
    pub annual_return: f64,
    #[arg(long, default_value_t = 10)]
    pub years: u32,
}

#[derive(Parser, Debug, Clone)]
pub struct SimulateArgs {
    #[arg(long, default_value_t = 500_000.0)]
    pub principal: f64,
    #[arg(long, default_value_t = 32_000.0)]
    pub annual_contribution: f64,
    #[arg(long, default_value_t = 20, help = "Horizon in years")]
    pub years: u32,
    #[arg(long, default_value_t = 3.0, help = "Annual inflation in percent")]
    pub inflation_rate: f64,
    #[arg(long, default_value_t = 85.0, help = "Stable assets share of the portfolio in percent")]
    pub stable_weight: f64,
    #[arg(long, default_value_t = 7.0, help = "Stable assets mean annual return in percent")]
    pub stable_return: f64,
    #[arg(long, default_value_t = 10.0, help = "Stable assets return std dev in percent")]
    pub stable_std_dev: f64,
    #[arg(long, default_value_t = 15.0, help = "Growth assets share of the portfolio in percent")]
    pub growth_weight: f64,
    #[arg(long, default_value_t = 15.0, help = "Growth assets mean annual return in percent")]
    pub growth_return: f64,
    #[arg(long, default_value_t = 30.0, help = "Growth assets return std dev in percent")]
    pub growth_std_dev: f64,
    #[arg(
        long = "asset-class",
        value_name = "WEIGHT:MEAN:STD_DEV",
        value_parser = parse_asset_class,
        help = "Replace the stable/growth pair with explicit asset classes, all in percent"
    )]
    pub asset_classes: Vec<AssetClassInput>,
    #[arg(long, default_value_t = DEFAULT_TRIALS)]
    pub trials: u32,
    #[arg(long, help = "Seed for reproducible runs; drawn at random when omitted")]
    pub seed: Option<u64>,
    #[arg(long, help = "Include every trial path in the output")]
    pub include_trials: bool,
}

#[derive(Args, Debug, Clone)]
pub struct HousingArgs {
    #[arg(long, default_value_t = 1_150_000.0)]
    pub home_price: f64,
    #[arg(long, default_value_t = 4_300.0)]
    pub monthly_rent: f64,
    #[arg(long, default_value_t = 30, help = "Years you expect to stay")]
    pub stay_years: u32,
    #[arg(long, default_value_t = 4.0, help = "Mortgage rate in percent")]
    pub mortgage_rate: f64,
    #[arg(long, default_value_t = 25.0, help = "Down payment in percent of the price")]
    pub down_payment: f64,
    #[arg(long, default_value_t = 30)]
    pub mortgage_term_years: u32,
    #[arg(long, default_value_t = 9.0, help = "Return on money not spent, in percent")]
    pub investment_return: f64,
    #[arg(long, default_value_t = 4.0, help = "Annual home price growth in percent")]
    pub home_price_growth: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual rent growth in percent")]
    pub rental_growth: f64,
    #[arg(long, default_value_t = 4.5, help = "Cost of buying in percent of the price")]
    pub buying_cost: f64,
    #[arg(long, default_value_t = 8.0, help = "Cost of selling in percent of the sale price")]
    pub selling_cost: f64,
    #[arg(long, default_value_t = 2.0, help = "Annual maintenance, tax and insurance in percent")]
    pub maintenance_cost: f64,
}

#[derive(Parser, Debug, Clone)]
pub struct RentVsBuyArgs {
    #[command(flatten)]
    pub housing: HousingArgs,
    #[arg(long, default_value_t = 0.5, help = "First mortgage rate of the sweep in percent")]
    pub sweep_from: f64,
    #[arg(long, default_value_t = 6.0, help = "Last mortgage rate of the sweep in percent")]
    pub sweep_to: f64,
    #[arg(long, default_value_t = 100)]
    pub sweep_points: usize,
}

#[derive(Parser, Debug, Clone)]
pub struct BreakEvenArgs {
    #[command(flatten)]
    pub housing: HousingArgs,
    #[arg(long, default_value_t = 0.0, help = "Lowest mortgage rate searched, in percent")]
    pub search_min: f64,
    #[arg(long, default_value_t = 20.0, help = "Highest mortgage rate searched, in percent")]
    pub search_max: f64,
    #[arg(long, default_value_t = 0.01, help = "Search tolerance in percentage points")]
    pub tolerance: f64,
}

#[derive(Parser, Debug, Clone)]
pub struct FirePlanArgs {
    #[arg(long, default_value_t = 35)]
    pub current_age: u32,
    #[arg(long, default_value_t = 55)]
    pub target_age: u32,
    #[arg(long, default_value_t = 80_000.0, help = "Annual expenses in retirement")]
    pub annual_expenses: f64,
    #[arg(long, default_value_t = 500_000.0)]
    pub current_savings: f64,
    #[arg(long, default_value_t = 80_000.0)]
    pub annual_income: f64,
    #[arg(long, default_value_t = 40.0, help = "Share of income saved, in percent")]
    pub savings_rate: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual inflation in percent")]
    pub inflation_rate: f64,
    #[arg(
        long = "allocation",
        value_name = "NAME:WEIGHT:GROWTH",
        value_parser = parse_allocation,
        default_values = ["equities:70:10", "fixed-income:20:4", "cash:10:0"],
        help = "Portfolio slice with weight and expected growth in percent"
    )]
    pub allocation: Vec<AllocationInput>,
    #[arg(long, help = "Nominal annual return in percent; overrides the allocation blend")]
    pub annual_return: Option<f64>,
}

#[derive(Parser, Debug, Clone)]
pub struct DebtArgs {
    #[arg(long, default_value_t = 50_000.0)]
    pub balance: f64,
    #[arg(long, default_value_t = 5.0, help = "Annual interest rate in percent")]
    pub annual_rate: f64,
    #[arg(long, default_value_t = 1_000.0)]
    pub monthly_payment: f64,
    #[arg(long, default_value_t = 7.0, help = "Annual investment return in percent")]
    pub investment_return: f64,
}

#[derive(Parser, Debug, Clone)]
pub struct InsuranceArgs {
    #[arg(long, default_value_t = 32)]
    pub current_age: u32,
    #[arg(long, default_value_t = 500_000.0)]
    pub current_savings: f64,
    #[arg(long, default_value_t = 100_000.0)]
    pub annual_income: f64,
    #[arg(long, default_value_t = 23.0, help = "Share of income saved, in percent")]
    pub savings_rate: f64,
    #[arg(long, default_value = "male", help = "male or female; selects the premium table")]
    pub gender: Gender,
    #[arg(long, default_value_t = 1)]
    pub dependents: u32,
    #[arg(long, default_value_t = 300_000.0)]
    pub cost_per_dependent: f64,
    #[arg(long, default_value_t = 500_000.0, help = "Total debts to cover")]
    pub debts: f64,
    #[arg(long, help = "Term life cover you already hold")]
    pub current_coverage: Option<f64>,
    #[arg(long, default_value_t = 50.0, help = "Chance of having a dependent, in percent")]
    pub probability_dependent: f64,
    #[arg(long, default_value_t = 50.0, help = "Chance of taking on debt, in percent")]
    pub probability_debt: f64,
    #[arg(long, help = "Annual premium if bought now; table value when omitted")]
    pub premium_now: Option<f64>,
    #[arg(long, help = "Annual premium if bought in 10 years; table value when omitted")]
    pub premium_later: Option<f64>,
    #[arg(long, default_value_t = 4.5, help = "Return on savings in percent")]
    pub investment_return: f64,
}

#[derive(Parser, Debug, Clone)]
pub struct PortfolioArgs {
    #[arg(
        long = "holding",
        value_name = "NAME:WEIGHT:RETURN:STD_DEV",
        value_parser = parse_holding,
        default_values = ["portfolio:100:10:10"],
        help = "Holding with weight, expected annual return and std dev, all in percent"
    )]
    pub holdings: Vec<HoldingInput>,
    #[arg(
        long,
        value_delimiter = ',',
        help = "Rebalanced weights in percent, one per holding in order"
    )]
    pub new_weights: Vec<f64>,
}

/// Every flag at its default value.
pub fn defaults<T: Parser>() -> T {
    T::parse_from(["fincalc"])
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionRequest {
    pub principal: f64,
    pub annual_contribution: f64,
    pub annual_return: f64,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    pub config: SimulationConfig,
    pub trials: u32,
    pub seed: Option<u64>,
    pub include_trials: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioRequest {
    pub holdings: Vec<Holding>,
    pub new_weights: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FirePlanRequest {
    pub inputs: FirePlanInputs,
    pub allocation: Vec<AllocationSlice>,
}

pub fn build_projection(args: &ProjectArgs) -> Result<ProjectionRequest, String> {
    if !args.principal.is_finite() || args.principal < 0.0 {
        return Err("--principal must be >= 0".to_string());
    }
    if !args.annual_contribution.is_finite() {
        return Err("--annual-contribution must be a finite number".to_string());
    }
    let annual_return = rate_above_minus_100("--annual-return", args.annual_return)?;
    at_most("--years", args.years, MAX_YEARS)?;

    Ok(ProjectionRequest {
        principal: args.principal,
        annual_contribution: args.annual_contribution,
        annual_return,
        years: args.years,
    })
}

pub fn build_simulation(args: &SimulateArgs) -> Result<SimulationRequest, String> {
    if !args.principal.is_finite() || args.principal < 0.0 {
        return Err("--principal must be >= 0".to_string());
    }
    if !args.annual_contribution.is_finite() {
        return Err("--annual-contribution must be a finite number".to_string());
    }
    if args.trials == 0 {
        return Err("--trials must be > 0".to_string());
    }
    at_most("--trials", args.trials, MAX_TRIALS)?;
    if args.include_trials && args.trials > MAX_REPORTED_TRIALS {
        return Err(format!(
            "--trials must be <= {MAX_REPORTED_TRIALS} with --include-trials"
        ));
    }
    at_most("--years", args.years, MAX_YEARS)?;
    let inflation_rate = rate_above_minus_100("--inflation-rate", args.inflation_rate)?;

    let asset_classes = if args.asset_classes.is_empty() {
        vec![
            asset_class(
                "--stable",
                args.stable_weight,
                args.stable_return,
                args.stable_std_dev,
            )?,
            asset_class(
                "--growth",
                args.growth_weight,
                args.growth_return,
                args.growth_std_dev,
            )?,
        ]
    } else {
        args.asset_classes
            .iter()
            .map(|c| asset_class("--asset-class", c.weight, c.mean_return, c.std_dev))
            .collect::<Result<Vec<_>, _>>()?
    };

    let total_weight: f64 = asset_classes.iter().map(|c| c.weight).sum();
    if (total_weight - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(format!(
            "asset class weights must sum to 100, got {:.4}",
            total_weight * 100.0
        ));
    }

    Ok(SimulationRequest {
        config: SimulationConfig {
            principal: args.principal,
            annual_contribution: args.annual_contribution,
            horizon_years: args.years,
            asset_classes,
            inflation_rate,
        },
        trials: args.trials,
        seed: args.seed,
        include_trials: args.include_trials,
    })
}

pub fn build_cost_config(args: &HousingArgs) -> Result<CostFunctionConfig, String> {
    for (name, value) in [
        ("--home-price", args.home_price),
        ("--monthly-rent", args.monthly_rent),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }
    for (name, value) in [
        ("--down-payment", args.down_payment),
        ("--buying-cost", args.buying_cost),
        ("--selling-cost", args.selling_cost),
        ("--maintenance-cost", args.maintenance_cost),
    ] {
        percent_between_0_and_100(name, value)?;
    }
    for (name, value) in [
        ("--investment-return", args.investment_return),
        ("--home-price-growth", args.home_price_growth),
        ("--rental-growth", args.rental_growth),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }
    if args.stay_years == 0 {
        return Err("--stay-years must be > 0".to_string());
    }
    at_most("--stay-years", args.stay_years, MAX_YEARS)?;
    if args.mortgage_term_years == 0 {
        return Err("--mortgage-term-years must be > 0".to_string());
    }
    at_most("--mortgage-term-years", args.mortgage_term_years, MAX_YEARS)?;
    let mortgage_rate = rate_above_minus_100("--mortgage-rate", args.mortgage_rate)?;

    Ok(CostFunctionConfig {
        home_price: args.home_price,
        monthly_rent: args.monthly_rent,
        stay_years: args.stay_years,
        mortgage_rate,
        down_payment: args.down_payment / 100.0,
        mortgage_term_years: args.mortgage_term_years,
        investment_return: args.investment_return / 100.0,
        home_price_growth: args.home_price_growth / 100.0,
        rental_growth: args.rental_growth / 100.0,
        buying_cost: args.buying_cost / 100.0,
        selling_cost: args.selling_cost / 100.0,
        maintenance_cost: args.maintenance_cost / 100.0,
    })
}

/// Sweep bounds as fractions plus the point count.
pub fn build_sweep(args: &RentVsBuyArgs) -> Result<(f64, f64, usize), String> {
    let from = rate_above_minus_100("--sweep-from", args.sweep_from)?;
    let to = rate_above_minus_100("--sweep-to", args.sweep_to)?;
    if to < from {
        return Err("--sweep-to must be >= --sweep-from".to_string());
    }
    if args.sweep_points < 2 {
        return Err("--sweep-points must be >= 2".to_string());
    }
    at_most("--sweep-points", args.sweep_points, MAX_SWEEP_POINTS)?;
    Ok((from, to, args.sweep_points))
}

pub fn build_break_even(args: &BreakEvenArgs) -> Result<BreakEvenConfig, String> {
    let search_min = rate_above_minus_100("--search-min", args.search_min)?;
    let search_max = rate_above_minus_100("--search-max", args.search_max)?;
    if search_max < search_min {
        return Err("--search-max must be >= --search-min".to_string());
    }
    if !args.tolerance.is_finite() || args.tolerance <= 0.0 {
        return Err("--tolerance must be > 0".to_string());
    }
    Ok(BreakEvenConfig {
        search_min,
        search_max,
        tolerance: args.tolerance / 100.0,
        ..BreakEvenConfig::default()
    })
}

pub fn build_fire_plan(args: &FirePlanArgs) -> Result<FirePlanRequest, String> {
    at_most("--current-age", args.current_age, MAX_AGE)?;
    at_most("--target-age", args.target_age, MAX_AGE)?;
    if args.target_age < args.current_age {
        return Err("--target-age must be >= --current-age".to_string());
    }
    for (name, value) in [
        ("--annual-expenses", args.annual_expenses),
        ("--current-savings", args.current_savings),
        ("--annual-income", args.annual_income),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }
    percent_between_0_and_100("--savings-rate", args.savings_rate)?;
    let inflation_rate = rate_above_minus_100("--inflation-rate", args.inflation_rate)?;

    let allocation = args
        .allocation
        .iter()
        .map(|slice| allocation_slice(&slice.name, slice.weight, slice.growth_rate))
        .collect::<Result<Vec<_>, _>>()?;
    let total_weight: f64 = allocation.iter().map(|s| s.weight).sum();
    if args.annual_return.is_none() && (total_weight - 1.0).abs() > 1e-9 {
        warn!(
            total_percent = total_weight * 100.0,
            "allocation weights do not sum to 100; blending by relative weight"
        );
    }

    let annual_return = match args.annual_return {
        Some(v) => rate_above_minus_100("--annual-return", v)?,
        None => blended_return(&allocation),
    };

    Ok(FirePlanRequest {
        inputs: FirePlanInputs {
            current_age: args.current_age,
            target_age: args.target_age,
            annual_expenses: args.annual_expenses,
            current_savings: args.current_savings,
            annual_income: args.annual_income,
            savings_rate: args.savings_rate / 100.0,
            annual_return,
            inflation_rate,
        },
        allocation,
    })
}

pub fn build_debt(args: &DebtArgs) -> Result<DebtInputs, String> {
    if !args.balance.is_finite() || args.balance < 0.0 {
        return Err("--balance must be >= 0".to_string());
    }
    if !args.monthly_payment.is_finite() || args.monthly_payment <= 0.0 {
        return Err("--monthly-payment must be > 0".to_string());
    }
    percent_between_0_and_100("--annual-rate", args.annual_rate)?;
    percent_between_0_and_100("--investment-return", args.investment_return)?;

    Ok(DebtInputs {
        balance: args.balance,
        annual_rate: args.annual_rate / 100.0,
        monthly_payment: args.monthly_payment,
        investment_return: args.investment_return / 100.0,
    })
}

pub fn build_insurance(args: &InsuranceArgs) -> Result<InsuranceInputs, String> {
    at_most("--current-age", args.current_age, MAX_AGE)?;
    for (name, value) in [
        ("--current-savings", args.current_savings),
        ("--annual-income", args.annual_income),
        ("--cost-per-dependent", args.cost_per_dependent),
        ("--debts", args.debts),
        ("--investment-return", args.investment_return),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }
    for (name, value) in [
        ("--current-coverage", args.current_coverage),
        ("--premium-now", args.premium_now),
        ("--premium-later", args.premium_later),
    ] {
        if value.is_some_and(|v| !v.is_finite() || v < 0.0) {
            return Err(format!("{name} must be >= 0"));
        }
    }
    percent_between_0_and_100("--savings-rate", args.savings_rate)?;
    percent_between_0_and_100("--probability-dependent", args.probability_dependent)?;
    percent_between_0_and_100("--probability-debt", args.probability_debt)?;

    Ok(InsuranceInputs {
        current_age: args.current_age,
        current_savings: args.current_savings,
        annual_income: args.annual_income,
        savings_rate: args.savings_rate / 100.0,
        gender: args.gender,
        dependents: args.dependents,
        cost_per_dependent: args.cost_per_dependent,
        debts: args.debts,
        current_coverage: args.current_coverage,
        probability_dependent: args.probability_dependent / 100.0,
        probability_debt: args.probability_debt / 100.0,
        premium_now: args.premium_now,
        premium_later: args.premium_later,
        investment_return: args.investment_return / 100.0,
    })
}

pub fn build_portfolio(args: &PortfolioArgs) -> Result<PortfolioRequest, String> {
    if args.holdings.is_empty() {
        return Err("at least one --holding is required".to_string());
    }
    let holdings = args
        .holdings
        .iter()
        .map(holding)
        .collect::<Result<Vec<_>, _>>()?;
    weights_sum_to_100("holding weights", args.holdings.iter().map(|h| h.weight))?;

    if !args.new_weights.is_empty() {
        if args.new_weights.len() != args.holdings.len() {
            return Err(format!(
                "--new-weights expects {} values, one per holding, got {}",
                args.holdings.len(),
                args.new_weights.len()
            ));
        }
        for &weight in &args.new_weights {
            percent_between_0_and_100("--new-weights", weight)?;
        }
        weights_sum_to_100("--new-weights", args.new_weights.iter().copied())?;
    }

    Ok(PortfolioRequest {
        holdings,
        new_weights: args.new_weights.iter().map(|w| w / 100.0).collect(),
    })
}

/// Parses `NAME:WEIGHT:RETURN:STD_DEV`, splitting from the right so the name
/// may contain `:`.
pub fn parse_holding(raw: &str) -> Result<HoldingInput, String> {
    let mut parts = raw.rsplitn(4, ':');
    let (Some(std_dev), Some(annual_return), Some(weight), Some(name)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("--holding expects NAME:WEIGHT:RETURN:STD_DEV, got `{raw}`"));
    };
    Ok(HoldingInput {
        name: name.to_string(),
        weight: parse_number("--holding", weight)?,
        annual_return: parse_number("--holding", annual_return)?,
        std_dev: parse_number("--holding", std_dev)?,
    })
}

/// Parses `WEIGHT:MEAN:STD_DEV`. Ranges are checked by `build_simulation`.
pub fn parse_asset_class(raw: &str) -> Result<AssetClassInput, String> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [weight, mean, std_dev] = parts.as_slice() else {
        return Err(format!("--asset-class expects WEIGHT:MEAN:STD_DEV, got `{raw}`"));
    };
    Ok(AssetClassInput {
        weight: parse_number("--asset-class", weight)?,
        mean_return: parse_number("--asset-class", mean)?,
        std_dev: parse_number("--asset-class", std_dev)?,
    })
}

/// Parses `NAME:WEIGHT:GROWTH`, splitting from the right so the name may
/// itself contain `:`.
pub fn parse_allocation(raw: &str) -> Result<AllocationInput, String> {
    let mut parts = raw.rsplitn(3, ':');
    let (Some(growth), Some(weight), Some(name)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("--allocation expects NAME:WEIGHT:GROWTH, got `{raw}`"));
    };
    Ok(AllocationInput {
        name: name.to_string(),
        weight: parse_number("--allocation", weight)?,
        growth_rate: parse_number("--allocation", growth)?,
    })
}

fn asset_class(
    name: &str,
    weight: f64,
    mean_return: f64,
    std_dev: f64,
) -> Result<AssetClass, String> {
    percent_between_0_and_100(&format!("{name} weight"), weight)?;
    if !mean_return.is_finite() {
        return Err(format!("{name} mean return must be a finite number"));
    }
    if !std_dev.is_finite() || std_dev < 0.0 {
        return Err(format!("{name} standard deviation must be >= 0"));
    }
    Ok(AssetClass {
        weight: weight / 100.0,
        mean_return: mean_return / 100.0,
        std_dev: std_dev / 100.0,
    })
}

fn allocation_slice(
    name: &str,
    weight: f64,
    growth_rate: f64,
) -> Result<AllocationSlice, String> {
    let label = format!("--allocation {name}");
    if name.trim().is_empty() {
        return Err("--allocation name must not be empty".to_string());
    }
    percent_between_0_and_100(&format!("{label} weight"), weight)?;
    let growth_rate = rate_above_minus_100(&format!("{label} growth"), growth_rate)?;
    Ok(AllocationSlice::new(name.trim(), weight / 100.0, growth_rate))
}

fn holding(input: &HoldingInput) -> Result<Holding, String> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err("--holding name must not be empty".to_string());
    }
    let label = format!("--holding {name}");
    percent_between_0_and_100(&format!("{label} weight"), input.weight)?;
    let annual_return = rate_above_minus_100(&format!("{label} return"), input.annual_return)?;
    if !input.std_dev.is_finite() || input.std_dev < 0.0 {
        return Err(format!("{label} standard deviation must be >= 0"));
    }
    Ok(Holding {
        name: name.to_string(),
        weight: input.weight / 100.0,
        annual_return,
        std_dev: input.std_dev / 100.0,
    })
}

fn weights_sum_to_100(name: &str, weights: impl Iterator<Item = f64>) -> Result<(), String> {
    let total: f64 = weights.sum();
    if (total / 100.0 - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(format!("{name} must sum to 100, got {total:.4}"));
    }
    Ok(())
}

fn parse_number(name: &str, raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("{name}: `{raw}` is not a number"))
}

fn at_most<T>(name: &str, value: T, max: T) -> Result<(), String>
where
    T: PartialOrd + std::fmt::Display,
{
    if value > max {
        return Err(format!("{name} must be <= {max}"));
    }
    Ok(())
}

fn percent_between_0_and_100(name: &str, value: f64) -> Result<(), String> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{name} must be between 0 and 100"))
    }
}

/// Converts a percent to a fraction, rejecting -100% and below.
fn rate_above_minus_100(name: &str, percent: f64) -> Result<f64, String> {
    if !percent.is_finite() || percent <= -100.0 {
        return Err(format!("{name} must be > -100"));
    }
    Ok(percent / 100.0)
}
