use serde::Serialize;
use tracing::debug;

use super::error::{CalcError, CalcResult, ensure_finite, ensure_non_negative};
use super::projection::{future_value, growth_factor};

/// Savings needed per unit of annual expenses (4% withdrawal rule).
pub const FIRE_MULTIPLE: f64 = 25.0;
pub const MAX_ADDITIONAL_YEARS: u32 = 100;
pub const MAX_AGE: u32 = 150;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSlice {
    pub name: String,
    pub weight: f64,
    pub growth_rate: f64,
}

impl AllocationSlice {
    pub fn new(name: impl Into<String>, weight: f64, growth_rate: f64) -> Self {
        Self {
            name: name.into(),
            weight,
            growth_rate,
        }
    }
}

/// 70% equities at 10%, 20% fixed income at 4%, 10% cash at 0%.
pub fn default_allocation() -> Vec<AllocationSlice> {
    vec![
        AllocationSlice::new("equities", 0.70, 0.10),
        AllocationSlice::new("fixed-income", 0.20, 0.04),
        AllocationSlice::new("cash", 0.10, 0.0),
    ]
}

/// Weight-normalized average growth rate; 0 when the weights sum to 0.
pub fn blended_return(slices: &[AllocationSlice]) -> f64 {
    let total_weight: f64 = slices.iter().map(|s| s.weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    slices.iter().map(|s| s.weight * s.growth_rate).sum::<f64>() / total_weight
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirePlanInputs {
    pub current_age: u32,
    pub target_age: u32,
    pub annual_expenses: f64,
    pub current_savings: f64,
    pub annual_income: f64,
    pub savings_rate: f64,
    pub annual_return: f64,
    pub inflation_rate: f64,
}

impl FirePlanInputs {
    pub fn years_to_target(&self) -> u32 {
        self.target_age.saturating_sub(self.current_age)
    }

    pub fn real_return(&self) -> f64 {
        self.annual_return - self.inflation_rate
    }

    pub fn annual_savings(&self) -> f64 {
        self.annual_income * self.savings_rate
    }

    fn projected_savings(&self) -> f64 {
        future_value(
            self.current_savings,
            self.annual_savings(),
            self.real_return(),
            self.years_to_target(),
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgePoint {
    pub age: u32,
    pub savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirePlan {
    pub fire_number: f64,
    pub real_return: f64,
    pub annual_savings: f64,
    pub years_to_target: u32,
    pub current_savings_growth: f64,
    pub contributions_growth: f64,
    pub projected_savings: f64,
    pub can_retire: bool,
    pub gap: f64,
    pub additional_years: Option<u32>,
    pub fire_age: Option<u32>,
    pub required_growth_rate: Option<f64>,
    pub actual_trajectory: Vec<AgePoint>,
    pub required_trajectory: Vec<AgePoint>,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityRow {
    pub value: f64,
    pub projected_savings: f64,
}

/// Savings rates 10%..=80% in steps of 5 points.
pub fn default_savings_rates() -> Vec<f64> {
    (2..=16).map(|step| step as f64 * 0.05).collect()
}

/// Nominal returns 3.0%..=12.0% in steps of 0.5 points.
pub fn default_annual_returns() -> Vec<f64> {
    (6..=24).map(|step| step as f64 * 0.005).collect()
}

pub fn plan_fire(inputs: &FirePlanInputs) -> CalcResult<FirePlan> {
    validate_inputs(inputs)?;

    let fire_number = FIRE_MULTIPLE * inputs.annual_expenses;
    let real_return = inputs.real_return();
    let annual_savings = inputs.annual_savings();
    let years = inputs.years_to_target();

    let current_savings_growth = future_value(inputs.current_savings, 0.0, real_return, years);
    let contributions_growth = future_value(0.0, annual_savings, real_return, years);
    let projected_savings = current_savings_growth + contributions_growth;

    let can_retire = projected_savings >= fire_number;
    let gap = if can_retire {
        0.0
    } else {
        fire_number - projected_savings
    };
    let additional_years = if can_retire {
        Some(0)
    } else {
        years_until_target(projected_savings, annual_savings, real_return, fire_number)
    };

    let required_growth_rate = if inputs.current_savings > 0.0 && years > 0 {
        Some((fire_number / inputs.current_savings).powf(1.0 / years as f64) - 1.0)
    } else {
        None
    };

    let actual_trajectory = (0..=years)
        .map(|n| AgePoint {
            age: inputs.current_age + n,
            savings: future_value(inputs.current_savings, annual_savings, real_return, n),
        })
        .collect();
    let required_trajectory = match required_growth_rate {
        Some(rate) => (0..=years)
            .map(|n| AgePoint {
                age: inputs.current_age + n,
                savings: inputs.current_savings * growth_factor(rate, n),
            })
            .collect(),
        None => Vec::new(),
    };

    debug!(fire_number, projected_savings, can_retire, "fire plan computed");

    Ok(FirePlan {
        fire_number,
        real_return,
        annual_savings,
        years_to_target: years,
        current_savings_growth,
        contributions_growth,
        projected_savings,
        can_retire,
        gap,
        additional_years,
        fire_age: additional_years.and_then(|extra| inputs.target_age.checked_add(extra)),
        required_growth_rate,
        actual_trajectory,
        required_trajectory,
    })
}

pub fn savings_rate_sensitivity(
    inputs: &FirePlanInputs,
    savings_rates: &[f64],
) -> CalcResult<Vec<SensitivityRow>> {
    validate_inputs(inputs)?;
    savings_rates
        .iter()
        .map(|&savings_rate| {
            let candidate = FirePlanInputs {
                savings_rate,
                ..*inputs
            };
            validate_inputs(&candidate)?;
            Ok(SensitivityRow {
                value: savings_rate,
                projected_savings: candidate.projected_savings(),
            })
        })
        .collect()
}

pub fn return_sensitivity(
    inputs: &FirePlanInputs,
    annual_returns: &[f64],
) -> CalcResult<Vec<SensitivityRow>> {
    validate_inputs(inputs)?;
    annual_returns
        .iter()
        .map(|&annual_return| {
            let candidate = FirePlanInputs {
                annual_return,
                ..*inputs
            };
            validate_inputs(&candidate)?;
            Ok(SensitivityRow {
                value: annual_return,
                projected_savings: candidate.projected_savings(),
            })
        })
        .collect()
}

/// Whole years of further compounding and contributing until `target` is met.
fn years_until_target(start: f64, contribution: f64, rate: f64, target: f64) -> Option<u32> {
    let mut balance = start;
    for year in 1..=MAX_ADDITIONAL_YEARS {
        balance = balance * (1.0 + rate) + contribution;
        if balance >= target {
            return Some(year);
        }
    }
    None
}

fn validate_inputs(inputs: &FirePlanInputs) -> CalcResult<()> {
    for (field, age) in [
        ("current_age", inputs.current_age),
        ("target_age", inputs.target_age),
    ] {
        if age > MAX_AGE {
            return Err(CalcError::invalid(
                field,
                format!("must be <= {MAX_AGE}, got {age}"),
            ));
        }
    }
    if inputs.target_age < inputs.current_age {
        return Err(CalcError::invalid(
            "target_age",
            format!(
                "must be >= current age {}, got {}",
                inputs.current_age, inputs.target_age
            ),
        ));
    }
    ensure_non_negative("annual_expenses", inputs.annual_expenses)?;
    ensure_non_negative("current_savings", inputs.current_savings)?;
    ensure_non_negative("annual_income", inputs.annual_income)?;
    ensure_non_negative("savings_rate", inputs.savings_rate)?;
    ensure_finite("annual_return", inputs.annual_return)?;
    ensure_finite("inflation_rate", inputs.inflation_rate)?;
    if inputs.real_return() <= -1.0 {
        return Err(CalcError::invalid(
            "annual_return",
            "real return after inflation must be > -100%",
        ));
    }
    Ok(())
}
