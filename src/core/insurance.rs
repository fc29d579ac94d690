use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{CalcError, CalcResult, ensure_non_negative};
use super::fire::{AgePoint, MAX_AGE};
use super::projection::future_value;

pub const DEFAULT_INSURANCE_RETURN: f64 = 0.045;
/// Years between buying now and buying later.
pub const DEFERRAL_YEARS: u32 = 10;
pub const BUY_NOW_PREMIUM_YEARS: f64 = 30.0;
pub const BUY_LATER_PREMIUM_YEARS: f64 = 20.0;
pub const PREMIUM_DISCOUNT_RATE: f64 = 0.03;
pub const PREMIUM_TABLE_FIRST_AGE: u32 = 20;

/// Annual premium for $1M of term cover, male, from age 20.
const MALE_PREMIUMS: [f64; 50] = [
    365.84, 410.16, 454.48, 498.80, 543.12, 587.44, 631.76, 676.08, 720.40, 764.72, 809.04,
    853.36, 897.68, 942.00, 986.32, 1030.64, 1074.96, 1119.28, 1163.60, 1207.92, 1252.24,
    1296.60, 1340.92, 1385.24, 1429.56, 1252.27, 1296.60, 1340.92, 1385.24, 1429.56, 1473.88,
    1518.20, 1562.52, 1606.84, 1651.16, 1695.48, 1739.80, 1784.12, 1828.44, 1872.76, 1917.08,
    1961.40, 2005.72, 2050.04, 2094.36, 2138.68, 2183.00, 2227.32, 2271.64, 2315.96,
];

/// Annual premium for $1M of term cover, female, from age 20.
const FEMALE_PREMIUMS: [f64; 51] = [
    286.50, 318.75, 351.00, 383.25, 415.50, 447.75, 480.00, 512.25, 544.50, 576.75, 609.00,
    641.25, 673.50, 705.75, 738.00, 770.25, 802.50, 834.75, 867.00, 899.25, 931.50, 963.74,
    995.99, 1028.24, 1060.49, 931.49, 963.74, 995.99, 1028.24, 1060.49, 1092.74, 1124.99,
    1157.24, 1189.49, 1221.74, 1253.99, 1286.24, 1318.49, 1350.74, 1382.99, 1415.24, 1447.49,
    1479.74, 1511.99, 1544.24, 1576.49, 1608.74, 1640.99, 1673.24, 1705.49, 1737.74,
];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            other => Err(format!("expected `male` or `female`, got `{other}`")),
        }
    }
}

/// Table premium for the given gender and age, if the table covers it.
pub fn default_annual_premium(gender: Gender, age: u32) -> Option<f64> {
    let table: &[f64] = match gender {
        Gender::Male => &MALE_PREMIUMS,
        Gender::Female => &FEMALE_PREMIUMS,
    };
    let index = age.checked_sub(PREMIUM_TABLE_FIRST_AGE)?;
    table.get(index as usize).copied()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsuranceInputs {
    pub current_age: u32,
    pub current_savings: f64,
    pub annual_income: f64,
    pub savings_rate: f64,
    pub gender: Gender,
    pub dependents: u32,
    pub cost_per_dependent: f64,
    pub debts: f64,
    pub current_coverage: Option<f64>,
    pub probability_dependent: f64,
    pub probability_debt: f64,
    pub premium_now: Option<f64>,
    pub premium_later: Option<f64>,
    pub investment_return: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CoverageStatus {
    OverInsured,
    UnderInsured,
    Matched,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageCheck {
    pub current_coverage: f64,
    pub status: CoverageStatus,
    pub difference: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PurchaseTiming {
    BuyNow,
    BuyLater,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumComparison {
    pub premium_now: f64,
    pub premium_later: f64,
    pub buy_now_cost: f64,
    pub buy_later_cost_undiscounted: f64,
    pub buy_later_cost: f64,
    pub expected_buy_later_cost: f64,
    pub recommendation: PurchaseTiming,
    pub savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsuranceAssessment {
    pub dependents_cost: f64,
    pub coverage_need: f64,
    pub coverage_gap: f64,
    pub coverage: Option<CoverageCheck>,
    pub annual_savings: f64,
    pub savings_projection: Vec<AgePoint>,
    pub savings_at_coverage_age: f64,
    pub future_coverage_gap: f64,
    pub probability_dependent_or_debt: f64,
    pub premiums: PremiumComparison,
}

pub fn assess_life_insurance(inputs: &InsuranceInputs) -> CalcResult<InsuranceAssessment> {
    validate_inputs(inputs)?;

    let dependents_cost = inputs.dependents as f64 * inputs.cost_per_dependent;
    let coverage_need = dependents_cost + inputs.debts;
    let coverage_gap = (coverage_need - inputs.current_savings).max(0.0);
    let coverage = inputs
        .current_coverage
        .map(|current| check_coverage(current, coverage_need));

    let annual_savings = inputs.annual_income * inputs.savings_rate;
    let savings_projection: Vec<AgePoint> = (0..=DEFERRAL_YEARS)
        .map(|n| AgePoint {
            age: inputs.current_age + n,
            savings: future_value(
                inputs.current_savings,
                annual_savings,
                inputs.investment_return,
                n,
            ),
        })
        .collect();
    let savings_at_coverage_age = savings_projection
        .last()
        .map(|point| point.savings)
        .unwrap_or(inputs.current_savings);
    let future_coverage_gap = (coverage_need - savings_at_coverage_age).max(0.0);

    let probability_dependent_or_debt = inputs.probability_dependent + inputs.probability_debt
        - inputs.probability_dependent * inputs.probability_debt;
    let premiums = compare_premiums(inputs, probability_dependent_or_debt)?;

    debug!(
        coverage_need,
        coverage_gap,
        recommendation = ?premiums.recommendation,
        "life insurance assessed"
    );

    Ok(InsuranceAssessment {
        dependents_cost,
        coverage_need,
        coverage_gap,
        coverage,
        annual_savings,
        savings_projection,
        savings_at_coverage_age,
        future_coverage_gap,
        probability_dependent_or_debt,
        premiums,
    })
}

fn check_coverage(current: f64, need: f64) -> CoverageCheck {
    let status = if current > need {
        CoverageStatus::OverInsured
    } else if current < need {
        CoverageStatus::UnderInsured
    } else {
        CoverageStatus::Matched
    };
    CoverageCheck {
        current_coverage: current,
        status,
        difference: (current - need).abs(),
    }
}

fn compare_premiums(
    inputs: &InsuranceInputs,
    probability: f64,
) -> CalcResult<PremiumComparison> {
    let later_age = inputs.current_age + DEFERRAL_YEARS;
    let premium_now = premium_or_table(
        "premium_now",
        inputs.premium_now,
        inputs.gender,
        inputs.current_age,
    )?;
    let premium_later =
        premium_or_table("premium_later", inputs.premium_later, inputs.gender, later_age)?;

    let buy_now_cost = premium_now * BUY_NOW_PREMIUM_YEARS;
    let buy_later_cost_undiscounted = premium_later * BUY_LATER_PREMIUM_YEARS;
    let buy_later_cost =
        buy_later_cost_undiscounted / (1.0 + PREMIUM_DISCOUNT_RATE).powi(DEFERRAL_YEARS as i32);
    let expected_buy_later_cost = probability * buy_later_cost;

    let recommendation = if buy_now_cost < expected_buy_later_cost {
        PurchaseTiming::BuyNow
    } else {
        PurchaseTiming::BuyLater
    };

    Ok(PremiumComparison {
        premium_now,
        premium_later,
        buy_now_cost,
        buy_later_cost_undiscounted,
        buy_later_cost,
        expected_buy_later_cost,
        recommendation,
        savings: (buy_now_cost - expected_buy_later_cost).abs(),
    })
}

fn premium_or_table(
    field: &'static str,
    premium: Option<f64>,
    gender: Gender,
    age: u32,
) -> CalcResult<f64> {
    if let Some(value) = premium {
        ensure_non_negative(field, value)?;
        return Ok(value);
    }
    default_annual_premium(gender, age).ok_or_else(|| {
        CalcError::invalid(
            field,
            format!("no table premium for age {age}; provide the premium explicitly"),
        )
    })
}

fn validate_inputs(inputs: &InsuranceInputs) -> CalcResult<()> {
    if inputs.current_age > MAX_AGE {
        return Err(CalcError::invalid(
            "current_age",
            format!("must be <= {MAX_AGE}, got {}", inputs.current_age),
        ));
    }
    ensure_non_negative("current_savings", inputs.current_savings)?;
    ensure_non_negative("annual_income", inputs.annual_income)?;
    ensure_non_negative("cost_per_dependent", inputs.cost_per_dependent)?;
    ensure_non_negative("debts", inputs.debts)?;
    if let Some(coverage) = inputs.current_coverage {
        ensure_non_negative("current_coverage", coverage)?;
    }
    ensure_non_negative("investment_return", inputs.investment_return)?;
    for (field, value) in [
        ("savings_rate", inputs.savings_rate),
        ("probability_dependent", inputs.probability_dependent),
        ("probability_debt", inputs.probability_debt),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(CalcError::invalid(
                field,
                format!("must be between 0 and 1, got {value}"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn base_inputs() -> InsuranceInputs {
        InsuranceInputs {
            current_age: 32,
            current_savings: 500_000.0,
            annual_income: 100_000.0,
            savings_rate: 0.23,
            gender: Gender::Male,
            dependents: 1,
            cost_per_dependent: 300_000.0,
            debts: 500_000.0,
            current_coverage: None,
            probability_dependent: 0.5,
            probability_debt: 0.5,
            premium_now: None,
            premium_later: None,
            investment_return: DEFAULT_INSURANCE_RETURN,
        }
    }

    #[test]
    fn hand_calculated_need_and_gap() {
        let result = assess_life_insurance(&base_inputs()).expect("valid inputs");
        assert_eq!(result.dependents_cost, 300_000.0);
        assert_eq!(result.coverage_need, 800_000.0);
        assert_eq!(result.coverage_gap, 300_000.0);
        assert_eq!(result.coverage, None);
        assert_approx_tol(result.annual_savings, 23_000.0, 1e-9);
        assert_approx_tol(result.probability_dependent_or_debt, 0.75, 1e-12);
    }

    #[test]
    fn savings_projection_covers_ten_years() {
        let result = assess_life_insurance(&base_inputs()).expect("valid inputs");
        assert_eq!(result.savings_projection.len(), 11);
        assert_eq!(result.savings_projection[0].age, 32);
        assert_eq!(result.savings_projection[0].savings, 500_000.0);
        assert_eq!(result.savings_projection[10].age, 42);
        assert_approx_tol(result.savings_at_coverage_age, 1_059_113.53, 0.01);
        assert_eq!(result.future_coverage_gap, 0.0);
    }

    #[test]
    fn table_premiums_favour_buying_later_by_default() {
        let premiums = assess_life_insurance(&base_inputs())
            .expect("valid inputs")
            .premiums;
        assert_eq!(premiums.premium_now, 897.68);
        assert_eq!(premiums.premium_later, 1_340.92);
        assert_approx_tol(premiums.buy_now_cost, 26_930.40, 1e-6);
        assert_approx_tol(premiums.buy_later_cost_undiscounted, 26_818.40, 1e-6);
        assert_approx_tol(premiums.buy_later_cost, 19_955.41, 0.01);
        assert_approx_tol(premiums.expected_buy_later_cost, 14_966.56, 0.01);
        assert_eq!(premiums.recommendation, PurchaseTiming::BuyLater);
        assert_approx_tol(premiums.savings, 11_963.84, 0.01);
    }

    #[test]
    fn explicit_premiums_can_favour_buying_now() {
        let inputs = InsuranceInputs {
            premium_now: Some(300.0),
            premium_later: Some(2_000.0),
            probability_dependent: 1.0,
            ..base_inputs()
        };
        let premiums = assess_life_insurance(&inputs).expect("valid inputs").premiums;
        assert_eq!(premiums.recommendation, PurchaseTiming::BuyNow);
        assert_approx_tol(premiums.buy_now_cost, 9_000.0, 1e-9);
    }

    #[test]
    fn classifies_existing_coverage() {
        let status = |coverage: f64| {
            let inputs = InsuranceInputs {
                current_coverage: Some(coverage),
                ..base_inputs()
            };
            assess_life_insurance(&inputs)
                .expect("valid inputs")
                .coverage
                .expect("coverage given")
        };
        let over = status(1_000_000.0);
        assert_eq!(over.status, CoverageStatus::OverInsured);
        assert_eq!(over.difference, 200_000.0);
        let under = status(500_000.0);
        assert_eq!(under.status, CoverageStatus::UnderInsured);
        assert_eq!(under.difference, 300_000.0);
        assert_eq!(status(800_000.0).status, CoverageStatus::Matched);
    }

    #[test]
    fn savings_above_need_leave_no_gap() {
        let inputs = InsuranceInputs {
            current_savings: 2_000_000.0,
            ..base_inputs()
        };
        let result = assess_life_insurance(&inputs).expect("valid inputs");
        assert_eq!(result.coverage_gap, 0.0);
    }

    #[test]
    fn zero_return_projection_is_linear() {
        let inputs = InsuranceInputs {
            investment_return: 0.0,
            ..base_inputs()
        };
        let result = assess_life_insurance(&inputs).expect("valid inputs");
        assert_approx_tol(result.savings_at_coverage_age, 730_000.0, 1e-6);
    }

    #[test]
    fn premium_table_lookup_bounds() {
        assert_eq!(default_annual_premium(Gender::Female, 20), Some(286.50));
        assert_eq!(default_annual_premium(Gender::Female, 70), Some(1_737.74));
        assert_eq!(default_annual_premium(Gender::Male, 69), Some(2_315.96));
        assert_eq!(default_annual_premium(Gender::Male, 70), None);
        assert_eq!(default_annual_premium(Gender::Male, 19), None);
    }

    #[test]
    fn age_outside_table_needs_explicit_premium() {
        let inputs = InsuranceInputs {
            current_age: 65,
            ..base_inputs()
        };
        let err = assess_life_insurance(&inputs).expect_err("no table premium at 75");
        assert!(err.to_string().contains("premium_later"));

        let inputs = InsuranceInputs {
            premium_later: Some(3_000.0),
            ..inputs
        };
        assert!(assess_life_insurance(&inputs).is_ok());
    }

    #[test]
    fn rejects_out_of_range_probabilities_and_ages() {
        let inputs = InsuranceInputs {
            probability_debt: 1.5,
            ..base_inputs()
        };
        let err = assess_life_insurance(&inputs).expect_err("must reject");
        assert!(err.to_string().contains("probability_debt"));

        let inputs = InsuranceInputs {
            current_age: u32::MAX,
            ..base_inputs()
        };
        assert!(assess_life_insurance(&inputs).is_err());
    }

    #[test]
    fn gender_parses_case_insensitively() {
        assert_eq!("Female".parse::<Gender>(), Ok(Gender::Female));
        assert!("other".parse::<Gender>().is_err());
    }
}
