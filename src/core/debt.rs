use serde::Serialize;

use super::error::{CalcError, CalcResult, ensure_non_negative};
use super::projection::growth_factor;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebtInputs {
    pub balance: f64,
    pub annual_rate: f64,
    pub monthly_payment: f64,
    pub investment_return: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtRepayment {
    pub months: u32,
    pub years: f64,
    pub total_paid: f64,
    pub total_interest: f64,
    pub opportunity_cost: f64,
}

/// Months of level payments needed to clear the balance, and what those
/// payments would have earned if invested instead.
///
/// Every month is counted as a full payment, so `total_paid` slightly
/// overstates the final month.
pub fn repay_debt(inputs: &DebtInputs) -> CalcResult<DebtRepayment> {
    ensure_non_negative("balance", inputs.balance)?;
    ensure_non_negative("annual_rate", inputs.annual_rate)?;
    ensure_non_negative("investment_return", inputs.investment_return)?;
    ensure_non_negative("monthly_payment", inputs.monthly_payment)?;
    if inputs.monthly_payment == 0.0 {
        return Err(CalcError::invalid("monthly_payment", "must be > 0"));
    }

    let monthly_rate = inputs.annual_rate / 12.0;
    let first_interest = monthly_rate * inputs.balance;
    if inputs.balance > 0.0 && inputs.monthly_payment <= first_interest {
        return Err(CalcError::invalid(
            "monthly_payment",
            format!(
                "payment {:.2} never repays the debt; first month interest is {first_interest:.2}",
                inputs.monthly_payment
            ),
        ));
    }

    let months = months_to_repay(inputs.balance, monthly_rate, inputs.monthly_payment);
    let total_paid = inputs.monthly_payment * months as f64;
    let years = months as f64 / 12.0;
    let opportunity_cost = total_paid * ((1.0 + inputs.investment_return).powf(years) - 1.0);

    Ok(DebtRepayment {
        months,
        years,
        total_paid,
        total_interest: total_paid - inputs.balance,
        opportunity_cost,
    })
}

fn months_to_repay(balance: f64, monthly_rate: f64, payment: f64) -> u32 {
    if balance == 0.0 {
        return 0;
    }
    let exact = if monthly_rate == 0.0 {
        balance / payment
    } else {
        -(1.0 - monthly_rate * balance / payment).ln() / (1.0 + monthly_rate).ln()
    };
    // Drop rounding noise so an exact whole number of months is not pushed up.
    let rounded = exact.round();
    if (exact - rounded).abs() < 1e-9 {
        rounded as u32
    } else {
        exact.ceil() as u32
    }
}

/// Balance left after `months` payments, never below zero.
pub fn remaining_balance(inputs: &DebtInputs, months: u32) -> f64 {
    let monthly_rate = inputs.annual_rate / 12.0;
    let grown = inputs.balance * growth_factor(monthly_rate, months);
    let paid = if monthly_rate == 0.0 {
        inputs.monthly_payment * months as f64
    } else {
        inputs.monthly_payment * ((growth_factor(monthly_rate, months) - 1.0) / monthly_rate)
    };
    (grown - paid).max(0.0)
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

    fn base_inputs() -> DebtInputs {
        DebtInputs {
            balance: 50_000.0,
            annual_rate: 0.05,
            monthly_payment: 1_000.0,
            investment_return: 0.07,
        }
    }

    #[test]
    fn hand_calculated_amortization() {
        let result = repay_debt(&base_inputs()).expect("repayable");
        assert_eq!(result.months, 57);
        assert_approx_tol(result.years, 4.75, 1e-12);
        assert_approx_tol(result.total_paid, 57_000.0, 1e-9);
        assert_approx_tol(result.total_interest, 7_000.0, 1e-9);
        assert_approx_tol(result.opportunity_cost, 21_604.57, 0.01);
    }

    #[test]
    fn month_count_matches_simulated_balance() {
        let inputs = base_inputs();
        let result = repay_debt(&inputs).expect("repayable");
        assert!(remaining_balance(&inputs, result.months - 1) > 0.0);
        assert_eq!(remaining_balance(&inputs, result.months), 0.0);
    }

    #[test]
    fn zero_rate_divides_balance_by_payment() {
        let inputs = DebtInputs {
            balance: 12_000.0,
            annual_rate: 0.0,
            monthly_payment: 1_000.0,
            investment_return: 0.0,
        };
        let result = repay_debt(&inputs).expect("repayable");
        assert_eq!(result.months, 12);
        assert_eq!(result.total_interest, 0.0);
        assert_eq!(result.opportunity_cost, 0.0);

        let inputs = DebtInputs {
            balance: 12_500.0,
            ..inputs
        };
        assert_eq!(repay_debt(&inputs).expect("repayable").months, 13);
    }

    #[test]
    fn zero_balance_is_repaid_immediately() {
        let inputs = DebtInputs {
            balance: 0.0,
            ..base_inputs()
        };
        let result = repay_debt(&inputs).expect("repayable");
        assert_eq!(result.months, 0);
        assert_eq!(result.total_paid, 0.0);
        assert_eq!(result.opportunity_cost, 0.0);
    }

    #[test]
    fn rejects_payment_that_only_covers_interest() {
        let inputs = DebtInputs {
            balance: 300_000.0,
            annual_rate: 0.05,
            monthly_payment: 1_000.0,
            investment_return: 0.07,
        };
        let err = repay_debt(&inputs).expect_err("unpayable");
        assert!(err.to_string().contains("never repays"));
    }

    #[test]
    fn rejects_non_positive_payment() {
        let inputs = DebtInputs {
            monthly_payment: 0.0,
            ..base_inputs()
        };
        assert!(repay_debt(&inputs).is_err());
        let inputs = DebtInputs {
            monthly_payment: -5.0,
            ..base_inputs()
        };
        assert!(repay_debt(&inputs).is_err());
    }
}
