use serde::Serialize;
use tracing::debug;

use super::engine::WEIGHT_SUM_TOLERANCE;
use super::error::{CalcError, CalcResult, ensure_finite, ensure_non_negative};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub name: String,
    pub weight: f64,
    pub annual_return: f64,
    pub std_dev: f64,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    pub annual_return: f64,
    pub std_dev: f64,
    pub one_sigma_low: f64,
    pub one_sigma_high: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioReview {
    pub holdings: Vec<Holding>,
    pub current: PortfolioMetrics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_weights: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rebalanced: Option<PortfolioMetrics>,
}

/// Weighted return and standard deviation of `holdings`, and of the same
/// holdings at `new_weights` when those are given.
///
/// Holdings are treated as uncorrelated: the portfolio standard deviation is
/// the root of the summed squared weighted deviations.
pub fn review_portfolio(holdings: &[Holding], new_weights: &[f64]) -> CalcResult<PortfolioReview> {
    if holdings.is_empty() {
        return Err(CalcError::invalid("holdings", "at least one holding is required"));
    }
    for holding in holdings {
        ensure_non_negative("weight", holding.weight)?;
        ensure_finite("annual_return", holding.annual_return)?;
        ensure_non_negative("std_dev", holding.std_dev)?;
    }
    let current_weights: Vec<f64> = holdings.iter().map(|h| h.weight).collect();
    check_weight_sum("weight", &current_weights)?;
    let current = metrics(holdings, &current_weights);

    let rebalanced = if new_weights.is_empty() {
        None
    } else {
        if new_weights.len() != holdings.len() {
            return Err(CalcError::invalid(
                "new_weights",
                format!(
                    "expected {} weights, one per holding, got {}",
                    holdings.len(),
                    new_weights.len()
                ),
            ));
        }
        for &weight in new_weights {
            ensure_non_negative("new_weights", weight)?;
        }
        check_weight_sum("new_weights", new_weights)?;
        Some(metrics(holdings, new_weights))
    };

    debug!(
        annual_return = current.annual_return,
        std_dev = current.std_dev,
        rebalanced = rebalanced.is_some(),
        "portfolio reviewed"
    );

    Ok(PortfolioReview {
        holdings: holdings.to_vec(),
        current,
        new_weights: rebalanced.map(|_| new_weights.to_vec()),
        rebalanced,
    })
}

fn metrics(holdings: &[Holding], weights: &[f64]) -> PortfolioMetrics {
    let annual_return = holdings
        .iter()
        .zip(weights)
        .map(|(h, w)| w * h.annual_return)
        .sum::<f64>();
    let std_dev = holdings
        .iter()
        .zip(weights)
        .map(|(h, w)| (w * h.std_dev).powi(2))
        .sum::<f64>()
        .sqrt();
    PortfolioMetrics {
        annual_return,
        std_dev,
        one_sigma_low: annual_return - std_dev,
        one_sigma_high: annual_return + std_dev,
    }
}

fn check_weight_sum(field: &'static str, weights: &[f64]) -> CalcResult<()> {
    let total: f64 = weights.iter().sum();
    if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(CalcError::invalid(
            field,
            format!("weights must sum to 1, got {total:.6}"),
        ));
    }
    Ok(())
}
