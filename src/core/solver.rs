use serde::Serialize;
use tracing::{debug, warn};

use super::error::{CalcError, CalcResult};
use super::housing::{total_costs, validate_cost_config};
use super::types::{CostComparison, CostFunctionConfig};

pub const DEFAULT_SEARCH_MIN: f64 = 0.0;
pub const DEFAULT_SEARCH_MAX: f64 = 0.20;
pub const DEFAULT_TOLERANCE: f64 = 0.0001;
pub const DEFAULT_MAX_ITERATIONS: u32 = 200;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakEvenConfig {
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for BreakEvenConfig {
    fn default() -> Self {
        Self {
            search_min: DEFAULT_SEARCH_MIN,
            search_max: DEFAULT_SEARCH_MAX,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_rate: f64,
    pub renting_cost: f64,
    pub buying_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakEvenResult {
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub rate: f64,
    pub rate_percent: f64,
    pub costs_at_rate: CostComparison,
    pub iterations: Vec<BreakEvenIteration>,
    pub bracketed: bool,
    pub converged: bool,
    pub message: String,
}

/// Break-even mortgage rate for the rent-vs-buy cost model.
///
/// Assumes buying cost rises with the mortgage rate while renting cost does
/// not depend on it. That is not verified beyond checking the bracket ends.
pub fn mortgage_break_even(
    cost_config: &CostFunctionConfig,
    config: BreakEvenConfig,
) -> CalcResult<BreakEvenResult> {
    validate_cost_config(cost_config)?;
    if config.search_min <= -1.0 {
        return Err(CalcError::invalid(
            "search_min",
            format!("mortgage rate must be > -100%, got {}", config.search_min),
        ));
    }
    find_break_even(config, |rate| total_costs(cost_config, rate))
}

/// Bisection for the point where the two costs returned by `costs` are equal.
///
/// When renting is dearer at the midpoint the lower bound moves up, otherwise
/// the upper bound moves down. If the bracket ends do not straddle a sign
/// change the search still runs and converges to a bound; the result is then
/// marked `bracketed = false`.
///
/// Stops after `max_iterations` steps, or earlier once the midpoint can no
/// longer be told apart from a bound in `f64`.
pub fn find_break_even<F>(config: BreakEvenConfig, mut costs: F) -> CalcResult<BreakEvenResult>
where
    F: FnMut(f64) -> CostComparison,
{
    validate_config(config)?;

    let mut lo = config.search_min;
    let mut hi = config.search_max;

    let low_gap = costs(lo).gap();
    let high_gap = costs(hi).gap();
    let bracketed =
        lo == hi || low_gap == 0.0 || high_gap == 0.0 || (low_gap > 0.0) != (high_gap > 0.0);
    if !bracketed {
        warn!(
            search_min = lo,
            search_max = hi,
            low_gap,
            high_gap,
            "break-even bracket has no sign change; result will sit on a bound"
        );
    }

    let mut iterations = Vec::new();
    let mut it = 0;
    while hi - lo > config.tolerance && it < config.max_iterations {
        let mid = (lo + hi) * 0.5;
        if mid <= lo || mid >= hi {
            break;
        }
        it += 1;
        let eval = costs(mid);
        iterations.push(BreakEvenIteration {
            iteration: it,
            lower_bound: lo,
            upper_bound: hi,
            candidate_rate: mid,
            renting_cost: eval.renting,
            buying_cost: eval.buying,
        });

        if eval.renting > eval.buying {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let converged = hi - lo <= config.tolerance;
    let rate = (lo + hi) * 0.5;
    let costs_at_rate = costs(rate);
    debug!(rate, iterations = it, bracketed, converged, "break-even search finished");

    let message = if !bracketed {
        "Costs do not cross inside the search bounds; the rate shown is a search bound.".to_string()
    } else if !converged {
        "Stopped before the tolerance was met; returning best estimate.".to_string()
    } else if iterations.is_empty() {
        "Search bounds already within tolerance.".to_string()
    } else {
        "Solved break-even rate.".to_string()
    };

    Ok(BreakEvenResult {
        search_min: config.search_min,
        search_max: config.search_max,
        tolerance: config.tolerance,
        rate,
        rate_percent: rate * 100.0,
        costs_at_rate,
        iterations,
        bracketed,
        converged,
        message,
    })
}

fn validate_config(config: BreakEvenConfig) -> CalcResult<()> {
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return Err(CalcError::invalid("search_bounds", "search bounds must be finite"));
    }
    if config.search_max < config.search_min {
        return Err(CalcError::invalid(
            "search_max",
            "search_max must be >= search_min",
        ));
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err(CalcError::invalid("tolerance", "tolerance must be > 0"));
    }
    if config.max_iterations == 0 {
        return Err(CalcError::invalid("max_iterations", "max_iterations must be > 0"));
    }
    Ok(())
}
