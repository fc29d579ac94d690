use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

use super::error::{CalcError, CalcResult, ensure_finite, ensure_non_negative};
use super::types::{
    FinalPercentiles, PercentileSeries, SimulationConfig, SimulationResult, TrajectoryPoint,
};

pub const DEFAULT_TRIALS: u32 = 1_000;
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

const LOW_PERCENTILE: f64 = 10.0;
const MEDIAN_PERCENTILE: f64 = 50.0;
const HIGH_PERCENTILE: f64 = 90.0;

/// Runs `trials` independent paths with a reproducible `ChaCha8Rng` seeded from `seed`.
pub fn run_seeded_monte_carlo(
    config: &SimulationConfig,
    trials: u32,
    seed: u64,
) -> CalcResult<SimulationResult> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    run_monte_carlo(config, trials, &mut rng)
}

/// Simulates `trials` savings paths over the configured horizon.
///
/// Every year each asset class draws one normally distributed return; the
/// draws are blended with the configured weights, inflation is subtracted and
/// the total is compounded before the contribution is added. Percentile
/// series are computed independently per year across all trials, so a
/// percentile series is generally not the path of any single trial.
pub fn run_monte_carlo<R: Rng + ?Sized>(
    config: &SimulationConfig,
    trials: u32,
    rng: &mut R,
) -> CalcResult<SimulationResult> {
    validate_config(config)?;
    if trials == 0 {
        return Err(CalcError::invalid("trials", "must be > 0"));
    }

    let samplers = build_samplers(config)?;
    let horizon = config.horizon_years as usize;
    let mut acc = YearlyAccumulator::new(horizon, trials as usize);
    let mut paths = Vec::with_capacity(trials as usize);

    for _ in 0..trials {
        let path = simulate_trial(config, &samplers, rng);
        for (idx, point) in path.iter().enumerate() {
            acc.push(idx, point.value);
        }
        paths.push(path);
    }

    let [p10, p50, p90] = acc.into_series([LOW_PERCENTILE, MEDIAN_PERCENTILE, HIGH_PERCENTILE]);
    let final_percentiles = FinalPercentiles {
        p10: final_value(&p10, config.principal),
        p50: final_value(&p50, config.principal),
        p90: final_value(&p90, config.principal),
    };

    debug!(
        trials,
        horizon_years = config.horizon_years,
        median_final = final_percentiles.p50,
        "monte carlo run complete"
    );

    Ok(SimulationResult {
        trials: paths,
        p10,
        p50,
        p90,
        final_percentiles,
    })
}

struct ClassSampler {
    weight: f64,
    returns: Normal<f64>,
}

fn build_samplers(config: &SimulationConfig) -> CalcResult<Vec<ClassSampler>> {
    config
        .asset_classes
        .iter()
        .map(|class| {
            let returns = Normal::new(class.mean_return, class.std_dev)
                .map_err(|e| CalcError::invalid("asset_classes.std_dev", e.to_string()))?;
            Ok(ClassSampler {
                weight: class.weight,
                returns,
            })
        })
        .collect()
}

fn simulate_trial<R: Rng + ?Sized>(
    config: &SimulationConfig,
    samplers: &[ClassSampler],
    rng: &mut R,
) -> Vec<TrajectoryPoint> {
    let mut total = config.principal;
    let mut path = Vec::with_capacity(config.horizon_years as usize);

    for year in 1..=config.horizon_years {
        let blended: f64 = samplers
            .iter()
            .map(|s| s.weight * s.returns.sample(rng))
            .sum();
        let real_return = blended - config.inflation_rate;
        total = total * (1.0 + real_return) + config.annual_contribution;
        path.push(TrajectoryPoint { year, value: total });
    }

    path
}

fn final_value(series: &PercentileSeries, principal: f64) -> f64 {
    series.points.last().map(|p| p.value).unwrap_or(principal)
}

fn validate_config(config: &SimulationConfig) -> CalcResult<()> {
    ensure_non_negative("principal", config.principal)?;
    ensure_finite("annual_contribution", config.annual_contribution)?;
    ensure_finite("inflation_rate", config.inflation_rate)?;

    if config.asset_classes.is_empty() {
        return Err(CalcError::invalid(
            "asset_classes",
            "at least one asset class is required",
        ));
    }

    let mut weight_sum = 0.0;
    for class in &config.asset_classes {
        ensure_non_negative("asset_classes.weight", class.weight)?;
        ensure_finite("asset_classes.mean_return", class.mean_return)?;
        ensure_non_negative("asset_classes.std_dev", class.std_dev)?;
        weight_sum += class.weight;
    }

    if (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(CalcError::invalid(
            "asset_classes.weight",
            format!("weights must sum to 1, got {weight_sum}"),
        ));
    }
    Ok(())
}

struct YearlyAccumulator {
    values: Vec<Vec<f64>>,
}

impl YearlyAccumulator {
    fn new(years: usize, expected_samples: usize) -> Self {
        Self {
            values: (0..years)
                .map(|_| Vec::with_capacity(expected_samples))
                .collect(),
        }
    }

    fn push(&mut self, index: usize, value: f64) {
        self.values[index].push(value);
    }

    fn into_series<const N: usize>(mut self, percentiles: [f64; N]) -> [PercentileSeries; N] {
        percentiles.map(|p| PercentileSeries {
            percentile: p,
            points: self
                .values
                .iter_mut()
                .enumerate()
                .map(|(idx, year_values)| TrajectoryPoint {
                    year: idx as u32 + 1,
                    value: percentile(year_values, p),
                })
                .collect(),
        })
    }
}

/// Linear-interpolation percentile (`p` in 0..=100). Sorts `values` in place.
pub fn percentile(values: &mut [f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.sort_by(|a, b| a.total_cmp(b));

    let n = values.len();
    if n == 1 {
        return values[0];
    }

    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;

    if lower == upper {
        values[lower]
    } else {
        let w = rank - lower as f64;
        values[lower] + (values[upper] - values[lower]) * w
    }
}
