use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetClass {
    pub weight: f64,
    pub mean_return: f64,
    pub std_dev: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub principal: f64,
    pub annual_contribution: f64,
    pub horizon_years: u32,
    pub asset_classes: Vec<AssetClass>,
    pub inflation_rate: f64,
}

impl SimulationConfig {
    /// Weighted mean of the asset-class means, before inflation.
    pub fn blended_mean_return(&self) -> f64 {
        self.asset_classes
            .iter()
            .map(|class| class.weight * class.mean_return)
            .sum()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryPoint {
    pub year: u32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileSeries {
    pub percentile: f64,
    pub points: Vec<TrajectoryPoint>,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalPercentiles {
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub trials: Vec<Vec<TrajectoryPoint>>,
    pub p10: PercentileSeries,
    pub p50: PercentileSeries,
    pub p90: PercentileSeries,
    pub final_percentiles: FinalPercentiles,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostFunctionConfig {
    pub home_price: f64,
    pub monthly_rent: f64,
    pub stay_years: u32,
    pub mortgage_rate: f64,
    pub down_payment: f64,
    pub mortgage_term_years: u32,
    pub investment_return: f64,
    pub home_price_growth: f64,
    pub rental_growth: f64,
    pub buying_cost: f64,
    pub selling_cost: f64,
    pub maintenance_cost: f64,
}

impl CostFunctionConfig {
    pub fn with_mortgage_rate(self, mortgage_rate: f64) -> Self {
        Self {
            mortgage_rate,
            ..self
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostComparison {
    pub renting: f64,
    pub buying: f64,
}

impl CostComparison {
    /// Positive when renting is the more expensive option.
    pub fn gap(self) -> f64 {
        self.renting - self.buying
    }
}
