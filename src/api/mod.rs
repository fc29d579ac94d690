pub mod args;
pub mod report;

use axum::{
    Router,
    extract::{Json, Query},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::Gender;
use args::{
    AllocationInput, AssetClassInput, BreakEvenArgs, DebtArgs, FirePlanArgs, HoldingInput,
    HousingArgs, InsuranceArgs, PortfolioArgs, ProjectArgs, RentVsBuyArgs, SimulateArgs,
    defaults,
};
use report::{
    break_even_report, debt_report, fire_plan_report, insurance_report, portfolio_report,
    project_report, rent_vs_buy_report, simulate_report,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    principal: Option<f64>,
    annual_contribution: Option<f64>,
    annual_return: Option<f64>,
    years: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    principal: Option<f64>,
    annual_contribution: Option<f64>,
    years: Option<u32>,
    inflation_rate: Option<f64>,
    stable_weight: Option<f64>,
    stable_return: Option<f64>,
    stable_std_dev: Option<f64>,
    growth_weight: Option<f64>,
    growth_return: Option<f64>,
    growth_std_dev: Option<f64>,
    asset_classes: Option<Vec<AssetClassInput>>,
    trials: Option<u32>,
    seed: Option<u64>,
    include_trials: Option<bool>,
}

/// Shared by the rent-vs-buy and break-even endpoints; each reads the keys it needs.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct HousingPayload {
    home_price: Option<f64>,
    monthly_rent: Option<f64>,
    stay_years: Option<u32>,
    mortgage_rate: Option<f64>,
    down_payment: Option<f64>,
    mortgage_term_years: Option<u32>,
    investment_return: Option<f64>,
    home_price_growth: Option<f64>,
    rental_growth: Option<f64>,
    buying_cost: Option<f64>,
    selling_cost: Option<f64>,
    maintenance_cost: Option<f64>,

    sweep_from: Option<f64>,
    sweep_to: Option<f64>,
    sweep_points: Option<usize>,

    search_min: Option<f64>,
    search_max: Option<f64>,
    tolerance: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FirePlanPayload {
    current_age: Option<u32>,
    target_age: Option<u32>,
    annual_expenses: Option<f64>,
    current_savings: Option<f64>,
    annual_income: Option<f64>,
    savings_rate: Option<f64>,
    inflation_rate: Option<f64>,
    annual_return: Option<f64>,
    allocation: Option<Vec<AllocationInput>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DebtPayload {
    balance: Option<f64>,
    annual_rate: Option<f64>,
    monthly_payment: Option<f64>,
    investment_return: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct InsurancePayload {
    current_age: Option<u32>,
    current_savings: Option<f64>,
    annual_income: Option<f64>,
    savings_rate: Option<f64>,
    gender: Option<Gender>,
    dependents: Option<u32>,
    cost_per_dependent: Option<f64>,
    debts: Option<f64>,
    current_coverage: Option<f64>,
    probability_dependent: Option<f64>,
    probability_debt: Option<f64>,
    premium_now: Option<f64>,
    premium_later: Option<f64>,
    investment_return: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PortfolioPayload {
    holdings: Option<Vec<HoldingInput>>,
    new_weights: Option<Vec<f64>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router() -> Router {
    Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route(
            "/api/rent-vs-buy",
            get(rent_vs_buy_get_handler).post(rent_vs_buy_post_handler),
        )
        .route(
            "/api/break-even",
            get(break_even_get_handler).post(break_even_post_handler),
        )
        .route(
            "/api/fire-plan",
            get(fire_plan_get_handler).post(fire_plan_post_handler),
        )
        .route("/api/debt", get(debt_get_handler).post(debt_post_handler))
        .route(
            "/api/insurance",
            get(insurance_get_handler).post(insurance_post_handler),
        )
        .route(
            "/api/portfolio",
            get(portfolio_get_handler).post(portfolio_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "fincalc HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/api/project");

    axum::serve(listener, router()).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload)
}

async fn rent_vs_buy_get_handler(Query(payload): Query<HousingPayload>) -> Response {
    rent_vs_buy_handler_impl(payload)
}

async fn rent_vs_buy_post_handler(Json(payload): Json<HousingPayload>) -> Response {
    rent_vs_buy_handler_impl(payload)
}

async fn break_even_get_handler(Query(payload): Query<HousingPayload>) -> Response {
    break_even_handler_impl(payload)
}

async fn break_even_post_handler(Json(payload): Json<HousingPayload>) -> Response {
    break_even_handler_impl(payload)
}

async fn fire_plan_get_handler(Query(payload): Query<FirePlanPayload>) -> Response {
    fire_plan_handler_impl(payload)
}

async fn fire_plan_post_handler(Json(payload): Json<FirePlanPayload>) -> Response {
    fire_plan_handler_impl(payload)
}

async fn debt_get_handler(Query(payload): Query<DebtPayload>) -> Response {
    debt_handler_impl(payload)
}

async fn debt_post_handler(Json(payload): Json<DebtPayload>) -> Response {
    debt_handler_impl(payload)
}

async fn insurance_get_handler(Query(payload): Query<InsurancePayload>) -> Response {
    insurance_handler_impl(payload)
}

async fn insurance_post_handler(Json(payload): Json<InsurancePayload>) -> Response {
    insurance_handler_impl(payload)
}

async fn portfolio_get_handler(Query(payload): Query<PortfolioPayload>) -> Response {
    portfolio_handler_impl(payload)
}

async fn portfolio_post_handler(Json(payload): Json<PortfolioPayload>) -> Response {
    portfolio_handler_impl(payload)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    respond("project", project_report(&project_args_from_payload(payload)))
}

fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    respond("simulate", simulate_report(&simulate_args_from_payload(payload)))
}

fn rent_vs_buy_handler_impl(payload: HousingPayload) -> Response {
    respond(
        "rent-vs-buy",
        rent_vs_buy_report(&rent_vs_buy_args_from_payload(payload)),
    )
}

fn break_even_handler_impl(payload: HousingPayload) -> Response {
    respond(
        "break-even",
        break_even_report(&break_even_args_from_payload(payload)),
    )
}

fn fire_plan_handler_impl(payload: FirePlanPayload) -> Response {
    respond(
        "fire-plan",
        fire_plan_report(&fire_plan_args_from_payload(payload)),
    )
}

fn debt_handler_impl(payload: DebtPayload) -> Response {
    respond("debt", debt_report(&debt_args_from_payload(payload)))
}

fn insurance_handler_impl(payload: InsurancePayload) -> Response {
    respond("insurance", insurance_report(&insurance_args_from_payload(payload)))
}

fn portfolio_handler_impl(payload: PortfolioPayload) -> Response {
    respond("portfolio", portfolio_report(&portfolio_args_from_payload(payload)))
}

fn respond<T: Serialize>(endpoint: &str, result: Result<T, String>) -> Response {
    match result {
        Ok(body) => json_response(StatusCode::OK, body),
        Err(msg) => {
            warn!(endpoint, error = %msg, "rejected request");
            error_response(StatusCode::BAD_REQUEST, &msg)
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn project_args_from_payload(payload: ProjectPayload) -> ProjectArgs {
    let mut args: ProjectArgs = defaults();

    if let Some(v) = payload.principal {
        args.principal = v;
    }
    if let Some(v) = payload.annual_contribution {
        args.annual_contribution = v;
    }
    if let Some(v) = payload.annual_return {
        args.annual_return = v;
    }
    if let Some(v) = payload.years {
        args.years = v;
    }

    args
}

fn simulate_args_from_payload(payload: SimulatePayload) -> SimulateArgs {
    let mut args: SimulateArgs = defaults();

    if let Some(v) = payload.principal {
        args.principal = v;
    }
    if let Some(v) = payload.annual_contribution {
        args.annual_contribution = v;
    }
    if let Some(v) = payload.years {
        args.years = v;
    }
    if let Some(v) = payload.inflation_rate {
        args.inflation_rate = v;
    }

    if let Some(v) = payload.stable_weight {
        args.stable_weight = v;
    }
    if let Some(v) = payload.stable_return {
        args.stable_return = v;
    }
    if let Some(v) = payload.stable_std_dev {
        args.stable_std_dev = v;
    }
    if let Some(v) = payload.growth_weight {
        args.growth_weight = v;
    }
    if let Some(v) = payload.growth_return {
        args.growth_return = v;
    }
    if let Some(v) = payload.growth_std_dev {
        args.growth_std_dev = v;
    }
    if let Some(classes) = payload.asset_classes {
        args.asset_classes = classes;
    }

    if let Some(v) = payload.trials {
        args.trials = v;
    }
    if let Some(v) = payload.seed {
        args.seed = Some(v);
    }
    if let Some(v) = payload.include_trials {
        args.include_trials = v;
    }

    args
}

fn overlay_housing(housing: &mut HousingArgs, payload: &HousingPayload) {
    if let Some(v) = payload.home_price {
        housing.home_price = v;
    }
    if let Some(v) = payload.monthly_rent {
        housing.monthly_rent = v;
    }
    if let Some(v) = payload.stay_years {
        housing.stay_years = v;
    }
    if let Some(v) = payload.mortgage_rate {
        housing.mortgage_rate = v;
    }
    if let Some(v) = payload.down_payment {
        housing.down_payment = v;
    }
    if let Some(v) = payload.mortgage_term_years {
        housing.mortgage_term_years = v;
    }
    if let Some(v) = payload.investment_return {
        housing.investment_return = v;
    }
    if let Some(v) = payload.home_price_growth {
        housing.home_price_growth = v;
    }
    if let Some(v) = payload.rental_growth {
        housing.rental_growth = v;
    }
    if let Some(v) = payload.buying_cost {
        housing.buying_cost = v;
    }
    if let Some(v) = payload.selling_cost {
        housing.selling_cost = v;
    }
    if let Some(v) = payload.maintenance_cost {
        housing.maintenance_cost = v;
    }
}

fn rent_vs_buy_args_from_payload(payload: HousingPayload) -> RentVsBuyArgs {
    let mut args: RentVsBuyArgs = defaults();
    overlay_housing(&mut args.housing, &payload);

    if let Some(v) = payload.sweep_from {
        args.sweep_from = v;
    }
    if let Some(v) = payload.sweep_to {
        args.sweep_to = v;
    }
    if let Some(v) = payload.sweep_points {
        args.sweep_points = v;
    }

    args
}

fn break_even_args_from_payload(payload: HousingPayload) -> BreakEvenArgs {
    let mut args: BreakEvenArgs = defaults();
    overlay_housing(&mut args.housing, &payload);

    if let Some(v) = payload.search_min {
        args.search_min = v;
    }
    if let Some(v) = payload.search_max {
        args.search_max = v;
    }
    if let Some(v) = payload.tolerance {
        args.tolerance = v;
    }

    args
}

fn fire_plan_args_from_payload(payload: FirePlanPayload) -> FirePlanArgs {
    let mut args: FirePlanArgs = defaults();

    if let Some(v) = payload.current_age {
        args.current_age = v;
    }
    if let Some(v) = payload.target_age {
        args.target_age = v;
    }
    if let Some(v) = payload.annual_expenses {
        args.annual_expenses = v;
    }
    if let Some(v) = payload.current_savings {
        args.current_savings = v;
    }
    if let Some(v) = payload.annual_income {
        args.annual_income = v;
    }
    if let Some(v) = payload.savings_rate {
        args.savings_rate = v;
    }
    if let Some(v) = payload.inflation_rate {
        args.inflation_rate = v;
    }
    if let Some(v) = payload.annual_return {
        args.annual_return = Some(v);
    }
    if let Some(slices) = payload.allocation {
        args.allocation = slices;
    }

    args
}

fn debt_args_from_payload(payload: DebtPayload) -> DebtArgs {
    let mut args: DebtArgs = defaults();

    if let Some(v) = payload.balance {
        args.balance = v;
    }
    if let Some(v) = payload.annual_rate {
        args.annual_rate = v;
    }
    if let Some(v) = payload.monthly_payment {
        args.monthly_payment = v;
    }
    if let Some(v) = payload.investment_return {
        args.investment_return = v;
    }

    args
}

fn insurance_args_from_payload(payload: InsurancePayload) -> InsuranceArgs {
    let mut args: InsuranceArgs = defaults();

    if let Some(v) = payload.current_age {
        args.current_age = v;
    }
    if let Some(v) = payload.current_savings {
        args.current_savings = v;
    }
    if let Some(v) = payload.annual_income {
        args.annual_income = v;
    }
    if let Some(v) = payload.savings_rate {
        args.savings_rate = v;
    }
    if let Some(v) = payload.gender {
        args.gender = v;
    }
    if let Some(v) = payload.dependents {
        args.dependents = v;
    }
    if let Some(v) = payload.cost_per_dependent {
        args.cost_per_dependent = v;
    }
    if let Some(v) = payload.debts {
        args.debts = v;
    }
    if let Some(v) = payload.current_coverage {
        args.current_coverage = Some(v);
    }
    if let Some(v) = payload.probability_dependent {
        args.probability_dependent = v;
    }
    if let Some(v) = payload.probability_debt {
        args.probability_debt = v;
    }
    if let Some(v) = payload.premium_now {
        args.premium_now = Some(v);
    }
    if let Some(v) = payload.premium_later {
        args.premium_later = Some(v);
    }
    if let Some(v) = payload.investment_return {
        args.investment_return = v;
    }

    args
}

fn portfolio_args_from_payload(payload: PortfolioPayload) -> PortfolioArgs {
    let mut args: PortfolioArgs = defaults();

    if let Some(v) = payload.holdings {
        args.holdings = v;
    }
    if let Some(v) = payload.new_weights {
        args.new_weights = v;
    }

    args
}
