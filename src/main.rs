use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use fincalc::api::args::{
    BreakEvenArgs, DebtArgs, FirePlanArgs, InsuranceArgs, PortfolioArgs, ProjectArgs,
    RentVsBuyArgs, SimulateArgs,
};
use fincalc::api::report::{
    break_even_report, debt_report, fire_plan_report, insurance_report, portfolio_report,
    project_report, rent_vs_buy_report, simulate_report,
};

#[derive(Parser, Debug)]
#[command(
    name = "fincalc",
    about = "Personal finance calculators: projections, Monte Carlo, housing, FIRE, debt, insurance"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the calculators as a JSON HTTP API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Deterministic compound-growth projection
    Project(ProjectArgs),
    /// Monte Carlo simulation with per-year percentiles
    Simulate(SimulateArgs),
    /// Compare the total cost of renting and buying
    RentVsBuy(RentVsBuyArgs),
    /// Mortgage rate at which renting and buying cost the same
    BreakEven(BreakEvenArgs),
    /// FIRE number, projected savings and sensitivity tables
    FirePlan(FirePlanArgs),
    /// Months to repay a debt and the opportunity cost of the payments
    Debt(DebtArgs),
    /// Life insurance need and a buy-now versus buy-later premium comparison
    Insurance(InsuranceArgs),
    /// Weighted return and risk of a portfolio, before and after rebalancing
    Portfolio(PortfolioArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Serve { port } => fincalc::api::run_http_server(port)
            .await
            .map_err(|e| format!("Server error: {e}")),
        Commands::Project(args) => print_json(project_report(&args)),
        Commands::Simulate(args) => print_json(simulate_report(&args)),
        Commands::RentVsBuy(args) => print_json(rent_vs_buy_report(&args)),
        Commands::BreakEven(args) => print_json(break_even_report(&args)),
        Commands::FirePlan(args) => print_json(fire_plan_report(&args)),
        Commands::Debt(args) => print_json(debt_report(&args)),
        Commands::Insurance(args) => print_json(insurance_report(&args)),
        Commands::Portfolio(args) => print_json(portfolio_report(&args)),
    };

    if let Err(msg) = outcome {
        eprintln!("Error: {msg}");
        std::process::exit(1);
    }
}

fn print_json<T: Serialize>(result: Result<T, String>) -> Result<(), String> {
    let body = result?;
    let json = serde_json::to_string_pretty(&body).map_err(|e| format!("JSON error: {e}"))?;
    println!("{json}");
    Ok(())
}
