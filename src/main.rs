//! Weighted AMM Arbitrage - single decision cycle
//!
//! Loads a TOML scenario (parameters, pool, prices), runs the decision engine
//! once and prints the resulting decision as JSON on stdout.
//!
//! Usage:
//!   cargo run -- --scenario config/scenario.toml
//!   ARB_SCENARIO=/path/to/scenario.toml cargo run -- --all-routes --verbose

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use weighted_arb::{ArbitrageEngine, RouteSelection, ScenarioConfig, WeightedMath};

/// Weighted AMM arbitrage decision engine
#[derive(Parser)]
#[command(name = "weighted-arb")]
struct Args {
    /// Scenario file (params, pool state and prices)
    #[arg(short, long, env = "ARB_SCENARIO", default_value = "config/scenario.toml")]
    scenario: String,

    /// Debug-level logging unless RUST_LOG is set
    #[arg(short, long)]
    verbose: bool,

    /// Size every mispriced route instead of only the top-ranked one
    #[arg(long)]
    all_routes: bool,
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    // Initialize logging (stderr, stdout carries the decision)
    let default_level = if args.verbose { "debug" } else { "info" };
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let scenario = ScenarioConfig::load(&args.scenario)?;
    info!("Scenario loaded from {}", args.scenario);

    let mut params = scenario.params.clone();
    if args.all_routes {
        params.route_selection = RouteSelection::AllRoutes;
    }
    info!(
        "Liquidity grid [{}, {}) step {} {}, route selection {:?}",
        params.min_arb_liquidity,
        params.max_arb_liquidity,
        params.arb_liquidity_granularity,
        params.external_currency,
        params.route_selection
    );

    let pricing = WeightedMath::new();
    let state = scenario
        .market_state(&pricing)
        .context("Failed to build market state")?;
    info!(
        "Timestep {} at {}: {} pool tokens, gas cost {}",
        state.timestep,
        state.change_datetime,
        state.pool.token_count(),
        state.gas_cost
    );

    let engine = ArbitrageEngine::with_pricing(params, pricing)?;
    let decision = engine.decide(&state).context("Decision cycle failed")?;

    if decision.is_trade() {
        info!("Decision: swap at {:?}", decision.change_datetime_update);
    } else {
        info!("Decision: no trade");
    }

    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}
