//! Arcade Simulator
//!
//! Plays blackjack sessions against the shared ledger to check payouts and
//! the bankruptcy floor over many rounds.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arcade_blackjack::TableConfig;
use arcade_common::{save_json, FileStore, KeyValueStore, MemoryStore};
use arcade_ledger::{Ledger, LedgerConfig};

mod controller;
mod metrics;
mod strategy;

use controller::SimulationController;
use strategy::Strategy;

/// Store key for the last session's metrics.
const METRICS_KEY: &str = "blackjackSimulatorMetrics";

/// Arcade blackjack simulator CLI
#[derive(Parser, Debug)]
#[command(name = "simulator")]
#[command(about = "Play simulated blackjack sessions against the arcade ledger")]
struct Args {
    /// Number of rounds to play
    #[arg(short, long, default_value = "1000")]
    rounds: u64,

    /// Stake per round
    #[arg(short, long, default_value = "10")]
    bet: u64,

    /// Strategy to play (basic, stand, hit-to-17)
    #[arg(short, long, default_value = "basic")]
    strategy: String,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Persist the balance to this JSON file instead of memory
    #[arg(long)]
    store: Option<PathBuf>,

    /// Print final metrics as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let strategy = Strategy::load(&args.strategy)?;

    let ledger_config = LedgerConfig::from_env();
    ledger_config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid ledger config: {}", e))?;
    let table_config = TableConfig::from_env();
    table_config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid table config: {}", e))?;

    let store: Arc<dyn KeyValueStore> = match &args.store {
        Some(path) => Arc::new(
            FileStore::open(path)
                .with_context(|| format!("opening store {}", path.display()))?,
        ),
        None => Arc::new(MemoryStore::new()),
    };

    info!("Starting arcade simulator");
    info!("Store: {}", store.name());

    let ledger = Arc::new(Ledger::open(store.clone(), ledger_config));
    let starting_balance = ledger.balance();

    let mut controller = SimulationController::new(
        ledger,
        table_config,
        strategy,
        args.rounds,
        args.bet,
        args.seed,
    );
    controller.run()?;

    // Print metrics
    let metrics = controller.metrics();
    info!("Simulation complete");
    info!("Rounds: {}", metrics.rounds);
    info!(
        "Blackjacks: {}, wins: {}, pushes: {}, losses: {}",
        metrics.blackjacks, metrics.wins, metrics.pushes, metrics.losses
    );
    info!("Doubles: {}", metrics.doubles);
    info!("Bankruptcies: {}", metrics.bankruptcies);
    info!("Rejected deals: {}", metrics.rejected_deals);
    info!("Net: {:+}", metrics.net);
    info!("Return to player: {:.4}", metrics.return_to_player());
    info!("Balance: {} -> {}", starting_balance, controller.balance());

    // Last session's figures live next to the balance, under their own key.
    save_json(store.as_ref(), METRICS_KEY, metrics);

    if args.json {
        println!("{}", serde_json::to_string_pretty(metrics)?);
    }

    Ok(())
}
