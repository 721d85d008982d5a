//! Offline simulation binary for the Outpost colony controller.
//!
//! Loads a scenario, builds the in-memory grid host, and runs the
//! controller for a number of ticks, printing the node table and market
//! status at the end.
//!
//! # Usage
//!
//! ```text
//! outpost-engine <scenario.json> [ticks] [config.yaml]
//! ```
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration (defaults when no file is given)
//! 3. Parse the scenario and build the grid host
//! 4. Run the simulation loop
//! 5. Print the end-of-run report

use std::path::Path;

use anyhow::{bail, Context};
use tracing::info;
use tracing_subscriber::EnvFilter;

use outpost_core::{console, Colony, ControllerConfig};
use outpost_host::{MemoryStore, Scenario};

/// Ticks simulated when the caller does not say.
const DEFAULT_TICKS: u64 = 1_000;

/// Spawn refill rate for offline runs, where refill logistics are not
/// simulated creep-by-creep.
const OFFLINE_ENERGY_RECHARGE: u32 = 20;

fn main() -> anyhow::Result<()> {
    // 1. Structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(scenario_path) = args.first() else {
        bail!("usage: outpost-engine <scenario.json> [ticks] [config.yaml]");
    };
    let ticks: u64 = match args.get(1) {
        Some(raw) => raw.parse().context("ticks must be an integer")?,
        None => DEFAULT_TICKS,
    };

    // 2. Configuration.
    let config = match args.get(2) {
        Some(path) => ControllerConfig::from_file(Path::new(path))?,
        None => ControllerConfig::default(),
    };
    info!(
        cache_ttl = config.analysis.cache_ttl,
        report_interval = config.logging.report_interval,
        "configuration loaded"
    );

    // 3. Scenario and host.
    let scenario = Scenario::from_file(Path::new(scenario_path))?;
    info!(name = %scenario.name, rooms = scenario.nodes.len(), "scenario loaded");
    let mut host = scenario.build_host()?;
    host.energy_recharge = OFFLINE_ENERGY_RECHARGE;
    let mut store = MemoryStore::new();

    // 4. Simulation loop.
    let mut colony = Colony::new(config);
    for _ in 0..ticks {
        colony.tick(&mut host, &mut store);
        host.step();
    }
    info!(ticks, "simulation complete");

    // 5. End-of-run report.
    println!("{}", console::show_nodes(&colony));
    println!("{}", console::market_status(&colony));
    Ok(())
}
