//! LEO Handover Simulation CLI
//!
//! Runs a scenario through the per-tick handover decision engine.
//!
//! Usage:
//!   handover-sim --scenario scenarios/five_sat_pass.json \
//!                --ticks 100 \
//!                --output data/handover_run.json

use anyhow::{Context, Result};
use clap::Parser;
use handover_selector::report::RunReport;
use handover_selector::{loader, selector, Simulation, TickResult};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(
    name = "handover-sim",
    about = "Simulate LEO serving-satellite selection for a fixed user terminal"
)]
struct Args {
    /// Path to scenario JSON file
    #[arg(short, long)]
    scenario: PathBuf,

    /// Override tick limit from the scenario
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Override tick length in seconds
    #[arg(long)]
    dt: Option<f64>,

    /// Output JSON run report
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Include every tick in the report (default: final tick only)
    #[arg(long)]
    history: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{}", "=".repeat(60));
    info!("SX9-Orbital LEO Handover Simulator");
    info!("{}", "=".repeat(60));

    let mut scenario = loader::load_scenario(&args.scenario)
        .with_context(|| format!("loading scenario {:?}", args.scenario))?;
    if let Some(ticks) = args.ticks {
        scenario.config.tick_limit = Some(ticks);
    }
    if let Some(dt) = args.dt {
        scenario.config.dt = dt;
    }
    if scenario.config.tick_limit.is_none() {
        anyhow::bail!("scenario has no tick limit; pass --ticks to bound the run");
    }

    let name = scenario.name.clone();
    let config = scenario.config;
    let satellite_count = scenario.satellites.len();

    let mut sim = Simulation::new(scenario)?;

    let mut ticks: Vec<TickResult> = Vec::new();
    let summary = sim.run(|result| {
        if !args.history {
            ticks.clear();
        }
        ticks.push(result.clone());
    });

    // Show final-tick candidates by score
    if let Some(last) = ticks.last() {
        info!("\nCandidates at tick {} (t={:.1}s):", last.tick, last.elapsed);
        for m in selector::rank(&last.metrics) {
            info!(
                "  {:.3} | {:8} | d={:7.1}km | t_avail={:7.2}s | res={:.2}",
                m.score,
                m.id.to_string(),
                m.distance_km,
                m.available_time,
                m.resource_availability
            );
        }
        match last.selection {
            Some(s) => info!("Serving: {} (t_avail={:.2}s)", s.id, s.available_time),
            None => info!("Serving: none"),
        }
    }

    if let Some(output) = &args.output {
        let report = RunReport::new(name, &config, satellite_count, summary, ticks);
        report.write_json(output)?;
    }

    // Summary
    info!("\n{}", "=".repeat(60));
    info!("SUMMARY");
    info!("{}", "=".repeat(60));
    info!("Ticks run:      {}", summary.ticks);
    info!("Handovers:      {}", summary.handovers);
    info!("Acquisitions:   {}", summary.acquisitions);
    info!("Releases:       {}", summary.releases);
    info!("Unserved ticks: {}", summary.unserved_ticks);

    Ok(())
}
