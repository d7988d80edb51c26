//! Run every scenario in parallel and write a valuation summary
//!
//! Scenarios that are not configured (for example `custom` without
//! utilization tables) are reported and skipped.

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use business_projections::report::write_valuation_csv;
use business_projections::{
    CombinedProjectionResult, FleetSource, ProjectionResult, Scenario, ScenarioRunner,
};
use clap::Parser;
use log::warn;
use rayon::prelude::*;

/// Project the fleet and finance businesses under every scenario
#[derive(Parser)]
#[command(name = "scenario_sweep")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Assumptions JSON file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Grow fleets from the first year at each scenario's growth rate
    #[arg(long)]
    grow: bool,

    /// Summary CSV path
    #[arg(short, long, default_value = "scenario_summary.csv")]
    output: PathBuf,
}

struct SweepResult {
    scenario: Scenario,
    fleet: CombinedProjectionResult,
    finance: ProjectionResult,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    let runner = match &args.config {
        Some(path) => ScenarioRunner::from_json_path(path)
            .with_context(|| format!("loading assumptions from {}", path.display()))?,
        None => ScenarioRunner::new(),
    };
    let source = if args.grow {
        FleetSource::ScenarioGrowth
    } else {
        FleetSource::Configured
    };

    let mut results: Vec<SweepResult> = Scenario::ALL
        .par_iter()
        .filter_map(|&scenario| {
            let run = runner
                .run_fleet(scenario, source)
                .and_then(|fleet| Ok((fleet, runner.run_portfolio(scenario)?)));
            match run {
                Ok((fleet, finance)) => Some(SweepResult {
                    scenario,
                    fleet,
                    finance,
                }),
                Err(e) => {
                    warn!("skipping scenario {}: {}", scenario, e);
                    None
                }
            }
        })
        .collect();
    results.sort_by_key(|r| r.scenario);
    println!("Ran {} scenarios in {:?}\n", results.len(), start.elapsed());

    println!(
        "{:<14} {:>18} {:>18} {:>18} {:>10} {:>18} {:>10}",
        "Scenario", "Fleet Revenue", "Fleet NPV", "Fleet TV", "Fleet IRR", "Finance NPV", "CAGR"
    );
    println!("{}", "-".repeat(112));
    for r in &results {
        let fleet = &r.fleet.combined;
        println!(
            "{:<14} {:>18.2} {:>18.2} {:>18.2} {:>9.2}% {:>18.2} {:>9.2}%",
            r.scenario,
            fleet.totals.revenue,
            fleet.valuation.npv,
            fleet.valuation.terminal_value,
            fleet.valuation.irr * 100.0,
            r.finance.valuation.npv,
            fleet.revenue_cagr() * 100.0,
        );
    }

    let rows: Vec<&ProjectionResult> = results
        .iter()
        .flat_map(|r| {
            r.fleet
                .divisions
                .iter()
                .chain([&r.fleet.combined, &r.finance])
        })
        .collect();

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    write_valuation_csv(&rows, file)?;
    println!("\nSummary written to: {}", args.output.display());

    Ok(())
}
