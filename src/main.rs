//! Business Projections CLI
//!
//! Command-line interface for running fleet and lending projections

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use business_projections::assumptions::loader::{write_assumptions, DEFAULT_CONFIG_PATH};
use business_projections::fleet::load_fleet;
use business_projections::projection::{
    DivisionInput, PortfolioInput, ProjectionConfig, ProjectionEngine, ProjectionResult,
};
use business_projections::report::{to_json, write_valuation_csv, write_yearly_csv};
use business_projections::{Assumptions, FleetSource, Scenario, ScenarioRunner};
use clap::{Parser, ValueEnum};

/// Business Projections - revenue, EBITDA, cash flow and valuation over a multi-year horizon
#[derive(Parser)]
#[command(name = "business_projections")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Business to project
    #[arg(short, long, value_enum, default_value = "fleet")]
    business: Business,

    /// Scenario: conservative, moderate, aggressive or custom
    #[arg(short, long, default_value = "moderate")]
    scenario: Scenario,

    /// Assumptions JSON file (config/projections.json if present, else built-in defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fleet CSV for a division, as DIVISION=PATH (repeatable)
    #[arg(long, value_parser = parse_fleet_arg)]
    fleet: Vec<(String, PathBuf)>,

    /// Portfolio CSV for the lending business
    #[arg(long)]
    portfolio: Option<PathBuf>,

    /// Compound each division's first-year fleet at the scenario growth rate
    #[arg(long)]
    grow: bool,

    /// Omit per-category rows from the output
    #[arg(long)]
    summary: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the effective assumptions as JSON and exit
    #[arg(long)]
    dump_config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Business {
    /// Combined transport and construction rental
    Fleet,
    /// Equipment finance lending portfolio
    Finance,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Yearly rows as CSV
    Csv,
}

fn parse_fleet_arg(s: &str) -> std::result::Result<(String, PathBuf), String> {
    let (division, path) = s
        .split_once('=')
        .ok_or_else(|| format!("expected DIVISION=PATH, got '{}'", s))?;
    if division.is_empty() || path.is_empty() {
        return Err(format!("expected DIVISION=PATH, got '{}'", s));
    }
    Ok((division.to_string(), PathBuf::from(path)))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .or_else(|| Some(PathBuf::from(DEFAULT_CONFIG_PATH)).filter(|p| p.exists()));
    let assumptions = match &config_path {
        Some(path) => load_config(path)?,
        None => Assumptions::default_pricing(),
    };

    if let Some(path) = &cli.dump_config {
        write_assumptions(path, &assumptions)
            .with_context(|| format!("writing assumptions to {}", path.display()))?;
        println!("Assumptions written to: {}", path.display());
        return Ok(());
    }

    let config = ProjectionConfig {
        detailed_output: !cli.summary,
        ..ProjectionConfig::default()
    };

    match cli.business {
        Business::Fleet => run_fleet(&cli, assumptions, config),
        Business::Finance => run_finance(&cli, assumptions, config),
    }
}

fn load_config(path: &Path) -> Result<Assumptions> {
    Assumptions::from_json_path(path)
        .with_context(|| format!("loading assumptions from {}", path.display()))
}

fn run_fleet(cli: &Cli, assumptions: Assumptions, config: ProjectionConfig) -> Result<()> {
    let source = if cli.grow {
        FleetSource::ScenarioGrowth
    } else {
        FleetSource::Configured
    };
    let runner = ScenarioRunner::with_assumptions(assumptions).with_config(config.clone());
    let mut fleets = runner.fleets(cli.scenario, source)?;

    for (name, path) in &cli.fleet {
        let index = runner
            .assumptions()
            .divisions
            .iter()
            .position(|d| &d.name == name)
            .with_context(|| format!("no division named '{}'", name))?;
        fleets[index] = load_fleet(path).with_context(|| format!("loading fleet from {}", path.display()))?;
    }

    let assumptions = runner.assumptions();
    let inputs: Vec<DivisionInput<'_>> = assumptions
        .divisions
        .iter()
        .zip(fleets.iter())
        .map(|(division, fleet)| DivisionInput::new(division, fleet, division.default_split))
        .collect();

    let engine = ProjectionEngine::new(assumptions.clone(), config);
    let result = engine
        .project_combined(&inputs, cli.scenario)
        .with_context(|| format!("running {} scenario", cli.scenario))?;

    let mut results: Vec<&ProjectionResult> = result.divisions.iter().collect();
    results.push(&result.combined);

    match cli.format {
        OutputFormat::Table => {
            print_header(cli.scenario);
            for r in &results {
                print_table(r);
            }
            Ok(())
        }
        OutputFormat::Json => emit(cli, |w| Ok(w.write_all(to_json(&result)?.as_bytes())?)),
        OutputFormat::Csv => emit(cli, |w| Ok(write_yearly_csv(&results, w)?)),
    }
}

fn run_finance(cli: &Cli, assumptions: Assumptions, config: ProjectionConfig) -> Result<()> {
    let portfolio = match &cli.portfolio {
        Some(path) => {
            load_fleet(path).with_context(|| format!("loading portfolio from {}", path.display()))?
        }
        None => assumptions.finance.default_portfolio.clone(),
    };

    let engine = ProjectionEngine::new(assumptions, config);
    let finance = &engine.assumptions().finance;
    let input = PortfolioInput::new(finance, &portfolio);
    let result = engine
        .project_portfolio(&input, cli.scenario)
        .with_context(|| format!("running {} scenario", cli.scenario))?;

    match cli.format {
        OutputFormat::Table => {
            print_header(cli.scenario);
            print_table(&result);
            Ok(())
        }
        OutputFormat::Json => emit(cli, |w| Ok(w.write_all(to_json(&result)?.as_bytes())?)),
        OutputFormat::Csv => emit(cli, |w| {
            write_yearly_csv(&[&result], &mut *w)?;
            writeln!(w)?;
            Ok(write_valuation_csv(&[&result], w)?)
        }),
    }
}

/// Send machine-readable output to the chosen file or stdout
fn emit<F>(cli: &Cli, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    match &cli.output {
        Some(path) => {
            let mut file =
                File::create(path).with_context(|| format!("creating {}", path.display()))?;
            write(&mut file)?;
            println!("Results written to: {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            write(&mut lock)?;
            writeln!(lock)?;
        }
    }
    Ok(())
}

fn print_header(scenario: Scenario) {
    println!("Business Projections v{}", env!("CARGO_PKG_VERSION"));
    println!("==========================\n");
    println!("Scenario: {}", scenario);
}

fn print_table(result: &ProjectionResult) {
    println!("\n{}", result.label);
    println!(
        "{:>6} {:>16} {:>16} {:>16} {:>8} {:>16} {:>16} {:>16}",
        "Year", "Revenue", "OpEx", "EBITDA", "Margin", "Depreciation", "Capital", "FCF"
    );
    println!("{}", "-".repeat(118));

    for y in &result.years {
        println!(
            "{:>6} {:>16.2} {:>16.2} {:>16.2} {:>7.1}% {:>16.2} {:>16.2} {:>16.2}",
            y.year,
            y.revenue.total,
            y.operating_expenses.total,
            y.ebitda.value,
            y.ebitda.margin_percent,
            y.depreciation,
            y.capital_requirement,
            y.cash_flow.fcf,
        );
    }

    let v = &result.valuation;
    println!("\nSummary:");
    println!("  Total Revenue: ${:.2}", result.totals.revenue);
    println!("  Total EBITDA: ${:.2}", result.totals.ebitda);
    println!("  Average EBITDA Margin: {:.2}%", result.average_ebitda_margin() * 100.0);
    println!("  Revenue CAGR: {:.2}%", result.revenue_cagr() * 100.0);
    println!("  Terminal Value ({}x EBITDA): ${:.2}", v.ebitda_multiple, v.terminal_value);
    println!("  NPV @ {:.1}%: ${:.2}", v.discount_rate * 100.0, v.npv);
    if v.irr_converged {
        println!("  IRR: {:.2}%", v.irr * 100.0);
    } else {
        println!(
            "  IRR: {:.2}% (not converged after {} iterations, residual NPV {:.2})",
            v.irr * 100.0,
            v.irr_iterations,
            v.irr_residual_npv
        );
    }

    if !result.revenue_by_group.is_empty() {
        println!("  Revenue by group:");
        for (group, revenue) in &result.revenue_by_group {
            println!("    {}: ${:.2}", group, revenue);
        }
    }
}
