//! Simulate command - run the daily revenue simulation

use anyhow::{Context, Result};
use chrono::NaiveDate;
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::{self, Config};
use crate::csv_io;
use crate::engine::{self, MarketData};
use crate::models::{Baseline, RewardBasis, SimulationConfig, SimulationMode};
use crate::report;
use crate::series::TimeSeries;

use super::spinner;

/// Flag values; `None` keeps the config file setting
#[derive(Debug, Clone)]
pub struct Options {
    pub mode: SimulationMode,
    pub efficiency: Option<f64>,
    pub fee: Option<f64>,
    pub exponent: Option<f64>,
    pub growth: Option<f64>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub average_power: Option<f64>,
    pub block_height_basis: bool,
    pub price_csv: Option<PathBuf>,
    pub hashrate_csv: Option<PathBuf>,
    pub power_csv: Option<PathBuf>,
    pub offline: bool,
    pub daily: bool,
    pub json: bool,
    pub out: Option<PathBuf>,
}

pub async fn execute(options: Options) -> Result<()> {
    let config = config::load_config()?;
    let metrics = super::current_metrics(&config, options.offline).await?;
    let sim_config = build_config(&config, &options, metrics.baseline())?;

    let pb = spinner("Loading input series...");
    let data = MarketData {
        price: load_series(options.price_csv.clone(), config.price_path()?)?,
        hashrate: load_series(options.hashrate_csv.clone(), config.hashrate_path()?)?,
        power: load_series(options.power_csv.clone(), config.power_path()?)?,
    };
    pb.finish_with_message(format!(
        "{} Loaded {} price, {} hashrate, {} power rows",
        "✓".green(),
        data.price.len(),
        data.hashrate.len(),
        data.power.len()
    ));

    let sim = engine::simulate(&sim_config, &data).context("Simulation failed")?;

    if let Some(dir) = &options.out {
        let files = report::write_outputs(&sim, dir)
            .with_context(|| format!("Failed to write results to {}", dir.display()))?;
        print_written(&files, options.json, &mut std::io::stdout(), &mut std::io::stderr())?;
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&sim)?);
        return Ok(());
    }

    println!();
    report::print_overview(&sim);
    if options.daily {
        report::print_daily(&sim.daily);
    }
    report::print_yearly(&sim.yearly);
    report::print_totals(&sim);

    Ok(())
}

/// Merge config file settings with flag overrides
fn build_config(
    config: &Config,
    options: &Options,
    baseline: Baseline,
) -> Result<SimulationConfig> {
    let mut sim = config.simulation_config(options.mode, baseline);

    if let Some(efficiency) = options.efficiency {
        sim.efficiency_j_per_th = efficiency;
    }
    if let Some(fee) = options.fee {
        sim.fee_per_block_btc = fee;
    }
    if let Some(exponent) = options.exponent {
        sim.exponent = exponent;
    }
    if let Some(growth) = options.growth {
        sim.annual_growth_rate = growth;
    }
    if options.average_power.is_some() {
        sim.average_power_mw = options.average_power;
    }

    sim.date_range = match (options.start, options.end) {
        (None, None) => None,
        (Some(start), Some(end)) => Some((start, end)),
        _ => anyhow::bail!("--start and --end must be given together"),
    };

    if options.block_height_basis {
        sim.reward_basis = RewardBasis::BlockHeight {
            anchor_height: baseline.block_height,
            anchor_date: baseline.date,
        };
    }

    sim.validate().context("Invalid simulation parameters")?;
    Ok(sim)
}

/// List written files; stdout is reserved for the document under `--json`
fn print_written<O: Write, E: Write>(
    files: &[PathBuf],
    json: bool,
    stdout: &mut O,
    stderr: &mut E,
) -> std::io::Result<()> {
    let target: &mut dyn Write = if json { stderr } else { stdout };
    for file in files {
        writeln!(target, "  {} {}", "Wrote:".bright_black(), file.display())?;
    }
    Ok(())
}

/// A missing file is an empty series; the resolvers fill the gap
fn load_series(override_path: Option<PathBuf>, default_path: PathBuf) -> Result<TimeSeries<f64>> {
    let path = override_path.unwrap_or(default_path);
    if !path.exists() {
        warn!(path = %path.display(), "Input file missing, using fallbacks");
        return Ok(TimeSeries::new());
    }
    let series = read(&path)?;
    if series.is_empty() {
        warn!(path = %path.display(), "No usable rows, using fallbacks");
    }
    Ok(series)
}

fn read(path: &Path) -> Result<TimeSeries<f64>> {
    csv_io::read_series(path).with_context(|| format!("Failed to read {}", path.display()))
}
