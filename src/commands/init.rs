//! Init command - write a configuration and seed the data directory

use anyhow::{Context, Result};
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

use crate::config::{self, Config};
use crate::csv_io;
use crate::market;
use crate::models::SimulationMode;
use crate::sample;

use super::spinner;

pub async fn execute(
    data_dir: Option<PathBuf>,
    efficiency: Option<f64>,
    fee: Option<f64>,
    average_power: Option<f64>,
    force: bool,
) -> Result<()> {
    println!("{}", "Initializing minesim".cyan().bold());
    println!();

    let config_path = config::get_config_path()?;
    let mut config = if config_path.exists() && !force {
        config::load_config()?
    } else {
        Config::new()
    };

    if data_dir.is_some() {
        config.data_dir = data_dir;
    }
    if let Some(efficiency) = efficiency {
        config.efficiency_j_per_th = efficiency;
    }
    if let Some(fee) = fee {
        config.fee_per_block_btc = fee;
    }
    if average_power.is_some() {
        config.average_power_mw = average_power;
    }

    // Reject settings a simulation would refuse later
    config
        .simulation_config(SimulationMode::Projection, config.fallback)
        .validate()
        .context("Invalid settings")?;

    let data_dir = config.data_dir()?;
    println!("  {} {}", "Config:".bright_black(), config_path.display());
    println!("  {} {}", "Data:".bright_black(), data_dir.display());
    println!("  {} {} J/TH", "Efficiency:".bright_black(), config.efficiency_j_per_th);
    println!("  {} {} BTC/block", "Fees:".bright_black(), config.fee_per_block_btc);
    println!();

    let pb = spinner("Saving configuration...");
    config::save_config(&config)?;
    pb.finish_with_message(format!("{} Config saved", "✓".green()));

    let power_path = config.power_path()?;
    if !power_path.exists() || force {
        let pb = spinner("Generating sample power profile...");
        let today = chrono::Utc::now().date_naive();
        let series =
            sample::generate_power_series(market::history_start(), today, &mut StdRng::from_entropy());
        csv_io::write_series(&power_path, "MW", &series)
            .with_context(|| format!("Failed to write {}", power_path.display()))?;
        pb.finish_with_message(format!("{} {} days written", "✓".green(), series.len()));
    }

    println!();
    println!("{}", "Ready".green().bold());
    println!();
    println!("  {}", "Next:".yellow());
    println!("    {}", "minesim fetch       # Download price and hashrate history".bright_black());
    println!("    {}", "minesim simulate    # Run a historical simulation".bright_black());
    println!();

    Ok(())
}
