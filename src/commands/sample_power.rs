//! Sample power command - regenerate the synthetic site power file

use anyhow::{Context, Result};
use colored::Colorize;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config;
use crate::csv_io;
use crate::market;
use crate::sample;

use super::spinner;

pub async fn execute(seed: Option<u64>) -> Result<()> {
    let config = config::load_config()?;
    let path = config.power_path()?;
    let today = chrono::Utc::now().date_naive();

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let pb = spinner("Generating sample power profile...");
    let series = sample::generate_power_series(market::history_start(), today, &mut rng);
    csv_io::write_series(&path, "MW", &series)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    pb.finish_with_message(format!("{} {} days written", "✓".green(), series.len()));

    println!("  {} {}", "File:".bright_black(), path.display());
    println!(
        "  {} {:.1} MW",
        "Mean:".bright_black(),
        series.mean().unwrap_or_default()
    );

    Ok(())
}
