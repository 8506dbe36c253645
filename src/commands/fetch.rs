//! Fetch command - download history and snapshot live metrics

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::warn;

use crate::config;
use crate::csv_io;
use crate::market;

use super::spinner;

pub async fn execute(attempts: Option<u32>) -> Result<()> {
    let config = config::load_config()?;
    let attempts = attempts.unwrap_or(config.fetch_attempts);

    println!("{}", "Fetching market data".cyan().bold());
    println!();

    // A failed download keeps the previous file
    let price_path = config.price_path()?;
    let pb = spinner("Downloading price history...");
    match market::fetch_price_history(attempts).await {
        Ok(series) => {
            csv_io::write_series(&price_path, "price", &series)
                .with_context(|| format!("Failed to write {}", price_path.display()))?;
            pb.finish_with_message(format!("{} Price history: {} days", "✓".green(), series.len()));
        }
        Err(e) => {
            warn!("{}", e);
            pb.finish_with_message(format!("{} Price history unchanged", "✗".red()));
        }
    }

    let hashrate_path = config.hashrate_path()?;
    let pb = spinner("Downloading hashrate history...");
    match market::fetch_hashrate_history(attempts).await {
        Ok(series) => {
            csv_io::write_series(&hashrate_path, "EH/s", &series)
                .with_context(|| format!("Failed to write {}", hashrate_path.display()))?;
            pb.finish_with_message(format!("{} Hashrate history: {} days", "✓".green(), series.len()));
        }
        Err(e) => {
            warn!("{}", e);
            pb.finish_with_message(format!("{} Hashrate history unchanged", "✗".red()));
        }
    }

    let pb = spinner("Fetching live metrics...");
    let metrics = market::fetch_live_metrics(attempts, config.fallback).await;
    let snapshot_path = config.live_metrics_path()?;
    std::fs::write(&snapshot_path, serde_json::to_string_pretty(&metrics)?)
        .with_context(|| format!("Failed to write {}", snapshot_path.display()))?;
    pb.finish_with_message(format!("{} Live snapshot saved", "✓".green()));

    println!();
    println!("  {} {}", "Data:".bright_black(), config.data_dir()?.display());
    if !metrics.degraded.is_empty() {
        println!(
            "  {} {}",
            "Fallback:".bright_black(),
            metrics.degraded.join(", ").yellow()
        );
    }

    Ok(())
}
