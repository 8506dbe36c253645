//! Live command - show current price, hashrate and tip height

use anyhow::Result;
use colored::Colorize;

use crate::config;
use crate::report::format_eur;

pub async fn execute(offline: bool, json: bool) -> Result<()> {
    let config = config::load_config()?;
    let metrics = super::current_metrics(&config, offline).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    println!();
    println!("{}", "Live Metrics".cyan().bold());
    println!();
    println!("  {} {}", "Date:".bright_black(), metrics.date);
    println!(
        "  {} {}",
        "Spot price:".bright_black(),
        format!("{} EUR", format_eur(metrics.spot_price_eur)).green()
    );
    println!("  {} {:.1} EH/s", "Network hash:".bright_black(), metrics.network_ehs);
    println!("  {} {}", "Block height:".bright_black(), metrics.block_height);
    if !metrics.degraded.is_empty() {
        println!(
            "  {} {}",
            "Fallback:".bright_black(),
            metrics.degraded.join(", ").yellow()
        );
    }

    Ok(())
}
