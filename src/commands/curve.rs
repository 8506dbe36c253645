//! Curve command - print the calibrated power-law price curve

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config;
use crate::power_law::PowerLaw;
use crate::report::format_eur;

pub async fn execute(
    years: u32,
    step_days: u32,
    exponent: Option<f64>,
    offline: bool,
    json: bool,
) -> Result<()> {
    let config = config::load_config()?;
    let metrics = super::current_metrics(&config, offline).await?;
    let exponent = exponent.unwrap_or(config.exponent);

    let model = PowerLaw::calibrated(metrics.date, metrics.spot_price_eur, exponent)
        .context("Failed to calibrate power law")?;
    let points = model.curve(metrics.date, years, step_days)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }

    println!();
    println!("{}", "Power-Law Curve".cyan().bold());
    println!();
    println!(
        "  {} {} EUR on {} (exponent {})",
        "Anchor:".bright_black(),
        format_eur(metrics.spot_price_eur),
        metrics.date,
        exponent
    );
    println!();
    println!("  {:<10} {:>14}", "Year".bright_black(), "Price EUR".bright_black());
    println!("  {}", "-".repeat(26).bright_black());
    for point in &points {
        println!("  {:<10.2} {:>14}", point.year, format_eur(point.price_eur));
    }

    Ok(())
}
