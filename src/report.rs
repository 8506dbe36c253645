//! Terminal tables and output files for a simulation run

use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::csv_io;
use crate::engine::Simulation;
use crate::error::SimResult;
use crate::models::{DailyResult, YearlySummary};
use crate::resolve::ResolutionStats;

/// Run header: mode, range, calibration
pub fn print_overview(sim: &Simulation) {
    println!("{}", "Simulation".cyan().bold());
    println!();
    println!("  {} {}", "Mode:".bright_black(), sim.config.mode.to_string().green());
    println!("  {} {} → {}", "Range:".bright_black(), sim.start, sim.end);
    println!(
        "  {} {:.1} J/TH, {:.0} MW avg",
        "Site:".bright_black(),
        sim.config.efficiency_j_per_th,
        sim.average_power_mw
    );
    println!(
        "  {} {:.4e} × days^{}",
        "Power law:".bright_black(),
        sim.power_law.coefficient,
        sim.power_law.exponent
    );
    println!(
        "  {} {} @ {} EUR",
        "Anchor:".bright_black(),
        sim.config.baseline.date,
        format_eur(sim.config.baseline.spot_price_eur)
    );
    println!();
}

pub fn print_yearly(yearly: &[YearlySummary]) {
    println!("  {}", "Yearly".bright_black());
    println!("  {}", "━".repeat(86).bright_black());
    println!(
        "  {:<6} {:>14} {:>10} {:>14} {:>18} {:>18}",
        "Year".bright_black(),
        "Avg price".bright_black(),
        "Share %".bright_black(),
        "BTC mined".bright_black(),
        "Revenue EUR".bright_black(),
        "Cumulative EUR".bright_black()
    );

    for y in yearly {
        println!(
            "  {:<6} {:>14} {:>10.4} {:>14.4} {:>18} {:>18}",
            y.year.to_string().cyan(),
            format_eur(y.avg_price_eur),
            y.avg_hash_share_pct,
            y.total_btc_mined,
            format_eur(y.total_revenue_eur).green(),
            format_eur(y.cumulative_revenue_eur)
        );
    }
    println!();
}

pub fn print_daily(daily: &[DailyResult]) {
    println!("  {}", "Daily".bright_black());
    println!("  {}", "━".repeat(96).bright_black());
    println!(
        "  {:<10} {:>12} {:>9} {:>10} {:>9} {:>11} {:>14} {:>16}",
        "Date".bright_black(),
        "Price".bright_black(),
        "Site EH/s".bright_black(),
        "Net EH/s".bright_black(),
        "Share %".bright_black(),
        "BTC".bright_black(),
        "Revenue EUR".bright_black(),
        "Cumulative EUR".bright_black()
    );

    for d in daily {
        println!(
            "  {:<10} {:>12} {:>9.3} {:>10.1} {:>9.4} {:>11.6} {:>14} {:>16}",
            d.date.to_string(),
            format_eur(d.price_eur),
            d.site_hash_ehs,
            d.network_hash_ehs,
            d.hash_share_pct,
            d.btc_mined,
            format_eur(d.revenue_eur),
            format_eur(d.cumulative_revenue_eur)
        );
    }
    println!();
}

pub fn print_totals(sim: &Simulation) {
    let t = &sim.totals;
    println!("  {}", "Totals".bright_black());
    println!("  {}", "━".repeat(40).bright_black());
    println!("    {} {}", "Days:".bright_black(), t.days);
    println!("    {} {:.4}", "BTC mined:".bright_black(), t.total_btc_mined);
    println!(
        "    {} {}",
        "Revenue:".bright_black(),
        format!("{} EUR", format_eur(t.total_revenue_eur)).green()
    );
    println!("    {} {:.3} EH/s", "Avg site hash:".bright_black(), t.avg_site_hash_ehs);
    println!("    {} {:.1} EH/s", "Avg network hash:".bright_black(), t.avg_network_hash_ehs);
    println!(
        "    {} {} EUR",
        "Final cumulative:".bright_black(),
        format_eur(t.final_cumulative_revenue_eur)
    );

    let gaps = ResolutionStats::gaps(&sim.resolution.price)
        + ResolutionStats::gaps(&sim.resolution.power)
        + ResolutionStats::gaps(&sim.resolution.network);
    if gaps > 0 {
        println!(
            "    {} {}",
            "Filled gaps:".bright_black(),
            gaps.to_string().yellow()
        );
    }
    println!();
}

/// Write `daily.csv`, `yearly.csv` and `simulation.json` into `dir`
pub fn write_outputs(sim: &Simulation, dir: &Path) -> SimResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let daily = dir.join("daily.csv");
    let yearly = dir.join("yearly.csv");
    let json = dir.join("simulation.json");

    csv_io::write_records(&daily, &sim.daily)?;
    csv_io::write_records(&yearly, &sim.yearly)?;
    let file = std::fs::File::create(&json)?;
    serde_json::to_writer_pretty(file, sim).map_err(std::io::Error::from)?;

    Ok(vec![daily, yearly, json])
}

/// Whole euros with thousands separators
pub fn format_eur(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.round().abs() as u64;
    let digits = rounded.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    if value.round() < 0.0 {
        out.insert(0, '-');
    }
    out
}
