//! Mined command - BTC issued since an accounting start block and a share's value

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use crate::config;
use crate::report::format_eur;
use crate::reward::{self, RewardSchedule};

/// Block mined around 2018-01-01
pub const DEFAULT_START_BLOCK: u64 = 499_500;

/// Fleet-wide efficiency used for the network's power draw (J/TH)
const NETWORK_EFFICIENCY_J_PER_TH: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityCost {
    pub start_block: u64,
    pub block_height: u64,
    /// Subsidy paid by the next block
    pub current_subsidy_btc: f64,
    pub network_btc: f64,
    pub share_pct: f64,
    pub share_btc: f64,
    pub share_value_eur: f64,
    pub network_power_mw: f64,
}

/// Subsidy issued in `[start_block, block_height)`, the `share_pct` slice of
/// it valued at `spot_price_eur`, and the network draw at 30 J/TH
pub fn opportunity_cost(
    start_block: u64,
    block_height: u64,
    share_pct: f64,
    spot_price_eur: f64,
    network_ehs: f64,
) -> OpportunityCost {
    let schedule = RewardSchedule::standard();
    let network_btc = reward::mined_btc_between(start_block, block_height, &schedule);
    let share_btc = network_btc * share_pct / 100.0;
    // EH/s -> TH/s is 1e6, W -> MW is 1e-6
    let network_power_mw = network_ehs * NETWORK_EFFICIENCY_J_PER_TH;

    OpportunityCost {
        start_block,
        block_height,
        current_subsidy_btc: schedule.subsidy_at_height(block_height),
        network_btc,
        share_pct,
        share_btc,
        share_value_eur: share_btc * spot_price_eur,
        network_power_mw,
    }
}

pub async fn execute(share: f64, start_block: u64, offline: bool, json: bool) -> Result<()> {
    if !(share.is_finite() && (0.0..=100.0).contains(&share)) {
        anyhow::bail!("Share must be between 0 and 100 percent, got {}", share);
    }

    let config = config::load_config()?;
    let metrics = super::current_metrics(&config, offline).await?;
    let cost = opportunity_cost(
        start_block,
        metrics.block_height,
        share,
        metrics.spot_price_eur,
        metrics.network_ehs,
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&cost)?);
        return Ok(());
    }

    println!();
    println!("{}", "Mined Since Start Block".cyan().bold());
    println!();
    println!(
        "  {} {} → {}",
        "Blocks:".bright_black(),
        cost.start_block,
        cost.block_height
    );
    println!("  {} {} BTC", "Block subsidy:".bright_black(), cost.current_subsidy_btc);
    println!("  {} {:.2} BTC", "Network issued:".bright_black(), cost.network_btc);
    println!(
        "  {} {:.2} BTC ({}%)",
        "Share:".bright_black(),
        cost.share_btc,
        cost.share_pct
    );
    println!(
        "  {} {}",
        "Value:".bright_black(),
        format!("{} EUR", format_eur(cost.share_value_eur)).green()
    );
    println!(
        "  {} {} MW",
        "Network draw:".bright_black(),
        format_eur(cost.network_power_mw)
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opportunity_cost_within_one_era() {
        let cost = opportunity_cost(499_500, 629_500, 3.0, 50_000.0, 1000.0);
        assert_eq!(cost.network_btc, 130_000.0 * 12.5);
        assert!((cost.share_btc - 48_750.0).abs() < 1e-9);
        assert!((cost.share_value_eur - 48_750.0 * 50_000.0).abs() < 1e-3);
        assert_eq!(cost.network_power_mw, 30_000.0);
        assert_eq!(cost.current_subsidy_btc, 12.5);
    }

    #[test]
    fn test_opportunity_cost_across_halvings() {
        let cost = opportunity_cost(DEFAULT_START_BLOCK, 916_944, 3.0, 96_500.0, 1020.0);
        let expected = 130_500.0 * 12.5 + 210_000.0 * 6.25 + 76_944.0 * 3.125;
        assert!((cost.network_btc - expected).abs() < 1e-6);
        assert_eq!(cost.current_subsidy_btc, 3.125);
    }

    #[test]
    fn test_tip_before_start_is_zero() {
        let cost = opportunity_cost(500_000, 400_000, 3.0, 1.0, 1.0);
        assert_eq!(cost.network_btc, 0.0);
        assert_eq!(cost.share_value_eur, 0.0);
    }
}
