//! CLI command implementations
//!
//! Commands that need current market state fetch it live unless `--offline`
//! is given. Offline runs use the last `fetch` snapshot, or the configured
//! fallback values when no snapshot exists.

pub mod curve;
pub mod fetch;
pub mod init;
pub mod live;
pub mod mined;
pub mod sample_power;
pub mod simulate;

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::market::{self, LiveMetrics};

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Live metrics, or the stored snapshot/fallback when `offline`
async fn current_metrics(config: &Config, offline: bool) -> Result<LiveMetrics> {
    if offline {
        return offline_metrics(config);
    }

    let pb = spinner("Fetching live metrics...");
    let metrics = market::fetch_live_metrics(config.fetch_attempts, config.fallback).await;
    if metrics.degraded.is_empty() {
        pb.finish_with_message(format!("{} Live metrics fetched", "✓".green()));
    } else {
        pb.finish_with_message(format!(
            "{} Fallback used for: {}",
            "!".yellow(),
            metrics.degraded.join(", ")
        ));
    }
    Ok(metrics)
}

fn offline_metrics(config: &Config) -> Result<LiveMetrics> {
    let path = config.live_metrics_path()?;
    if !path.exists() {
        debug!("No live snapshot, using configured fallback");
        let fallback = config.fallback;
        return Ok(LiveMetrics {
            date: fallback.date,
            spot_price_eur: fallback.spot_price_eur,
            network_ehs: fallback.network_ehs,
            block_height: fallback.block_height,
            degraded: vec!["offline".to_string()],
        });
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let metrics: LiveMetrics = serde_json::from_str(&content)
        .context("Failed to parse live metrics snapshot")?;
    debug!(date = %metrics.date, "Using live snapshot");
    Ok(metrics)
}
