//! Yearly rollup of daily simulation results

use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{DailyResult, YearlySummary};

#[derive(Default)]
struct YearAccumulator {
    days: usize,
    price_sum: f64,
    share_sum: f64,
    btc: f64,
    revenue: f64,
}

/// Group daily results by calendar year, ascending.
///
/// Prices and hash shares are plain means over the year's days; BTC and
/// revenue are sums. The cumulative column carries revenue across years.
pub fn aggregate(daily: &[DailyResult]) -> Vec<YearlySummary> {
    let mut years: BTreeMap<i32, YearAccumulator> = BTreeMap::new();

    for day in daily {
        let acc = years.entry(day.date.year()).or_default();
        acc.days += 1;
        acc.price_sum += day.price_eur;
        acc.share_sum += day.hash_share_pct;
        acc.btc += day.btc_mined;
        acc.revenue += day.revenue_eur;
    }

    let mut running = 0.0;
    years
        .into_iter()
        .map(|(year, acc)| {
            running += acc.revenue;
            let days = acc.days as f64;
            YearlySummary {
                year,
                avg_price_eur: acc.price_sum / days,
                avg_hash_share_pct: acc.share_sum / days,
                total_btc_mined: acc.btc,
                total_revenue_eur: acc.revenue,
                cumulative_revenue_eur: running,
            }
        })
        .collect()
}

/// Whole-run totals over the daily results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub days: usize,
    pub total_btc_mined: f64,
    pub total_revenue_eur: f64,
    pub avg_site_hash_ehs: f64,
    pub avg_network_hash_ehs: f64,
    pub final_cumulative_revenue_eur: f64,
}

pub fn totals(daily: &[DailyResult]) -> Totals {
    if daily.is_empty() {
        return Totals::default();
    }
    let days = daily.len() as f64;

    Totals {
        days: daily.len(),
        total_btc_mined: daily.iter().map(|d| d.btc_mined).sum(),
        total_revenue_eur: daily.iter().map(|d| d.revenue_eur).sum(),
        avg_site_hash_ehs: daily.iter().map(|d| d.site_hash_ehs).sum::<f64>() / days,
        avg_network_hash_ehs: daily.iter().map(|d| d.network_hash_ehs).sum::<f64>() / days,
        final_cumulative_revenue_eur: daily
            .last()
            .map(|d| d.cumulative_revenue_eur)
            .unwrap_or(0.0),
    }
}
