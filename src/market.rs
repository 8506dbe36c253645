//! Market data adapters
//!
//! Sources:
//! - Blockstream: chain tip height
//! - CoinGecko: EUR spot price
//! - CryptoCompare: daily EUR closes, paged back to 2018
//! - blockchain.info: network hashrate (TH/s, converted to EH/s)
//!
//! Every request is retried immediately up to a fixed attempt count. Live
//! metrics degrade to configured constants; history fetches report failure
//! and leave it to the caller to keep the previous file.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{SimError, SimResult};
use crate::models::Baseline;
use crate::reward;
use crate::series::TimeSeries;

const BLOCKSTREAM_TIP: &str = "https://blockstream.info/api/blocks/tip/height";
const COINGECKO_SPOT: &str = "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=eur";
const CRYPTOCOMPARE_HISTODAY: &str =
    "https://min-api.cryptocompare.com/data/v2/histoday?fsym=BTC&tsym=EUR&limit=2000";
const BLOCKCHAIN_HASHRATE: &str = "https://api.blockchain.info/charts/hash-rate?format=json";
const BLOCKCHAIN_HASHRATE_HISTORY: &str =
    "https://api.blockchain.info/charts/hash-rate?timespan=all&sampled=false&format=json";

/// TH/s per EH/s
const THS_PER_EHS: f64 = 1_000_000.0;

const SECONDS_PER_DAY: i64 = 86_400;

/// Upper bound on histoday pages (2000 days each)
const MAX_HISTORY_PAGES: usize = 10;

/// First day kept in downloaded history
pub fn history_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// HTTP client shared by the adapters
pub fn client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("minesim/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

/// Run `op` up to `attempts` times, retrying immediately on failure
pub async fn with_retry<T, F, Fut>(source_name: &str, attempts: u32, mut op: F) -> SimResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                debug!(source = source_name, attempt, "Fetch failed: {:#}", e);
                last_error = format!("{:#}", e);
            }
        }
    }

    Err(SimError::Fetch {
        source_name: source_name.to_string(),
        attempts,
        message: last_error,
    })
}

// ============================================================================
// LIVE METRICS
// ============================================================================

/// Current spot observations, with the names of any that fell back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveMetrics {
    pub date: NaiveDate,
    pub spot_price_eur: f64,
    pub network_ehs: f64,
    pub block_height: u64,
    /// Metrics that used the fallback constant
    #[serde(default)]
    pub degraded: Vec<String>,
}

impl LiveMetrics {
    pub fn baseline(&self) -> Baseline {
        Baseline {
            date: self.date,
            spot_price_eur: self.spot_price_eur,
            network_ehs: self.network_ehs,
            block_height: self.block_height,
        }
    }
}

pub async fn fetch_block_height(client: &reqwest::Client) -> Result<u64> {
    let text = client
        .get(BLOCKSTREAM_TIP)
        .send()
        .await
        .context("Failed to reach Blockstream")?
        .error_for_status()?
        .text()
        .await?;
    text.trim()
        .parse::<u64>()
        .context("Invalid tip height response")
}

pub async fn fetch_spot_price_eur(client: &reqwest::Client) -> Result<f64> {
    let body: serde_json::Value = client
        .get(COINGECKO_SPOT)
        .send()
        .await
        .context("Failed to reach CoinGecko")?
        .error_for_status()?
        .json()
        .await?;
    body["bitcoin"]["eur"]
        .as_f64()
        .context("Invalid spot price response")
}

pub async fn fetch_network_hashrate_ehs(client: &reqwest::Client) -> Result<f64> {
    let body = client
        .get(BLOCKCHAIN_HASHRATE)
        .send()
        .await
        .context("Failed to reach blockchain.info")?
        .error_for_status()?
        .text()
        .await?;
    let series = parse_hashrate_chart(&body)?;
    series
        .iter()
        .last()
        .map(|(_, ehs)| *ehs)
        .context("Empty hashrate response")
}

/// Fetch all live metrics; any that keep failing use the matching `fallback` value
pub async fn fetch_live_metrics(attempts: u32, fallback: Baseline) -> LiveMetrics {
    let today = Utc::now().date_naive();

    let client = match client() {
        Ok(c) => c,
        Err(e) => {
            warn!("Using fallback live metrics: {:#}", e);
            return resolve_live(today, None, None, None, fallback);
        }
    };

    let spot = match with_retry("coingecko", attempts, || fetch_spot_price_eur(&client)).await {
        Ok(price) => Some(price),
        Err(e) => {
            warn!(fallback = fallback.spot_price_eur, "{}", e);
            None
        }
    };

    let network = match with_retry("blockchain.info", attempts, || fetch_network_hashrate_ehs(&client)).await {
        Ok(ehs) => Some(ehs),
        Err(e) => {
            warn!(fallback = fallback.network_ehs, "{}", e);
            None
        }
    };

    let height = match with_retry("blockstream", attempts, || fetch_block_height(&client)).await {
        Ok(height) => Some(height),
        Err(e) => {
            warn!(fallback = fallback.block_height, "{}", e);
            None
        }
    };

    resolve_live(today, spot, network, height, fallback)
}

/// Merge fetched values (`None` = gave up) with `fallback` into one snapshot.
///
/// The snapshot date is the price observation date: `today` for a live price,
/// `fallback.date` otherwise. The tip height is moved to that date at 144
/// blocks/day from wherever it was observed.
pub fn resolve_live(
    today: NaiveDate,
    spot: Option<f64>,
    network: Option<f64>,
    height: Option<u64>,
    fallback: Baseline,
) -> LiveMetrics {
    let mut degraded = Vec::new();

    let (date, spot_price_eur) = match spot {
        Some(price) => (today, price),
        None => {
            degraded.push("price".to_string());
            (fallback.date, fallback.spot_price_eur)
        }
    };

    let network_ehs = match network {
        Some(ehs) => ehs,
        None => {
            degraded.push("hashrate".to_string());
            fallback.network_ehs
        }
    };

    let block_height = match height {
        Some(height) => reward::estimate_height(date, height, today),
        None => {
            degraded.push("block_height".to_string());
            reward::estimate_height(date, fallback.block_height, fallback.date)
        }
    };

    LiveMetrics {
        date,
        spot_price_eur,
        network_ehs,
        block_height,
        degraded,
    }
}

// ============================================================================
// HISTORY
// ============================================================================

#[derive(Debug, Deserialize)]
struct Histoday {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Message", default)]
    message: String,
    #[serde(rename = "Data", default)]
    data: HistodayData,
}

#[derive(Debug, Default, Deserialize)]
struct HistodayData {
    #[serde(rename = "TimeFrom", default)]
    time_from: i64,
    #[serde(rename = "Data", default)]
    bars: Vec<HistodayBar>,
}

#[derive(Debug, Deserialize)]
struct HistodayBar {
    time: i64,
    close: f64,
}

/// One page of daily closes
#[derive(Debug, Clone, PartialEq)]
pub struct HistodayPage {
    /// Unix seconds of the first bar requested
    pub time_from: i64,
    pub prices: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Deserialize)]
struct ChartPoint {
    x: i64,
    y: f64,
}

#[derive(Debug, Deserialize)]
struct Chart {
    values: Vec<ChartPoint>,
}

/// CryptoCompare histoday: `Data.Data` is `[{time: unix_s, close, ...}, ...]`.
/// Zero closes pad the range before trading began and are dropped.
pub fn parse_histoday(body: &str) -> Result<HistodayPage> {
    let page: Histoday = serde_json::from_str(body).context("Invalid histoday JSON")?;
    if page.response != "Success" {
        anyhow::bail!("CryptoCompare error: {}", page.message);
    }

    let prices = page
        .data
        .bars
        .into_iter()
        .filter(|bar| bar.close.is_finite() && bar.close > 0.0)
        .filter_map(|bar| Some((DateTime::from_timestamp(bar.time, 0)?.date_naive(), bar.close)))
        .collect();

    Ok(HistodayPage {
        time_from: page.data.time_from,
        prices,
    })
}

/// `toTs` for the page preceding one that begins at `time_from`, or `None`
/// once `history_start()` is covered
pub fn previous_page_end(time_from: i64) -> Option<i64> {
    let first = DateTime::from_timestamp(time_from, 0)?.date_naive();
    (first > history_start()).then_some(time_from - SECONDS_PER_DAY)
}

/// blockchain.info chart: `values` is `[{x: unix_s, y: TH/s}, ...]`, returned in EH/s
pub fn parse_hashrate_chart(body: &str) -> Result<TimeSeries<f64>> {
    let chart: Chart = serde_json::from_str(body).context("Invalid hashrate chart JSON")?;
    Ok(TimeSeries::from_points(chart.values.into_iter().filter_map(
        |p| {
            let date = DateTime::from_timestamp(p.x, 0)?.date_naive();
            Some((date, p.y / THS_PER_EHS))
        },
    )))
}

/// Calendar-complete from `history_start()` through `today`
fn complete(series: TimeSeries<f64>, today: NaiveDate) -> TimeSeries<f64> {
    series.fill_forward(Some(today)).since(history_start())
}

async fn get_text(client: &reqwest::Client, url: &str) -> Result<String> {
    Ok(client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", url))?
        .error_for_status()?
        .text()
        .await?)
}

/// Daily EUR price from `history_start()`, forward-filled
pub async fn fetch_price_history(attempts: u32) -> SimResult<TimeSeries<f64>> {
    let client = client().map_err(|e| client_error("cryptocompare", e))?;
    let mut points = Vec::new();
    let mut to_ts: Option<i64> = None;

    for _ in 0..MAX_HISTORY_PAGES {
        let url = match to_ts {
            Some(ts) => format!("{}&toTs={}", CRYPTOCOMPARE_HISTODAY, ts),
            None => CRYPTOCOMPARE_HISTODAY.to_string(),
        };
        let page = with_retry("cryptocompare", attempts, || async {
            parse_histoday(&get_text(&client, &url).await?)
        })
        .await?;
        debug!(rows = page.prices.len(), time_from = page.time_from, "Fetched price page");

        let next = if page.prices.is_empty() {
            None
        } else {
            previous_page_end(page.time_from)
        };
        points.extend(page.prices);
        match next {
            Some(ts) => to_ts = Some(ts),
            None => break,
        }
    }

    Ok(complete(TimeSeries::from_points(points), Utc::now().date_naive()))
}

/// Daily network hashrate in EH/s, forward-filled
pub async fn fetch_hashrate_history(attempts: u32) -> SimResult<TimeSeries<f64>> {
    let client = client().map_err(|e| client_error("blockchain.info", e))?;
    let series = with_retry("blockchain.info", attempts, || async {
        parse_hashrate_chart(&get_text(&client, BLOCKCHAIN_HASHRATE_HISTORY).await?)
    })
    .await?;
    Ok(complete(series, Utc::now().date_naive()))
}

fn client_error(source_name: &str, e: anyhow::Error) -> SimError {
    SimError::Client {
        source_name: source_name.to_string(),
        message: format!("{:#}", e),
    }
}
