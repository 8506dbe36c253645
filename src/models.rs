//! Data models for the mining revenue simulator

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

// ============================================================================
// NETWORK CONSTANTS
// ============================================================================

/// Target blocks per day (one block every ten minutes)
pub const BLOCKS_PER_DAY: u64 = 144;

/// Blocks between subsidy halvings
pub const HALVING_INTERVAL: u64 = 210_000;

/// Days per year used for fractional-year axes
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Genesis block date (2009-01-03)
pub fn genesis_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2009, 1, 3).unwrap_or(NaiveDate::MIN)
}

// ============================================================================
// DEFAULTS
// ============================================================================

pub const DEFAULT_EFFICIENCY_J_PER_TH: f64 = 18.0;
pub const DEFAULT_FEE_PER_BLOCK_BTC: f64 = 0.022;
pub const DEFAULT_EXPONENT: f64 = 5.6;
pub const DEFAULT_GROWTH_RATE: f64 = 1.30;

/// Site power when neither a configured average nor a power series exists
pub const DEFAULT_AVERAGE_POWER_MW: f64 = 1000.0;

/// Spot price used when the live price cannot be fetched
pub const FALLBACK_SPOT_PRICE_EUR: f64 = 96_500.0;

/// Network hashrate used when the live value cannot be fetched (EH/s)
pub const FALLBACK_NETWORK_EHS: f64 = 1020.0;

/// Tip height used when the live value cannot be fetched
pub const FALLBACK_BLOCK_HEIGHT: u64 = 916_944;

/// Date the fallback tip height refers to
pub fn fallback_block_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 29).unwrap_or(NaiveDate::MIN)
}

/// Projection window used when no explicit range is given
pub fn projection_window() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or(NaiveDate::MIN),
        NaiveDate::from_ymd_opt(2032, 12, 31).unwrap_or(NaiveDate::MAX),
    )
}

/// Simulation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationMode {
    /// Walk recorded series, falling back to the model on gaps
    Historical,
    /// Walk a future window using the model and hashrate growth
    Projection,
}

impl std::fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationMode::Historical => write!(f, "historical"),
            SimulationMode::Projection => write!(f, "projection"),
        }
    }
}

impl std::str::FromStr for SimulationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "historical" | "hist" => Ok(SimulationMode::Historical),
            "projection" | "proj" => Ok(SimulationMode::Projection),
            _ => Err(format!("Invalid mode: {}. Use historical or projection", s)),
        }
    }
}

/// How the block reward available on a given day is determined
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RewardBasis {
    /// Calendar-year table, halving years averaged
    YearAverage,
    /// Block height estimated from an anchor at 144 blocks/day
    BlockHeight {
        anchor_height: u64,
        anchor_date: NaiveDate,
    },
}

/// The "now" a simulation is calibrated against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Date of the spot observations
    pub date: NaiveDate,
    /// Spot price (EUR/BTC), the power-law anchor
    pub spot_price_eur: f64,
    /// Network hashrate (EH/s), projection starting point
    pub network_ehs: f64,
    /// Tip height observed at `date`
    pub block_height: u64,
}

impl Baseline {
    /// Baseline built entirely from the offline fallback constants
    pub fn fallback() -> Self {
        Self {
            date: fallback_block_date(),
            spot_price_eur: FALLBACK_SPOT_PRICE_EUR,
            network_ehs: FALLBACK_NETWORK_EHS,
            block_height: FALLBACK_BLOCK_HEIGHT,
        }
    }
}

/// Immutable parameters for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub efficiency_j_per_th: f64,
    pub fee_per_block_btc: f64,
    pub exponent: f64,
    /// Multiplicative, e.g. 1.30 = +30%/yr
    pub annual_growth_rate: f64,
    pub mode: SimulationMode,
    /// Inclusive range; `None` picks the mode default
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Overrides the power series mean
    pub average_power_mw: Option<f64>,
    pub reward_basis: RewardBasis,
    pub baseline: Baseline,
}

impl SimulationConfig {
    pub fn new(mode: SimulationMode, baseline: Baseline) -> Self {
        Self {
            efficiency_j_per_th: DEFAULT_EFFICIENCY_J_PER_TH,
            fee_per_block_btc: DEFAULT_FEE_PER_BLOCK_BTC,
            exponent: DEFAULT_EXPONENT,
            annual_growth_rate: DEFAULT_GROWTH_RATE,
            mode,
            date_range: None,
            average_power_mw: None,
            reward_basis: RewardBasis::YearAverage,
            baseline,
        }
    }

    /// Reject parameters outside their accepted ranges, naming the first offender
    pub fn validate(&self) -> SimResult<()> {
        if !self.efficiency_j_per_th.is_finite() || self.efficiency_j_per_th <= 0.0 {
            return Err(SimError::config(
                "efficiency_j_per_th",
                format!("must be greater than 0, got {}", self.efficiency_j_per_th),
            ));
        }
        if !self.fee_per_block_btc.is_finite() || self.fee_per_block_btc < 0.0 {
            return Err(SimError::config(
                "fee_per_block_btc",
                format!("must be 0 or more, got {}", self.fee_per_block_btc),
            ));
        }
        if !self.exponent.is_finite() || self.exponent <= 0.0 || self.exponent > 20.0 {
            return Err(SimError::config(
                "exponent",
                format!("must be within (0, 20], got {}", self.exponent),
            ));
        }
        if !self.annual_growth_rate.is_finite() || self.annual_growth_rate < 0.0 {
            return Err(SimError::config(
                "annual_growth_rate",
                format!("must be 0 or more, got {}", self.annual_growth_rate),
            ));
        }
        if let Some(mw) = self.average_power_mw {
            if !mw.is_finite() || mw < 0.0 {
                return Err(SimError::config(
                    "average_power_mw",
                    format!("must be 0 or more, got {}", mw),
                ));
            }
        }
        if !self.baseline.spot_price_eur.is_finite() || self.baseline.spot_price_eur <= 0.0 {
            return Err(SimError::config(
                "spot_price_eur",
                format!("must be greater than 0, got {}", self.baseline.spot_price_eur),
            ));
        }
        if !self.baseline.network_ehs.is_finite() || self.baseline.network_ehs <= 0.0 {
            return Err(SimError::config(
                "network_ehs",
                format!("must be greater than 0, got {}", self.baseline.network_ehs),
            ));
        }
        if let Some((start, end)) = self.date_range {
            if end < start {
                return Err(SimError::invalid_date(
                    end,
                    format!("range end precedes start {}", start),
                ));
            }
            if start <= genesis_date() {
                return Err(SimError::invalid_date(start, "must fall after the genesis block"));
            }
        }
        Ok(())
    }
}

/// One simulated day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyResult {
    pub date: NaiveDate,
    pub price_eur: f64,
    pub site_hash_ehs: f64,
    pub network_hash_ehs: f64,
    pub hash_share_pct: f64,
    pub btc_mined: f64,
    pub revenue_eur: f64,
    pub cumulative_revenue_eur: f64,
}

/// Calendar-year rollup of daily results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlySummary {
    pub year: i32,
    pub avg_price_eur: f64,
    pub avg_hash_share_pct: f64,
    pub total_btc_mined: f64,
    pub total_revenue_eur: f64,
    pub cumulative_revenue_eur: f64,
}
