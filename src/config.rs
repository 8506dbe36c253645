//! Configuration management for the minesim CLI

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{
    Baseline, SimulationConfig, SimulationMode, DEFAULT_EFFICIENCY_J_PER_TH, DEFAULT_EXPONENT,
    DEFAULT_FEE_PER_BLOCK_BTC, DEFAULT_GROWTH_RATE,
};

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the CSV inputs (platform data dir when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Daily EUR price file
    pub price_csv: String,

    /// Daily network hashrate file (EH/s)
    pub hashrate_csv: String,

    /// Daily site power file (MW)
    pub power_csv: String,

    /// Miner efficiency (J/TH)
    pub efficiency_j_per_th: f64,

    /// Transaction fees per block (BTC)
    pub fee_per_block_btc: f64,

    /// Power-law exponent
    pub exponent: f64,

    /// Annual network hashrate growth factor
    pub annual_growth_rate: f64,

    /// Fixed site power (MW), overrides the power series mean
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_power_mw: Option<f64>,

    /// Attempts per external request
    pub fetch_attempts: u32,

    /// Values used when live metrics cannot be fetched
    pub fallback: Baseline,
}

impl Config {
    pub fn new() -> Self {
        Self {
            data_dir: None,
            price_csv: "historical_btcprice.csv".to_string(),
            hashrate_csv: "sample_hashrate.csv".to_string(),
            power_csv: "sample_power.csv".to_string(),
            efficiency_j_per_th: DEFAULT_EFFICIENCY_J_PER_TH,
            fee_per_block_btc: DEFAULT_FEE_PER_BLOCK_BTC,
            exponent: DEFAULT_EXPONENT,
            annual_growth_rate: DEFAULT_GROWTH_RATE,
            average_power_mw: None,
            fetch_attempts: 10,
            fallback: Baseline::fallback(),
        }
    }

    /// Resolved data directory, created if missing
    pub fn data_dir(&self) -> Result<PathBuf> {
        let dir = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => ProjectDirs::from("io", "minesim", "minesim")
                .context("Failed to determine data directory")?
                .data_dir()
                .to_path_buf(),
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        Ok(dir)
    }

    pub fn price_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(&self.price_csv))
    }

    pub fn hashrate_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(&self.hashrate_csv))
    }

    pub fn power_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(&self.power_csv))
    }

    pub fn live_metrics_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("live_metrics.json"))
    }

    /// Simulation parameters seeded from this file; CLI flags override afterwards
    pub fn simulation_config(&self, mode: SimulationMode, baseline: Baseline) -> SimulationConfig {
        SimulationConfig {
            efficiency_j_per_th: self.efficiency_j_per_th,
            fee_per_block_btc: self.fee_per_block_btc,
            exponent: self.exponent,
            annual_growth_rate: self.annual_growth_rate,
            average_power_mw: self.average_power_mw,
            ..SimulationConfig::new(mode, baseline)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Get the config file path
pub fn get_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("io", "minesim", "minesim")
        .context("Failed to determine config directory")?;

    let config_dir = proj_dirs.config_dir();
    std::fs::create_dir_all(config_dir)?;

    Ok(config_dir.join("config.toml"))
}

/// Load configuration from file
pub fn load_config() -> Result<Config> {
    load_config_from(&get_config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::new());
    }

    let content = std::fs::read_to_string(path)
        .context("Failed to read config file")?;

    let config: Config = toml::from_str(&content)
        .context("Failed to parse config file")?;

    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &Config) -> Result<()> {
    save_config_to(config, &get_config_path()?)
}

pub fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .context("Failed to serialize config")?;

    std::fs::write(path, content)
        .context("Failed to write config file")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FALLBACK_BLOCK_HEIGHT;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.fetch_attempts, 10);
        assert_eq!(config.fallback.block_height, FALLBACK_BLOCK_HEIGHT);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::new();
        config.data_dir = Some(dir.path().to_path_buf());
        config.average_power_mw = Some(250.0);
        config.exponent = 5.8;

        save_config_to(&config, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "efficiency_j_per_th = 21.5\nfetch_attempts = 3\n").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.efficiency_j_per_th, 21.5);
        assert_eq!(config.fetch_attempts, 3);
        assert_eq!(config.fee_per_block_btc, DEFAULT_FEE_PER_BLOCK_BTC);
        assert_eq!(config.power_csv, "sample_power.csv");
    }

    #[test]
    fn test_simulation_config_carries_settings() {
        let mut config = Config::new();
        config.annual_growth_rate = 1.1;
        config.average_power_mw = Some(42.0);

        let sim = config.simulation_config(SimulationMode::Projection, config.fallback);
        assert_eq!(sim.annual_growth_rate, 1.1);
        assert_eq!(sim.average_power_mw, Some(42.0));
        assert_eq!(sim.mode, SimulationMode::Projection);
        assert!(sim.date_range.is_none());
        assert!(sim.validate().is_ok());
    }

    #[test]
    fn test_data_paths_join_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new();
        config.data_dir = Some(dir.path().join("data"));

        assert_eq!(config.power_path().unwrap(), dir.path().join("data").join("sample_power.csv"));
        assert!(dir.path().join("data").is_dir());
    }
}
