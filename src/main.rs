//! minesim - Bitcoin mining revenue simulator
//!
//! Daily simulation of a mining site's BTC output and EUR revenue, over
//! recorded history or a power-law projection.

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

mod aggregate;
mod commands;
mod config;
mod csv_io;
mod engine;
mod error;
mod market;
mod models;
mod power_law;
mod report;
mod resolve;
mod reward;
mod sample;
mod series;

use commands::{curve, fetch, init, live, mined, sample_power, simulate};
use models::SimulationMode;

/// minesim - Bitcoin mining revenue simulator
#[derive(Parser)]
#[command(name = "minesim")]
#[command(version)]
#[command(about = "Simulate mining revenue over history or a power-law projection", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a configuration and seed the data directory
    Init {
        /// Directory for CSV inputs
        #[arg(long, env = "MINESIM_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// Miner efficiency (J/TH)
        #[arg(long)]
        efficiency: Option<f64>,

        /// Transaction fees per block (BTC)
        #[arg(long)]
        fee: Option<f64>,

        /// Fixed site power (MW)
        #[arg(long)]
        average_power: Option<f64>,

        /// Overwrite existing config and sample power file
        #[arg(long)]
        force: bool,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Download price and hashrate history and snapshot live metrics
    Fetch {
        /// Attempts per request (defaults to config)
        #[arg(long)]
        attempts: Option<u32>,
    },

    /// Regenerate the synthetic site power file
    SamplePower {
        /// Seed for a reproducible profile
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show current spot price, network hashrate and tip height
    Live {
        /// Use the last fetched snapshot instead of the network
        #[arg(long)]
        offline: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the calibrated power-law price curve
    Curve {
        /// Years ahead of the anchor date
        #[arg(long, default_value = "7")]
        years: u32,

        /// Days between points
        #[arg(long, default_value = "30")]
        step: u32,

        /// Power-law exponent (defaults to config)
        #[arg(long)]
        exponent: Option<f64>,

        #[arg(long)]
        offline: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// BTC issued since a start block and the value of a share of it
    Mined {
        /// Hypothetical share of issuance (percent)
        #[arg(long, default_value = "3")]
        share: f64,

        /// Accounting start block
        #[arg(long, default_value_t = mined::DEFAULT_START_BLOCK)]
        start_block: u64,

        #[arg(long)]
        offline: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run the daily revenue simulation
    Simulate {
        /// historical or projection
        #[arg(long, default_value = "historical")]
        mode: SimulationMode,

        /// Miner efficiency (J/TH)
        #[arg(long)]
        efficiency: Option<f64>,

        /// Transaction fees per block (BTC)
        #[arg(long)]
        fee: Option<f64>,

        /// Power-law exponent
        #[arg(long)]
        exponent: Option<f64>,

        /// Annual network hashrate growth factor (projection)
        #[arg(long)]
        growth: Option<f64>,

        /// First day (YYYY-MM-DD), requires --end
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day (YYYY-MM-DD), inclusive
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Fixed site power (MW)
        #[arg(long)]
        average_power: Option<f64>,

        /// Sum each day's blocks through the height schedule instead of the yearly table
        #[arg(long)]
        block_height_basis: bool,

        /// Price CSV (date,price)
        #[arg(long)]
        price_csv: Option<PathBuf>,

        /// Hashrate CSV (date,EH/s)
        #[arg(long)]
        hashrate_csv: Option<PathBuf>,

        /// Power CSV (date,MW)
        #[arg(long)]
        power_csv: Option<PathBuf>,

        /// Use the last fetched snapshot instead of the network
        #[arg(long)]
        offline: bool,

        /// Also print the daily table
        #[arg(long)]
        daily: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Directory for daily.csv, yearly.csv and simulation.json
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let json = matches!(
        cli.command,
        Commands::Live { json: true, .. }
            | Commands::Curve { json: true, .. }
            | Commands::Mined { json: true, .. }
            | Commands::Simulate { json: true, .. }
    );
    if !json {
        print_banner();
    }

    match cli.command {
        Commands::Init {
            data_dir,
            efficiency,
            fee,
            average_power,
            force,
        } => {
            init::execute(data_dir, efficiency, fee, average_power, force).await?;
        }

        Commands::Config { path } => {
            let config_path = config::get_config_path()?;
            if path {
                println!("{}", config_path.display());
            } else {
                println!("Config file: {}", config_path.display());
                if config_path.exists() {
                    let config = config::load_config()?;
                    println!("\n{}", toml::to_string_pretty(&config)?);
                } else {
                    println!("(not created yet - run 'minesim init' first)");
                }
            }
        }

        Commands::Fetch { attempts } => {
            fetch::execute(attempts).await?;
        }

        Commands::SamplePower { seed } => {
            sample_power::execute(seed).await?;
        }

        Commands::Live { offline, json } => {
            live::execute(offline, json).await?;
        }

        Commands::Curve {
            years,
            step,
            exponent,
            offline,
            json,
        } => {
            curve::execute(years, step, exponent, offline, json).await?;
        }

        Commands::Mined {
            share,
            start_block,
            offline,
            json,
        } => {
            mined::execute(share, start_block, offline, json).await?;
        }

        Commands::Simulate {
            mode,
            efficiency,
            fee,
            exponent,
            growth,
            start,
            end,
            average_power,
            block_height_basis,
            price_csv,
            hashrate_csv,
            power_csv,
            offline,
            daily,
            json,
            out,
        } => {
            simulate::execute(simulate::Options {
                mode,
                efficiency,
                fee,
                exponent,
                growth,
                start,
                end,
                average_power,
                block_height_basis,
                price_csv,
                hashrate_csv,
                power_csv,
                offline,
                daily,
                json,
                out,
            })
            .await?;
        }
    }

    Ok(())
}

fn print_banner() {
    let banner = r#"
               _
  _ __ ___ (_)_ __   ___  ___(_)_ __ ___
 | '_ ` _ \| | '_ \ / _ \/ __| | '_ ` _ \
 | | | | | | | | | |  __/\__ \ | | | | | |
 |_| |_| |_|_|_| |_|\___||___/_|_| |_| |_|
                                           "#;

    println!("{}", banner.cyan());
    println!(
        "{}",
        "  Bitcoin Mining Revenue Simulator".bright_black()
    );
    println!();
}
