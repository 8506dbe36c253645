//! Daily mining simulation
//!
//! One ascending pass over the date range. For each day:
//!   price -> site hashrate -> network hashrate -> hash share
//!   -> BTC mined -> revenue -> cumulative revenue
//! Every lookup goes through a resolver with a fallback, so a gap in the
//! input series never stops the run.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::{self, Totals};
use crate::error::{SimError, SimResult};
use crate::models::{
    genesis_date, projection_window, DailyResult, SimulationConfig, SimulationMode, YearlySummary,
    DEFAULT_AVERAGE_POWER_MW,
};
use crate::power_law::PowerLaw;
use crate::resolve::{NetworkHashResolver, PowerResolver, PriceResolver, ResolutionStats};
use crate::reward::{self, RewardSchedule};
use crate::series::TimeSeries;

/// The three input series, loaded once and never mutated by a run
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    /// EUR per BTC
    pub price: TimeSeries<f64>,
    /// Network hashrate, EH/s
    pub hashrate: TimeSeries<f64>,
    /// Site power, MW
    pub power: TimeSeries<f64>,
}

/// Output of one run
#[derive(Debug, Clone, Serialize)]
pub struct Simulation {
    pub config: SimulationConfig,
    pub power_law: PowerLaw,
    pub average_power_mw: f64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub daily: Vec<DailyResult>,
    pub yearly: Vec<YearlySummary>,
    pub totals: Totals,
    pub resolution: ResolutionStats,
}

/// Site hashrate in EH/s from efficiency (J/TH) and power (MW)
pub fn site_hash_ehs(efficiency_j_per_th: f64, power_mw: f64) -> f64 {
    (1000.0 / efficiency_j_per_th) * (power_mw / 1000.0)
}

/// Site share of the network in percent; 0 when the network figure is unusable
pub fn hash_share_pct(site_ehs: f64, network_ehs: f64) -> f64 {
    if network_ehs > 0.0 && network_ehs.is_finite() {
        site_ehs / network_ehs * 100.0
    } else {
        0.0
    }
}

/// Inclusive range the run walks
pub fn resolve_range(config: &SimulationConfig, data: &MarketData) -> SimResult<(NaiveDate, NaiveDate)> {
    let (start, end) = match (config.date_range, config.mode) {
        (Some(range), _) => range,
        (None, SimulationMode::Projection) => projection_window(),
        (None, SimulationMode::Historical) => data
            .power
            .span()
            .or_else(|| data.hashrate.span())
            .ok_or_else(|| {
                SimError::config(
                    "date_range",
                    "historical mode needs a date range, a power series or a hashrate series",
                )
            })?,
    };

    if end < start {
        return Err(SimError::invalid_date(
            end,
            format!("range end precedes start {}", start),
        ));
    }
    if start <= genesis_date() {
        return Err(SimError::invalid_date(start, "must fall after the genesis block"));
    }
    Ok((start, end))
}

/// Run one simulation. Pure: the same config and data give the same output.
pub fn simulate(config: &SimulationConfig, data: &MarketData) -> SimResult<Simulation> {
    config.validate()?;

    let model = PowerLaw::calibrated(
        config.baseline.date,
        config.baseline.spot_price_eur,
        config.exponent,
    )?;
    let average_power_mw = config
        .average_power_mw
        .or_else(|| data.power.mean())
        .unwrap_or(DEFAULT_AVERAGE_POWER_MW);
    let (start, end) = resolve_range(config, data)?;

    let (price_resolver, power_resolver, network_resolver) = match config.mode {
        SimulationMode::Historical => (
            PriceResolver::historical(&data.price, model),
            PowerResolver::historical(&data.power, average_power_mw),
            NetworkHashResolver::historical(&data.hashrate, config.baseline.network_ehs),
        ),
        SimulationMode::Projection => (
            PriceResolver::projection(model),
            PowerResolver::constant(average_power_mw),
            NetworkHashResolver::projection(
                config.baseline.network_ehs,
                config.annual_growth_rate,
                config.baseline.date.year(),
            ),
        ),
    };

    debug!(
        mode = %config.mode,
        %start,
        %end,
        coefficient = model.coefficient,
        average_power_mw,
        "Starting simulation"
    );

    let schedule = RewardSchedule::standard();
    let mut stats = ResolutionStats::default();
    let mut daily = Vec::with_capacity((end - start).num_days() as usize + 1);
    let mut cumulative_revenue_eur = 0.0;
    let mut date = start;

    while date <= end {
        let price = price_resolver.resolve(date)?;
        let power = power_resolver.resolve(date);
        let network = network_resolver.resolve(date);
        ResolutionStats::record(&mut stats.price, price.source);
        ResolutionStats::record(&mut stats.power, power.source);
        ResolutionStats::record(&mut stats.network, network.source);

        let site_ehs = site_hash_ehs(config.efficiency_j_per_th, power.value);
        let share_pct = hash_share_pct(site_ehs, network.value);
        let network_btc = reward::daily_network_reward(
            date,
            config.reward_basis,
            config.fee_per_block_btc,
            &schedule,
        );
        let btc_mined = share_pct / 100.0 * network_btc;
        let revenue_eur = btc_mined * price.value;
        cumulative_revenue_eur += revenue_eur;

        daily.push(DailyResult {
            date,
            price_eur: price.value,
            site_hash_ehs: site_ehs,
            network_hash_ehs: network.value,
            hash_share_pct: share_pct,
            btc_mined,
            revenue_eur,
            cumulative_revenue_eur,
        });

        date += Duration::days(1);
    }

    debug!(
        price_gaps = ResolutionStats::gaps(&stats.price),
        power_gaps = ResolutionStats::gaps(&stats.power),
        network_gaps = ResolutionStats::gaps(&stats.network),
        "Resolved data gaps through fallbacks"
    );

    let yearly = aggregate::aggregate(&daily);
    let totals = aggregate::totals(&daily);

    info!(
        days = totals.days,
        years = yearly.len(),
        btc = totals.total_btc_mined,
        revenue_eur = totals.total_revenue_eur,
        "Simulation complete"
    );

    Ok(Simulation {
        config: config.clone(),
        power_law: model,
        average_power_mw,
        start,
        end,
        daily,
        yearly,
        totals,
        resolution: stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Baseline, RewardBasis};
    use crate::resolve::Source;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn one_day_data(date: NaiveDate) -> MarketData {
        MarketData {
            price: TimeSeries::from_points(vec![(date, 50_000.0)]),
            hashrate: TimeSeries::from_points(vec![(date, 500.0)]),
            power: TimeSeries::from_points(vec![(date, 100.0)]),
        }
    }

    fn scenario_config(date: NaiveDate) -> SimulationConfig {
        let mut config = SimulationConfig::new(SimulationMode::Historical, Baseline::fallback());
        config.efficiency_j_per_th = 20.0;
        config.fee_per_block_btc = 0.02;
        config.date_range = Some((date, date));
        config
    }

    fn assert_rel(actual: f64, expected: f64) {
        assert!(
            ((actual - expected) / expected).abs() < 1e-6,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn assert_scenario(day: &DailyResult) {
        assert_rel(day.site_hash_ehs, 5.0);
        assert_rel(day.hash_share_pct, 1.0);
        assert_rel(day.btc_mined, 9.0288);
        assert_rel(day.revenue_eur, 451_440.0);
        assert_rel(day.cumulative_revenue_eur, 451_440.0);
    }

    #[test]
    fn test_single_day_scenario_block_height_2024() {
        // Early 2024 is still in the 6.25 BTC regime
        let date = d(2024, 1, 15);
        let mut config = scenario_config(date);
        config.reward_basis = RewardBasis::BlockHeight {
            anchor_height: 823_786,
            anchor_date: d(2024, 1, 1),
        };

        let sim = simulate(&config, &one_day_data(date)).unwrap();
        assert_eq!(sim.daily.len(), 1);
        assert_scenario(&sim.daily[0]);
        assert_eq!(sim.daily[0].price_eur, 50_000.0);
        assert_eq!(sim.daily[0].network_hash_ehs, 500.0);
    }

    #[test]
    fn test_single_day_scenario_year_average() {
        let date = d(2021, 3, 10);
        let sim = simulate(&scenario_config(date), &one_day_data(date)).unwrap();
        assert_scenario(&sim.daily[0]);
        assert_eq!(sim.yearly.len(), 1);
        assert_rel(sim.yearly[0].total_revenue_eur, 451_440.0);
    }

    #[test]
    fn test_site_hash_formula() {
        assert!((site_hash_ehs(20.0, 100.0) - 5.0).abs() < 1e-12);
        assert!((site_hash_ehs(18.0, 1000.0) - 55.555_555).abs() < 1e-5);
    }

    #[test]
    fn test_zero_network_hash_gives_zero_share() {
        assert_eq!(hash_share_pct(5.0, 0.0), 0.0);
        assert_eq!(hash_share_pct(5.0, f64::NAN), 0.0);

        let date = d(2022, 5, 5);
        let mut data = one_day_data(date);
        data.hashrate = TimeSeries::from_points(vec![(date, 0.0)]);
        let sim = simulate(&scenario_config(date), &data).unwrap();

        let day = &sim.daily[0];
        assert_eq!(day.hash_share_pct, 0.0);
        assert_eq!(day.btc_mined, 0.0);
        assert_eq!(day.revenue_eur, 0.0);
        assert!(day.cumulative_revenue_eur.is_finite());
    }

    #[test]
    fn test_cumulative_is_running_sum() {
        let points = |v: f64| {
            (0..40)
                .filter(|i| i % 7 != 3)
                .map(|i| (d(2023, 12, 1) + Duration::days(i), v + i as f64))
                .collect::<Vec<_>>()
        };
        let data = MarketData {
            price: TimeSeries::from_points(points(40_000.0)),
            hashrate: TimeSeries::from_points(points(450.0)),
            power: TimeSeries::from_points(points(90.0)),
        };
        let mut config = SimulationConfig::new(SimulationMode::Historical, Baseline::fallback());
        config.date_range = Some((d(2023, 12, 1), d(2024, 1, 9)));

        let sim = simulate(&config, &data).unwrap();
        assert_eq!(sim.daily.len(), 40);

        let mut running = 0.0;
        let mut prev = 0.0;
        for day in &sim.daily {
            assert!(day.revenue_eur >= 0.0);
            running += day.revenue_eur;
            assert!((day.cumulative_revenue_eur - running).abs() < 1e-6);
            assert!(day.cumulative_revenue_eur >= prev);
            prev = day.cumulative_revenue_eur;
        }
        assert!(sim.daily.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_gaps_resolved_without_abort() {
        let data = MarketData {
            price: TimeSeries::from_points(vec![(d(2020, 1, 1), 6_500.0)]),
            hashrate: TimeSeries::from_points(vec![(d(2020, 1, 1), 100.0), (d(2020, 1, 3), 120.0)]),
            power: TimeSeries::from_points(vec![(d(2020, 1, 1), 50.0)]),
        };
        let mut config = SimulationConfig::new(SimulationMode::Historical, Baseline::fallback());
        config.date_range = Some((d(2019, 12, 30), d(2020, 1, 3)));

        let sim = simulate(&config, &data).unwrap();
        assert_eq!(sim.daily.len(), 5);

        // 2019 has no hashrate data at all
        assert_eq!(sim.daily[0].network_hash_ehs, Baseline::fallback().network_ehs);
        // 2020-01-02 falls back to the 2020 mean
        assert_eq!(sim.daily[3].network_hash_ehs, 110.0);
        assert_eq!(sim.resolution.price.get(&Source::Recorded), Some(&1));
        assert_eq!(sim.resolution.price.get(&Source::Model), Some(&4));
        assert_eq!(sim.resolution.power.get(&Source::Average), Some(&4));
    }

    #[test]
    fn test_projection_window_and_consistency() {
        let config = SimulationConfig::new(SimulationMode::Projection, Baseline::fallback());
        let sim = simulate(&config, &MarketData::default()).unwrap();

        assert_eq!(sim.start, d(2026, 1, 1));
        assert_eq!(sim.end, d(2032, 12, 31));
        assert_eq!(sim.daily.len(), 365 * 7 + 2);
        assert_eq!(sim.yearly.len(), 7);
        assert_eq!(sim.average_power_mw, DEFAULT_AVERAGE_POWER_MW);

        let last = sim.yearly.last().unwrap();
        let sum: f64 = sim.yearly.iter().map(|y| y.total_revenue_eur).sum();
        let final_daily = sim.daily.last().unwrap().cumulative_revenue_eur;
        assert!((last.cumulative_revenue_eur - sum).abs() / sum < 1e-9);
        assert!((last.cumulative_revenue_eur - final_daily).abs() / final_daily < 1e-9);
    }

    #[test]
    fn test_projection_network_grows_yearly() {
        let config = SimulationConfig::new(SimulationMode::Projection, Baseline::fallback());
        let sim = simulate(&config, &MarketData::default()).unwrap();

        let jan_2026 = &sim.daily[0];
        assert!((jan_2026.network_hash_ehs - 1020.0 * 1.3).abs() < 1e-9);
        assert!(sim.yearly.windows(2).all(|w| w[1].avg_hash_share_pct < w[0].avg_hash_share_pct));
    }

    #[test]
    fn test_historical_range_defaults_to_power_span() {
        let data = MarketData {
            power: TimeSeries::from_points(vec![(d(2023, 3, 1), 90.0), (d(2023, 3, 10), 110.0)]),
            hashrate: TimeSeries::from_points(vec![(d(2018, 1, 1), 20.0), (d(2024, 1, 1), 600.0)]),
            ..MarketData::default()
        };
        let config = SimulationConfig::new(SimulationMode::Historical, Baseline::fallback());
        let sim = simulate(&config, &data).unwrap();

        assert_eq!((sim.start, sim.end), (d(2023, 3, 1), d(2023, 3, 10)));
        assert_eq!(sim.average_power_mw, 100.0);
    }

    #[test]
    fn test_historical_range_falls_back_to_hashrate_span() {
        let data = MarketData {
            hashrate: TimeSeries::from_points(vec![(d(2022, 1, 1), 200.0), (d(2022, 1, 5), 210.0)]),
            ..MarketData::default()
        };
        let config = SimulationConfig::new(SimulationMode::Historical, Baseline::fallback());
        let sim = simulate(&config, &data).unwrap();
        assert_eq!(sim.daily.len(), 5);
    }

    #[test]
    fn test_historical_without_any_range_rejected() {
        let config = SimulationConfig::new(SimulationMode::Historical, Baseline::fallback());
        let err = simulate(&config, &MarketData::default()).unwrap_err();
        assert!(err.to_string().contains("date_range"));
    }

    #[test]
    fn test_invalid_configuration_rejected_before_run() {
        let mut config = SimulationConfig::new(SimulationMode::Projection, Baseline::fallback());
        config.efficiency_j_per_th = -1.0;
        let err = simulate(&config, &MarketData::default()).unwrap_err();
        assert!(matches!(
            err,
            SimError::Configuration { parameter: "efficiency_j_per_th", .. }
        ));
    }

    #[test]
    fn test_pre_genesis_series_rejected() {
        let data = MarketData {
            power: TimeSeries::from_points(vec![(d(2008, 12, 1), 90.0), (d(2009, 2, 1), 90.0)]),
            ..MarketData::default()
        };
        let config = SimulationConfig::new(SimulationMode::Historical, Baseline::fallback());
        assert!(matches!(
            simulate(&config, &data),
            Err(SimError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_runs_are_reproducible() {
        let config = SimulationConfig::new(SimulationMode::Projection, Baseline::fallback());
        let a = simulate(&config, &MarketData::default()).unwrap();
        let b = simulate(&config, &MarketData::default()).unwrap();
        assert_eq!(a.daily, b.daily);
        assert_eq!(a.yearly, b.yearly);
    }
}
