//! Block subsidy schedule
//!
//! Two views of the same schedule:
//! - Calendar years: a table of (first year, subsidy) with halving years
//!   averaged between the old and new subsidy. Used for projections where
//!   only a date is known.
//! - Block heights: regimes of `HALVING_INTERVAL` blocks each. Used when the
//!   height is known or can be estimated, so halving days split exactly.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{RewardBasis, BLOCKS_PER_DAY, HALVING_INTERVAL};

/// Initial block subsidy (BTC)
pub const INITIAL_SUBSIDY: f64 = 50.0;

/// (first calendar year, subsidy) ordered ascending
const SUBSIDY_BY_YEAR: [(i32, f64); 7] = [
    (2009, 50.0),
    (2012, 25.0),
    (2016, 12.5),
    (2020, 6.25),
    (2024, 3.125),
    (2028, 1.5625),
    (2032, 0.78125),
];

/// Calendar years in which a halving lands
const HALVING_YEARS: [i32; 6] = [2012, 2016, 2020, 2024, 2028, 2032];

/// Eras generated for the standard height schedule
const STANDARD_ERAS: u64 = 64;

fn table_index(year: i32) -> usize {
    SUBSIDY_BY_YEAR
        .iter()
        .rposition(|(first_year, _)| *first_year <= year)
        .unwrap_or(0)
}

/// Block subsidy applicable in a calendar year.
///
/// Halving years return the mean of the pre- and post-halving subsidy.
pub fn reward_for_year(year: i32) -> f64 {
    let idx = table_index(year);
    let subsidy = SUBSIDY_BY_YEAR[idx].1;

    if HALVING_YEARS.contains(&year) && idx > 0 {
        (SUBSIDY_BY_YEAR[idx - 1].1 + subsidy) / 2.0
    } else {
        subsidy
    }
}

/// Average total reward per block (subsidy plus fees) for a year
pub fn average_reward_per_block(year: i32, fee_per_block_btc: f64) -> f64 {
    reward_for_year(year) + fee_per_block_btc
}

/// A run of blocks paying the same subsidy: `[start_height, end_height)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Regime {
    pub start_height: u64,
    pub end_height: u64,
    pub subsidy: f64,
}

/// Height-indexed subsidy regimes, ordered and non-overlapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardSchedule {
    regimes: Vec<Regime>,
}

impl RewardSchedule {
    /// Bitcoin's schedule: 50 BTC halving every 210 000 blocks
    pub fn standard() -> Self {
        let regimes = (0..STANDARD_ERAS)
            .map(|era| Regime {
                start_height: era * HALVING_INTERVAL,
                end_height: (era + 1) * HALVING_INTERVAL,
                subsidy: INITIAL_SUBSIDY / 2f64.powi(era as i32),
            })
            .collect();
        Self { regimes }
    }

    pub fn regimes(&self) -> &[Regime] {
        &self.regimes
    }

    /// Subsidy paid by the block at `height`, 0 outside every regime
    pub fn subsidy_at_height(&self, height: u64) -> f64 {
        self.regimes
            .iter()
            .find(|r| r.start_height <= height && height < r.end_height)
            .map(|r| r.subsidy)
            .unwrap_or(0.0)
    }
}

impl Default for RewardSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

/// Total subsidy paid by blocks `[start_block, end_block)`.
///
/// Each regime contributes only the blocks it shares with the range, so
/// boundary blocks are counted once. Returns 0 when `end_block <= start_block`.
pub fn mined_btc_between(start_block: u64, end_block: u64, schedule: &RewardSchedule) -> f64 {
    if end_block <= start_block {
        return 0.0;
    }

    schedule
        .regimes()
        .iter()
        .map(|r| {
            let lo = r.start_height.max(start_block);
            let hi = r.end_height.min(end_block);
            if hi > lo {
                (hi - lo) as f64 * r.subsidy
            } else {
                0.0
            }
        })
        .sum()
}

/// Estimate the first block height mined on `date` from a known (height, date) pair
pub fn estimate_height(date: NaiveDate, anchor_height: u64, anchor_date: NaiveDate) -> u64 {
    let offset = (date - anchor_date).num_days() * BLOCKS_PER_DAY as i64;
    if offset >= 0 {
        anchor_height.saturating_add(offset as u64)
    } else {
        anchor_height.saturating_sub(offset.unsigned_abs())
    }
}

/// BTC paid to the whole network on `date` (subsidy plus fees over 144 blocks)
pub fn daily_network_reward(
    date: NaiveDate,
    basis: RewardBasis,
    fee_per_block_btc: f64,
    schedule: &RewardSchedule,
) -> f64 {
    match basis {
        RewardBasis::YearAverage => {
            average_reward_per_block(date.year(), fee_per_block_btc) * BLOCKS_PER_DAY as f64
        }
        RewardBasis::BlockHeight {
            anchor_height,
            anchor_date,
        } => {
            let first = estimate_height(date, anchor_height, anchor_date);
            mined_btc_between(first, first + BLOCKS_PER_DAY, schedule)
                + fee_per_block_btc * BLOCKS_PER_DAY as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_for_plain_years() {
        assert_eq!(reward_for_year(2010), 50.0);
        assert_eq!(reward_for_year(2015), 25.0);
        assert_eq!(reward_for_year(2021), 6.25);
        assert_eq!(reward_for_year(2030), 1.5625);
        assert_eq!(reward_for_year(2040), 0.78125);
    }

    #[test]
    fn test_reward_before_table_is_initial() {
        assert_eq!(reward_for_year(2009), 50.0);
        assert_eq!(reward_for_year(2001), 50.0);
    }

    #[test]
    fn test_halving_years_are_averaged() {
        assert_eq!(reward_for_year(2012), 37.5);
        assert_eq!(reward_for_year(2020), 9.375);
        assert_eq!(reward_for_year(2024), 4.6875);
        assert_eq!(reward_for_year(2032), 1.171875);
    }

    #[test]
    fn test_average_reward_adds_fee() {
        assert!((average_reward_per_block(2021, 0.02) - 6.27).abs() < 1e-12);
    }

    #[test]
    fn test_mined_between_single_regime() {
        let schedule = RewardSchedule::standard();
        let mined = mined_btc_between(499_500, 630_000, &schedule);
        assert_eq!(mined, (630_000 - 499_500) as f64 * 12.5);
    }

    #[test]
    fn test_mined_between_spans_halvings() {
        let schedule = RewardSchedule::standard();
        let mined = mined_btc_between(499_500, 916_944, &schedule);
        let expected = 130_500.0 * 12.5 + 210_000.0 * 6.25 + 76_944.0 * 3.125;
        assert!((mined - expected).abs() < 1e-6);
    }

    #[test]
    fn test_mined_between_inverted_range_is_zero() {
        let schedule = RewardSchedule::standard();
        assert_eq!(mined_btc_between(630_000, 499_500, &schedule), 0.0);
        assert_eq!(mined_btc_between(630_000, 630_000, &schedule), 0.0);
    }

    #[test]
    fn test_boundary_block_counted_once() {
        let schedule = RewardSchedule::standard();
        // 629_999 pays 12.5, 630_000 pays 6.25
        assert_eq!(mined_btc_between(629_999, 630_001, &schedule), 18.75);
        assert_eq!(schedule.subsidy_at_height(630_000), 6.25);
    }

    #[test]
    fn test_subsidy_keeps_halving_past_table() {
        let schedule = RewardSchedule::standard();
        assert_eq!(schedule.subsidy_at_height(1_470_000), 0.390625);
        assert!(schedule.subsidy_at_height(u64::MAX) >= 0.0);
    }

    #[test]
    fn test_estimate_height_both_directions() {
        let anchor = NaiveDate::from_ymd_opt(2025, 9, 29).unwrap();
        let later = NaiveDate::from_ymd_opt(2025, 10, 9).unwrap();
        let earlier = NaiveDate::from_ymd_opt(2025, 9, 19).unwrap();
        assert_eq!(estimate_height(later, 916_944, anchor), 916_944 + 1_440);
        assert_eq!(estimate_height(earlier, 916_944, anchor), 916_944 - 1_440);
        assert_eq!(estimate_height(earlier, 100, anchor), 0);
    }

    #[test]
    fn test_daily_reward_block_height_splits_halving_day() {
        let schedule = RewardSchedule::standard();
        let anchor_date = NaiveDate::from_ymd_opt(2024, 4, 19).unwrap();
        // 44 blocks before the halving, 100 after
        let basis = RewardBasis::BlockHeight {
            anchor_height: 839_956,
            anchor_date,
        };
        let reward = daily_network_reward(anchor_date, basis, 0.0, &schedule);
        assert!((reward - (44.0 * 6.25 + 100.0 * 3.125)).abs() < 1e-9);
    }

    #[test]
    fn test_daily_reward_year_average() {
        let schedule = RewardSchedule::standard();
        let date = NaiveDate::from_ymd_opt(2021, 6, 1).unwrap();
        let reward = daily_network_reward(date, RewardBasis::YearAverage, 0.02, &schedule);
        assert!((reward - 902.88).abs() < 1e-9);
    }
}
