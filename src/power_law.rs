//! Power-law price model: `price(days) = coefficient * days^exponent`
//!
//! `days` counts whole days since the genesis block. The coefficient is fit to
//! a single (days, price) anchor, so recalibrating is O(1) and the model holds
//! nothing but the two numbers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::models::{genesis_date, DAYS_PER_YEAR};

/// Whole days between the genesis block and `date`; must be at least 1
pub fn days_since_genesis(date: NaiveDate) -> SimResult<i64> {
    let days = (date - genesis_date()).num_days();
    if days < 1 {
        return Err(SimError::invalid_date(
            date,
            "must fall at least one day after the genesis block",
        ));
    }
    Ok(days)
}

/// `anchor_price / anchor_days^exponent`
pub fn calibrate(anchor_days: i64, anchor_price: f64, exponent: f64) -> f64 {
    anchor_price / (anchor_days as f64).powf(exponent)
}

/// `coefficient * days^exponent`
pub fn project_price(days_since_genesis: i64, coefficient: f64, exponent: f64) -> f64 {
    coefficient * (days_since_genesis as f64).powf(exponent)
}

/// A calibrated model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerLaw {
    pub coefficient: f64,
    pub exponent: f64,
}

/// One point of the model curve on a fractional-year axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub year: f64,
    pub price_eur: f64,
}

impl PowerLaw {
    /// Fit to a price observed on `anchor_date`
    pub fn calibrated(anchor_date: NaiveDate, anchor_price: f64, exponent: f64) -> SimResult<Self> {
        let days = days_since_genesis(anchor_date)?;
        Ok(Self {
            coefficient: calibrate(days, anchor_price, exponent),
            exponent,
        })
    }

    pub fn price_at_days(&self, days: i64) -> f64 {
        project_price(days, self.coefficient, self.exponent)
    }

    pub fn price_on(&self, date: NaiveDate) -> SimResult<f64> {
        Ok(self.price_at_days(days_since_genesis(date)?))
    }

    /// Curve from `from_date` forward, one point every `step_days`
    pub fn curve(&self, from_date: NaiveDate, years_ahead: u32, step_days: u32) -> SimResult<Vec<CurvePoint>> {
        let start = days_since_genesis(from_date)?;
        let step = step_days.max(1) as i64;
        let horizon = years_ahead as i64 * 365;

        Ok((0..=horizon)
            .step_by(step as usize)
            .map(|offset| {
                let day = start + offset;
                CurvePoint {
                    year: 2009.0 + day as f64 / DAYS_PER_YEAR,
                    price_eur: self.price_at_days(day),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_since_genesis() {
        let day_one = NaiveDate::from_ymd_opt(2009, 1, 4).unwrap();
        assert_eq!(days_since_genesis(day_one).unwrap(), 1);

        let mid_2025 = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        assert_eq!(days_since_genesis(mid_2025).unwrap(), 6023);
    }

    #[test]
    fn test_genesis_and_before_rejected() {
        assert!(days_since_genesis(genesis_date()).is_err());
        let before = NaiveDate::from_ymd_opt(2008, 10, 31).unwrap();
        assert!(matches!(
            days_since_genesis(before),
            Err(SimError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_round_trip_recovers_anchor_price() {
        for &(days, price, exponent) in &[
            (1_i64, 0.05, 5.6),
            (6023, 95_335.0, 5.6),
            (4000, 7_000.0, 4.2),
            (9000, 1.0e6, 6.1),
        ] {
            let coefficient = calibrate(days, price, exponent);
            let back = project_price(days, coefficient, exponent);
            assert!(((back - price) / price).abs() < 1e-12, "{} {} {}", days, price, exponent);
        }
    }

    #[test]
    fn test_reference_coefficient() {
        // 95 335 EUR on 2025-07-01 with exponent 5.6
        let anchor = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let model = PowerLaw::calibrated(anchor, 95_335.0, 5.6).unwrap();
        assert!((model.coefficient / 6.4908e-17 - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_price_grows_with_time() {
        let anchor = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let model = PowerLaw::calibrated(anchor, 95_335.0, 5.6).unwrap();
        let later = NaiveDate::from_ymd_opt(2030, 7, 1).unwrap();
        assert!(model.price_on(later).unwrap() > 95_335.0);
    }

    #[test]
    fn test_curve_sampling() {
        let anchor = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let model = PowerLaw::calibrated(anchor, 95_335.0, 5.6).unwrap();
        let points = model.curve(anchor, 7, 30).unwrap();

        // 0, 30, ..., 2550 (7 * 365 = 2555)
        assert_eq!(points.len(), 86);
        assert!((points[0].price_eur - 95_335.0).abs() < 1e-6);
        assert!(points.windows(2).all(|w| w[1].year > w[0].year));
    }
}
