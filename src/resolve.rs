//! Per-series value resolvers
//!
//! Each resolver walks a fixed priority list (recorded entry, then derived
//! fallback, then constant) and always yields a value, tagged with the rung
//! that produced it.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::SimResult;
use crate::power_law::PowerLaw;
use crate::series::TimeSeries;

/// Which rung of a resolver's priority list produced a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Entry for that exact date
    Recorded,
    /// Mean of the series over that calendar year
    YearlyAverage,
    /// Mean of the whole series, or a configured average
    Average,
    /// Power-law price projection
    Model,
    /// Baseline hashrate compounded by the growth rate
    Growth,
    /// Fixed fallback constant
    Constant,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub value: f64,
    pub source: Source,
}

impl Resolved {
    fn new(value: f64, source: Source) -> Self {
        Self { value, source }
    }
}

/// Price: recorded close, else power-law projection
pub struct PriceResolver<'a> {
    history: Option<&'a TimeSeries<f64>>,
    model: PowerLaw,
}

impl<'a> PriceResolver<'a> {
    pub fn historical(history: &'a TimeSeries<f64>, model: PowerLaw) -> Self {
        Self {
            history: Some(history),
            model,
        }
    }

    pub fn projection(model: PowerLaw) -> Self {
        Self {
            history: None,
            model,
        }
    }

    pub fn resolve(&self, date: NaiveDate) -> SimResult<Resolved> {
        if let Some(price) = self.history.and_then(|h| h.get(date)) {
            return Ok(Resolved::new(price, Source::Recorded));
        }
        Ok(Resolved::new(self.model.price_on(date)?, Source::Model))
    }
}

/// Site power: recorded MW, else the average
pub struct PowerResolver<'a> {
    series: Option<&'a TimeSeries<f64>>,
    average_mw: f64,
}

impl<'a> PowerResolver<'a> {
    pub fn historical(series: &'a TimeSeries<f64>, average_mw: f64) -> Self {
        Self {
            series: Some(series),
            average_mw,
        }
    }

    pub fn constant(average_mw: f64) -> Self {
        Self {
            series: None,
            average_mw,
        }
    }

    pub fn resolve(&self, date: NaiveDate) -> Resolved {
        match self.series.and_then(|s| s.get(date)) {
            Some(mw) => Resolved::new(mw, Source::Recorded),
            None => Resolved::new(self.average_mw, Source::Average),
        }
    }
}

/// Network hashrate in EH/s
pub enum NetworkHashResolver<'a> {
    /// Recorded entry, else that year's mean, else a constant
    Historical {
        series: &'a TimeSeries<f64>,
        yearly: BTreeMap<i32, f64>,
        fallback_ehs: f64,
    },
    /// `base_ehs * growth^(year - base_year)`
    Projection {
        base_ehs: f64,
        growth_rate: f64,
        base_year: i32,
    },
}

impl<'a> NetworkHashResolver<'a> {
    pub fn historical(series: &'a TimeSeries<f64>, fallback_ehs: f64) -> Self {
        NetworkHashResolver::Historical {
            series,
            yearly: series.yearly_averages(),
            fallback_ehs,
        }
    }

    pub fn projection(base_ehs: f64, growth_rate: f64, base_year: i32) -> Self {
        NetworkHashResolver::Projection {
            base_ehs,
            growth_rate,
            base_year,
        }
    }

    pub fn resolve(&self, date: NaiveDate) -> Resolved {
        match self {
            NetworkHashResolver::Historical {
                series,
                yearly,
                fallback_ehs,
            } => {
                if let Some(ehs) = series.get(date) {
                    Resolved::new(ehs, Source::Recorded)
                } else if let Some(avg) = yearly.get(&date.year()) {
                    Resolved::new(*avg, Source::YearlyAverage)
                } else {
                    Resolved::new(*fallback_ehs, Source::Constant)
                }
            }
            NetworkHashResolver::Projection {
                base_ehs,
                growth_rate,
                base_year,
            } => {
                let years = date.year() - base_year;
                Resolved::new(base_ehs * growth_rate.powi(years), Source::Growth)
            }
        }
    }
}

/// Count of lookups answered by each rung, per series
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolutionStats {
    pub price: BTreeMap<Source, usize>,
    pub power: BTreeMap<Source, usize>,
    pub network: BTreeMap<Source, usize>,
}

impl ResolutionStats {
    pub fn record(counts: &mut BTreeMap<Source, usize>, source: Source) {
        *counts.entry(source).or_insert(0) += 1;
    }

    /// Lookups that did not find a recorded entry
    pub fn gaps(counts: &BTreeMap<Source, usize>) -> usize {
        counts
            .iter()
            .filter(|(source, _)| **source != Source::Recorded)
            .map(|(_, n)| n)
            .sum()
    }
}
