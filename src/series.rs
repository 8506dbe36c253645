//! Date-indexed series (price, hashrate, site power)

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ascending (date, value) pairs with no duplicate dates
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeSeries<T> {
    points: Vec<(NaiveDate, T)>,
}

impl<T: Copy> TimeSeries<T> {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Sort by date; on duplicate dates the later entry wins
    pub fn from_points(points: impl IntoIterator<Item = (NaiveDate, T)>) -> Self {
        let map: BTreeMap<NaiveDate, T> = points.into_iter().collect();
        Self {
            points: map.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<T> {
        self.points
            .binary_search_by_key(&date, |(d, _)| *d)
            .ok()
            .map(|idx| self.points[idx].1)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|(d, _)| *d)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|(d, _)| *d)
    }

    /// Inclusive date span covered by the series
    pub fn span(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.first_date()?, self.last_date()?))
    }

    pub fn iter(&self) -> impl Iterator<Item = &(NaiveDate, T)> {
        self.points.iter()
    }

    /// Entries on or after `date`
    pub fn since(&self, date: NaiveDate) -> Self {
        let start = self.points.partition_point(|(d, _)| *d < date);
        Self {
            points: self.points[start..].to_vec(),
        }
    }

    /// One entry per calendar day from the first date through `until`
    /// (or the last date), each gap carrying the previous value forward
    pub fn fill_forward(&self, until: Option<NaiveDate>) -> Self {
        let (Some(first), Some(last)) = (self.first_date(), self.last_date()) else {
            return Self::new();
        };
        let end = until.map_or(last, |u| u.max(last));

        let mut filled = Vec::with_capacity((end - first).num_days() as usize + 1);
        let mut source = self.points.iter().peekable();
        let mut current = self.points[0].1;
        let mut day = first;

        while day <= end {
            while let Some((d, v)) = source.peek() {
                if *d > day {
                    break;
                }
                current = *v;
                source.next();
            }
            filled.push((day, current));
            day += Duration::days(1);
        }

        Self { points: filled }
    }
}

impl TimeSeries<f64> {
    /// Arithmetic mean of all values
    pub fn mean(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.points.iter().map(|(_, v)| v).sum::<f64>() / self.points.len() as f64)
    }

    /// Mean value per calendar year present in the series
    pub fn yearly_averages(&self) -> BTreeMap<i32, f64> {
        let mut sums: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
        for (date, value) in &self.points {
            let entry = sums.entry(date.year()).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
        sums.into_iter()
            .map(|(year, (sum, count))| (year, sum / count as f64))
            .collect()
    }
}
