//! Sample site power profile

use chrono::{Duration, NaiveDate};
use rand::Rng;

use crate::series::TimeSeries;

pub const SAMPLE_MIN_MW: f64 = 80.0;
pub const SAMPLE_MAX_MW: f64 = 120.0;

/// One whole-MW reading per day in `[start, end]`, uniform in 80-120 MW
pub fn generate_power_series<R: Rng>(start: NaiveDate, end: NaiveDate, rng: &mut R) -> TimeSeries<f64> {
    let mut points = Vec::new();
    let mut day = start;
    while day <= end {
        let mw: f64 = rng.gen_range(SAMPLE_MIN_MW..SAMPLE_MAX_MW);
        points.push((day, mw.round()));
        day += Duration::days(1);
    }
    TimeSeries::from_points(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sample_covers_range_within_bounds() {
        let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2018, 12, 31).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let series = generate_power_series(start, end, &mut rng);
        assert_eq!(series.len(), 365);
        assert_eq!(series.span(), Some((start, end)));
        assert!(series
            .iter()
            .all(|(_, mw)| (SAMPLE_MIN_MW..=SAMPLE_MAX_MW).contains(mw) && mw.fract() == 0.0));
    }

    #[test]
    fn test_sample_is_seed_deterministic() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let a = generate_power_series(start, end, &mut StdRng::seed_from_u64(42));
        let b = generate_power_series(start, end, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = generate_power_series(start, end, &mut StdRng::seed_from_u64(1));
        assert!(series.is_empty());
    }
}
