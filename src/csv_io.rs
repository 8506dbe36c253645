//! CSV series files
//!
//! Inputs are two-column files with a header row: an ISO date followed by a
//! value whose header varies by series (`MW`, `EH/s`, `price`, ...). Rows that
//! do not parse are skipped.

use chrono::NaiveDate;
use serde::Serialize;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

use crate::error::SimResult;
use crate::series::TimeSeries;

/// Read a `date,value` series from a file
pub fn read_series(path: &Path) -> SimResult<TimeSeries<f64>> {
    let file = std::fs::File::open(path)?;
    let series = read_series_from(file)?;
    debug!(path = %path.display(), rows = series.len(), "Loaded series");
    Ok(series)
}

/// Read a `date,value` series from any reader
pub fn read_series_from<R: Read>(reader: R) -> SimResult<TimeSeries<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut points = Vec::new();
    let mut skipped = 0usize;

    // Byte records so a row with invalid UTF-8 is skipped rather than fatal
    for record in reader.byte_records() {
        let record = record?;
        let field = |i: usize| record.get(i).and_then(|f| std::str::from_utf8(f).ok()).map(str::trim);
        let (Some(date), Some(value)) = (field(0), field(1)) else {
            skipped += 1;
            continue;
        };

        match (parse_date(date), value.parse::<f64>()) {
            (Some(date), Ok(value)) if value.is_finite() => points.push((date, value)),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(skipped, "Skipped unparsable rows");
    }

    Ok(TimeSeries::from_points(points))
}

/// Accept `YYYY-MM-DD`, tolerating a trailing time component
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Write a series as `date,<value_header>`
pub fn write_series(path: &Path, value_header: &str, series: &TimeSeries<f64>) -> SimResult<()> {
    let file = std::fs::File::create(path)?;
    write_series_to(file, value_header, series)
}

pub fn write_series_to<W: Write>(writer: W, value_header: &str, series: &TimeSeries<f64>) -> SimResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["date", value_header])?;
    for (date, value) in series.iter() {
        writer.write_record([date.to_string(), value.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write serializable records (daily or yearly results) with a header row
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> SimResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
