//! Error types for the simulation core

use chrono::NaiveDate;
use thiserror::Error;

/// Errors surfaced by the simulation core and its file/network adapters.
///
/// Data gaps inside a series are not represented here: every lookup has a
/// fallback and never fails a run.
#[derive(Debug, Error)]
pub enum SimError {
    /// Date precedes the genesis epoch, or a range is inverted
    #[error("Invalid date {date}: {reason}")]
    InvalidDate { date: NaiveDate, reason: String },

    /// A simulation parameter is outside its accepted range
    #[error("Invalid parameter '{parameter}': {reason}")]
    Configuration {
        parameter: &'static str,
        reason: String,
    },

    /// An external source kept failing after every retry
    #[error("Fetch from {source_name} failed after {attempts} attempts: {message}")]
    Fetch {
        source_name: String,
        attempts: u32,
        message: String,
    },

    /// The HTTP client could not be built, so no request was made
    #[error("HTTP client setup for {source_name} failed: {message}")]
    Client { source_name: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    pub fn config(parameter: &'static str, reason: impl Into<String>) -> Self {
        SimError::Configuration {
            parameter,
            reason: reason.into(),
        }
    }

    pub fn invalid_date(date: NaiveDate, reason: impl Into<String>) -> Self {
        SimError::InvalidDate {
            date,
            reason: reason.into(),
        }
    }
}

pub type SimResult<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_message_names_parameter() {
        let err = SimError::config("efficiency_j_per_th", "must be greater than 0, got 0");
        let msg = err.to_string();
        assert!(msg.contains("efficiency_j_per_th"));
        assert!(msg.contains("greater than 0"));
    }

    #[test]
    fn test_client_message_has_no_attempt_count() {
        let err = SimError::Client {
            source_name: "coingecko".to_string(),
            message: "no TLS backend".to_string(),
        };
        let msg = err.to_string();
        assert_eq!(msg, "HTTP client setup for coingecko failed: no TLS backend");
        assert!(!msg.contains("attempts"));
    }

    #[test]
    fn test_invalid_date_message() {
        let date = NaiveDate::from_ymd_opt(2008, 12, 31).unwrap();
        let err = SimError::invalid_date(date, "precedes genesis");
        assert_eq!(err.to_string(), "Invalid date 2008-12-31: precedes genesis");
    }
}
