//! Analytics error taxonomy
//!
//! Hard failures abort the requested computation. Soft conditions (a
//! deviation against a zero fair value, toxicity before the window fills)
//! are not errors; they travel as [`crate::series::DerivedValue::Undefined`].

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised by the analytics core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalyticsError {
    /// Reconciliation left too few usable rows
    #[error(
        "Insufficient data: {dense_rows} dense rows after reconciliation (empty series: {empty_series:?})"
    )]
    InsufficientData {
        /// Series that loaded zero usable points
        empty_series: Vec<String>,
        /// Rows remaining after fills and row-wise drop
        dense_rows: usize,
    },

    /// Regression training window holds too few rows
    #[error(
        "Insufficient training data: {rows} rows since {training_start} (need at least {required})"
    )]
    InsufficientTrainingData {
        training_start: DateTime<Utc>,
        rows: usize,
        required: usize,
    },

    /// Regressor has no variance over the training window
    #[error("Degenerate training data: column {column} is constant since {training_start}")]
    DegenerateTrainingData {
        column: String,
        training_start: DateTime<Utc>,
    },

    /// Non-positive bucket volume, zero window, malformed bound
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Series constructed with a repeated instant
    #[error("Duplicate instant {instant} in series {series}")]
    DuplicateInstant {
        series: String,
        instant: DateTime<Utc>,
    },

    /// Formula or model references a column the panel does not carry
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Metric has no value at a panel row and cannot join the panel
    #[error("Metric {metric} is undefined at {instant}")]
    UndefinedMetric {
        metric: String,
        instant: DateTime<Utc>,
    },
}

/// Result alias for analytics operations
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Errors raised while loading snapshot files
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Snapshot not found: {}", path.display())]
    SnapshotNotFound { path: std::path::PathBuf },

    /// Column missing or of the wrong Arrow type
    #[error("Invalid {column} column in snapshot {id}")]
    InvalidColumn { id: String, column: &'static str },

    /// Cell that does not parse as a decimal or timestamp
    #[error("Invalid {column} value {value:?} in snapshot {id}")]
    InvalidValue {
        id: String,
        column: &'static str,
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_names_series() {
        let err = AnalyticsError::InsufficientData {
            empty_series: vec!["overnight_facility".to_string()],
            dense_rows: 0,
        };
        let msg = err.to_string();
        assert!(msg.contains("overnight_facility"));
        assert!(msg.contains("0 dense rows"));
    }

    #[test]
    fn test_data_error_names_column() {
        let err = DataError::InvalidValue {
            id: "WALCL".into(),
            column: "value",
            value: "n/a".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value value \"n/a\" in snapshot WALCL"
        );
    }

    #[test]
    fn test_invalid_parameter_message() {
        let err = AnalyticsError::InvalidParameter("bucket_volume must be positive".into());
        assert_eq!(
            err.to_string(),
            "Invalid parameter: bucket_volume must be positive"
        );
    }
}
