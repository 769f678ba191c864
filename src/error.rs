//! Error types for the reporting and replay paths.

use thiserror::Error;

/// Errors raised while writing a report to its sink.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode JSON report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while decoding a recorded result capture.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read results: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid record on line {line}: {source}")]
    InvalidRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {field} duration {value} on line {line}")]
    InvalidDuration {
        line: usize,
        field: &'static str,
        value: f64,
    },
}
