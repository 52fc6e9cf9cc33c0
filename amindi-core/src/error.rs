use reqwest::StatusCode;
use thiserror::Error;

/// Why a single attempt against the upstream provider failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connection refused, reset, ...).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream responded with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to parse upstream JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A body that parsed but carries the provider's `error` object.
    #[error("upstream reported error {code}: {message}")]
    Upstream { code: i64, message: String },

    #[error("upstream response is missing `{0}`")]
    MissingField(&'static str),

    #[error("upstream `{field}` out of range: {value}")]
    OutOfRange { field: &'static str, value: String },
}

/// Errors that escape an aggregation run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("no locations to aggregate")]
    NoLocations,
}
