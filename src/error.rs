//! Error types for burndown-sync
//!
//! Defines the crate error enum covering every failure mode of a sync, plus the
//! single [`SyncError`] wrapper surfaced to callers of a sprint sync.
//! Uses thiserror for ergonomic error handling.

use thiserror::Error;

/// Result type alias for burndown-sync operations
pub type Result<T> = std::result::Result<T, BurndownError>;

/// Comprehensive error type for burndown-sync operations
#[derive(Error, Debug)]
pub enum BurndownError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed sprint version name scheme
    #[error("Template error: {0}")]
    Template(String),

    /// Sprint model violates a precondition (e.g. unordered day buckets)
    #[error("Invalid sprint: {0}")]
    InvalidSprint(String),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Tracker integration errors (unexpected HTTP status, bad payload)
    #[error("Integration error: {0}")]
    Integration(String),

    /// Rate limited (retry-after duration in seconds)
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

/// Failure of a whole sprint synchronization.
///
/// Carries the sprint being synced and the error that stopped the sync.
/// Per-issue anomalies never produce this; they are reported as
/// [`crate::sync::SyncDiagnostic`]s instead.
#[derive(Error, Debug)]
#[error("Failed to sync sprint {sprint_id}: {source}")]
pub struct SyncError {
    pub sprint_id: String,
    #[source]
    pub source: BurndownError,
}

impl SyncError {
    pub fn new(sprint_id: impl Into<String>, source: BurndownError) -> Self {
        Self {
            sprint_id: sprint_id.into(),
            source,
        }
    }
}

impl crate::integrations::retry::RetryableError for BurndownError {
    fn retry_decision(&self) -> crate::integrations::retry::RetryDecision {
        use crate::integrations::retry::RetryDecision;
        use std::time::Duration;

        match self {
            BurndownError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    RetryDecision::Retry
                } else if let Some(status) = e.status() {
                    match status.as_u16() {
                        429 => RetryDecision::RetryAfter(Duration::from_secs(60)),
                        500..=599 => RetryDecision::Retry,
                        _ => RetryDecision::NoRetry,
                    }
                } else if e.is_decode() {
                    RetryDecision::NoRetry
                } else {
                    RetryDecision::Retry
                }
            }
            BurndownError::RateLimited(secs) => {
                RetryDecision::RetryAfter(Duration::from_secs(*secs))
            }
            BurndownError::Integration(msg) => {
                if msg.contains("HTTP 5") {
                    RetryDecision::Retry
                } else {
                    RetryDecision::NoRetry
                }
            }
            BurndownError::Config(_)
            | BurndownError::Template(_)
            | BurndownError::InvalidSprint(_)
            | BurndownError::Auth(_)
            | BurndownError::Json(_)
            | BurndownError::Yaml(_)
            | BurndownError::Io(_)
            | BurndownError::Other(_) => RetryDecision::NoRetry,
        }
    }
}
