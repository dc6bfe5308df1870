//! burndown-sync - Jira to burndown-chart sprint synchronization
//!
//! Pulls the issues assigned to a sprint's Jira version, classifies them as
//! planned or unplanned work and accumulates the effort burned on every day of
//! the sprint, together with the sprint's planned goal.
//!
//! # Architecture
//!
//! - **model**: Sprint and per-day effort buckets
//! - **config**: Jira connection and per-team sync settings
//! - **integrations**: Jira REST client and retry policy
//! - **sync**: The sync worker (goal, bucketing, worklog summaries, diagnostics)

pub mod config;
pub mod error;
pub mod integrations;
pub mod logging;
pub mod model;
pub mod sync;

// Re-exports
pub use error::{BurndownError, Result, SyncError};
