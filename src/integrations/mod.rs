//! External Integrations
//!
//! Adapters for the issue trackers a sprint can be synced from.
//!
//! # Built-in Integrations
//!
//! - **JIRA**: REST API adapter implementing [`crate::sync::IssueTracker`]
//!
//! Every adapter retries transient HTTP failures through [`retry::with_retry`];
//! anything that still fails surfaces as a sync failure to the caller.

pub mod jira;
pub mod retry;

pub use jira::{
    sprint_jql, JiraClient, JiraFields, JiraIssue, JiraResolution, JiraWorklog, JiraWorklogPage,
};
pub use retry::{with_retry, RetryConfig, RetryDecision, RetryableError};
