//! Issue tracker seam
//!
//! The sync worker only needs two queries from a tracker. Authentication and
//! transport live in the implementation (see [`crate::integrations::JiraClient`]).

use crate::integrations::JiraIssue;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Keys of every issue in `project_key` scheduled for `version`
    async fn find_issue_keys(&self, project_key: &str, version: &str) -> Result<Vec<String>>;

    /// Full issue record, `Ok(None)` if the tracker has no such issue
    async fn get_issue(&self, key: &str) -> Result<Option<JiraIssue>>;
}
