//! Sprint sync worker
//!
//! Recomputes a sprint's planned goal and per-day burned/unplanned effort from
//! the current tracker state.
//!
//! # Sync Flow
//!
//! 1. Render the sprint's version name from the team's scheme
//! 2. Search the tracker for the version's issues and load each one
//! 3. Compute the goal from all loaded issues
//! 4. Reset the day buckets, then add the effort of every resolved issue

use super::buckets::{is_in_sprint, select_bucket};
use super::diagnostics::{DiagnosticSink, SyncDiagnostic, TracingSink};
use super::effort::{effort_value, is_unplanned};
use super::template::format_version_name;
use super::tracker::IssueTracker;
use super::worklog::summarize_worklog;
use crate::config::{JiraConnection, TeamSync};
use crate::integrations::{JiraClient, JiraIssue};
use crate::model::{Sprint, SprintEffort};
use crate::{Result, SyncError};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of a sprint sync
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub sprint_id: String,

    /// Version name the issues were searched under
    pub version: String,

    /// Keys returned by the tracker search
    pub issues_found: usize,

    /// Issues actually loaded
    pub issues_fetched: usize,

    pub resolved_issues: usize,

    pub planned: f64,
    pub burned: f64,
    pub unplanned: f64,

    pub diagnostics: Vec<SyncDiagnostic>,
}

impl SyncReport {
    fn new(sprint_id: impl Into<String>) -> Self {
        Self {
            sprint_id: sprint_id.into(),
            ..Default::default()
        }
    }

    /// Number of issues listed by the search that could not be loaded
    pub fn issues_missing(&self) -> usize {
        self.issues_found.saturating_sub(self.issues_fetched)
    }
}

/// Synchronizes tracker issues into sprint day buckets
pub struct SprintSyncWorker<T> {
    tracker: T,
    sink: Arc<dyn DiagnosticSink>,
}

impl SprintSyncWorker<JiraClient> {
    /// Create a worker talking to JIRA
    pub fn connect(connection: &JiraConnection) -> Result<Self> {
        Ok(Self::new(JiraClient::new(connection)?))
    }
}

impl<T: IssueTracker> SprintSyncWorker<T> {
    pub fn new(tracker: T) -> Self {
        Self {
            tracker,
            sink: Arc::new(TracingSink),
        }
    }

    /// Send diagnostics to `sink` instead of the log
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// Replace the tracker used by subsequent syncs
    pub fn set_tracker(&mut self, tracker: T) {
        self.tracker = tracker;
    }

    /// Refresh `sprint.planned` and every day bucket from the tracker
    ///
    /// The sprint is reset and recomputed in full, so repeated syncs against
    /// the same tracker state give the same result. Issues that cannot be
    /// loaded or placed are reported as diagnostics; any other failure stops
    /// the sync and is returned as a [`SyncError`].
    pub async fn sync_sprint(
        &self,
        team: &TeamSync,
        sprint: &mut Sprint,
    ) -> std::result::Result<SyncReport, SyncError> {
        let mut report = SyncReport::new(&sprint.id);

        self.run(team, sprint, &mut report)
            .await
            .map_err(|e| SyncError::new(&sprint.id, e))?;

        info!(
            sprint = %sprint.id,
            team = %team.name,
            issues = report.issues_fetched,
            planned = report.planned,
            burned = report.burned,
            unplanned = report.unplanned,
            "Sprint synced"
        );

        Ok(report)
    }

    async fn run(&self, team: &TeamSync, sprint: &mut Sprint, report: &mut SyncReport) -> Result<()> {
        sprint.ensure_ascending()?;

        let version = format_version_name(&team.sprint_version_name_scheme, &sprint.id)?;
        report.version = version.clone();

        let issue_keys = self
            .tracker
            .find_issue_keys(&team.project_key, &version)
            .await?;
        report.issues_found = issue_keys.len();

        if issue_keys.is_empty() {
            self.record(
                report,
                SyncDiagnostic::EmptySprint {
                    sprint_id: sprint.id.clone(),
                    version,
                },
            );
        }

        let issues = self.fetch_issues(&issue_keys, report).await?;
        report.issues_fetched = issues.len();

        sprint.planned = calculate_sprint_goal(&issues, team, &sprint.efforts);

        reset_sprint_efforts(&mut sprint.efforts, team.unplanned);

        let mut record = |diagnostic: SyncDiagnostic| self.record(report, diagnostic);
        let mut resolved = 0;
        for issue in issues.iter().filter(|issue| issue.is_resolved()) {
            resolved += 1;
            calculate_effort(team, &sprint.id, &mut sprint.efforts, issue, &mut record);
        }

        report.resolved_issues = resolved;
        report.planned = sprint.planned;
        report.burned = sprint.total_burned();
        report.unplanned = sprint.total_unplanned();

        Ok(())
    }

    /// Load every issue in `keys`, in order, skipping ones the tracker does not have
    async fn fetch_issues(&self, keys: &[String], report: &mut SyncReport) -> Result<Vec<JiraIssue>> {
        let mut issues = Vec::with_capacity(keys.len());

        for key in keys {
            debug!(issue = %key, "Fetching issue");
            match self.tracker.get_issue(key).await? {
                Some(issue) => issues.push(issue),
                None => self.record(report, SyncDiagnostic::IssueMissing { issue: key.clone() }),
            }
        }

        Ok(issues)
    }

    fn record(&self, report: &mut SyncReport, diagnostic: SyncDiagnostic) {
        self.sink.emit(&diagnostic);
        report.diagnostics.push(diagnostic);
    }
}

/// Sprint goal: effort of every planned issue not resolved outside the sprint
///
/// Unresolved issues and issues without a resolution date count toward the goal.
pub fn calculate_sprint_goal(issues: &[JiraIssue], team: &TeamSync, efforts: &[SprintEffort]) -> f64 {
    issues
        .iter()
        .filter(|issue| !is_unplanned(team, issue))
        .filter(|issue| {
            issue
                .resolution_date()
                .map_or(true, |resolved| is_in_sprint(efforts, resolved.date_naive()))
        })
        .map(|issue| effort_value(team, issue))
        .sum()
}

/// Zero burned effort, and unplanned effort when the team tracks it
pub fn reset_sprint_efforts(efforts: &mut [SprintEffort], unplanned: bool) {
    for effort in efforts {
        effort.burned = 0.0;
        if unplanned {
            effort.unplanned = 0.0;
        }
    }
}

/// Add a resolved issue's effort to the sprint
///
/// Unplanned issues contribute their logged hours to the day each worklog
/// was started. Planned issues contribute their effort value to the day they
/// were resolved, provided that day lies within the sprint.
pub fn calculate_effort(
    team: &TeamSync,
    sprint_id: &str,
    efforts: &mut [SprintEffort],
    issue: &JiraIssue,
    record: &mut dyn FnMut(SyncDiagnostic),
) {
    if is_unplanned(team, issue) {
        for (day, hours) in summarize_worklog(issue) {
            update_sprint_effort(efforts, day, 0.0, hours as f64, sprint_id, &issue.key, record);
        }
        return;
    }

    let planned = effort_value(team, issue);

    let Some(resolved) = issue.resolution_date().map(|d| d.date_naive()) else {
        record(SyncDiagnostic::Unresolved {
            issue: issue.key.clone(),
            value: planned,
        });
        return;
    };

    if is_in_sprint(efforts, resolved) {
        update_sprint_effort(efforts, resolved, planned, 0.0, sprint_id, &issue.key, record);
    } else {
        record(SyncDiagnostic::ResolvedOutOfSprint {
            issue: issue.key.clone(),
            resolved,
            value: planned,
        });
    }
}

/// Add effort to the bucket selected for `day`
pub fn update_sprint_effort(
    efforts: &mut [SprintEffort],
    day: NaiveDate,
    planned: f64,
    unplanned: f64,
    sprint_id: &str,
    issue_key: &str,
    record: &mut dyn FnMut(SyncDiagnostic),
) {
    match select_bucket(efforts, day) {
        Some(idx) => {
            let bucket = &mut efforts[idx];
            bucket.burned += planned;
            bucket.unplanned += unplanned;
        }
        None => record(SyncDiagnostic::Unbucketable {
            issue: issue_key.to_string(),
            sprint_id: sprint_id.to_string(),
            date: day,
        }),
    }
}
