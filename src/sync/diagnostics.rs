//! Per-issue sync anomalies
//!
//! Anomalies that affect a single issue never abort a sync. They are
//! collected in the [`crate::sync::SyncReport`] and forwarded to a
//! [`DiagnosticSink`] as they happen.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncDiagnostic {
    /// The tracker returned no issues for the sprint's version
    EmptySprint { sprint_id: String, version: String },

    /// A key listed by the search could not be loaded
    IssueMissing { issue: String },

    /// Resolved issue without a resolution date; its effort is not burned
    Unresolved { issue: String, value: f64 },

    /// Planned issue resolved before the first or after the last sprint day
    ResolvedOutOfSprint {
        issue: String,
        resolved: NaiveDate,
        value: f64,
    },

    /// No day bucket exists to receive the effort
    Unbucketable {
        issue: String,
        sprint_id: String,
        date: NaiveDate,
    },
}

impl fmt::Display for SyncDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncDiagnostic::EmptySprint { sprint_id, version } => {
                write!(f, "No issues found for sprint {} (version {})", sprint_id, version)
            }
            SyncDiagnostic::IssueMissing { issue } => {
                write!(f, "Issue {} could not be loaded", issue)
            }
            SyncDiagnostic::Unresolved { issue, value } => {
                write!(f, "Issue {} unresolved (value: {})", issue, value)
            }
            SyncDiagnostic::ResolvedOutOfSprint {
                issue,
                resolved,
                value,
            } => write!(
                f,
                "Issue {} resolved out of sprint ({}, value: {})",
                issue, resolved, value
            ),
            SyncDiagnostic::Unbucketable {
                issue,
                sprint_id,
                date,
            } => write!(
                f,
                "Cannot add effort of issue {} to sprint {} for {}: date is out of range",
                issue, sprint_id, date
            ),
        }
    }
}

/// Receiver for sync diagnostics
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: &SyncDiagnostic);
}

/// Forwards diagnostics to `tracing` at info level
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, diagnostic: &SyncDiagnostic) {
        tracing::info!(diagnostic = ?diagnostic, "{}", diagnostic);
    }
}

/// Keeps diagnostics in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<SyncDiagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics received so far
    pub fn entries(&self) -> Vec<SyncDiagnostic> {
        self.lock().clone()
    }

    // Entries already pushed stay valid after a panicking holder
    fn lock(&self) -> MutexGuard<'_, Vec<SyncDiagnostic>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, diagnostic: &SyncDiagnostic) {
        self.lock().push(diagnostic.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let out_of_sprint = SyncDiagnostic::ResolvedOutOfSprint {
            issue: "CORE-3".to_string(),
            resolved: NaiveDate::from_ymd_opt(2012, 4, 20).unwrap(),
            value: 5.0,
        };
        assert_eq!(
            out_of_sprint.to_string(),
            "Issue CORE-3 resolved out of sprint (2012-04-20, value: 5)"
        );

        let empty = SyncDiagnostic::EmptySprint {
            sprint_id: "12".to_string(),
            version: "Sprint 12".to_string(),
        };
        assert!(empty.to_string().contains("No issues found for sprint 12"));
    }

    #[test]
    fn test_memory_sink_collects() {
        let sink = MemorySink::new();
        sink.emit(&SyncDiagnostic::IssueMissing {
            issue: "CORE-1".to_string(),
        });
        TracingSink.emit(&SyncDiagnostic::IssueMissing {
            issue: "CORE-2".to_string(),
        });

        assert_eq!(sink.entries().len(), 1);
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let json = serde_json::to_value(SyncDiagnostic::IssueMissing {
            issue: "CORE-1".to_string(),
        })
        .unwrap();
        assert_eq!(json["kind"], "issue_missing");
        assert_eq!(json["issue"], "CORE-1");
    }

    #[test]
    fn test_memory_sink_survives_poisoned_lock() {
        let sink = std::sync::Arc::new(MemorySink::new());
        sink.emit(&SyncDiagnostic::IssueMissing {
            issue: "CORE-1".to_string(),
        });

        let poisoner = std::sync::Arc::clone(&sink);
        let result = std::thread::spawn(move || {
            let _guard = poisoner.entries.lock().unwrap();
            panic!("holder panicked");
        })
        .join();
        assert!(result.is_err());
        assert!(sink.entries.is_poisoned());

        sink.emit(&SyncDiagnostic::IssueMissing {
            issue: "CORE-2".to_string(),
        });

        assert_eq!(sink.entries().len(), 2);
    }
}
