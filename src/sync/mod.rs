//! Sprint synchronization
//!
//! Turns the issues of a sprint's tracker version into burndown data:
//!
//! - **tracker**: the two queries a tracker must answer
//! - **template**: version names rendered from a team's scheme
//! - **effort**: planned/unplanned classification and effort values
//! - **buckets**: mapping calendar days onto sprint day buckets
//! - **worklog**: per-day hour totals of logged work
//! - **diagnostics**: per-issue anomalies that never abort a sync
//! - **worker**: the sync itself

pub mod buckets;
pub mod diagnostics;
pub mod effort;
mod template;
mod tracker;
pub mod worker;
pub mod worklog;

pub use buckets::{is_in_sprint, select_bucket};
pub use diagnostics::{DiagnosticSink, MemorySink, SyncDiagnostic, TracingSink};
pub use effort::{effort_value, is_unplanned};
pub use template::format_version_name;
pub use tracker::IssueTracker;
pub use worker::{SprintSyncWorker, SyncReport};
pub use worklog::summarize_worklog;
