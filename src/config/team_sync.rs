//! Per-team sync settings
//!
//! Describes how a team's sprints map onto Jira: which project and version to
//! query, how effort is measured, and how unplanned work is flagged.

use serde::{Deserialize, Serialize};

/// How the effort of a single issue is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffortMode {
    /// Original time estimate, in hours
    #[default]
    TimeEstimate,

    /// Story points from a custom field
    StoryPoints,
}

impl std::fmt::Display for EffortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EffortMode::TimeEstimate => write!(f, "time_estimate"),
            EffortMode::StoryPoints => write!(f, "story_points"),
        }
    }
}

/// Sync configuration for one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSync {
    /// Team name (used to select the team on the command line)
    pub name: String,

    /// Jira project key
    pub project_key: String,

    /// Version name for a sprint; `{0}` is replaced by the sprint id
    #[serde(default = "default_version_name_scheme")]
    pub sprint_version_name_scheme: String,

    #[serde(default)]
    pub effort_mode: EffortMode,

    /// Custom field holding story points (e.g. "customfield_10002")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story_points_field_id: Option<String>,

    /// Track unplanned work separately
    #[serde(default)]
    pub unplanned: bool,

    /// Custom field carrying the unplanned flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unplanned_flag_field_id: Option<String>,

    /// Value of the flag field marking an issue as unplanned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unplanned_flag_name: Option<String>,
}

fn default_version_name_scheme() -> String {
    "Sprint {0}".to_string()
}

impl TeamSync {
    /// Create a team sync with time-estimate effort and no unplanned tracking
    pub fn new(name: impl Into<String>, project_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project_key: project_key.into(),
            sprint_version_name_scheme: default_version_name_scheme(),
            effort_mode: EffortMode::TimeEstimate,
            story_points_field_id: None,
            unplanned: false,
            unplanned_flag_field_id: None,
            unplanned_flag_name: None,
        }
    }

    /// Set the version name scheme
    pub fn with_version_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.sprint_version_name_scheme = scheme.into();
        self
    }

    /// Measure effort in story points read from `field_id`
    pub fn with_story_points(mut self, field_id: impl Into<String>) -> Self {
        self.effort_mode = EffortMode::StoryPoints;
        self.story_points_field_id = Some(field_id.into());
        self
    }

    /// Track unplanned work flagged by `field_id` holding `flag_name`
    pub fn with_unplanned_flag(
        mut self,
        field_id: impl Into<String>,
        flag_name: impl Into<String>,
    ) -> Self {
        self.unplanned = true;
        self.unplanned_flag_field_id = Some(field_id.into());
        self.unplanned_flag_name = Some(flag_name.into());
        self
    }
}
