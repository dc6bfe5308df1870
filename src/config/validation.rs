//! Configuration validation
//!
//! Validates burndown configuration for correctness:
//! - At least one team, no duplicate team names
//! - Valid Jira URL
//! - Version name schemes that format cleanly
//! - Field ids required by the chosen effort mode and unplanned tracking

use super::burndown_config::{BurndownConfig, JiraConnection};
use super::team_sync::{EffortMode, TeamSync};
use crate::sync::format_version_name;
use crate::BurndownError;
use std::collections::HashSet;

/// Validation error details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub team: Option<String>,
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            team: None,
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(ref team) = self.team {
            write!(f, "[{}] {}: {}", team, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// Validation result
pub type ValidationResult = std::result::Result<(), Vec<ValidationError>>;

/// Validate a burndown configuration
pub fn validate_config(config: &BurndownConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if let Err(mut jira_errors) = validate_jira(&config.jira) {
        errors.append(&mut jira_errors);
    }

    if config.teams.is_empty() {
        errors.push(ValidationError::new(
            "teams",
            "At least one team must be defined",
        ));
    }

    let mut seen_names = HashSet::new();
    for team in &config.teams {
        if !seen_names.insert(&team.name) {
            errors.push(ValidationError::new(
                "teams",
                format!("Duplicate team name: {}", team.name),
            ));
        }
    }

    for team in &config.teams {
        if let Err(mut team_errors) = validate_team(team) {
            errors.append(&mut team_errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_jira(jira: &JiraConnection) -> ValidationResult {
    let mut errors = Vec::new();

    if !jira.url.starts_with("http://") && !jira.url.starts_with("https://") {
        errors.push(ValidationError::new(
            "jira.url",
            format!("Invalid URL '{}': must start with http:// or https://", jira.url),
        ));
    }

    if jira.login().is_some() && jira.password_env.is_none() {
        errors.push(ValidationError::new(
            "jira.password_env",
            "A password environment variable is required when a username is set",
        ));
    }

    if jira.timeout_secs == 0 {
        errors.push(ValidationError::new(
            "jira.timeout_secs",
            "Timeout must be greater than 0",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a single team
pub fn validate_team(team: &TeamSync) -> ValidationResult {
    let mut errors = Vec::new();

    if team.name.trim().is_empty() {
        errors.push(ValidationError::new("name", "Team name cannot be empty"));
    }

    if team.project_key.trim().is_empty() {
        errors.push(
            ValidationError::new("project_key", "Project key cannot be empty").with_team(&team.name),
        );
    }

    if let Err(e) = format_version_name(&team.sprint_version_name_scheme, "1") {
        errors.push(
            ValidationError::new("sprint_version_name_scheme", e.to_string()).with_team(&team.name),
        );
    }

    if team.effort_mode == EffortMode::StoryPoints && is_blank(&team.story_points_field_id) {
        errors.push(
            ValidationError::new(
                "story_points_field_id",
                "Required when effort_mode is story_points",
            )
            .with_team(&team.name),
        );
    }

    if team.unplanned {
        if is_blank(&team.unplanned_flag_field_id) {
            errors.push(
                ValidationError::new(
                    "unplanned_flag_field_id",
                    "Required when unplanned tracking is enabled",
                )
                .with_team(&team.name),
            );
        }
        if is_blank(&team.unplanned_flag_name) {
            errors.push(
                ValidationError::new(
                    "unplanned_flag_name",
                    "Required when unplanned tracking is enabled",
                )
                .with_team(&team.name),
            );
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or_default().is_empty()
}

/// Validate and convert problems into a single configuration error
pub fn validate_config_result(config: &BurndownConfig) -> crate::Result<()> {
    validate_config(config).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        BurndownError::Config(format!(
            "Configuration validation failed:\n  {}",
            messages.join("\n  ")
        ))
    })
}
