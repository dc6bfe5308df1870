//! Configuration system
//!
//! Loads ~/.config/burndown/config.yaml with support for:
//! - A Jira connection (anonymous, basic auth or bearer token)
//! - Per-team sync settings (project, version scheme, effort mode, unplanned flag)

mod burndown_config;
mod team_sync;
pub mod validation;

pub use burndown_config::{BurndownConfig, JiraConnection};
pub use team_sync::{EffortMode, TeamSync};
pub use validation::{validate_config, validate_config_result, validate_team, ValidationError};
