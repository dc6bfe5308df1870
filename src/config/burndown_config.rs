//! burndown-sync configuration file handling
//!
//! Loads and manages the ~/.config/burndown/config.yaml file holding the Jira
//! connection and the sync settings of every team.

use super::team_sync::TeamSync;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Jira connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JiraConnection {
    /// Jira instance URL
    pub url: String,

    /// Username for basic auth; absent or blank means anonymous access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Environment variable holding the basic-auth password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Environment variable holding a bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Retries for transient HTTP failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Client-wide request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    30
}

impl JiraConnection {
    /// Create an anonymous connection to a Jira instance
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password_env: None,
            token_env: None,
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Use basic auth with the password read from `password_env`
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password_env: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password_env = Some(password_env.into());
        self
    }

    /// Username, if one is configured and not blank
    pub fn login(&self) -> Option<&str> {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// burndown-sync configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurndownConfig {
    pub jira: JiraConnection,

    #[serde(default)]
    pub teams: Vec<TeamSync>,
}

impl BurndownConfig {
    /// Create a configuration without any teams
    pub fn new(jira: JiraConnection) -> Self {
        Self {
            jira,
            teams: Vec::new(),
        }
    }

    /// Sample configuration written by `burndown-sync init`
    pub fn sample() -> Self {
        let mut config = Self::new(
            JiraConnection::new("https://jira.example.com").with_credentials("jira-bot", "JIRA_PASSWORD"),
        );
        config.add_team(
            TeamSync::new("core", "CORE")
                .with_story_points("customfield_10002")
                .with_unplanned_flag("customfield_10100", "Unplanned"),
        );
        config
    }

    /// Load configuration from the default path (~/.config/burndown/config.yaml)
    pub fn load_default() -> Result<Self> {
        let path = Self::default_path();
        Self::load(&path)
    }

    /// Load configuration from a specific path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(crate::BurndownError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        tracing::info!(path = %path.display(), "Loading burndown configuration");

        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;

        tracing::debug!(
            teams = config.teams.len(),
            jira = %config.jira.url,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        tracing::info!(path = %path.display(), "Saving burndown configuration");

        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)?;

        Ok(())
    }

    /// Get the default config path (~/.config/burndown/config.yaml)
    pub fn default_path() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".config");
        path.push("burndown");
        path.push("config.yaml");
        path
    }

    /// Add a team
    pub fn add_team(&mut self, team: TeamSync) {
        self.teams.push(team);
    }

    /// Find a team by name
    pub fn team(&self, name: &str) -> Option<&TeamSync> {
        self.teams.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EffortMode;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.yaml");

        let config = BurndownConfig::sample();
        config.save(&path).unwrap();

        let loaded = BurndownConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        let team = loaded.team("core").expect("team should exist");
        assert_eq!(team.effort_mode, EffortMode::StoryPoints);
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = BurndownConfig::load(temp_dir.path().join("missing.yaml")).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn test_parse_yaml_with_defaults() {
        let yaml = r#"
jira:
  url: https://jira.example.com
teams:
  - name: core
    project_key: CORE
    sprint_version_name_scheme: "Sprint {0}"
    effort_mode: story_points
    story_points_field_id: customfield_10002
"#;
        let config: BurndownConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.jira.max_retries, 3);
        assert_eq!(config.jira.timeout_secs, 30);
        assert!(config.jira.login().is_none());
        assert!(config.team("core").is_some());
        assert!(config.team("web").is_none());
    }

    #[test]
    fn test_blank_username_is_anonymous() {
        let mut jira = JiraConnection::new("https://jira.example.com");
        jira.username = Some("   ".to_string());
        assert!(jira.login().is_none());

        jira.username = Some(" mark ".to_string());
        assert_eq!(jira.login(), Some("mark"));
    }
}
