//! JIRA REST adapter
//!
//! Reads sprint issues from JIRA: JQL search by project and fix version, and
//! single-issue fetches including resolution, estimates, worklogs and custom
//! fields.

use crate::config::JiraConnection;
use crate::integrations::retry::{with_retry, RetryConfig};
use crate::sync::IssueTracker;
use crate::{BurndownError, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};

/// Per-request timeout for search operations (large result sets)
const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);
/// Per-request timeout for single issue fetches
const GET_TIMEOUT: Duration = Duration::from_secs(10);
/// Page size for JQL searches
const SEARCH_PAGE_SIZE: u32 = 100;
/// Page size for worklog reloads
const WORKLOG_PAGE_SIZE: u32 = 1000;

/// JIRA issue representation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssue {
    pub key: String,
    #[serde(default)]
    pub id: Option<String>,
    pub fields: JiraFields,
}

/// JIRA issue fields
///
/// Fields the sync does not model explicitly (custom fields in particular)
/// are kept in `custom`, keyed by field id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraFields {
    #[serde(default)]
    pub resolution: Option<JiraResolution>,
    #[serde(default, with = "jira_time::option")]
    pub resolutiondate: Option<DateTime<FixedOffset>>,
    /// Original estimate in seconds
    #[serde(default)]
    pub timeoriginalestimate: Option<i64>,
    #[serde(default)]
    pub worklog: Option<JiraWorklogPage>,
    #[serde(flatten)]
    pub custom: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraResolution {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
}

/// Worklog block embedded in an issue (or returned by the worklog endpoint)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JiraWorklogPage {
    #[serde(rename = "startAt", default)]
    pub start_at: u32,
    #[serde(rename = "maxResults", default)]
    pub max_results: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub worklogs: Vec<JiraWorklog>,
}

impl JiraWorklogPage {
    /// Whether the issue carries more worklogs than were embedded
    pub fn is_truncated(&self) -> bool {
        (self.worklogs.len() as u32) < self.total
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraWorklog {
    #[serde(with = "jira_time")]
    pub started: DateTime<FixedOffset>,
    #[serde(rename = "timeSpentSeconds", default)]
    pub time_spent_seconds: i64,
}

impl JiraWorklog {
    pub fn minutes_spent(&self) -> i64 {
        self.time_spent_seconds / 60
    }
}

#[derive(Debug, Clone, Deserialize)]
struct JiraSearchResponse {
    #[serde(default)]
    total: u32,
    #[serde(default)]
    issues: Vec<JiraIssueRef>,
}

#[derive(Debug, Clone, Deserialize)]
struct JiraIssueRef {
    key: String,
}

impl JiraIssue {
    /// Create an issue with no fields set
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            id: None,
            fields: JiraFields::default(),
        }
    }

    /// Whether the issue carries a resolution (resolved or closed)
    pub fn is_resolved(&self) -> bool {
        self.fields.resolution.is_some()
    }

    pub fn resolution_date(&self) -> Option<DateTime<FixedOffset>> {
        self.fields.resolutiondate
    }

    pub fn original_estimate_seconds(&self) -> Option<i64> {
        self.fields.timeoriginalestimate
    }

    /// Value of a custom (or otherwise unmodelled) field; JSON null reads as absent
    pub fn custom_field(&self, field_id: &str) -> Option<&serde_json::Value> {
        self.fields.custom.get(field_id).filter(|v| !v.is_null())
    }

    pub fn worklogs(&self) -> &[JiraWorklog] {
        self.fields
            .worklog
            .as_ref()
            .map(|page| page.worklogs.as_slice())
            .unwrap_or_default()
    }
}

/// Authentication applied to every request
#[derive(Debug, Clone)]
enum JiraAuth {
    Anonymous,
    Basic {
        username: String,
        password: Option<String>,
    },
    Bearer(String),
}

/// JIRA API client used by the sprint sync
pub struct JiraClient {
    client: Client,
    base_url: String,
    auth: JiraAuth,
    retry: RetryConfig,
}

/// JQL selecting every issue of a project scheduled for a fix version
pub fn sprint_jql(project_key: &str, version: &str) -> String {
    format!(
        "project = \"{}\" AND fixVersion = \"{}\"",
        escape_jql(project_key),
        escape_jql(version)
    )
}

fn escape_jql(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl JiraClient {
    /// Create a client for a JIRA connection
    ///
    /// A non-blank username selects basic auth (password read from
    /// `password_env`); otherwise a bearer token from `token_env` is used if
    /// present, and the client is anonymous if neither is configured.
    pub fn new(connection: &JiraConnection) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(connection.timeout_secs))
            .build()?;

        let base_url = format!("{}/rest/api/2", connection.url.trim_end_matches('/'));

        let auth = if let Some(username) = connection.login() {
            JiraAuth::Basic {
                username: username.to_string(),
                password: read_env(connection.password_env.as_deref()),
            }
        } else if let Some(token) = read_env(connection.token_env.as_deref()) {
            JiraAuth::Bearer(token)
        } else {
            JiraAuth::Anonymous
        };

        Ok(Self {
            client,
            base_url,
            auth,
            retry: RetryConfig::with_max_retries(connection.max_retries),
        })
    }

    /// Override the retry policy
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = JiraAuth::Basic {
            username: username.into(),
            password: Some(password.into()),
        };
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth = JiraAuth::Bearer(token.into());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self.auth, JiraAuth::Anonymous)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            JiraAuth::Anonymous => request,
            JiraAuth::Basic { username, password } => request.basic_auth(username, password.as_ref()),
            JiraAuth::Bearer(token) => request.bearer_auth(token),
        }
    }

    /// Keys of every issue matching a JQL query, following pagination
    pub async fn search_keys(&self, jql: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut start_at = 0u32;

        loop {
            let page = with_retry(&self.retry, "jira.search", || self.search_page(jql, start_at)).await?;
            let returned = page.issues.len() as u32;
            keys.extend(page.issues.into_iter().map(|issue| issue.key));

            if returned == 0 || start_at + returned >= page.total {
                break;
            }
            start_at += returned;
        }

        info!(jql = %jql, total = keys.len(), "JIRA search complete");
        Ok(keys)
    }

    async fn search_page(&self, jql: &str, start_at: u32) -> Result<JiraSearchResponse> {
        let url = format!("{}/search", self.base_url);

        let params = [
            ("jql", jql.to_string()),
            ("startAt", start_at.to_string()),
            ("maxResults", SEARCH_PAGE_SIZE.to_string()),
            ("fields", "key".to_string()),
        ];

        debug!(jql = %jql, start_at, "Searching JIRA issues");

        let response = self
            .authorize(self.client.get(&url).query(&params))
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            _ => Err(error_for_response(response, "searching issues").await),
        }
    }

    /// Fetch a single issue; `Ok(None)` when JIRA has no such issue
    pub async fn fetch_issue(&self, key: &str) -> Result<Option<JiraIssue>> {
        let issue = with_retry(&self.retry, "jira.issue", || self.fetch_issue_once(key)).await?;

        let Some(mut issue) = issue else {
            return Ok(None);
        };

        let truncated = issue
            .fields
            .worklog
            .as_ref()
            .is_some_and(JiraWorklogPage::is_truncated);
        if truncated {
            let page = self.fetch_worklog(key).await?;
            debug!(key = %key, worklogs = page.worklogs.len(), "Loaded complete worklog");
            issue.fields.worklog = Some(page);
        }

        Ok(Some(issue))
    }

    async fn fetch_issue_once(&self, key: &str) -> Result<Option<JiraIssue>> {
        let url = format!("{}/issue/{}", self.base_url, key);

        debug!(key = %key, "Fetching JIRA issue");

        let response = self
            .authorize(self.client.get(&url))
            .timeout(GET_TIMEOUT)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(error_for_response(response, &format!("fetching issue {}", key)).await),
        }
    }

    /// Every worklog entry of an issue, following pagination
    async fn fetch_worklog(&self, key: &str) -> Result<JiraWorklogPage> {
        let mut worklogs = Vec::new();
        let mut start_at = 0u32;
        let mut total;

        loop {
            let page = with_retry(&self.retry, "jira.worklog", || self.worklog_page(key, start_at)).await?;
            let returned = page.worklogs.len() as u32;
            total = page.total;
            worklogs.extend(page.worklogs);

            if returned == 0 || start_at + returned >= total {
                break;
            }
            start_at += returned;
        }

        if (worklogs.len() as u32) < total {
            debug!(key = %key, loaded = worklogs.len(), total, "JIRA returned fewer worklogs than reported");
        }

        Ok(JiraWorklogPage {
            start_at: 0,
            max_results: worklogs.len() as u32,
            total,
            worklogs,
        })
    }

    async fn worklog_page(&self, key: &str, start_at: u32) -> Result<JiraWorklogPage> {
        let url = format!("{}/issue/{}/worklog", self.base_url, key);

        let params = [
            ("startAt", start_at.to_string()),
            ("maxResults", WORKLOG_PAGE_SIZE.to_string()),
        ];

        debug!(key = %key, start_at, "Fetching JIRA worklog");

        let response = self
            .authorize(self.client.get(&url).query(&params))
            .timeout(GET_TIMEOUT)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            _ => Err(error_for_response(response, &format!("fetching worklog of {}", key)).await),
        }
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn find_issue_keys(&self, project_key: &str, version: &str) -> Result<Vec<String>> {
        self.search_keys(&sprint_jql(project_key, version)).await
    }

    async fn get_issue(&self, key: &str) -> Result<Option<JiraIssue>> {
        self.fetch_issue(key).await
    }
}

fn read_env(var: Option<&str>) -> Option<String> {
    var.and_then(|name| std::env::var(name.trim_start_matches('$')).ok())
}

async fn error_for_response(response: Response, action: &str) -> BurndownError {
    match response.status() {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            BurndownError::Auth(format!("JIRA authentication failed while {}", action))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);
            BurndownError::RateLimited(retry_after)
        }
        status => {
            let error_body = response.text().await.unwrap_or_default();
            BurndownError::Integration(format!(
                "JIRA API error {}: HTTP {}: {}",
                action, status, error_body
            ))
        }
    }
}

/// JIRA timestamps (`2012-03-25T10:15:30.000+0200`), also accepting RFC 3339
mod jira_time {
    use chrono::{DateTime, FixedOffset};
    use serde::{Deserialize, Deserializer, Serializer};

    const JIRA_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

    pub fn parse(value: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(value).or_else(|_| DateTime::parse_from_str(value, JIRA_FORMAT))
    }

    pub fn serialize<S: Serializer>(value: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::{DateTime, FixedOffset};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<FixedOffset>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<FixedOffset>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw).map(Some).map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}
