//! Effort classification
//!
//! Decides whether an issue is planned or unplanned work and how much effort
//! it represents under the team's effort mode.

use crate::config::{EffortMode, TeamSync};
use crate::integrations::JiraIssue;
use serde_json::Value;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Whether `issue` counts as unplanned work for `team`
///
/// Always false when the team does not track unplanned work.
pub fn is_unplanned(team: &TeamSync, issue: &JiraIssue) -> bool {
    if !team.unplanned {
        return false;
    }

    match (
        team.unplanned_flag_field_id.as_deref(),
        team.unplanned_flag_name.as_deref(),
    ) {
        (Some(field_id), Some(flag)) => has_flag(issue, field_id, flag),
        _ => false,
    }
}

/// Whether the custom field `field_id` carries `flag`
///
/// Matches plain string fields, option objects (`{"value": ..}` or
/// `{"name": ..}`) and multi-value fields containing such an option.
pub fn has_flag(issue: &JiraIssue, field_id: &str, flag: &str) -> bool {
    issue
        .custom_field(field_id)
        .is_some_and(|value| value_matches(value, flag))
}

fn value_matches(value: &Value, flag: &str) -> bool {
    match value {
        Value::String(s) => s == flag,
        Value::Object(map) => ["value", "name"]
            .iter()
            .filter_map(|key| map.get(*key))
            .any(|v| v.as_str() == Some(flag)),
        Value::Array(items) => items.iter().any(|item| value_matches(item, flag)),
        _ => false,
    }
}

/// Effort of an issue under the team's effort mode
pub fn effort_value(team: &TeamSync, issue: &JiraIssue) -> f64 {
    match team.effort_mode {
        EffortMode::TimeEstimate => original_estimate_hours(issue),
        EffortMode::StoryPoints => story_points(issue, team.story_points_field_id.as_deref()),
    }
}

/// Original estimate in hours, 0 when not estimated
pub fn original_estimate_hours(issue: &JiraIssue) -> f64 {
    issue
        .original_estimate_seconds()
        .map(|secs| secs as f64 / SECONDS_PER_HOUR)
        .unwrap_or(0.0)
}

/// Story points from the configured field, 0 when absent or not numeric
pub fn story_points(issue: &JiraIssue, field_id: Option<&str>) -> f64 {
    field_id
        .and_then(|id| issue.custom_field(id))
        .and_then(|value| match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|points| points.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issue_with(field: &str, value: Value) -> JiraIssue {
        let mut issue = JiraIssue::new("CORE-1");
        issue.fields.custom.insert(field.to_string(), value);
        issue
    }

    fn unplanned_team() -> TeamSync {
        TeamSync::new("core", "CORE").with_unplanned_flag("customfield_10100", "Unplanned")
    }

    #[test]
    fn test_flag_shapes() {
        let team = unplanned_team();

        assert!(is_unplanned(&team, &issue_with("customfield_10100", json!("Unplanned"))));
        assert!(is_unplanned(
            &team,
            &issue_with("customfield_10100", json!({"value": "Unplanned", "id": "10300"}))
        ));
        assert!(is_unplanned(
            &team,
            &issue_with("customfield_10100", json!([{"value": "Other"}, {"value": "Unplanned"}]))
        ));
        assert!(!is_unplanned(&team, &issue_with("customfield_10100", json!("Planned"))));
        assert!(!is_unplanned(&team, &issue_with("customfield_10999", json!("Unplanned"))));
        assert!(!is_unplanned(&team, &issue_with("customfield_10100", Value::Null)));
    }

    #[test]
    fn test_flag_ignored_without_tracking() {
        let mut team = unplanned_team();
        team.unplanned = false;

        let issue = issue_with("customfield_10100", json!("Unplanned"));
        assert!(!is_unplanned(&team, &issue));
        assert!(has_flag(&issue, "customfield_10100", "Unplanned"));
    }

    #[test]
    fn test_time_estimate_in_hours() {
        let team = TeamSync::new("core", "CORE");
        let mut issue = JiraIssue::new("CORE-2");
        issue.fields.timeoriginalestimate = Some(5400);

        assert_eq!(effort_value(&team, &issue), 1.5);
        assert_eq!(effort_value(&team, &JiraIssue::new("CORE-3")), 0.0);
    }

    #[test]
    fn test_story_points_parsing() {
        let team = TeamSync::new("core", "CORE").with_story_points("customfield_10002");

        assert_eq!(effort_value(&team, &issue_with("customfield_10002", json!(5))), 5.0);
        assert_eq!(effort_value(&team, &issue_with("customfield_10002", json!("2.5"))), 2.5);
        assert_eq!(effort_value(&team, &issue_with("customfield_10002", json!("lots"))), 0.0);
        assert_eq!(effort_value(&team, &issue_with("customfield_10002", json!({"v": 1}))), 0.0);
        assert_eq!(effort_value(&team, &JiraIssue::new("CORE-4")), 0.0);
    }

    #[test]
    fn test_story_points_mode_ignores_estimate() {
        let team = TeamSync::new("core", "CORE").with_story_points("customfield_10002");
        let mut issue = issue_with("customfield_10002", json!(3));
        issue.fields.timeoriginalestimate = Some(36000);

        assert_eq!(effort_value(&team, &issue), 3.0);
    }
}
