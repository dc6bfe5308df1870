//! Worklog summaries for unplanned work

use crate::integrations::JiraIssue;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Hours logged on an issue per calendar day
///
/// Minutes are summed per day before rounding to whole hours (half up), so
/// two 20 minute entries on one day count as one hour.
pub fn summarize_worklog(issue: &JiraIssue) -> BTreeMap<NaiveDate, i64> {
    let mut minutes_per_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();

    for entry in issue.worklogs() {
        *minutes_per_day.entry(entry.started.date_naive()).or_default() += entry.minutes_spent();
    }

    minutes_per_day
        .into_iter()
        .map(|(day, minutes)| (day, minutes_to_hours(minutes)))
        .collect()
}

fn minutes_to_hours(minutes: i64) -> i64 {
    (minutes as f64 / 60.0 + 0.5).floor() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::{JiraWorklog, JiraWorklogPage};
    use chrono::DateTime;

    fn issue_with_worklogs(entries: &[(&str, i64)]) -> JiraIssue {
        let worklogs = entries
            .iter()
            .map(|(started, minutes)| JiraWorklog {
                started: DateTime::parse_from_rfc3339(started).unwrap(),
                time_spent_seconds: minutes * 60,
            })
            .collect::<Vec<_>>();

        let mut issue = JiraIssue::new("CORE-9");
        issue.fields.worklog = Some(JiraWorklogPage {
            total: worklogs.len() as u32,
            max_results: worklogs.len() as u32,
            worklogs,
            ..Default::default()
        });
        issue
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2012, 3, d).unwrap()
    }

    #[test]
    fn test_same_day_summed_before_rounding() {
        let issue = issue_with_worklogs(&[
            ("2012-03-26T09:00:00+02:00", 20),
            ("2012-03-26T15:30:00+02:00", 20),
        ]);

        let summary = summarize_worklog(&issue);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[&day(26)], 1);
    }

    #[test]
    fn test_days_kept_apart() {
        let issue = issue_with_worklogs(&[
            ("2012-03-26T09:00:00+02:00", 120),
            ("2012-03-27T09:00:00+02:00", 29),
            ("2012-03-28T09:00:00+02:00", 30),
        ]);

        let summary = summarize_worklog(&issue);
        assert_eq!(summary[&day(26)], 2);
        assert_eq!(summary[&day(27)], 0);
        assert_eq!(summary[&day(28)], 1);
    }

    #[test]
    fn test_day_taken_from_local_offset() {
        // 23:30 local is already the next day in UTC
        let issue = issue_with_worklogs(&[("2012-03-26T23:30:00-05:00", 60)]);

        let summary = summarize_worklog(&issue);
        assert_eq!(summary.keys().copied().collect::<Vec<_>>(), vec![day(26)]);
    }

    #[test]
    fn test_no_worklog() {
        assert!(summarize_worklog(&JiraIssue::new("CORE-10")).is_empty());
    }
}
