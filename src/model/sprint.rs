//! Sprint and per-day effort buckets

use crate::{BurndownError, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// One calendar day of a sprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SprintEffort {
    /// The day this bucket represents
    pub date: NaiveDate,

    /// Planned effort resolved on this day
    #[serde(default)]
    pub burned: f64,

    /// Unplanned effort logged on this day
    #[serde(default)]
    pub unplanned: f64,
}

impl SprintEffort {
    /// Create an empty bucket for a day
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            burned: 0.0,
            unplanned: 0.0,
        }
    }
}

/// A time-boxed iteration with day-level effort tracking
///
/// `efforts` must be strictly ascending by date; see [`Sprint::ensure_ascending`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: String,

    #[serde(default)]
    pub efforts: Vec<SprintEffort>,

    /// Sprint goal
    #[serde(default)]
    pub planned: f64,
}

impl Sprint {
    /// Create a sprint without any day buckets
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            efforts: Vec::new(),
            planned: 0.0,
        }
    }

    /// Create a sprint with `days` consecutive zeroed buckets starting at `first_day`
    pub fn with_days(id: impl Into<String>, first_day: NaiveDate, days: u32) -> Self {
        let efforts = (0..days)
            .filter_map(|offset| first_day.checked_add_days(Days::new(offset.into())))
            .map(SprintEffort::new)
            .collect();

        Self {
            id: id.into(),
            efforts,
            planned: 0.0,
        }
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.efforts.first().map(|e| e.date)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.efforts.last().map(|e| e.date)
    }

    pub fn total_burned(&self) -> f64 {
        self.efforts.iter().map(|e| e.burned).sum()
    }

    pub fn total_unplanned(&self) -> f64 {
        self.efforts.iter().map(|e| e.unplanned).sum()
    }

    /// Bucket for an exact day, if the sprint has one
    pub fn effort_on(&self, date: NaiveDate) -> Option<&SprintEffort> {
        self.efforts.iter().find(|e| e.date == date)
    }

    /// Check that day buckets are strictly ascending by date
    ///
    /// Bucket selection relies on this ordering.
    pub fn ensure_ascending(&self) -> Result<()> {
        for pair in self.efforts.windows(2) {
            if pair[0].date >= pair[1].date {
                return Err(BurndownError::InvalidSprint(format!(
                    "sprint {} has day buckets out of order: {} is followed by {}",
                    self.id, pair[0].date, pair[1].date
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2012, 3, d).unwrap()
    }

    #[test]
    fn test_with_days_builds_consecutive_buckets() {
        let sprint = Sprint::with_days("12", day(26), 10);

        assert_eq!(sprint.efforts.len(), 10);
        assert_eq!(sprint.first_day(), Some(day(26)));
        assert_eq!(
            sprint.last_day(),
            Some(NaiveDate::from_ymd_opt(2012, 4, 4).unwrap())
        );
        assert!(sprint.ensure_ascending().is_ok());
        assert_eq!(sprint.total_burned(), 0.0);
    }

    #[test]
    fn test_unordered_buckets_rejected() {
        let mut sprint = Sprint::new("7");
        sprint.efforts.push(SprintEffort::new(day(5)));
        sprint.efforts.push(SprintEffort::new(day(4)));

        let err = sprint.ensure_ascending().unwrap_err();
        assert!(matches!(err, BurndownError::InvalidSprint(_)));
    }

    #[test]
    fn test_duplicate_days_rejected() {
        let mut sprint = Sprint::new("7");
        sprint.efforts.push(SprintEffort::new(day(5)));
        sprint.efforts.push(SprintEffort::new(day(5)));

        assert!(sprint.ensure_ascending().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let json = r#"{
            "id": "3",
            "efforts": [
                {"date": "2012-03-01"},
                {"date": "2012-03-02", "burned": 4.5, "unplanned": 2}
            ]
        }"#;
        let sprint: Sprint = serde_json::from_str(json).expect("should deserialize");

        assert_eq!(sprint.planned, 0.0);
        assert_eq!(sprint.efforts[0].burned, 0.0);
        assert_eq!(sprint.effort_on(day(2)).map(|e| e.burned), Some(4.5));
        assert_eq!(sprint.total_unplanned(), 2.0);
    }
}
