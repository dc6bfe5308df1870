//! Day bucket resolution
//!
//! Maps a calendar day onto the sprint's day buckets. Buckets are compared by
//! calendar day only and must be strictly ascending.

use crate::model::SprintEffort;
use chrono::NaiveDate;

/// Index of the bucket receiving effort for `day`
///
/// Picks the first bucket dated on or after `day`, so a day falling in the
/// range `(previous bucket date, bucket date]` lands in that bucket. A day
/// before every bucket, or after the last one, goes to the last bucket.
/// Returns `None` only for an empty sequence.
pub fn select_bucket(efforts: &[SprintEffort], day: NaiveDate) -> Option<usize> {
    let last = efforts.len().checked_sub(1)?;
    if efforts[0].date > day {
        return Some(last);
    }

    let before = efforts.partition_point(|effort| effort.date < day);
    Some(before.min(last))
}

/// Whether `day` lies between the first and last sprint day (inclusive)
pub fn is_in_sprint(efforts: &[SprintEffort], day: NaiveDate) -> bool {
    match (efforts.first(), efforts.last()) {
        (Some(first), Some(last)) => first.date <= day && day <= last.date,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2012, 3, d).unwrap()
    }

    fn buckets(days: &[u32]) -> Vec<SprintEffort> {
        days.iter().map(|d| SprintEffort::new(day(*d))).collect()
    }

    #[test]
    fn test_exact_day_selects_that_bucket() {
        let efforts = buckets(&[1, 2, 3, 4, 5]);
        for (idx, d) in (1..=5).enumerate() {
            assert_eq!(select_bucket(&efforts, day(d)), Some(idx));
        }
    }

    #[test]
    fn test_gap_day_goes_to_next_bucket() {
        // Weekend gap between the 2nd and the 5th
        let efforts = buckets(&[1, 2, 5, 6]);
        assert_eq!(select_bucket(&efforts, day(3)), Some(2));
        assert_eq!(select_bucket(&efforts, day(4)), Some(2));
        assert_eq!(select_bucket(&efforts, day(5)), Some(2));
    }

    #[test]
    fn test_before_first_bucket_falls_back_to_last() {
        let efforts = buckets(&[2, 3, 4, 5, 6]);
        assert_eq!(select_bucket(&efforts, day(1)), Some(4));
    }

    #[test]
    fn test_after_last_bucket_selects_last() {
        let efforts = buckets(&[1, 2, 3]);
        assert_eq!(select_bucket(&efforts, day(20)), Some(2));
    }

    #[test]
    fn test_empty_sequence_has_no_bucket() {
        assert_eq!(select_bucket(&[], day(1)), None);
        assert!(!is_in_sprint(&[], day(1)));
    }

    #[test]
    fn test_membership_is_inclusive() {
        let efforts = buckets(&[5, 6, 7]);
        assert!(is_in_sprint(&efforts, day(5)));
        assert!(is_in_sprint(&efforts, day(7)));
        assert!(!is_in_sprint(&efforts, day(4)));
        assert!(!is_in_sprint(&efforts, day(8)));
    }
}
