//! Inactivity evaluation
//!
//! Pure functions over the current time, a user's last activity and the
//! configured threshold.

use chrono::{DateTime, Utc};

use crate::domain::ActivityRecord;

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days elapsed since the user's last activity.
///
/// Floors toward negative infinity, so activity stamped slightly in the
/// future counts as -1 days. A user with no recorded activity is reported
/// as exactly `threshold_days`, which [`should_notify`] rejects: such users
/// are never emailed. The earlier cron script emailed them with the
/// threshold as the day count; that no longer happens.
pub fn days_inactive(
    now: DateTime<Utc>,
    record: Option<&ActivityRecord>,
    threshold_days: i64,
) -> i64 {
    match record {
        Some(record) => (now - record.last_seen)
            .num_seconds()
            .div_euclid(SECONDS_PER_DAY),
        None => threshold_days,
    }
}

/// Strictly more inactive days than the threshold.
pub fn should_notify(days_inactive: i64, threshold_days: i64) -> bool {
    days_inactive > threshold_days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap()
    }

    fn seen(ago: Duration) -> ActivityRecord {
        ActivityRecord::new(now() - ago)
    }

    #[test]
    fn test_whole_days_truncate() {
        let record = seen(Duration::days(45) + Duration::hours(23));
        assert_eq!(days_inactive(now(), Some(&record), 30), 45);

        let record = seen(Duration::hours(23) + Duration::minutes(59));
        assert_eq!(days_inactive(now(), Some(&record), 30), 0);
    }

    #[test]
    fn test_exact_day_boundary() {
        let record = seen(Duration::days(31));
        assert_eq!(days_inactive(now(), Some(&record), 30), 31);
    }

    #[test]
    fn test_future_activity_floors_negative() {
        let record = ActivityRecord::new(now() + Duration::seconds(1));
        assert_eq!(days_inactive(now(), Some(&record), 30), -1);
    }

    #[test]
    fn test_no_activity_equals_threshold() {
        assert_eq!(days_inactive(now(), None, 30), 30);
        assert_eq!(days_inactive(now(), None, 7), 7);
    }

    #[test]
    fn test_no_activity_never_notifies() {
        // Never-active users land exactly on the threshold, which is not
        // strictly greater
        for threshold in [0, 1, 30, 365] {
            let days = days_inactive(now(), None, threshold);
            assert!(!should_notify(days, threshold));
        }
    }

    #[test]
    fn test_should_notify_is_strict() {
        assert!(!should_notify(30, 30));
        assert!(should_notify(31, 30));
        assert!(!should_notify(10, 30));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let record = seen(Duration::days(40));
        let first = days_inactive(now(), Some(&record), 30);
        let second = days_inactive(now(), Some(&record), 30);
        assert_eq!(first, second);
        assert_eq!(should_notify(first, 30), should_notify(second, 30));
    }
}
