//! Outcome of one reconciliation pass

use chrono::{DateTime, Utc};
use serde::Serialize;

/// What happened to one user during a pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Notified,
    Skipped,
    Failed { cause: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserOutcome {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub days_inactive: i64,
    /// None when the user has no recorded activity
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

/// Report returned by a completed pass
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub started_at: DateTime<Utc>,
    pub threshold_days: i64,
    pub dry_run: bool,
    pub outcomes: Vec<UserOutcome>,
}

impl PassReport {
    pub fn new(started_at: DateTime<Utc>, threshold_days: i64, dry_run: bool) -> Self {
        Self {
            started_at,
            threshold_days,
            dry_run,
            outcomes: Vec::new(),
        }
    }

    pub fn users_checked(&self) -> usize {
        self.outcomes.len()
    }

    pub fn notified(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Notified))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, status: OutcomeStatus) -> UserOutcome {
        UserOutcome {
            user_id: name.to_string(),
            username: name.to_string(),
            email: format!("{}@example.com", name),
            days_inactive: 0,
            last_seen: None,
            status,
        }
    }

    #[test]
    fn test_report_counters() {
        let mut report = PassReport::new(Utc::now(), 30, false);
        report.outcomes.push(outcome("a", OutcomeStatus::Notified));
        report.outcomes.push(outcome("b", OutcomeStatus::Skipped));
        report.outcomes.push(outcome("c", OutcomeStatus::Skipped));
        report.outcomes.push(outcome("d", OutcomeStatus::Failed { cause: "x".into() }));

        assert_eq!(report.users_checked(), 4);
        assert_eq!(report.notified(), 1);
        assert_eq!(report.skipped(), 2);
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn test_outcome_serializes_flat() {
        let json = serde_json::to_value(outcome("a", OutcomeStatus::Failed { cause: "boom".into() }))
            .unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["cause"], "boom");
        assert_eq!(json["username"], "a");
    }
}
