//! Reconcile service - one fetch, evaluate, notify pass over the roster

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::result::Result;
use crate::domain::{InactivityNotice, OutcomeStatus, PassReport, UserOutcome};
use crate::ports::{ActivitySource, Notifier};
use crate::services::inactivity::{days_inactive, should_notify};

/// Runs reconciliation passes
///
/// Holds no state between passes; every call to [`ReconcileService::run`]
/// starts from a fresh roster.
pub struct ReconcileService {
    source: Arc<dyn ActivitySource>,
    notifier: Arc<dyn Notifier>,
    sender: String,
    threshold_days: i64,
}

impl ReconcileService {
    pub fn new(
        source: Arc<dyn ActivitySource>,
        notifier: Arc<dyn Notifier>,
        sender: impl Into<String>,
        threshold_days: i64,
    ) -> Self {
        Self {
            source,
            notifier,
            sender: sender.into(),
            threshold_days,
        }
    }

    pub fn threshold_days(&self) -> i64 {
        self.threshold_days
    }

    /// Name of the notifier in use ("smtp", "dry-run", ...)
    pub fn notifier_name(&self) -> &str {
        self.notifier.name()
    }

    /// Run one pass as of `now`.
    ///
    /// A failure to fetch the roster or any user's activity aborts the pass.
    /// A failure to notify one user is recorded in the report and the pass
    /// continues with the next user.
    pub fn run(&self, now: DateTime<Utc>) -> Result<PassReport> {
        let users = self.source.list_users()?;
        let mut report = PassReport::new(now, self.threshold_days, !self.notifier.delivers());

        for user in users {
            let record = self.source.last_activity(&user.user_id)?;
            let days = days_inactive(now, record.as_ref(), self.threshold_days);

            let status = if should_notify(days, self.threshold_days) {
                let notice = InactivityNotice::compose(&self.sender, &user, days);
                match self.notifier.send(&notice) {
                    Ok(()) => OutcomeStatus::Notified,
                    Err(e) => OutcomeStatus::Failed { cause: e.cause },
                }
            } else {
                OutcomeStatus::Skipped
            };

            report.outcomes.push(UserOutcome {
                user_id: user.user_id,
                username: user.username,
                email: user.email,
                days_inactive: days,
                last_seen: record.map(|r| r.last_seen),
                status,
            });
        }

        Ok(report)
    }
}
