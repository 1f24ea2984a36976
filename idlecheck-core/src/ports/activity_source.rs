//! Activity source port
//!
//! Defines the interface for reading the user roster and per-user activity
//! from an external activity-tracking service (Tautulli, test fakes, etc.)

use crate::domain::result::Result;
use crate::domain::{ActivityRecord, User};

/// Activity-tracking data source
///
/// Any error returned here is a transport failure and aborts the pass.
pub trait ActivitySource: Send + Sync {
    /// Source name (e.g., "tautulli")
    fn name(&self) -> &str;

    /// Fetch the full user roster
    fn list_users(&self) -> Result<Vec<User>>;

    /// Fetch the single most recent activity of one user
    ///
    /// Returns `None` when the user has no recorded history.
    fn last_activity(&self, user_id: &str) -> Result<Option<ActivityRecord>>;
}
