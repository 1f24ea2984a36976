//! User and activity domain models

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A media-server user as reported by the activity-tracking service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque key assigned by the activity-tracking service
    pub user_id: String,
    pub username: String,
    /// Empty when the service has no address on file
    pub email: String,
}

impl User {
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            email: email.into(),
        }
    }
}

/// The most recent recorded activity of one user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub last_seen: DateTime<Utc>,
}

impl ActivityRecord {
    pub fn new(last_seen: DateTime<Utc>) -> Self {
        Self { last_seen }
    }

    /// Build a record from a unix timestamp in seconds
    pub fn from_unix(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self::new)
    }
}
