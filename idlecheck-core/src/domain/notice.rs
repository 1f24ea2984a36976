//! Inactivity notice - the email handed to a notifier

use serde::Serialize;

use super::User;

pub const NOTICE_SUBJECT: &str = "Plex Inactivity Notice";

/// One email message for one inactive user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InactivityNotice {
    pub username: String,
    pub sender: String,
    pub recipient: String,
    pub days_inactive: i64,
    pub subject: String,
    pub body: String,
}

impl InactivityNotice {
    /// Compose the fixed-template notice for `user`
    pub fn compose(sender: &str, user: &User, days_inactive: i64) -> Self {
        let body = format!(
            "Hello {},\n\n\
             You have been inactive on Plex for {} days. \
             If you do not use Plex soon, your access may be revoked.\n\n\
             Thank you.",
            user.username, days_inactive
        );

        Self {
            username: user.username.clone(),
            sender: sender.to_string(),
            recipient: user.email.clone(),
            days_inactive,
            subject: NOTICE_SUBJECT.to_string(),
            body,
        }
    }
}
