//! Result and error types for the core library

use thiserror::Error;

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    /// Fetching users or activity failed (network, HTTP status, decode).
    /// Fatal to the pass that hit it.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Schedule error: {0}")]
    Schedule(String),

    #[error("Lock error: {0}")]
    Lock(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error aborted a pass because the data source failed
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Failure to deliver one inactivity notice.
///
/// Scoped to a single user: the pass records it and moves on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Error sending notification to {username} ({email}): {cause}")]
pub struct NotifyError {
    pub username: String,
    pub email: String,
    pub cause: String,
}

impl NotifyError {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        cause: impl std::fmt::Display,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            cause: cause.to_string(),
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;
