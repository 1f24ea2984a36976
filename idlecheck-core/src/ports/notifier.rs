//! Notifier port - delivers inactivity notices

use crate::domain::result::NotifyError;
use crate::domain::InactivityNotice;

/// Notice delivery sink
///
/// Implementations must not panic on delivery problems; every failure is
/// reported as a `NotifyError` for the one recipient.
pub trait Notifier: Send + Sync {
    /// Notifier name (e.g., "smtp", "dry-run")
    fn name(&self) -> &str;

    /// Whether notices actually leave the process
    fn delivers(&self) -> bool {
        true
    }

    fn send(&self, notice: &InactivityNotice) -> Result<(), NotifyError>;
}
