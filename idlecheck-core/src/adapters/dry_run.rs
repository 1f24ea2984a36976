//! Dry-run notifier - records notices instead of sending them

use std::sync::Mutex;

use crate::domain::result::NotifyError;
use crate::domain::InactivityNotice;
use crate::ports::Notifier;

/// Notifier that keeps every notice in memory and sends nothing
#[derive(Debug, Default)]
pub struct DryRunNotifier {
    notices: Mutex<Vec<InactivityNotice>>,
}

impl DryRunNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices recorded so far, in send order
    pub fn notices(&self) -> Vec<InactivityNotice> {
        self.notices
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }
}

impl Notifier for DryRunNotifier {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn delivers(&self) -> bool {
        false
    }

    fn send(&self, notice: &InactivityNotice) -> Result<(), NotifyError> {
        let mut notices = self
            .notices
            .lock()
            .map_err(|e| NotifyError::new(&notice.username, &notice.recipient, format!("Lock poisoned: {}", e)))?;
        notices.push(notice.clone());
        Ok(())
    }
}
