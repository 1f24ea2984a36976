//! Core domain entities
//!
//! Plain data structures with no I/O: users and their last activity as read
//! from the tracking service, the notice sent to an inactive user, and the
//! report of a pass.

mod notice;
mod pass;
pub mod result;
mod user;

pub use notice::{InactivityNotice, NOTICE_SUBJECT};
pub use pass::{OutcomeStatus, PassReport, UserOutcome};
pub use user::{ActivityRecord, User};
