//! Service layer - pass logic and its supporting machinery
//!
//! `inactivity` holds the pure evaluation rules, `reconcile` runs a pass
//! over the ports, `schedule` decides when passes fire, `lock` keeps them
//! from overlapping and `logging` records what happened.

pub mod inactivity;
pub mod lock;
pub mod logging;
mod reconcile;
pub mod schedule;

pub use inactivity::{days_inactive, should_notify};
pub use lock::PassLock;
pub use logging::{LogEntry, LogEvent, LoggingService, PassTrigger};
pub use reconcile::ReconcileService;
pub use schedule::{RunSchedule, Scheduler};
