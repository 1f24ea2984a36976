//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - Tautulli HTTP client for ActivitySource
//! - SMTP (implicit TLS) for Notifier
//! - In-memory dry-run Notifier

pub mod dry_run;
pub mod smtp;
pub mod tautulli;

#[cfg(test)]
pub mod tautulli_mock;
