//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The pass logic
//! depends only on these traits, not on concrete implementations.

mod activity_source;
mod notifier;

pub use activity_source::ActivitySource;
pub use notifier::Notifier;
