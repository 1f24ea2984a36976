//! CLI command implementations

pub mod check;
pub mod config;
pub mod logs;
pub mod next;
pub mod run;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use idlecheck_core::config::Config;
use idlecheck_core::{IdlecheckContext, LogEvent, LoggingService};

pub const ENV_IDLECHECK_DIR: &str = "IDLECHECK_DIR";

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let dir = get_idlecheck_dir().ok()?;
    std::fs::create_dir_all(&dir).ok()?;
    LoggingService::new(&dir, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the idlecheck directory from environment or default
pub fn get_idlecheck_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_IDLECHECK_DIR) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".idlecheck"))
        .ok_or_else(|| anyhow!("Could not find home directory; set {}", ENV_IDLECHECK_DIR))
}

/// Create the idlecheck directory if needed and return it
fn ensure_idlecheck_dir() -> Result<PathBuf> {
    let dir = get_idlecheck_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create idlecheck directory: {:?}", dir))?;
    Ok(dir)
}

/// Load the effective configuration
pub fn get_config() -> Result<Config> {
    let dir = ensure_idlecheck_dir()?;
    Config::load(&dir).context("Invalid configuration")
}

/// Build the idlecheck context
pub fn get_context(dry_run: bool) -> Result<IdlecheckContext> {
    let config = get_config()?;
    IdlecheckContext::from_config(config, dry_run)
        .context("Failed to initialize idlecheck context")
}
