//! idlecheck core - find inactive media-server users and email them
//!
//! Organized the hexagonal way:
//!
//! - **domain**: users, activity records, notices, pass reports, errors
//! - **ports**: traits for the activity source and the notice sink
//! - **services**: inactivity rules, the reconcile pass, scheduling,
//!   the pass lock and the event log
//! - **adapters**: Tautulli over HTTP, SMTP, dry-run

pub mod adapters;
pub mod config;
pub mod domain;
mod log_migrations;
pub mod ports;
pub mod services;

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use adapters::dry_run::DryRunNotifier;
use adapters::smtp::SmtpNotifier;
use adapters::tautulli::TautulliClient;
use config::Config;
use domain::OutcomeStatus;
use ports::{ActivitySource, Notifier};
use services::{PassLock, ReconcileService, RunSchedule, Scheduler};

// Re-export commonly used types at crate root
pub use domain::result::{Error, NotifyError, Result};
pub use domain::{ActivityRecord, InactivityNotice, PassReport, User, UserOutcome};
pub use services::{LogEntry, LogEvent, LoggingService, PassTrigger};

/// How a requested pass ended, when it did not fail
#[derive(Debug)]
pub enum PassRun {
    Completed(PassReport),
    /// Another process held the pass lock
    Skipped,
}

/// Main context for idlecheck operations
///
/// Built once at startup from the immutable [`Config`]; owns the wired-up
/// pass service, the scheduler and the event log.
pub struct IdlecheckContext {
    pub config: Config,
    pub reconcile_service: ReconcileService,
    pub scheduler: Scheduler,
    logger: Option<LoggingService>,
}

impl IdlecheckContext {
    /// Load configuration for `data_dir` and wire up Tautulli and SMTP.
    ///
    /// With `dry_run`, notices are recorded instead of sent.
    pub fn new(data_dir: &std::path::Path, dry_run: bool) -> Result<Self> {
        let config = Config::load(data_dir)?;
        Self::from_config(config, dry_run)
    }

    pub fn from_config(config: Config, dry_run: bool) -> Result<Self> {
        let source = TautulliClient::new(&config.tautulli_url, &config.api_key)
            .map_err(|e| Error::config(format!("{:#}", e)))?;

        let notifier: Arc<dyn Notifier> = if dry_run {
            Arc::new(DryRunNotifier::new())
        } else {
            Arc::new(
                SmtpNotifier::new(
                    &config.smtp_host,
                    config.smtp_port,
                    &config.sender_email,
                    &config.sender_password,
                )
                .map_err(|e| Error::config(format!("{:#}", e)))?,
            )
        };

        Self::with_ports(config, Arc::new(source), notifier)
    }

    /// Wire the context around explicit port implementations
    pub fn with_ports(
        config: Config,
        source: Arc<dyn ActivitySource>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let reconcile_service = ReconcileService::new(
            source,
            notifier,
            config.sender_email.clone(),
            config.threshold_days,
        );
        let scheduler = Scheduler::new(RunSchedule::parse(&config.schedule)?);

        // The event log is best effort; a pass runs without it. The service
        // opens the log file per call, so holding it here locks no one out.
        let logger = LoggingService::new(&config.data_dir, env!("CARGO_PKG_VERSION")).ok();

        Ok(Self {
            config,
            reconcile_service,
            scheduler,
            logger,
        })
    }

    pub fn logger(&self) -> Option<&LoggingService> {
        self.logger.as_ref()
    }

    /// Run one pass under the pass lock, recording it in the event log
    pub fn run_pass(&self, trigger: PassTrigger) -> Result<PassRun> {
        let pass_id = Uuid::new_v4().to_string();
        let event = |name: &str| LogEvent::new(name).with_pass(pass_id.as_str(), trigger);

        let Some(_lock) = PassLock::try_acquire(&self.config.data_dir)? else {
            self.log(event("pass_skipped").with_error("Another pass holds the lock"));
            return Ok(PassRun::Skipped);
        };

        self.log(event("pass_started"));

        let report = match self.reconcile_service.run(Utc::now()) {
            Ok(report) => report,
            Err(e) => {
                self.log(event("pass_failed").with_error(e.to_string()));
                return Err(e);
            }
        };

        for outcome in &report.outcomes {
            let logged = match &outcome.status {
                OutcomeStatus::Notified if report.dry_run => event("notice_recorded"),
                OutcomeStatus::Notified => event("notice_sent"),
                OutcomeStatus::Failed { cause } => event("notice_failed").with_error(cause.as_str()),
                OutcomeStatus::Skipped => continue,
            };
            self.log(logged.with_user(outcome.username.as_str(), outcome.days_inactive));
        }

        self.log(event("pass_completed"));

        Ok(PassRun::Completed(report))
    }

    /// Log an event, ignoring any errors (logging should never break a pass)
    pub fn log(&self, event: LogEvent) {
        if let Some(logger) = &self.logger {
            let _ = logger.log(event);
        }
    }
}
