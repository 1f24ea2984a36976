//! Output formatting utilities

use chrono::{DateTime, Local, TimeZone, Utc};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use idlecheck_core::domain::OutcomeStatus;
use idlecheck_core::{NotifyError, PassReport, UserOutcome};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Format unix milliseconds as local time
pub fn format_timestamp(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

fn format_last_seen(last_seen: Option<DateTime<Utc>>) -> String {
    last_seen
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string())
}

/// Console line for one user, if a notice was attempted for them
fn notice_line(outcome: &UserOutcome, dry_run: bool) -> Option<String> {
    match &outcome.status {
        OutcomeStatus::Notified if dry_run => Some(format!(
            "Would notify {} ({})",
            outcome.username, outcome.email
        )),
        OutcomeStatus::Notified => Some(format!(
            "Notification sent to {} ({})",
            outcome.username, outcome.email
        )),
        OutcomeStatus::Failed { cause } => {
            Some(NotifyError::new(&outcome.username, &outcome.email, cause).to_string())
        }
        OutcomeStatus::Skipped => None,
    }
}

/// Print one console line per notice attempted in the pass
pub fn print_notice_lines(report: &PassReport) {
    for outcome in &report.outcomes {
        let Some(line) = notice_line(outcome, report.dry_run) else {
            continue;
        };
        match outcome.status {
            OutcomeStatus::Failed { .. } => error(&line),
            _ if report.dry_run => info(&line),
            _ => println!("{}", line),
        }
    }
}

/// Print the per-user table and summary of a pass
pub fn print_report(report: &PassReport) {
    let mut table = create_table();
    table.set_header(vec!["User", "Email", "Last Seen", "Days Inactive", "Result"]);

    for outcome in &report.outcomes {
        let result = match &outcome.status {
            OutcomeStatus::Notified if report.dry_run => "would notify".cyan().to_string(),
            OutcomeStatus::Notified => "notified".green().to_string(),
            OutcomeStatus::Skipped => "-".dimmed().to_string(),
            OutcomeStatus::Failed { .. } => "failed".red().to_string(),
        };

        table.add_row(vec![
            outcome.username.clone(),
            outcome.email.clone(),
            format_last_seen(outcome.last_seen),
            outcome.days_inactive.to_string(),
            result,
        ]);
    }

    if !report.outcomes.is_empty() {
        println!("{}", table);
    }

    let summary = format!(
        "Checked {} users (threshold {} days): {} notified, {} failed",
        report.users_checked(),
        report.threshold_days,
        report.notified(),
        report.failed()
    );
    if report.failed() > 0 {
        warning(&summary);
    } else {
        success(&summary);
    }
}
