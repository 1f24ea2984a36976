//! Run command - pass on startup, then on the configured schedule

use anyhow::Result;
use idlecheck_core::{IdlecheckContext, LogEvent, PassRun, PassTrigger};

use super::get_context;
use crate::output;

pub fn run() -> Result<()> {
    let ctx = get_context(false)?;
    ctx.log(LogEvent::new("command_executed").with_command("run"));

    output::info(&format!(
        "Watching for users inactive more than {} days (schedule '{}')",
        ctx.config.threshold_days,
        ctx.scheduler.schedule().expr()
    ));

    run_pass(&ctx, PassTrigger::Startup);

    ctx.scheduler.run(
        |_| run_pass(&ctx, PassTrigger::Scheduled),
        |next| println!("Next pass at {}", next.format("%Y-%m-%d %H:%M %Z")),
    )?;

    Ok(())
}

/// Run one pass and report it; failures are printed, never fatal to the daemon
fn run_pass(ctx: &IdlecheckContext, trigger: PassTrigger) {
    match ctx.run_pass(trigger) {
        Ok(PassRun::Completed(report)) => {
            output::print_notice_lines(&report);
            output::success(&format!(
                "Pass complete: {} users checked, {} notified, {} failed",
                report.users_checked(),
                report.notified(),
                report.failed()
            ));
        }
        Ok(PassRun::Skipped) => {
            output::warning("Another pass is already running, skipping this one");
        }
        Err(e) => {
            output::error(&format!("Pass failed: {}", e));
        }
    }
}
