//! Check command - a single pass, then exit

use anyhow::Result;
use idlecheck_core::{LogEvent, PassRun, PassTrigger};

use super::get_context;
use crate::output;

pub fn run(dry_run: bool, json: bool) -> Result<()> {
    let ctx = get_context(dry_run)?;
    ctx.log(LogEvent::new("command_executed").with_command("check"));

    match ctx.run_pass(PassTrigger::Manual)? {
        PassRun::Completed(report) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            if report.dry_run {
                output::info("Dry run: no email will be sent");
            }
            output::print_notice_lines(&report);
            println!();
            output::print_report(&report);
        }
        PassRun::Skipped => {
            if json {
                println!("{}", serde_json::json!({ "skipped": true }));
            } else {
                output::warning("Another pass is already running, nothing to do");
            }
        }
    }

    Ok(())
}
