//! Next command - show upcoming scheduled runs

use anyhow::Result;
use colored::Colorize;
use idlecheck_core::services::RunSchedule;

use super::get_config;

pub fn run(count: usize) -> Result<()> {
    let config = get_config()?;
    let schedule = RunSchedule::parse(&config.schedule)?;

    println!("{} {}", "Schedule:".bold(), schedule.expr());
    for time in schedule.upcoming(count) {
        println!("  {}", time.format("%a %Y-%m-%d %H:%M %Z"));
    }

    Ok(())
}
