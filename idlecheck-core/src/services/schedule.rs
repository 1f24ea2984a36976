//! Scheduler for timed reconciliation passes
//!
//! Fires a job at the times described by a five-field cron expression,
//! evaluated in local time. The job itself knows nothing about time-based
//! waiting, so pass logic stays testable on its own.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone, Utc};
use cron::Schedule;

use crate::domain::result::{Error, Result};

/// Daily at 08:00
pub const DEFAULT_SCHEDULE: &str = "0 8 * * *";

/// Longest single sleep; keeps wall-clock jumps (suspend, DST) from being
/// missed for long
const MAX_SLEEP_SECS: u64 = 60;

/// Day names indexed by standard cron day-of-week number (0 = Sunday)
const DAY_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Parse a five-field cron expression (`min hour dom mon dow`)
///
/// Day-of-week uses standard cron numbering: 0 or 7 is Sunday, 1-5 is
/// Monday to Friday. Day names (`MON-FRI`) are accepted as well.
pub fn parse_schedule(expr: &str) -> Result<Schedule> {
    let invalid = |reason: String| Error::Schedule(format!("Invalid schedule '{}': {}", expr, reason));

    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(invalid(format!(
            "expected 5 fields (min hour dom mon dow), got {}",
            fields.len()
        )));
    }
    let day_of_week = day_of_week_names(fields[4]).map_err(invalid)?;

    // The cron crate expects a leading seconds field and counts weekdays
    // from 1 = Sunday, so numbers are rewritten as names
    let full_expr = format!(
        "0 {} {} {} {} {}",
        fields[0], fields[1], fields[2], fields[3], day_of_week
    );

    Schedule::from_str(&full_expr).map_err(|e| invalid(e.to_string()))
}

/// Rewrite a numeric day-of-week field into day names
fn day_of_week_names(field: &str) -> std::result::Result<String, String> {
    let mut days: Vec<&str> = Vec::new();

    for item in field.split(',') {
        if item == "*" || item == "?" || item.chars().any(|c| c.is_ascii_alphabetic()) {
            days.push(item);
            continue;
        }

        let (range, step) = match item.split_once('/') {
            Some((range, step)) => {
                let step: usize = step
                    .parse()
                    .map_err(|_| format!("invalid day-of-week step '{}'", step))?;
                if step == 0 {
                    return Err("day-of-week step cannot be zero".to_string());
                }
                (range, Some(step))
            }
            None => (item, None),
        };

        let (start, end) = if range == "*" {
            (0, 6)
        } else if let Some((start, end)) = range.split_once('-') {
            (day_number(start)?, day_number(end)?)
        } else {
            let day = day_number(range)?;
            // `n/step` runs from n to the end of the week
            (day, if step.is_some() { 6 } else { day })
        };
        if start > end {
            return Err(format!("day-of-week range '{}' runs backwards", range));
        }

        for day in (start..=end).step_by(step.unwrap_or(1)) {
            let name = DAY_NAMES[day % 7];
            if !days.contains(&name) {
                days.push(name);
            }
        }
    }

    Ok(days.join(","))
}

fn day_number(raw: &str) -> std::result::Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(day) if day <= 7 => Ok(day),
        _ => Err(format!("day of week must be 0-7, got '{}'", raw)),
    }
}

/// A parsed run schedule
#[derive(Debug, Clone)]
pub struct RunSchedule {
    expr: String,
    schedule: Schedule,
}

impl RunSchedule {
    pub fn parse(expr: &str) -> Result<Self> {
        Ok(Self {
            expr: expr.trim().to_string(),
            schedule: parse_schedule(expr)?,
        })
    }

    /// The expression as configured
    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// First fire time strictly after `after`
    pub fn next_after<Tz: TimeZone>(&self, after: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        self.schedule.after(after).next()
    }

    /// The next `count` fire times after now, in local time
    pub fn upcoming(&self, count: usize) -> Vec<DateTime<Local>> {
        self.schedule.upcoming(Local).take(count).collect()
    }
}

/// Drives a job at scheduled times, one run at a time
pub struct Scheduler {
    schedule: RunSchedule,
}

impl Scheduler {
    pub fn new(schedule: RunSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &RunSchedule {
        &self.schedule
    }

    /// Run `job` at every scheduled time, forever.
    ///
    /// `on_wait` is told the next fire time each time the scheduler starts
    /// waiting. Runs never overlap: a run that outlasts the next fire time
    /// makes that tick fire late, once.
    pub fn run<J, W>(&self, mut job: J, mut on_wait: W) -> Result<()>
    where
        J: FnMut(DateTime<Utc>),
        W: FnMut(DateTime<Local>),
    {
        loop {
            let now = Local::now();
            let next = self.schedule.next_after(&now).ok_or_else(|| {
                Error::Schedule(format!("Schedule '{}' has no upcoming run", self.schedule.expr()))
            })?;

            on_wait(next);
            sleep_until(next);
            job(Utc::now());
        }
    }
}

/// Sleep in bounded slices until the wall clock reaches `deadline`
fn sleep_until(deadline: DateTime<Local>) {
    loop {
        let remaining = (deadline - Local::now()).num_milliseconds();
        if remaining <= 0 {
            return;
        }
        let slice = (remaining as u64).min(MAX_SLEEP_SECS * 1000);
        std::thread::sleep(Duration::from_millis(slice));
    }
}
