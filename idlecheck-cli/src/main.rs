//! idlecheck CLI - email media-server users who stopped watching

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{check, config, logs, next, run};

/// idlecheck - notify inactive Plex users via Tautulli and SMTP
#[derive(Parser)]
#[command(name = "idlecheck", version, about, long_about = None)]
struct Cli {
    /// Defaults to `run` when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a pass now, then on the configured schedule
    Run,

    /// Run a single pass and exit
    Check {
        /// Record notices instead of sending them
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show upcoming scheduled runs
    Next {
        /// Number of runs to show
        #[arg(short, long, default_value = "5")]
        count: usize,
    },

    /// Show the effective configuration (secrets masked)
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = dispatch(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn dispatch(cli: Cli) -> Result<()> {
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run::run(),
        Commands::Check { dry_run, json } => check::run(dry_run, json),
        Commands::Next { count } => next::run(count),
        Commands::Config { json } => config::run(json),
        Commands::Logs { command } => logs::run(command),
    }
}
