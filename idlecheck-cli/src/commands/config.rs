//! Config command - print the effective configuration

use anyhow::Result;
use colored::Colorize;

use super::get_config;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let config = get_config()?.redacted();

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{}", "Configuration".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["Data directory".to_string(), config.data_dir]);
    table.add_row(vec!["Tautulli URL".to_string(), config.tautulli_url]);
    table.add_row(vec!["Tautulli API key".to_string(), config.api_key]);
    table.add_row(vec!["Sender".to_string(), config.sender_email]);
    table.add_row(vec!["Sender password".to_string(), config.sender_password]);
    table.add_row(vec![
        "Threshold".to_string(),
        format!("{} days", config.threshold_days),
    ]);
    table.add_row(vec!["Schedule".to_string(), config.schedule]);
    table.add_row(vec![
        "SMTP server".to_string(),
        format!("{}:{}", config.smtp_host, config.smtp_port),
    ]);

    println!("{}", table);

    Ok(())
}
