//! Configuration management
//!
//! Built once at startup and passed by reference afterwards. Non-secret
//! settings may live in `settings.json` in the data directory:
//! ```json
//! {
//!   "tautulliUrl": "http://tautulli.lan:8181/api/v2",
//!   "thresholdDays": 30,
//!   "schedule": "0 8 * * *",
//!   "smtpHost": "smtp.gmail.com",
//!   "smtpPort": 465
//! }
//! ```
//! Environment variables override the file. Secrets (API key, sender
//! address and password) come from the environment only.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::adapters::smtp::{DEFAULT_SMTP_HOST, DEFAULT_SMTP_PORT};
use crate::adapters::tautulli::DEFAULT_TAUTULLI_URL;
use crate::domain::result::{Error, Result};
use crate::services::schedule::{parse_schedule, DEFAULT_SCHEDULE};

pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const DEFAULT_THRESHOLD_DAYS: i64 = 30;

pub const ENV_TAUTULLI_URL: &str = "TAUTULLI_URL";
pub const ENV_TAUTULLI_API_KEY: &str = "TAUTULLI_API_KEY";
pub const ENV_SENDER_EMAIL: &str = "SENDER_EMAIL";
pub const ENV_SENDER_PASSWORD: &str = "SENDER_PASSWORD";
pub const ENV_THRESHOLD_DAYS: &str = "INACTIVITY_THRESHOLD_DAYS";
pub const ENV_SCHEDULE: &str = "IDLECHECK_SCHEDULE";
pub const ENV_SMTP_HOST: &str = "SMTP_HOST";
pub const ENV_SMTP_PORT: &str = "SMTP_PORT";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsFile {
    #[serde(default)]
    pub tautulli_url: Option<String>,
    #[serde(default)]
    pub threshold_days: Option<i64>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub smtp_host: Option<String>,
    #[serde(default)]
    pub smtp_port: Option<u16>,
}

impl SettingsFile {
    /// Read settings.json from `data_dir`; missing or malformed files yield defaults
    pub fn read(data_dir: &Path) -> Self {
        let path = data_dir.join(SETTINGS_FILE_NAME);
        std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }
}

/// Effective, immutable configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub tautulli_url: String,
    pub api_key: String,
    pub sender_email: String,
    pub sender_password: String,
    pub threshold_days: i64,
    pub schedule: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

/// Printable view of a [`Config`] with secrets masked
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactedConfig {
    pub data_dir: String,
    pub tautulli_url: String,
    pub api_key: String,
    pub sender_email: String,
    pub sender_password: String,
    pub threshold_days: i64,
    pub schedule: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl Config {
    /// Load config for `data_dir` from settings.json and the process environment
    pub fn load(data_dir: &Path) -> Result<Self> {
        Self::from_sources(data_dir, SettingsFile::read(data_dir), |key| {
            std::env::var(key).ok()
        })
    }

    /// Build config from a settings file and an environment lookup
    pub fn from_sources<F>(data_dir: &Path, settings: SettingsFile, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty variables count as unset
        let env = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let require = |key: &str| {
            env(key).ok_or_else(|| Error::config(format!("{} must be set", key)))
        };

        let tautulli_url = env(ENV_TAUTULLI_URL)
            .or(settings.tautulli_url)
            .unwrap_or_else(|| DEFAULT_TAUTULLI_URL.to_string());

        let threshold_days = match env(ENV_THRESHOLD_DAYS) {
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                Error::config(format!("{} must be a whole number of days, got '{}'", ENV_THRESHOLD_DAYS, raw))
            })?,
            None => settings.threshold_days.unwrap_or(DEFAULT_THRESHOLD_DAYS),
        };
        if threshold_days < 0 {
            return Err(Error::config(format!(
                "Inactivity threshold cannot be negative, got {}",
                threshold_days
            )));
        }

        let schedule = env(ENV_SCHEDULE)
            .or(settings.schedule)
            .unwrap_or_else(|| DEFAULT_SCHEDULE.to_string());
        parse_schedule(&schedule).map_err(|e| Error::config(e.to_string()))?;

        let smtp_host = env(ENV_SMTP_HOST)
            .or(settings.smtp_host)
            .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());

        let smtp_port = match env(ENV_SMTP_PORT) {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                Error::config(format!("{} must be a port number, got '{}'", ENV_SMTP_PORT, raw))
            })?,
            None => settings.smtp_port.unwrap_or(DEFAULT_SMTP_PORT),
        };

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            tautulli_url,
            api_key: require(ENV_TAUTULLI_API_KEY)?,
            sender_email: require(ENV_SENDER_EMAIL)?,
            sender_password: require(ENV_SENDER_PASSWORD)?,
            threshold_days,
            schedule,
            smtp_host,
            smtp_port,
        })
    }

    pub fn redacted(&self) -> RedactedConfig {
        RedactedConfig {
            data_dir: self.data_dir.display().to_string(),
            tautulli_url: self.tautulli_url.clone(),
            api_key: mask(&self.api_key),
            sender_email: self.sender_email.clone(),
            sender_password: mask(&self.sender_password),
            threshold_days: self.threshold_days,
            schedule: self.schedule.clone(),
            smtp_host: self.smtp_host.clone(),
            smtp_port: self.smtp_port,
        }
    }
}

/// Keep at most the last four characters of a secret
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "********".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
