//! Tautulli API client
//!
//! Reads the Plex user roster and per-user watch history from a Tautulli
//! instance. Every endpoint answers with the same envelope:
//!
//! ```json
//! { "response": { "result": "success", "message": null, "data": ... } }
//! ```

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use url::Url;

use crate::domain::result::{Error as DomainError, Result as DomainResult};
use crate::domain::{ActivityRecord, User};
use crate::ports::ActivitySource;

// =============================================================================
// API Response Models
// =============================================================================

#[derive(Debug, Deserialize)]
struct Envelope {
    response: EnvelopeBody,
}

#[derive(Debug, Deserialize)]
struct EnvelopeBody {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: JsonValue,
}

/// Tautulli user row from `get_users`
#[derive(Debug, Clone, Deserialize)]
pub struct TautulliUser {
    /// User ID (API returns number, we accept both)
    #[serde(deserialize_with = "deserialize_id")]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Watch history payload: a bare list of rows, or the paged table form
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HistoryPayload {
    Rows(Vec<HistoryRow>),
    Paged { data: Vec<HistoryRow> },
}

impl HistoryPayload {
    fn into_rows(self) -> Vec<HistoryRow> {
        match self {
            HistoryPayload::Rows(rows) => rows,
            HistoryPayload::Paged { data } => data,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HistoryRow {
    /// Unix seconds
    #[serde(deserialize_with = "deserialize_timestamp")]
    date: i64,
}

/// Deserialize ID that can be number or string
fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: JsonValue = Deserialize::deserialize(deserializer)?;
    match value {
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::String(s) => Ok(s),
        _ => Err(D::Error::custom("expected number or string for user_id")),
    }
}

/// Deserialize a unix timestamp that can be number or numeric string
fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: JsonValue = Deserialize::deserialize(deserializer)?;
    match value {
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", n))),
        JsonValue::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| D::Error::custom(format!("invalid timestamp '{}': {}", s, e))),
        _ => Err(D::Error::custom("expected number or string for date")),
    }
}

// =============================================================================
// Tautulli HTTP Client
// =============================================================================

/// Default API base URL of a local Tautulli install
pub const DEFAULT_TAUTULLI_URL: &str = "http://localhost:8181/api/v2";

/// Tautulli API client
#[derive(Debug)]
pub struct TautulliClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TautulliClient {
    /// Create a new client for the API rooted at `base_url`.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        if api_key.is_empty() {
            anyhow::bail!("Tautulli API key cannot be empty");
        }

        let parsed = Url::parse(base_url).context("Invalid Tautulli URL")?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("Tautulli URL must use http or https");
        }

        let client = Client::builder()
            .user_agent(concat!("idlecheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch all users known to Tautulli
    pub fn get_users(&self) -> Result<Vec<TautulliUser>> {
        self.fetch("get_users", &[])
    }

    /// Fetch the most recent watch history entry of one user, as unix seconds
    pub fn get_last_watched(&self, user_id: &str) -> Result<Option<i64>> {
        let payload: HistoryPayload = self.fetch(
            "get_user_watch_history",
            &[("user_id", user_id.to_string()), ("length", "1".to_string())],
        )?;

        Ok(payload.into_rows().first().map(|row| row.date))
    }

    /// GET `{base_url}/{endpoint}` and unwrap the response envelope
    fn fetch<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("apikey", &self.api_key)])
            .send()
            .map_err(|e| self.map_request_error(e))?;

        self.check_response_status(&response)?;

        let envelope: Envelope = response
            .json()
            .with_context(|| format!("Failed to parse Tautulli {} response", endpoint))?;

        let body = envelope.response;
        if body.result.as_deref() == Some("error") {
            anyhow::bail!(
                "Tautulli {} failed: {}",
                endpoint,
                body.message.as_deref().unwrap_or("unknown error")
            );
        }
        if body.data.is_null() {
            anyhow::bail!("Tautulli {} response has no data", endpoint);
        }

        serde_json::from_value(body.data)
            .with_context(|| format!("Unexpected Tautulli {} payload", endpoint))
    }

    fn map_user(&self, user: TautulliUser) -> User {
        User {
            user_id: user.user_id,
            username: user.username,
            email: user.email.unwrap_or_default(),
        }
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> anyhow::Error {
        if error.is_timeout() {
            anyhow::anyhow!("Connection to Tautulli timed out")
        } else if error.is_connect() {
            anyhow::anyhow!("Unable to connect to Tautulli at {}", self.base_url)
        } else {
            anyhow::anyhow!("Tautulli request failed: {}", error)
        }
    }

    /// Check response status and return appropriate errors
    fn check_response_status(&self, response: &reqwest::blocking::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        match status.as_u16() {
            401 => anyhow::bail!(
                "Tautulli authentication failed. Check that TAUTULLI_API_KEY is correct."
            ),
            404 => anyhow::bail!("Tautulli endpoint not found. Check the Tautulli URL."),
            code => anyhow::bail!("Tautulli API error: HTTP {}", code),
        }
    }
}

impl ActivitySource for TautulliClient {
    fn name(&self) -> &str {
        "tautulli"
    }

    fn list_users(&self) -> DomainResult<Vec<User>> {
        let users = self
            .get_users()
            .map_err(|e| DomainError::transport(format!("{:#}", e)))?;

        Ok(users.into_iter().map(|u| self.map_user(u)).collect())
    }

    fn last_activity(&self, user_id: &str) -> DomainResult<Option<ActivityRecord>> {
        let date = self
            .get_last_watched(user_id)
            .map_err(|e| DomainError::transport(format!("{:#}", e)))?;

        match date {
            Some(secs) => ActivityRecord::from_unix(secs).map(Some).ok_or_else(|| {
                DomainError::transport(format!(
                    "Tautulli returned an out-of-range timestamp {} for user {}",
                    secs, user_id
                ))
            }),
            None => Ok(None),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_empty_api_key() {
        let result = TautulliClient::new(DEFAULT_TAUTULLI_URL, "");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_reject_bad_url() {
        let result = TautulliClient::new("not a url", "key");
        assert!(result.is_err());

        let result = TautulliClient::new("ftp://tautulli.local/api/v2", "key");
        assert!(result.unwrap_err().to_string().contains("http"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = TautulliClient::new("http://localhost:8181/api/v2/", "key").unwrap();
        assert_eq!(client.base_url, "http://localhost:8181/api/v2");
    }

    #[test]
    fn test_user_row_numeric_id() {
        let json = r#"{"user_id": 133788, "username": "alice", "email": "a@example.com", "friendly_name": "Alice"}"#;
        let user: TautulliUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.user_id, "133788");
        assert_eq!(user.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn test_user_row_null_email() {
        let json = r#"{"user_id": "7", "username": "Local", "email": null}"#;
        let user: TautulliUser = serde_json::from_str(json).unwrap();

        let client = TautulliClient::new(DEFAULT_TAUTULLI_URL, "key").unwrap();
        let mapped = client.map_user(user);
        assert_eq!(mapped.user_id, "7");
        assert_eq!(mapped.email, "");
    }

    #[test]
    fn test_history_payload_shapes() {
        let rows: HistoryPayload = serde_json::from_str(r#"[{"date": 1700000000}]"#).unwrap();
        assert_eq!(rows.into_rows()[0].date, 1_700_000_000);

        let paged: HistoryPayload =
            serde_json::from_str(r#"{"recordsTotal": 1, "data": [{"date": "1700000001"}]}"#)
                .unwrap();
        assert_eq!(paged.into_rows()[0].date, 1_700_000_001);

        let empty: HistoryPayload = serde_json::from_str("[]").unwrap();
        assert!(empty.into_rows().is_empty());
    }

    #[test]
    fn test_envelope_error_fields() {
        let json = r#"{"response": {"result": "error", "message": "Invalid apikey", "data": {}}}"#;
        let envelope: Envelope = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.response.result.as_deref(), Some("error"));
        assert_eq!(envelope.response.message.as_deref(), Some("Invalid apikey"));
    }

    #[test]
    fn test_source_name() {
        let client = TautulliClient::new(DEFAULT_TAUTULLI_URL, "key").unwrap();
        assert_eq!(client.name(), "tautulli");
    }
}
