//! Mock Tautulli API server for testing
//!
//! Serves the two endpoints idlecheck reads, wrapped in the Tautulli
//! response envelope:
//! - GET /get_users returns a list of user rows
//! - GET /get_user_watch_history?user_id=N&length=1 returns at most one row

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use serde_json::{json, Value as JsonValue};
use url::Url;

/// API key the mock accepts
pub const MOCK_API_KEY: &str = "mock_api_key";

/// Mock Tautulli server for testing
pub struct MockTautulliServer {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<AtomicUsize>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

#[derive(Debug, Clone)]
pub struct MockUser {
    pub user_id: i64,
    pub username: String,
    pub email: Option<String>,
    /// Unix seconds of the last watch, None for no history
    pub last_watched: Option<i64>,
}

impl MockUser {
    pub fn new(user_id: i64, username: &str, last_watched: Option<i64>) -> Self {
        Self {
            user_id,
            username: username.to_string(),
            email: Some(format!("{}@example.com", username)),
            last_watched,
        }
    }
}

/// Configuration for mock responses
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    pub users: Vec<MockUser>,
    /// Force this HTTP status on get_users
    pub users_status: Option<u16>,
    /// Force this HTTP status on get_user_watch_history
    pub history_status: Option<u16>,
    /// Answer history in the paged `{ data: [...] }` form
    pub paged_history: bool,
}

impl MockTautulliServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let requests = Arc::new(AtomicUsize::new(0));
        let running_clone = running.clone();
        let requests_clone = requests.clone();
        let config = Arc::new(config);

        // Non-blocking so stop() is noticed
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        requests_clone.fetch_add(1, Ordering::SeqCst);
                        let cfg = config.clone();
                        thread::spawn(move || handle_connection(stream, &cfg));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    /// Get the base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Number of connections accepted so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockTautulliServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig) {
    // The accepted socket inherits non-blocking mode on some platforms
    let _ = stream.set_nonblocking(false);
    let mut buffer = [0; 4096];

    let Ok(n) = stream.read(&mut buffer) else {
        return;
    };
    let request = String::from_utf8_lossy(&buffer[..n]);

    let first_line = request.lines().next().unwrap_or("");
    let parts: Vec<&str> = first_line.split_whitespace().collect();
    if parts.len() < 2 || parts[0] != "GET" {
        send_response(&mut stream, 405, "Method Not Allowed", "{}");
        return;
    }

    let Ok(url) = Url::parse(&format!("http://mock{}", parts[1])) else {
        send_response(&mut stream, 400, "Bad Request", "{}");
        return;
    };
    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };

    // Tautulli reports a bad key inside a 200 envelope
    if param("apikey").as_deref() != Some(MOCK_API_KEY) {
        let body = envelope("error", Some("Invalid apikey"), json!({}));
        send_response(&mut stream, 200, "OK", &body);
        return;
    }

    match url.path() {
        "/get_users" => {
            if let Some(status) = config.users_status {
                send_response(&mut stream, status, "Error", r#"{"error": "forced"}"#);
                return;
            }
            let rows: Vec<JsonValue> = config
                .users
                .iter()
                .map(|u| {
                    json!({
                        "user_id": u.user_id,
                        "username": u.username,
                        "friendly_name": u.username,
                        "email": u.email,
                        "is_active": 1,
                    })
                })
                .collect();
            let body = envelope("success", None, JsonValue::Array(rows));
            send_response(&mut stream, 200, "OK", &body);
        }
        "/get_user_watch_history" => {
            if let Some(status) = config.history_status {
                send_response(&mut stream, status, "Error", r#"{"error": "forced"}"#);
                return;
            }
            let user_id = param("user_id").and_then(|v| v.parse::<i64>().ok());
            let rows: Vec<JsonValue> = config
                .users
                .iter()
                .filter(|u| Some(u.user_id) == user_id)
                .filter_map(|u| u.last_watched)
                .map(|date| json!({ "date": date, "title": "Some Movie" }))
                .collect();
            let data = if config.paged_history {
                json!({ "recordsTotal": rows.len(), "data": rows })
            } else {
                JsonValue::Array(rows)
            };
            send_response(&mut stream, 200, "OK", &envelope("success", None, data));
        }
        _ => send_response(&mut stream, 404, "Not Found", r#"{"error": "Endpoint not found"}"#),
    }
}

fn envelope(result: &str, message: Option<&str>, data: JsonValue) -> String {
    json!({ "response": { "result": result, "message": message, "data": data } }).to_string()
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    use crate::adapters::dry_run::DryRunNotifier;
    use crate::adapters::tautulli::TautulliClient;
    use crate::domain::OutcomeStatus;
    use crate::ports::ActivitySource;
    use crate::services::ReconcileService;

    fn days_ago(days: i64) -> i64 {
        (Utc::now() - Duration::days(days)).timestamp()
    }

    fn client_for(server: &MockTautulliServer) -> TautulliClient {
        TautulliClient::new(&server.base_url(), MOCK_API_KEY).unwrap()
    }

    #[test]
    fn test_mock_server_users() {
        let server = MockTautulliServer::start(MockConfig {
            users: vec![
                MockUser::new(1, "alice", Some(days_ago(45))),
                MockUser::new(2, "bob", None),
            ],
            ..Default::default()
        })
        .unwrap();

        let users = client_for(&server).list_users().unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].user_id, "1");
        assert_eq!(users[0].email, "alice@example.com");
    }

    #[test]
    fn test_mock_server_last_activity() {
        let watched = days_ago(10);
        let server = MockTautulliServer::start(MockConfig {
            users: vec![MockUser::new(1, "bob", Some(watched)), MockUser::new(2, "carol", None)],
            ..Default::default()
        })
        .unwrap();

        let client = client_for(&server);
        let record = client.last_activity("1").unwrap().unwrap();
        assert_eq!(record.last_seen.timestamp(), watched);
        assert!(client.last_activity("2").unwrap().is_none());
    }

    #[test]
    fn test_mock_server_paged_history() {
        let watched = days_ago(3);
        let server = MockTautulliServer::start(MockConfig {
            users: vec![MockUser::new(9, "dave", Some(watched))],
            paged_history: true,
            ..Default::default()
        })
        .unwrap();

        let record = client_for(&server).last_activity("9").unwrap().unwrap();
        assert_eq!(record.last_seen.timestamp(), watched);
    }

    #[test]
    fn test_mock_server_bad_api_key() {
        let server = MockTautulliServer::start(MockConfig::default()).unwrap();
        let client = TautulliClient::new(&server.base_url(), "wrong_key").unwrap();

        let err = client.list_users().unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("Invalid apikey"), "got: {}", err);
    }

    #[test]
    fn test_mock_server_http_500() {
        let server = MockTautulliServer::start(MockConfig {
            users_status: Some(500),
            ..Default::default()
        })
        .unwrap();

        let err = client_for(&server).list_users().unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("HTTP 500"), "got: {}", err);
    }

    #[test]
    fn test_roster_500_aborts_pass_without_notices() {
        let server = MockTautulliServer::start(MockConfig {
            users: vec![MockUser::new(1, "alice", Some(days_ago(45)))],
            users_status: Some(500),
            ..Default::default()
        })
        .unwrap();

        let notifier = Arc::new(DryRunNotifier::new());
        let service = ReconcileService::new(Arc::new(client_for(&server)), notifier.clone(), "admin@example.com", 30);

        let result = service.run(Utc::now());
        assert!(result.unwrap_err().is_transport());
        assert!(notifier.notices().is_empty());
        // Only the roster request was made
        assert_eq!(server.request_count(), 1);
    }

    #[test]
    fn test_history_failure_aborts_pass() {
        let server = MockTautulliServer::start(MockConfig {
            users: vec![MockUser::new(1, "alice", Some(days_ago(45)))],
            history_status: Some(502),
            ..Default::default()
        })
        .unwrap();

        let notifier = Arc::new(DryRunNotifier::new());
        let service = ReconcileService::new(Arc::new(client_for(&server)), notifier.clone(), "admin@example.com", 30);

        assert!(service.run(Utc::now()).unwrap_err().is_transport());
        assert!(notifier.notices().is_empty());
    }

    #[test]
    fn test_full_pass_over_http() {
        let server = MockTautulliServer::start(MockConfig {
            users: vec![
                MockUser::new(1, "alice", Some(days_ago(45))),
                MockUser::new(2, "bob", Some(days_ago(10))),
                MockUser::new(3, "carol", None),
            ],
            ..Default::default()
        })
        .unwrap();

        let notifier = Arc::new(DryRunNotifier::new());
        let service = ReconcileService::new(Arc::new(client_for(&server)), notifier.clone(), "admin@example.com", 30);

        let report = service.run(Utc::now()).unwrap();
        assert_eq!(report.users_checked(), 3);
        assert_eq!(report.outcomes[0].status, OutcomeStatus::Notified);
        assert_eq!(report.outcomes[1].status, OutcomeStatus::Skipped);
        assert_eq!(report.outcomes[2].status, OutcomeStatus::Skipped);

        let sent = notifier.notices();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "alice@example.com");
        assert!(sent[0].body.contains("45 days"));
    }
}
