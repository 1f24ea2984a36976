//! SMTP notifier
//!
//! Submits each notice over implicit TLS (SMTPS, port 465 by default) with
//! the sender's credentials. A connection is opened per message and closed
//! once the message is accepted.

use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::domain::result::NotifyError;
use crate::domain::InactivityNotice;
use crate::ports::Notifier;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;

/// Notifier delivering through an SMTP submission server
#[derive(Debug)]
pub struct SmtpNotifier {
    host: String,
    port: u16,
    credentials: Credentials,
}

impl SmtpNotifier {
    pub fn new(host: &str, port: u16, username: &str, password: &str) -> Result<Self> {
        if host.trim().is_empty() {
            anyhow::bail!("SMTP host cannot be empty");
        }
        if username.is_empty() {
            anyhow::bail!("SMTP username cannot be empty");
        }

        Ok(Self {
            host: host.trim().to_string(),
            port,
            credentials: Credentials::new(username.to_string(), password.to_string()),
        })
    }

    fn build_message(&self, notice: &InactivityNotice) -> Result<Message> {
        let from: Mailbox = notice
            .sender
            .parse()
            .with_context(|| format!("Invalid sender address '{}'", notice.sender))?;
        let to: Mailbox = notice
            .recipient
            .parse()
            .with_context(|| format!("Invalid recipient address '{}'", notice.recipient))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(notice.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(notice.body.clone())
            .context("Failed to build message")
    }

    fn transport(&self) -> Result<SmtpTransport> {
        let transport = SmtpTransport::relay(&self.host)
            .with_context(|| format!("Invalid SMTP host '{}'", self.host))?
            .port(self.port)
            .credentials(self.credentials.clone())
            .build();
        Ok(transport)
    }

    fn deliver(&self, notice: &InactivityNotice) -> Result<()> {
        let message = self.build_message(notice)?;
        self.transport()?
            .send(&message)
            .with_context(|| format!("SMTP delivery via {}:{} failed", self.host, self.port))?;
        Ok(())
    }
}

impl Notifier for SmtpNotifier {
    fn name(&self) -> &str {
        "smtp"
    }

    fn send(&self, notice: &InactivityNotice) -> std::result::Result<(), NotifyError> {
        self.deliver(notice)
            .map_err(|e| NotifyError::new(&notice.username, &notice.recipient, format!("{:#}", e)))
    }
}
