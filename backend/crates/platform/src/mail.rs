//! Outbound Mail Transport
//!
//! Mail is handed to an HTTP relay (JSON over HTTPS with a bearer key).
//! Without relay settings, messages are written to the log instead.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail relay request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail relay rejected message with status {0}")]
    Rejected(u16),
}

#[trait_variant::make(Mailer: Send)]
pub trait LocalMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError>;
}

#[derive(Debug, Clone)]
pub struct HttpMailerConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Relay client.
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    config: HttpMailerConfig,
}

impl HttpMailer {
    pub fn new(config: HttpMailerConfig) -> Result<Self, MailError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

impl Mailer for HttpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(mail)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MailError::Rejected(status.as_u16()));
        }
        Ok(())
    }
}

/// Development transport: logs instead of sending.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        tracing::info!(
            to = %mail.to,
            subject = %mail.subject,
            "Mail relay not configured, logging mail"
        );
        tracing::debug!(body = %mail.text, "Mail body");
        Ok(())
    }
}

pub enum MailTransport {
    Http(HttpMailer),
    Log(LogMailer),
}

impl Mailer for MailTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        match self {
            MailTransport::Http(m) => Mailer::send(m, mail).await,
            MailTransport::Log(m) => Mailer::send(m, mail).await,
        }
    }
}
