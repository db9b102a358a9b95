//! Outbound email
//!
//! Notifications go through a [`MailTransport`]. The production transport is
//! [`resend::ResendTransport`], an HTTP client for a Resend-compatible API.
//! Handlers hold the transport as `Arc<dyn MailTransport>` so tests can swap
//! in their own.

pub mod resend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::env;

/// Error type for email operations
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// No transport configured (missing API key or sender)
    #[error("Email transport is not configured: {0}")]
    NotConfigured(String),

    /// Provider could not be reached
    #[error("Email provider unreachable: {0}")]
    Unreachable(String),

    /// Provider rejected the credentials
    #[error("Email provider rejected credentials (status {0})")]
    Unauthorized(u16),

    /// Provider answered with an unexpected status
    #[error("Email provider returned status {status}: {body}")]
    Provider { status: u16, body: String },
}

/// Email settings read from the environment
///
/// Secrets are never logged or serialized; diagnostics only report whether
/// each value is present.
#[derive(Debug, Clone, Default)]
pub struct EmailConfig {
    /// Provider API key (`EMAIL_API_KEY`)
    pub api_key: Option<String>,

    /// Sender address (`EMAIL_FROM`)
    pub from: Option<String>,

    /// Recipient for admin notifications (`ADMIN_EMAIL`)
    pub admin_email: Option<String>,

    /// Provider base URL (`EMAIL_API_URL`)
    pub api_url: String,
}

/// Default provider endpoint
pub const DEFAULT_API_URL: &str = "https://api.resend.com";

impl EmailConfig {
    /// Reads `EMAIL_API_KEY`, `EMAIL_FROM`, `ADMIN_EMAIL` and `EMAIL_API_URL`
    ///
    /// Blank values count as absent.
    pub fn from_env() -> Self {
        Self {
            api_key: non_blank_var("EMAIL_API_KEY"),
            from: non_blank_var("EMAIL_FROM"),
            admin_email: non_blank_var("ADMIN_EMAIL"),
            api_url: non_blank_var("EMAIL_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        }
    }

    /// Whether enough is configured to build a transport
    pub fn is_complete(&self) -> bool {
        self.api_key.is_some() && self.from.is_some()
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// A message ready to send
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl EmailMessage {
    /// The message sent by the test-email endpoint
    pub fn test_notification(to: &str, site: &str, sent_at: &str) -> Self {
        let subject = format!("Test email from {}", site);
        let text = format!(
            "This is a test notification from {}.\n\nSent at {}.\nIf you received it, email delivery is working.",
            site, sent_at
        );
        let html = format!(
            "<p>This is a test notification from <strong>{}</strong>.</p>\
             <p>Sent at {}.</p><p>If you received it, email delivery is working.</p>",
            site, sent_at
        );

        Self {
            to: to.to_string(),
            subject,
            text,
            html,
        }
    }
}

/// Provider acknowledgement of a sent message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReceipt {
    /// Provider message id
    pub id: String,
}

/// Something that can deliver email
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Short name shown in diagnostics
    fn name(&self) -> &'static str;

    /// Checks that the provider is reachable and accepts our credentials
    async fn verify(&self) -> Result<(), EmailError>;

    /// Sends one message
    async fn send(&self, message: &EmailMessage) -> Result<SendReceipt, EmailError>;
}
