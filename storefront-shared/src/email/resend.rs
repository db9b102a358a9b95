//! Resend-compatible HTTP transport
//!
//! `verify` lists sending domains (`GET /domains`), which fails fast on a bad
//! key without sending anything. `send` posts to `/emails`.

use super::{EmailConfig, EmailError, EmailMessage, MailTransport, SendReceipt};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Request body for `POST /emails`
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    text: &'a str,
    html: &'a str,
}

/// HTTP email transport
#[derive(Clone)]
pub struct ResendTransport {
    api_key: String,
    from: String,
    base_url: String,
    http_client: Client,
}

impl ResendTransport {
    pub fn new(api_key: String, from: String, base_url: String) -> Result<Self, EmailError> {
        let http_client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EmailError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            from,
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Builds a transport if the config has both an API key and a sender
    pub fn from_config(config: &EmailConfig) -> Result<Self, EmailError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| EmailError::NotConfigured("EMAIL_API_KEY is not set".to_string()))?;
        let from = config
            .from
            .clone()
            .ok_or_else(|| EmailError::NotConfigured("EMAIL_FROM is not set".to_string()))?;

        Self::new(api_key, from, config.api_url.clone())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, EmailError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(EmailError::Unauthorized(status.as_u16()));
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Email provider returned an error");
        Err(EmailError::Provider {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl MailTransport for ResendTransport {
    fn name(&self) -> &'static str {
        "resend"
    }

    async fn verify(&self) -> Result<(), EmailError> {
        debug!("Verifying email provider connectivity");

        let response = self
            .http_client
            .get(format!("{}/domains", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| EmailError::Unreachable(e.to_string()))?;

        Self::check_status(response).await?;
        debug!("Email provider verified");
        Ok(())
    }

    async fn send(&self, message: &EmailMessage) -> Result<SendReceipt, EmailError> {
        let body = SendRequest {
            from: &self.from,
            to: vec![message.to.as_str()],
            subject: &message.subject,
            text: &message.text,
            html: &message.html,
        };

        let response = self
            .http_client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::Unreachable(e.to_string()))?;

        let receipt = Self::check_status(response)
            .await?
            .json::<SendReceipt>()
            .await
            .map_err(|e| EmailError::Provider {
                status: 200,
                body: format!("unreadable response: {}", e),
            })?;

        debug!(message_id = %receipt.id, "Email sent");
        Ok(receipt)
    }
}
