/// Email diagnostics endpoint
///
/// # Endpoint
///
/// ```text
/// GET /email-diagnostics
/// ```
///
/// # Response
///
/// ```json
/// {
///   "timestamp": "2025-01-01T12:00:00Z",
///   "environment": {
///     "email_api_key": true,
///     "email_from": true,
///     "admin_email": false,
///     "custom_api_url": false,
///     "app_env": "production"
///   },
///   "transporter": { "exists": true, "status": "configured" },
///   "connection": { "success": false, "error": "Email provider rejected credentials (status 401)" }
/// }
/// ```
///
/// Only presence flags are reported, never the configured values. The
/// connectivity probe runs under a timeout and inside `catch_unwind`; whatever
/// happens to it ends up in `connection`, and the response is still 200.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use storefront_shared::email::{MailTransport, DEFAULT_API_URL};
use tracing::{error, info, warn};

#[derive(Debug, Serialize, Deserialize)]
pub struct DiagnosticsResponse {
    pub timestamp: DateTime<Utc>,
    pub environment: EnvironmentReport,
    pub transporter: TransporterReport,
    pub connection: ConnectionReport,
}

/// Which settings are present
#[derive(Debug, Serialize, Deserialize)]
pub struct EnvironmentReport {
    pub email_api_key: bool,
    pub email_from: bool,
    pub admin_email: bool,

    /// True when `EMAIL_API_URL` points somewhere other than the default
    pub custom_api_url: bool,

    pub app_env: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransporterReport {
    pub exists: bool,

    /// "configured" or "missing"
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectionReport {
    pub success: bool,
    pub error: Option<String>,
}

impl ConnectionReport {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

/// Email diagnostics handler
pub async fn email_diagnostics(State(state): State<AppState>) -> ApiResult<Json<DiagnosticsResponse>> {
    let email = &state.config.email;

    let environment = EnvironmentReport {
        email_api_key: email.api_key.is_some(),
        email_from: email.from.is_some(),
        admin_email: email.admin_email.is_some(),
        custom_api_url: email.api_url != DEFAULT_API_URL,
        app_env: state.config.site.app_env.clone(),
    };

    let (transporter, connection) = match &state.mailer {
        Some(mailer) => (
            TransporterReport {
                exists: true,
                status: "configured".to_string(),
            },
            probe(mailer.as_ref(), state.probe_timeout).await,
        ),
        None => (
            TransporterReport {
                exists: false,
                status: "missing".to_string(),
            },
            ConnectionReport::failed("Email transport is not configured"),
        ),
    };

    info!(
        transporter = transporter.exists,
        connected = connection.success,
        "Email diagnostics collected"
    );

    Ok(Json(DiagnosticsResponse {
        timestamp: Utc::now(),
        environment,
        transporter,
        connection,
    }))
}

/// Runs the provider check, turning errors, timeouts and panics into a report
pub async fn probe(mailer: &dyn MailTransport, timeout: Duration) -> ConnectionReport {
    let verify = AssertUnwindSafe(mailer.verify()).catch_unwind();

    match tokio::time::timeout(timeout, verify).await {
        Ok(Ok(Ok(()))) => ConnectionReport::ok(),
        Ok(Ok(Err(e))) => {
            warn!(transport = mailer.name(), error = %e, "Email provider check failed");
            ConnectionReport::failed(e.to_string())
        }
        Ok(Err(panic)) => {
            let panic_msg = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(transport = mailer.name(), "Email provider check panicked: {}", panic_msg);
            ConnectionReport::failed(format!("Connectivity check panicked: {}", panic_msg))
        }
        Err(_) => {
            warn!(transport = mailer.name(), ?timeout, "Email provider check timed out");
            ConnectionReport::failed(format!(
                "Connectivity check timed out after {}ms",
                timeout.as_millis()
            ))
        }
    }
}
