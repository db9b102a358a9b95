/// Test email endpoint
///
/// # Endpoint
///
/// ```text
/// POST /test-email
/// ```
///
/// # Request
///
/// Check provider connectivity without sending anything:
///
/// ```json
/// { "action": "verify" }
/// ```
///
/// Send a test notification:
///
/// ```json
/// { "action": "test", "testEmail": "ops@example.com" }
/// ```
///
/// # Responses
///
/// - `verify`: 200 `{"success": true, "message": ...}` or 200
///   `{"success": false, "error": ...}`
/// - `test`: 200 `{"success": true, "message": ..., "result": {"id": ...}}`;
///   a failed send is 500 `{"error": "email_send_failed", "message": ...}`
/// - Malformed JSON, unknown action, missing or invalid address: 400

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use storefront_shared::email::{EmailMessage, SendReceipt};
use tracing::{info, warn};
use validator::Validate;

/// Test email request
#[derive(Debug, Deserialize, Validate)]
pub struct TestEmailRequest {
    /// "verify" or "test"
    pub action: String,

    /// Recipient, required for "test"
    #[serde(rename = "testEmail")]
    #[validate(email(message = "testEmail must be a valid email address"))]
    pub test_email: Option<String>,
}

/// Test email response
#[derive(Debug, Serialize, Deserialize)]
pub struct TestEmailResponse {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SendReceipt>,
}

enum Action {
    Verify,
    Test(String),
}

impl TestEmailRequest {
    fn into_action(self) -> ApiResult<Action> {
        self.validate()
            .map_err(|e| ApiError::BadRequest(format!("Invalid request: {}", e)))?;

        match self.action.as_str() {
            "verify" => Ok(Action::Verify),
            "test" => match self.test_email {
                Some(to) if !to.trim().is_empty() => Ok(Action::Test(to.trim().to_string())),
                _ => Err(ApiError::BadRequest(
                    "testEmail is required for action \"test\"".to_string(),
                )),
            },
            other => Err(ApiError::BadRequest(format!(
                "Unknown action \"{}\", expected \"verify\" or \"test\"",
                other
            ))),
        }
    }
}

/// Test email handler
pub async fn test_email(
    State(state): State<AppState>,
    payload: Result<Json<TestEmailRequest>, JsonRejection>,
) -> ApiResult<Json<TestEmailResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    match request.into_action()? {
        Action::Verify => Ok(Json(verify(&state).await)),
        Action::Test(to) => send_test(&state, &to).await.map(Json),
    }
}

async fn verify(state: &AppState) -> TestEmailResponse {
    let Some(mailer) = &state.mailer else {
        return TestEmailResponse {
            success: false,
            message: None,
            error: Some("Email transport is not configured".to_string()),
            result: None,
        };
    };

    match mailer.verify().await {
        Ok(()) => {
            info!(transport = mailer.name(), "Email provider verified on request");
            TestEmailResponse {
                success: true,
                message: Some("Email provider connection verified".to_string()),
                error: None,
                result: None,
            }
        }
        Err(e) => {
            warn!(transport = mailer.name(), error = %e, "Email provider verification failed");
            TestEmailResponse {
                success: false,
                message: None,
                error: Some(e.to_string()),
                result: None,
            }
        }
    }
}

async fn send_test(state: &AppState, to: &str) -> ApiResult<TestEmailResponse> {
    let mailer = state
        .mailer
        .as_ref()
        .ok_or_else(|| ApiError::EmailFailed("Email transport is not configured".to_string()))?;

    let message = EmailMessage::test_notification(to, &state.config.site.domain, &Utc::now().to_rfc3339());
    let receipt = mailer.send(&message).await?;

    info!(message_id = %receipt.id, "Test email sent");

    Ok(TestEmailResponse {
        success: true,
        message: Some(format!("Test email sent to {}", to)),
        error: None,
        result: Some(receipt),
    })
}
