/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use storefront_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config, None);
/// let app = storefront_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use storefront_shared::email::MailTransport;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Upper bound for the email provider probe in diagnostics
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Email transport, absent when the provider is not configured
    pub mailer: Option<Arc<dyn MailTransport>>,

    /// Upper bound for the diagnostics connectivity probe
    pub probe_timeout: Duration,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config, mailer: Option<Arc<dyn MailTransport>>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            mailer,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health              # Service and database status
/// ├── GET  /email-diagnostics   # Email configuration presence + provider probe
/// ├── POST /test-email          # Verify provider or send a test message
/// └── GET  /robots.txt          # Crawl rules for the requesting host
/// ```
///
/// Any other method on the diagnostics routes answers 405 with a JSON body.
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Panic recovery (a panicking handler answers 500 JSON)
/// 2. Logging (tower-http TraceLayer)
/// 3. CORS (tower-http CorsLayer)
/// 4. Security headers
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .max_age(Duration::from_secs(3600))
    };

    let production = state.config.site.is_production();

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/email-diagnostics",
            get(routes::diagnostics::email_diagnostics).fallback(only_get),
        )
        .route(
            "/test-email",
            post(routes::test_email::test_email).fallback(only_post),
        )
        .route("/robots.txt", get(routes::robots::robots_txt))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());

    ApiError::InternalError(format!("Handler panicked: {}", detail)).into_response()
}

async fn only_get(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(format!("Method {} not allowed, use GET", method))
}

async fn only_post(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(format!("Method {} not allowed, use POST", method))
}
