//! # Storefront Diagnostics Server
//!
//! Serves `/health`, `/email-diagnostics`, `/test-email` and `/robots.txt`.
//!
//! The database pool is created lazily so the server comes up (and can
//! report the outage) while the store is down.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p storefront-api
//! ```

use std::sync::Arc;
use storefront_api::{
    app::{build_router, AppState},
    config::Config,
};
use storefront_shared::db::pool::{close_pool, create_lazy_pool, DatabaseConfig};
use storefront_shared::email::{resend::ResendTransport, MailTransport};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_api=debug,storefront_shared=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Storefront diagnostics server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_lazy_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: 0,
        ..Default::default()
    })?;

    let mailer: Option<Arc<dyn MailTransport>> = if config.email.is_complete() {
        Some(Arc::new(ResendTransport::from_config(&config.email)?))
    } else {
        tracing::warn!("EMAIL_API_KEY or EMAIL_FROM missing, email transport disabled");
        None
    };

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(pool.clone(), config, mailer));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received, draining connections...");
        })
        .await?;

    close_pool(pool).await;
    Ok(())
}
