//! # Storefront Maintenance CLI
//!
//! ```bash
//! cargo run -p storefront-maint -- seed-dummy-product --price 1200
//! cargo run -p storefront-maint -- raise-upload-limits --to 25 --dry-run
//! cargo run -p storefront-maint -- test-mode on
//! ```
//!
//! Exits 0 on success and 1 on any failure.

use clap::Parser;
use std::process::ExitCode;
use storefront_maint::{cli::Cli, commands};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before clap reads env fallbacks
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront_maint=info,storefront_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    tracing::debug!(command = ?cli.command, "Starting");

    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Command failed");
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
