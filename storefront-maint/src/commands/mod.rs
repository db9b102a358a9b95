/// Subcommand implementations
///
/// Each command takes the process-wide pool explicitly and returns
/// `anyhow::Result`, printing a human-readable trace as it goes. Anything
/// that reaches `main` as an error exits the process with status 1.

pub mod accounts;
pub mod newsletter;
pub mod products;
pub mod schema;
pub mod test_mode;

use crate::cli::{Cli, Command};
use anyhow::Context;
use sqlx::PgPool;
use storefront_shared::db::pool::{close_pool, create_pool, DatabaseConfig};
use storefront_shared::maintenance::bulk::BulkUpdate;

/// Runs the parsed command line
///
/// `test-mode` only touches a local file and never opens a pool. Every other
/// command gets one pool for its whole run, closed before returning.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Command::TestMode { state, file, key } = &cli.command {
        return test_mode::run(file, key, *state);
    }

    let url = cli
        .database_url
        .clone()
        .context("DATABASE_URL is not set (use --database-url or the environment)")?;

    let pool = create_pool(DatabaseConfig {
        url,
        ..DatabaseConfig::for_script()
    })
    .await
    .context("Failed to connect to the database")?;

    let result = dispatch(&pool, cli.command).await;
    close_pool(pool).await;
    result
}

/// Routes a database command to its implementation
pub async fn dispatch(pool: &PgPool, command: Command) -> anyhow::Result<()> {
    match command {
        Command::UpsertProduct(args) => products::upsert_product(pool, args).await,
        Command::SeedDummyProduct { price } => products::seed_dummy_product(pool, price).await,
        Command::DeleteProducts { slugs } => products::delete_products(pool, &slugs).await,
        Command::HideTestProducts { dry_run } => products::hide_test_products(pool, dry_run).await,
        Command::RaiseUploadLimits { to, dry_run } => {
            accounts::raise_upload_limits(pool, to, dry_run).await
        }
        Command::ResetPurchaseUsage { over, dry_run } => {
            accounts::reset_purchase_usage(pool, over, dry_run).await
        }
        Command::SetRequestStatus { from, to, dry_run } => {
            accounts::set_request_status(pool, &from, &to, dry_run).await
        }
        Command::UserRequests(keys) => accounts::user_requests(pool, keys).await,
        Command::LinkRequests => accounts::link_requests(pool).await,
        Command::EnsureSchema => schema::ensure_schema(pool).await,
        Command::Newsletter { action } => newsletter::run(pool, action).await,
        Command::TestMode { state, file, key } => test_mode::run(&file, &key, state),
    }
}

/// Applies a bulk update, or only counts its matches when `dry_run` is set
///
/// Returns the number of rows changed (or that would change).
pub(crate) async fn apply_bulk(pool: &PgPool, update: &BulkUpdate, dry_run: bool) -> anyhow::Result<u64> {
    let table = update.table_name();
    let filter = update.describe_filter();

    if dry_run {
        let matching = update
            .count_matching(pool)
            .await
            .with_context(|| format!("Failed to count rows in {}", table))?;
        println!("[dry-run] {}: {} row(s) match {}", table, matching, filter);
        return Ok(u64::try_from(matching).unwrap_or(0));
    }

    let affected = update
        .execute(pool)
        .await
        .with_context(|| format!("Failed to update {}", table))?;
    println!("{}: {} row(s) updated where {}", table, affected, filter);
    Ok(affected)
}
