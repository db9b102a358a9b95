/// Account maintenance: upload limits, purchase usage, request status,
/// request lookup and identity linkage

use super::apply_bulk;
use crate::cli::UserKeys;
use anyhow::{bail, Context};
use sqlx::PgPool;
use storefront_shared::maintenance::bulk::{BulkUpdate, Comparison};
use storefront_shared::maintenance::resolver::{Resolution, UserResolver};
use storefront_shared::models::request::CustomProductRequest;
use tracing::info;

/// Profile and subscription updates raising every limit below `to`
pub fn raise_upload_limit_updates(to: i32) -> [BulkUpdate; 2] {
    ["user_profiles", "subscriptions"].map(|table| {
        BulkUpdate::table(table)
            .set("upload_limit", to)
            .filter("upload_limit", Comparison::Lt, to)
            .touch_updated_at()
    })
}

/// Raises profile limits, then subscription limits
///
/// The two tables are updated by separate statements, each atomic on its own.
/// If the subscription update fails the profile update stays applied; the
/// filter skips rows already at `to`, so re-running finishes the job.
pub async fn raise_upload_limits(pool: &PgPool, to: i32, dry_run: bool) -> anyhow::Result<()> {
    let mut total = 0;
    for update in raise_upload_limit_updates(to) {
        let done = total;
        total += apply_bulk(pool, &update, dry_run).await.with_context(|| {
            format!(
                "Failed to raise {} limits ({} rows already updated); re-run to finish",
                update.table_name(),
                done
            )
        })?;
    }
    info!(to, total, dry_run, "Raise upload limits finished");
    Ok(())
}

pub fn reset_purchase_usage_update(over: i32) -> BulkUpdate {
    BulkUpdate::table("one_time_purchases")
        .set("uploads_used", over)
        .filter("uploads_used", Comparison::Gt, over)
}

pub async fn reset_purchase_usage(pool: &PgPool, over: i32, dry_run: bool) -> anyhow::Result<()> {
    let capped = apply_bulk(pool, &reset_purchase_usage_update(over), dry_run).await?;
    info!(over, capped, dry_run, "Reset purchase usage finished");
    Ok(())
}

pub fn set_request_status_update(from: &str, to: &str) -> anyhow::Result<BulkUpdate> {
    let (from, to) = (from.trim(), to.trim());
    if from.is_empty() || to.is_empty() {
        bail!("request status must not be blank");
    }
    if from == to {
        bail!("--from and --to are both '{}', nothing to change", from);
    }

    Ok(BulkUpdate::table("custom_product_requests")
        .set("status", to.to_string())
        .filter("status", Comparison::Eq, from.to_string())
        .touch_updated_at())
}

pub async fn set_request_status(pool: &PgPool, from: &str, to: &str, dry_run: bool) -> anyhow::Result<()> {
    let update = set_request_status_update(from, to)?;
    let moved = apply_bulk(pool, &update, dry_run).await?;
    info!(from, to, moved, dry_run, "Set request status finished");
    Ok(())
}

/// Resolver trying id, provider subject, then email
pub fn resolver_for(keys: &UserKeys) -> UserResolver {
    let mut resolver = UserResolver::new();
    if let Some(id) = keys.id {
        resolver = resolver.by_id(id);
    }
    if let Some(subject) = &keys.supabase_id {
        resolver = resolver.by_supabase_id(subject);
    }
    if let Some(email) = &keys.email {
        resolver = resolver.by_email(email);
    }
    resolver
}

/// Prints a user's requests with their quotes and order
///
/// An unmatched user is reported and is not an error.
pub async fn user_requests(pool: &PgPool, keys: UserKeys) -> anyhow::Result<()> {
    let resolver = resolver_for(&keys);
    if resolver.is_empty() {
        bail!("every lookup key was blank");
    }

    let (user, matched_by) = match resolver.resolve(pool).await.context("User lookup failed")? {
        Resolution::Found { user, matched_by } => (user, matched_by),
        Resolution::NotFound => {
            println!("No user matched the given keys");
            return Ok(());
        }
    };

    println!("User {} <{}> (matched by {})", user.id, user.email, matched_by);

    let details = CustomProductRequest::list_details_for_user(pool, user.id, &user.email)
        .await
        .context("Failed to load custom product requests")?;

    if details.is_empty() {
        println!("No custom product requests");
        return Ok(());
    }

    for entry in &details {
        let request = &entry.request;
        let linked = if request.user_id.is_some() { "linked" } else { "email only" };
        println!(
            "- {} [{}] {} ({}), created {}",
            request.id, request.status, request.project_type, linked, request.created_at
        );
        for quote in &entry.quotes {
            println!(
                "    quote {} {} {} [{}] {}",
                quote.id, quote.amount, quote.currency, quote.status, quote.created_at
            );
        }
        match &entry.order {
            Some(order) => println!(
                "    order {} {} {} [{}]",
                order.id, order.amount, order.currency, order.status
            ),
            None => println!("    no order"),
        }
    }
    println!("{} request(s)", details.len());
    Ok(())
}

/// Links email-only requests to the matching accounts
pub async fn link_requests(pool: &PgPool) -> anyhow::Result<()> {
    let linked = CustomProductRequest::link_unlinked_by_email(pool)
        .await
        .context("Failed to link requests")?;
    let remaining = CustomProductRequest::count_unlinked(pool)
        .await
        .context("Failed to count unlinked requests")?;

    println!("Linked {} request(s); {} still without an account", linked, remaining);
    Ok(())
}
