use crate::cli::NewsletterAction;
use anyhow::{bail, Context};
use sqlx::PgPool;
use storefront_shared::models::newsletter::NewsletterSubscriber;
use storefront_shared::models::user::normalize_email;
use tracing::info;

pub async fn run(pool: &PgPool, action: NewsletterAction) -> anyhow::Result<()> {
    match action {
        NewsletterAction::Subscribe { email } => subscribe(pool, &email).await,
        NewsletterAction::Unsubscribe { email } => unsubscribe(pool, &email).await,
    }
}

fn checked_email(raw: &str) -> anyhow::Result<String> {
    let email = normalize_email(raw);
    if email.is_empty() || !email.contains('@') {
        bail!("'{}' is not an email address", raw);
    }
    Ok(email)
}

async fn subscribe(pool: &PgPool, raw: &str) -> anyhow::Result<()> {
    let email = checked_email(raw)?;
    let subscriber = NewsletterSubscriber::subscribe(pool, &email)
        .await
        .with_context(|| format!("Failed to subscribe {}", email))?;

    println!(
        "{} is subscribed (since {})",
        subscriber.email, subscriber.subscribed_at
    );
    Ok(())
}

async fn unsubscribe(pool: &PgPool, raw: &str) -> anyhow::Result<()> {
    let email = checked_email(raw)?;
    let changed = NewsletterSubscriber::unsubscribe(pool, &email)
        .await
        .with_context(|| format!("Failed to unsubscribe {}", email))?;

    if changed {
        println!("{} is unsubscribed", email);
    } else {
        info!(email = %email, "Not an active subscriber, nothing to do");
        println!("{} was not an active subscriber", email);
    }
    Ok(())
}
