/// Newsletter subscribers
///
/// The table is created by the schema guard (`ensure-schema`), not by the
/// baseline migration. Emails are stored lowercased so the unique index also
/// deduplicates case variants.

use crate::models::user::normalize_email;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Subscription state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "newsletter_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NewsletterStatus {
    Active,
    Unsubscribed,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NewsletterSubscriber {
    pub id: Uuid,
    pub email: String,
    pub status: NewsletterStatus,
    pub subscribed_at: DateTime<Utc>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

impl NewsletterSubscriber {
    /// Subscribes an email, reactivating it if it had unsubscribed
    ///
    /// Upsert keyed by the normalized email; never creates a duplicate.
    pub async fn subscribe(pool: &PgPool, email: &str) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, NewsletterSubscriber>(
            r#"
            INSERT INTO newsletter_subscribers (email)
            VALUES ($1)
            ON CONFLICT (email) DO UPDATE
            SET status = 'active',
                subscribed_at = CASE
                    WHEN newsletter_subscribers.status = 'active' THEN newsletter_subscribers.subscribed_at
                    ELSE NOW()
                END,
                unsubscribed_at = NULL
            RETURNING id, email, status, subscribed_at, unsubscribed_at
            "#,
        )
        .bind(normalize_email(email))
        .fetch_one(pool)
        .await
    }

    /// Unsubscribes an active email
    ///
    /// Returns false when the email is unknown or already unsubscribed.
    pub async fn unsubscribe(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE newsletter_subscribers
            SET status = 'unsubscribed', unsubscribed_at = NOW()
            WHERE email = $1 AND status = 'active'
            "#,
        )
        .bind(normalize_email(email))
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Finds a subscriber by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, NewsletterSubscriber>(
            r#"
            SELECT id, email, status, subscribed_at, unsubscribed_at
            FROM newsletter_subscribers
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await
    }
}
