/// Per-user upload accounting: profile, subscription, one-time purchases
///
/// These rows are what the upload-limit maintenance scripts repair. Each user
/// has at most one profile and at most one subscription (unique `user_id`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Upload counters attached to a user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub upload_count: i32,
    pub upload_limit: i32,
    pub updated_at: DateTime<Utc>,
}

/// Recurring plan attached to a user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_type: String,
    pub upload_limit: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Credits bought once, consumed by uploads
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OneTimePurchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub credits: i32,
    pub uploads_used: i32,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Creates the profile for a user
    pub async fn create(pool: &PgPool, user_id: Uuid, upload_limit: i32) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id, upload_limit)
            VALUES ($1, $2)
            RETURNING id, user_id, upload_count, upload_limit, updated_at
            "#,
        )
        .bind(user_id)
        .bind(upload_limit)
        .fetch_one(pool)
        .await
    }

    /// Finds the profile of a user
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, user_id, upload_count, upload_limit, updated_at
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }
}

impl Subscription {
    /// Creates the subscription for a user
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        plan_type: &str,
        upload_limit: i32,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Subscription>(
            r#"
            INSERT INTO subscriptions (user_id, plan_type, upload_limit)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, plan_type, upload_limit, status, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(plan_type)
        .bind(upload_limit)
        .fetch_one(pool)
        .await
    }

    /// Finds the subscription of a user
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subscription>(
            r#"
            SELECT id, user_id, plan_type, upload_limit, status, created_at, updated_at
            FROM subscriptions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }
}

impl OneTimePurchase {
    /// Records a purchase of `credits` uploads
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        credits: i32,
        uploads_used: i32,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, OneTimePurchase>(
            r#"
            INSERT INTO one_time_purchases (user_id, credits, uploads_used)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, credits, uploads_used, created_at
            "#,
        )
        .bind(user_id)
        .bind(credits)
        .bind(uploads_used)
        .fetch_one(pool)
        .await
    }

    /// Finds a purchase by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, OneTimePurchase>(
            "SELECT id, user_id, credits, uploads_used, created_at FROM one_time_purchases WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists a user's purchases, oldest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, OneTimePurchase>(
            r#"
            SELECT id, user_id, credits, uploads_used, created_at
            FROM one_time_purchases
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Credits still available
    pub fn remaining(&self) -> i32 {
        (self.credits - self.uploads_used).max(0)
    }
}
