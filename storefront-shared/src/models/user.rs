/// User model and identity lookups
///
/// A user can be reached through three keys: the internal id, the identity
/// provider subject (`supabase_user_id`), and the email address. Accounts are
/// created by both the storefront's sign-up flow and the identity provider, so
/// the provider subject is not always linked. Email lookups therefore compare
/// case-folded values.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email TEXT NOT NULL UNIQUE,
///     supabase_user_id TEXT UNIQUE,
///     name TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Internal user ID
    pub id: Uuid,

    /// Email address as entered at sign-up
    pub email: String,

    /// Identity provider subject, when the account has been linked
    pub supabase_user_id: Option<String>,

    /// Optional display name
    pub name: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub supabase_user_id: Option<String>,
    pub name: Option<String>,
}

/// Lowercases and trims an email for comparison
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

const USER_COLUMNS: &str = "id, email, supabase_user_id, name, created_at, updated_at";

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the email or provider subject already exists.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO users (email, supabase_user_id, name) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(data.email)
            .bind(data.supabase_user_id)
            .bind(data.name)
            .fetch_one(pool)
            .await
    }

    /// Finds a user by internal ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by identity provider subject
    pub async fn find_by_supabase_id(
        pool: &PgPool,
        supabase_user_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {} FROM users WHERE supabase_user_id = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&sql)
            .bind(supabase_user_id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email, ignoring case and surrounding whitespace
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {} FROM users WHERE lower(email) = $1", USER_COLUMNS);

        sqlx::query_as::<_, User>(&sql)
            .bind(normalize_email(email))
            .fetch_optional(pool)
            .await
    }

    /// Deletes a user by ID
    ///
    /// Profiles, subscriptions and purchases cascade. Custom product requests
    /// keep their email and lose the link.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
