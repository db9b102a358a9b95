/// Custom product requests, their quotes and orders
///
/// Historical requests were stored either with a `user_id` or with only the
/// requester's `email`, depending on which flow created them. Until every row
/// is linked, lookups for a user must match on either column; see
/// [`CustomProductRequest::list_for_user`] and
/// [`CustomProductRequest::link_unlinked_by_email`].
///
/// # Schema
///
/// ```sql
/// CREATE TABLE custom_product_requests (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID REFERENCES users(id) ON DELETE SET NULL,
///     email TEXT,
///     project_type TEXT NOT NULL,
///     status TEXT NOT NULL DEFAULT 'pending',
///     description TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use crate::models::user::normalize_email;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// A customer's request for a made-to-order product
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CustomProductRequest {
    pub id: Uuid,

    /// Owning account, when linked
    pub user_id: Option<Uuid>,

    /// Requester email, when captured
    pub email: Option<String>,

    pub project_type: String,

    pub status: String,

    pub description: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Price offer made for a request
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Quote {
    pub id: Uuid,
    pub request_id: Uuid,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Order placed once a quote is accepted
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductOrder {
    pub id: Uuid,
    pub request_id: Uuid,
    pub status: String,
    pub amount: i64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a request
#[derive(Debug, Clone, Default)]
pub struct CreateRequest {
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    pub project_type: String,
    pub description: Option<String>,
}

/// A request with its quotes (oldest first) and optional order
#[derive(Debug, Clone, Serialize)]
pub struct RequestDetails {
    pub request: CustomProductRequest,
    pub quotes: Vec<Quote>,
    pub order: Option<ProductOrder>,
}

const REQUEST_COLUMNS: &str =
    "id, user_id, email, project_type, status, description, created_at, updated_at";

impl CustomProductRequest {
    /// Creates a request
    pub async fn create(pool: &PgPool, data: CreateRequest) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO custom_product_requests (user_id, email, project_type, description) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            REQUEST_COLUMNS
        );

        sqlx::query_as::<_, CustomProductRequest>(&sql)
            .bind(data.user_id)
            .bind(data.email)
            .bind(data.project_type)
            .bind(data.description)
            .fetch_one(pool)
            .await
    }

    /// Finds a request by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {} FROM custom_product_requests WHERE id = $1", REQUEST_COLUMNS);

        sqlx::query_as::<_, CustomProductRequest>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists a user's requests, newest first
    ///
    /// Matches rows linked by `user_id` OR carrying the user's email (compared
    /// lowercased) in one statement, so rows created before linking are not
    /// missed.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        email: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {} FROM custom_product_requests \
             WHERE user_id = $1 OR lower(email) = $2 \
             ORDER BY created_at DESC",
            REQUEST_COLUMNS
        );

        sqlx::query_as::<_, CustomProductRequest>(&sql)
            .bind(user_id)
            .bind(normalize_email(email))
            .fetch_all(pool)
            .await
    }

    /// Lists a user's requests together with quotes and orders
    pub async fn list_details_for_user(
        pool: &PgPool,
        user_id: Uuid,
        email: &str,
    ) -> Result<Vec<RequestDetails>, sqlx::Error> {
        let requests = Self::list_for_user(pool, user_id, email).await?;
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = requests.iter().map(|r| r.id).collect();

        let quotes = sqlx::query_as::<_, Quote>(
            r#"
            SELECT id, request_id, amount, currency, status, created_at
            FROM quotes
            WHERE request_id = ANY($1)
            ORDER BY created_at ASC
            "#,
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;

        let orders = sqlx::query_as::<_, ProductOrder>(
            r#"
            SELECT id, request_id, status, amount, currency, created_at
            FROM product_orders
            WHERE request_id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(pool)
        .await?;

        let mut quotes_by_request: HashMap<Uuid, Vec<Quote>> = HashMap::new();
        for quote in quotes {
            quotes_by_request.entry(quote.request_id).or_default().push(quote);
        }

        let mut order_by_request: HashMap<Uuid, ProductOrder> =
            orders.into_iter().map(|o| (o.request_id, o)).collect();

        Ok(requests
            .into_iter()
            .map(|request| RequestDetails {
                quotes: quotes_by_request.remove(&request.id).unwrap_or_default(),
                order: order_by_request.remove(&request.id),
                request,
            })
            .collect())
    }

    /// Links email-only requests to the account with that email
    ///
    /// Converges: once every matching row is linked, a second run updates
    /// nothing. Returns the number of rows linked.
    pub async fn link_unlinked_by_email(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE custom_product_requests AS r
            SET user_id = u.id, updated_at = NOW()
            FROM users AS u
            WHERE r.user_id IS NULL
              AND r.email IS NOT NULL
              AND lower(r.email) = lower(u.email)
            "#,
        )
        .execute(pool)
        .await?;

        info!(linked = result.rows_affected(), "Linked email-only requests");
        Ok(result.rows_affected())
    }

    /// Counts requests with no linked account
    pub async fn count_unlinked(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM custom_product_requests WHERE user_id IS NULL")
            .fetch_one(pool)
            .await
    }
}

impl Quote {
    /// Adds a quote to a request
    pub async fn create(
        pool: &PgPool,
        request_id: Uuid,
        amount: i64,
        currency: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Quote>(
            r#"
            INSERT INTO quotes (request_id, amount, currency)
            VALUES ($1, $2, $3)
            RETURNING id, request_id, amount, currency, status, created_at
            "#,
        )
        .bind(request_id)
        .bind(amount)
        .bind(currency)
        .fetch_one(pool)
        .await
    }
}

impl ProductOrder {
    /// Places the order for a request
    pub async fn create(
        pool: &PgPool,
        request_id: Uuid,
        amount: i64,
        currency: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ProductOrder>(
            r#"
            INSERT INTO product_orders (request_id, amount, currency)
            VALUES ($1, $2, $3)
            RETURNING id, request_id, status, amount, currency, created_at
            "#,
        )
        .bind(request_id)
        .bind(amount)
        .bind(currency)
        .fetch_one(pool)
        .await
    }
}
