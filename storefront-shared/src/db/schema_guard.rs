/// Re-runnable schema repairs
///
/// Each statement here is guarded so that applying it to a database that
/// already has the change is a no-op: `IF NOT EXISTS` for tables, columns and
/// indexes, `DROP NOT NULL` (idempotent in Postgres), and a
/// `duplicate_object` handler for enum types, which have no `IF NOT EXISTS`
/// form.
///
/// The statements run in a single transaction. Postgres DDL is
/// transactional, so a failure leaves the schema exactly as it was.

use crate::error::MaintenanceResult;
use sqlx::{Executor, PgPool};
use tracing::{debug, info};

/// One guarded DDL statement
#[derive(Debug, Clone, Copy)]
pub struct SchemaStep {
    /// Short label printed by the CLI
    pub name: &'static str,

    /// The statement itself
    pub sql: &'static str,
}

/// Ordered repairs applied by `ensure-schema`
pub const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        name: "custom_product_requests.user_id nullable",
        sql: "ALTER TABLE custom_product_requests ALTER COLUMN user_id DROP NOT NULL",
    },
    SchemaStep {
        name: "custom_product_requests.email column",
        sql: "ALTER TABLE custom_product_requests ADD COLUMN IF NOT EXISTS email TEXT",
    },
    SchemaStep {
        name: "products.is_test column",
        sql: "ALTER TABLE products ADD COLUMN IF NOT EXISTS is_test BOOLEAN NOT NULL DEFAULT FALSE",
    },
    SchemaStep {
        name: "products.visible_in_catalog column",
        sql: "ALTER TABLE products ADD COLUMN IF NOT EXISTS visible_in_catalog BOOLEAN NOT NULL DEFAULT TRUE",
    },
    SchemaStep {
        name: "newsletter_status type",
        sql: r#"
            DO $$
            BEGIN
                CREATE TYPE newsletter_status AS ENUM ('active', 'unsubscribed');
            EXCEPTION
                WHEN duplicate_object THEN NULL;
            END
            $$
        "#,
    },
    SchemaStep {
        name: "newsletter_subscribers table",
        sql: r#"
            CREATE TABLE IF NOT EXISTS newsletter_subscribers (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                email TEXT NOT NULL UNIQUE,
                status newsletter_status NOT NULL DEFAULT 'active',
                subscribed_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                unsubscribed_at TIMESTAMPTZ
            )
        "#,
    },
    SchemaStep {
        name: "custom_product_requests email index",
        sql: "CREATE INDEX IF NOT EXISTS idx_custom_product_requests_email_lower ON custom_product_requests (lower(email))",
    },
    SchemaStep {
        name: "custom_product_requests user index",
        sql: "CREATE INDEX IF NOT EXISTS idx_custom_product_requests_user_id ON custom_product_requests (user_id)",
    },
    SchemaStep {
        name: "products catalog index",
        sql: "CREATE INDEX IF NOT EXISTS idx_products_catalog ON products (visible_in_catalog, status) WHERE is_test = FALSE",
    },
];

/// Applies every step in [`SCHEMA_STEPS`] inside one transaction
///
/// Returns the names of the steps executed, in order.
///
/// # Errors
///
/// Returns the first failing statement's error; the transaction is rolled
/// back when it is dropped.
pub async fn ensure_schema(pool: &PgPool) -> MaintenanceResult<Vec<&'static str>> {
    info!(steps = SCHEMA_STEPS.len(), "Ensuring schema");

    let mut tx = pool.begin().await?;
    let mut applied = Vec::with_capacity(SCHEMA_STEPS.len());

    for step in SCHEMA_STEPS {
        debug!(step = step.name, "Applying schema step");
        // Plain &str goes over the simple query protocol, which DO blocks need
        (&mut *tx).execute(step.sql).await?;
        applied.push(step.name);
    }

    tx.commit().await?;

    info!("Schema is up to date");
    Ok(applied)
}
