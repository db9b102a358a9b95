/// Catalog product model and slug-keyed operations
///
/// The slug is the only identity maintenance tooling uses for products. The
/// central operation is [`Product::upsert`], which guarantees exactly one row
/// per slug and only overwrites the attributes the caller lists.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE products (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     slug TEXT NOT NULL UNIQUE,
///     name TEXT NOT NULL,
///     description TEXT,
///     price BIGINT NOT NULL,              -- minor currency units
///     currency VARCHAR(3) NOT NULL DEFAULT 'usd',
///     product_type product_type NOT NULL DEFAULT 'one_time',
///     status product_status NOT NULL DEFAULT 'active',
///     is_test BOOLEAN NOT NULL DEFAULT FALSE,
///     visible_in_catalog BOOLEAN NOT NULL DEFAULT TRUE,
///     metadata JSONB NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use storefront_shared::models::product::{Product, ProductUpsert};
/// # use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let outcome = Product::upsert(&pool, &ProductUpsert::dummy_window()).await?;
/// println!("{} ({})", outcome.product.slug, if outcome.created { "created" } else { "updated" });
/// # Ok(())
/// # }
/// ```

use crate::error::{MaintenanceError, MaintenanceResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::fmt;
use tracing::{debug, info};
use uuid::Uuid;

/// Billing shape of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "product_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductType {
    /// Paid once
    OneTime,

    /// Billed on a schedule
    Recurring,
}

/// Catalog lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "product_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Inactive,
}

/// Product row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,

    /// Unique human-readable identifier
    pub slug: String,

    pub name: String,

    pub description: Option<String>,

    /// Price in minor currency units (cents)
    pub price: i64,

    /// Lowercase ISO 4217 code
    pub currency: String,

    pub product_type: ProductType,

    pub status: ProductStatus,

    /// Test fixtures are never shown to customers
    pub is_test: bool,

    pub visible_in_catalog: bool,

    /// Free-form key/value data (always a JSON object)
    pub metadata: JsonValue,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Mutable product attributes an upsert may overwrite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductField {
    Name,
    Description,
    Price,
    Currency,
    ProductType,
    Status,
    IsTest,
    VisibleInCatalog,
    Metadata,
}

impl ProductField {
    /// Every mutable attribute, in column order
    pub const ALL: [ProductField; 9] = [
        ProductField::Name,
        ProductField::Description,
        ProductField::Price,
        ProductField::Currency,
        ProductField::ProductType,
        ProductField::Status,
        ProductField::IsTest,
        ProductField::VisibleInCatalog,
        ProductField::Metadata,
    ];

    /// Column name in `products`
    pub fn column(&self) -> &'static str {
        match self {
            ProductField::Name => "name",
            ProductField::Description => "description",
            ProductField::Price => "price",
            ProductField::Currency => "currency",
            ProductField::ProductType => "product_type",
            ProductField::Status => "status",
            ProductField::IsTest => "is_test",
            ProductField::VisibleInCatalog => "visible_in_catalog",
            ProductField::Metadata => "metadata",
        }
    }

    /// Parses a column name (as typed on the command line)
    pub fn from_column(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.column() == s.trim().replace('-', "_"))
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Input for [`Product::upsert`]
///
/// `attributes` are all written when the slug is new. When the slug already
/// exists, only the fields in `overwrite` are written; every other column
/// keeps its stored value.
#[derive(Debug, Clone)]
pub struct ProductUpsert {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub currency: String,
    pub product_type: ProductType,
    pub status: ProductStatus,
    pub is_test: bool,
    pub visible_in_catalog: bool,
    pub metadata: JsonValue,

    /// Attributes overwritten on an existing row
    pub overwrite: Vec<ProductField>,
}

impl ProductUpsert {
    /// A new upsert with catalog defaults and a full overwrite set
    pub fn new(slug: impl Into<String>, name: impl Into<String>, price: i64) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            description: None,
            price,
            currency: "usd".to_string(),
            product_type: ProductType::OneTime,
            status: ProductStatus::Active,
            is_test: false,
            visible_in_catalog: true,
            metadata: JsonValue::Object(Default::default()),
            overwrite: ProductField::ALL.to_vec(),
        }
    }

    /// The hidden test product used to exercise checkout end to end
    pub fn dummy_window() -> Self {
        Self {
            description: Some("Test product for checkout verification".to_string()),
            is_test: true,
            visible_in_catalog: false,
            metadata: serde_json::json!({ "purpose": "checkout-test" }),
            ..Self::new("dummy-window", "Dummy Window", 1000)
        }
    }

    /// Restricts the overwrite set
    pub fn only(mut self, fields: &[ProductField]) -> Self {
        self.overwrite = fields.to_vec();
        self
    }

    /// Checks the input and normalizes the currency code
    ///
    /// # Errors
    ///
    /// Returns `MaintenanceError::Validation` for an empty or malformed slug,
    /// a blank name, a negative price, a currency that is not three ASCII
    /// letters, non-object metadata, or an empty overwrite set.
    pub fn validate(&mut self) -> MaintenanceResult<()> {
        if !is_valid_slug(&self.slug) {
            return Err(MaintenanceError::Validation(format!(
                "slug '{}' must be non-empty lowercase letters, digits and dashes",
                self.slug
            )));
        }
        if self.name.trim().is_empty() {
            return Err(MaintenanceError::Validation("name must not be blank".to_string()));
        }
        if self.price < 0 {
            return Err(MaintenanceError::Validation(format!(
                "price must be >= 0, got {}",
                self.price
            )));
        }

        let currency = self.currency.trim().to_ascii_lowercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(MaintenanceError::Validation(format!(
                "currency '{}' must be a three-letter code",
                self.currency
            )));
        }
        self.currency = currency;

        if !self.metadata.is_object() {
            return Err(MaintenanceError::Validation("metadata must be a JSON object".to_string()));
        }
        if self.overwrite.is_empty() {
            return Err(MaintenanceError::Validation(
                "overwrite set must name at least one field".to_string(),
            ));
        }

        Ok(())
    }
}

/// Result of an upsert
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    /// Row as stored after the statement
    pub product: Product,

    /// True when the slug did not exist before
    pub created: bool,
}

#[derive(sqlx::FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    product: Product,
    inserted: bool,
}

const PRODUCT_COLUMNS: &str = "id, slug, name, description, price, currency, product_type, status, \
     is_test, visible_in_catalog, metadata, created_at, updated_at";

/// Slugs are lowercase ASCII letters, digits and single dashes
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Builds the `INSERT ... ON CONFLICT (slug) DO UPDATE` statement
///
/// The update list is derived from `overwrite`, deduplicated, in the order
/// given. `xmax = 0` is true only for freshly inserted tuples.
fn upsert_sql(overwrite: &[ProductField]) -> String {
    let mut seen = Vec::with_capacity(overwrite.len());
    for field in overwrite {
        if !seen.contains(field) {
            seen.push(*field);
        }
    }

    let set_clause: Vec<String> = seen
        .iter()
        .map(|f| format!("{col} = EXCLUDED.{col}", col = f.column()))
        .collect();

    format!(
        "INSERT INTO products (slug, name, description, price, currency, product_type, status, \
         is_test, visible_in_catalog, metadata) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (slug) DO UPDATE SET {}, updated_at = NOW() \
         RETURNING {}, (xmax = 0) AS inserted",
        set_clause.join(", "),
        PRODUCT_COLUMNS
    )
}

impl Product {
    /// Creates the product if its slug is absent, else overwrites the listed attributes
    ///
    /// Runs as one statement, so it either fully applies or leaves the row
    /// untouched. Running it twice with the same input leaves the same single
    /// row.
    ///
    /// # Errors
    ///
    /// - `Validation` if the input is rejected (nothing is sent to the store)
    /// - `ConstraintViolation` if the store refuses the write
    /// - `Connectivity` if the store is unreachable
    pub async fn upsert(pool: &PgPool, input: &ProductUpsert) -> MaintenanceResult<UpsertOutcome> {
        let mut input = input.clone();
        input.validate()?;

        let sql = upsert_sql(&input.overwrite);
        debug!(slug = %input.slug, overwrite = ?input.overwrite, "Upserting product");

        let row = sqlx::query_as::<_, UpsertRow>(&sql)
            .bind(&input.slug)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.price)
            .bind(&input.currency)
            .bind(input.product_type)
            .bind(input.status)
            .bind(input.is_test)
            .bind(input.visible_in_catalog)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await?;

        info!(
            slug = %row.product.slug,
            product_id = %row.product.id,
            created = row.inserted,
            "Product upserted"
        );

        Ok(UpsertOutcome {
            product: row.product,
            created: row.inserted,
        })
    }

    /// Finds a product by slug
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {} FROM products WHERE slug = $1", PRODUCT_COLUMNS);

        sqlx::query_as::<_, Product>(&sql)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Counts rows with the given slug (0 or 1 while the unique index holds)
    pub async fn count_by_slug(pool: &PgPool, slug: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE slug = $1")
            .bind(slug)
            .fetch_one(pool)
            .await
    }

    /// Deletes a product by slug
    ///
    /// Returns false when no row had that slug.
    pub async fn delete_by_slug(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE slug = $1")
            .bind(slug)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
