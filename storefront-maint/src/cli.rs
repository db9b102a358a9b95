/// Command-line interface definition
///
/// Every subcommand is safe to re-run. Bulk updates accept `--dry-run`,
/// which reports how many rows would change without writing.

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use serde_json::Value as JsonValue;
use std::path::PathBuf;
use storefront_shared::models::product::{ProductField, ProductStatus, ProductType};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "storefront-maint", version, about = "Storefront data maintenance toolkit")]
pub struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", global = true, hide_env_values = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
pub enum Command {
    /// Create a product, or update the listed fields of an existing one
    UpsertProduct(UpsertProductArgs),

    /// Create or reprice the hidden checkout test product (dummy-window)
    SeedDummyProduct {
        /// Price in minor units
        #[arg(long, default_value_t = 1000)]
        price: i64,
    },

    /// Delete products by slug; missing slugs are skipped
    DeleteProducts {
        #[arg(required = true)]
        slugs: Vec<String>,
    },

    /// Raise every profile and subscription upload limit below N to N
    RaiseUploadLimits {
        #[arg(long, value_parser = clap::value_parser!(i32).range(0..))]
        to: i32,

        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Hide test products that are still visible in the catalog
    HideTestProducts {
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Move custom product requests from one status to another
    SetRequestStatus {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,

        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Cap one-time purchase usage at N uploads
    ResetPurchaseUsage {
        #[arg(long, value_parser = clap::value_parser!(i32).range(0..))]
        over: i32,

        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Show a user's custom product requests with quotes and orders
    UserRequests(UserKeys),

    /// Link email-only custom product requests to matching accounts
    LinkRequests,

    /// Apply the guarded schema repairs
    EnsureSchema,

    /// Newsletter subscription maintenance
    Newsletter {
        #[command(subcommand)]
        action: NewsletterAction,
    },

    /// Show or set the test-mode flag in a dotenv file
    TestMode {
        /// Omit to print the current value
        state: Option<Toggle>,

        #[arg(long, default_value = ".env.local")]
        file: PathBuf,

        #[arg(long, default_value = "TEST_MODE")]
        key: String,
    },
}

/// Arguments of `upsert-product`
///
/// `name` and `price` are always written. Every other attribute is written
/// only when its flag is given, so an existing row keeps whatever the
/// operator did not mention. `--only` replaces that set outright.
#[derive(Args, Debug)]
pub struct UpsertProductArgs {
    #[arg(long)]
    pub slug: String,

    #[arg(long)]
    pub name: String,

    /// Price in minor units (cents)
    #[arg(long)]
    pub price: i64,

    /// Three-letter code (default on create: usd)
    #[arg(long)]
    pub currency: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Default on create: one_time
    #[arg(long, value_enum)]
    pub product_type: Option<ProductTypeArg>,

    /// Default on create: active
    #[arg(long, value_enum)]
    pub status: Option<ProductStatusArg>,

    /// Mark as a test fixture
    #[arg(long, conflicts_with = "not_test")]
    pub test: bool,

    /// Clear the test fixture mark
    #[arg(long)]
    pub not_test: bool,

    /// Keep out of the public catalog
    #[arg(long, conflicts_with = "visible")]
    pub hidden: bool,

    /// Show in the public catalog
    #[arg(long)]
    pub visible: bool,

    /// JSON object stored as product metadata
    #[arg(long, value_parser = parse_json_object)]
    pub metadata: Option<JsonValue>,

    /// Fields to overwrite when the slug exists, replacing the derived set
    #[arg(long, value_delimiter = ',', value_parser = parse_field)]
    pub only: Vec<ProductField>,
}

impl UpsertProductArgs {
    /// `Some` only when `--test` or `--not-test` was given
    pub fn is_test(&self) -> Option<bool> {
        tri_state(self.test, self.not_test)
    }

    /// `Some` only when `--visible` or `--hidden` was given
    pub fn visible_in_catalog(&self) -> Option<bool> {
        tri_state(self.visible, self.hidden)
    }
}

fn tri_state(yes: bool, no: bool) -> Option<bool> {
    match (yes, no) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Keys tried in order: id, provider subject, email
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("key").required(true).multiple(true).args(["id", "supabase_id", "email"])))]
pub struct UserKeys {
    #[arg(long)]
    pub id: Option<Uuid>,

    #[arg(long)]
    pub supabase_id: Option<String>,

    #[arg(long)]
    pub email: Option<String>,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
pub enum NewsletterAction {
    Subscribe { email: String },
    Unsubscribe { email: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn as_bool(self) -> bool {
        matches!(self, Toggle::On)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductTypeArg {
    #[value(name = "one_time", alias = "one-time")]
    OneTime,
    Recurring,
}

impl From<ProductTypeArg> for ProductType {
    fn from(arg: ProductTypeArg) -> Self {
        match arg {
            ProductTypeArg::OneTime => ProductType::OneTime,
            ProductTypeArg::Recurring => ProductType::Recurring,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStatusArg {
    Active,
    Inactive,
}

impl From<ProductStatusArg> for ProductStatus {
    fn from(arg: ProductStatusArg) -> Self {
        match arg {
            ProductStatusArg::Active => ProductStatus::Active,
            ProductStatusArg::Inactive => ProductStatus::Inactive,
        }
    }
}

fn parse_json_object(raw: &str) -> Result<JsonValue, String> {
    let value: JsonValue = serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {}", e))?;
    if value.is_object() {
        Ok(value)
    } else {
        Err("metadata must be a JSON object".to_string())
    }
}

fn parse_field(raw: &str) -> Result<ProductField, String> {
    ProductField::from_column(raw).ok_or_else(|| {
        let known: Vec<&str> = ProductField::ALL.iter().map(|f| f.column()).collect();
        format!("unknown field '{}', expected one of: {}", raw, known.join(", "))
    })
}
