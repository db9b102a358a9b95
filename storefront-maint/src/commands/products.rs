/// Catalog maintenance: upserts, the checkout test product, deletions,
/// hiding test fixtures

use super::apply_bulk;
use crate::cli::UpsertProductArgs;
use anyhow::{bail, Context};
use sqlx::PgPool;
use storefront_shared::maintenance::batch::{delete_products_by_slug, ItemOutcome};
use storefront_shared::maintenance::bulk::{BulkUpdate, Comparison};
use storefront_shared::models::product::{Product, ProductField, ProductUpsert, UpsertOutcome};
use tracing::info;

/// Builds the upsert input from command-line arguments
///
/// The overwrite set is `name`, `price` and each attribute whose flag was
/// given, unless `--only` names the set explicitly. Omitted attributes take
/// catalog defaults on create and keep their stored value on update.
pub fn upsert_from_args(args: UpsertProductArgs) -> ProductUpsert {
    let is_test = args.is_test();
    let visible = args.visible_in_catalog();
    let mut input = ProductUpsert::new(args.slug, args.name, args.price);
    let mut overwrite = vec![ProductField::Name, ProductField::Price];

    if let Some(currency) = args.currency {
        input.currency = currency;
        overwrite.push(ProductField::Currency);
    }
    if let Some(description) = args.description {
        input.description = Some(description);
        overwrite.push(ProductField::Description);
    }
    if let Some(product_type) = args.product_type {
        input.product_type = product_type.into();
        overwrite.push(ProductField::ProductType);
    }
    if let Some(status) = args.status {
        input.status = status.into();
        overwrite.push(ProductField::Status);
    }
    if let Some(is_test) = is_test {
        input.is_test = is_test;
        overwrite.push(ProductField::IsTest);
    }
    if let Some(visible) = visible {
        input.visible_in_catalog = visible;
        overwrite.push(ProductField::VisibleInCatalog);
    }
    if let Some(metadata) = args.metadata {
        input.metadata = metadata;
        overwrite.push(ProductField::Metadata);
    }

    if args.only.is_empty() {
        input.only(&overwrite)
    } else {
        input.only(&args.only)
    }
}

pub async fn upsert_product(pool: &PgPool, args: UpsertProductArgs) -> anyhow::Result<()> {
    let input = upsert_from_args(args);
    let outcome = Product::upsert(pool, &input)
        .await
        .with_context(|| format!("Failed to upsert product '{}'", input.slug))?;
    report_upsert(&outcome);
    Ok(())
}

/// Upserts `dummy-window`, the hidden product used to test checkout
pub async fn seed_dummy_product(pool: &PgPool, price: i64) -> anyhow::Result<()> {
    let input = ProductUpsert {
        price,
        ..ProductUpsert::dummy_window()
    };
    let outcome = Product::upsert(pool, &input)
        .await
        .context("Failed to seed the dummy product")?;
    report_upsert(&outcome);
    Ok(())
}

fn report_upsert(outcome: &UpsertOutcome) {
    let product = &outcome.product;
    let verb = if outcome.created { "Created" } else { "Updated" };
    println!(
        "{} product '{}' ({}): {} {} minor units, test={}, visible={}",
        verb,
        product.slug,
        product.id,
        product.price,
        product.currency,
        product.is_test,
        product.visible_in_catalog
    );
}

/// Deletes every slug; fails only if at least one deletion errored
pub async fn delete_products(pool: &PgPool, slugs: &[String]) -> anyhow::Result<()> {
    let report = delete_products_by_slug(pool, slugs).await;

    for (slug, outcome) in &report.items {
        match outcome {
            ItemOutcome::Applied => println!("  deleted    {}", slug),
            ItemOutcome::NotFound => println!("  not found  {}", slug),
            ItemOutcome::Failed(e) => println!("  FAILED     {}: {}", slug, e),
        }
    }
    println!(
        "{} deleted, {} not found, {} failed",
        report.applied(),
        report.not_found(),
        report.failed()
    );

    if report.has_failures() {
        bail!("{} of {} deletions failed", report.failed(), report.items.len());
    }
    Ok(())
}

pub fn hide_test_products_update() -> BulkUpdate {
    BulkUpdate::table("products")
        .set("visible_in_catalog", false)
        .filter("is_test", Comparison::Eq, true)
        .filter("visible_in_catalog", Comparison::Eq, true)
        .touch_updated_at()
}

pub async fn hide_test_products(pool: &PgPool, dry_run: bool) -> anyhow::Result<()> {
    let hidden = apply_bulk(pool, &hide_test_products_update(), dry_run).await?;
    info!(hidden, dry_run, "Hide test products finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use storefront_shared::models::product::ProductType;

    fn parse_upsert(extra: &[&str]) -> UpsertProductArgs {
        let mut argv = vec![
            "storefront-maint",
            "upsert-product",
            "--slug",
            "oak-frame",
            "--name",
            "Oak Frame",
            "--price",
            "4500",
        ];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::UpsertProduct(args) => args,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unmentioned_fields_are_not_overwritten() {
        let input = upsert_from_args(parse_upsert(&[]));
        assert_eq!(input.overwrite, vec![ProductField::Name, ProductField::Price]);
        // Create-time defaults
        assert!(input.visible_in_catalog);
        assert!(!input.is_test);
        assert_eq!(input.currency, "usd");
        assert_eq!(input.product_type, ProductType::OneTime);
        assert!(input.metadata.is_object());
    }

    #[test]
    fn test_given_flags_join_the_overwrite_set() {
        let input = upsert_from_args(parse_upsert(&[
            "--test",
            "--hidden",
            "--product-type",
            "recurring",
            "--metadata",
            r#"{"size":"large"}"#,
        ]));
        assert!(input.is_test);
        assert!(!input.visible_in_catalog);
        assert_eq!(input.product_type, ProductType::Recurring);
        assert_eq!(
            input.overwrite,
            vec![
                ProductField::Name,
                ProductField::Price,
                ProductField::ProductType,
                ProductField::IsTest,
                ProductField::VisibleInCatalog,
                ProductField::Metadata,
            ]
        );
    }

    #[test]
    fn test_only_replaces_derived_set() {
        let input = upsert_from_args(parse_upsert(&["--hidden", "--only", "price", "--only", "status"]));
        assert!(!input.visible_in_catalog);
        assert_eq!(input.overwrite, vec![ProductField::Price, ProductField::Status]);
    }

    #[test]
    fn test_hide_update_targets_visible_fixtures() {
        let update = hide_test_products_update();
        assert_eq!(update.table_name(), "products");
        assert_eq!(
            update.describe_filter(),
            "is_test = true AND visible_in_catalog = true"
        );
    }
}
