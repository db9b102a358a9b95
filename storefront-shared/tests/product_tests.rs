/// Integration tests for product upsert, bulk visibility updates and batch delete
///
/// Run with: cargo test --test product_tests

mod common;

use common::{test_pool, unique_slug};
use storefront_shared::db::pool::close_pool;
use storefront_shared::error::MaintenanceError;
use storefront_shared::maintenance::batch::{delete_products_by_slug, ItemOutcome};
use storefront_shared::maintenance::bulk::{BulkUpdate, Comparison};
use storefront_shared::models::product::{Product, ProductField, ProductUpsert};

#[tokio::test]
async fn test_upsert_twice_leaves_one_row() {
    let Some(pool) = test_pool().await else { return };
    let slug = unique_slug("frame");
    let input = ProductUpsert::new(slug.clone(), "Oak Frame", 4500);

    let first = Product::upsert(&pool, &input).await.expect("First upsert failed");
    let second = Product::upsert(&pool, &input).await.expect("Second upsert failed");

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.product.id, second.product.id);
    assert_eq!(second.product.price, 4500);
    assert_eq!(Product::count_by_slug(&pool, &slug).await.unwrap(), 1);

    Product::delete_by_slug(&pool, &slug).await.unwrap();
    close_pool(pool).await;
}

#[tokio::test]
async fn test_dummy_window_price_change() {
    let Some(pool) = test_pool().await else { return };

    // The preset slug is shared, so start from a clean slate
    Product::delete_by_slug(&pool, "dummy-window").await.unwrap();

    let created = Product::upsert(&pool, &ProductUpsert::dummy_window()).await.unwrap();
    assert!(created.created);
    assert_eq!(created.product.price, 1000);
    assert_eq!(created.product.currency, "usd");
    assert!(created.product.is_test);
    assert!(!created.product.visible_in_catalog);

    let repriced = ProductUpsert {
        price: 1200,
        ..ProductUpsert::dummy_window()
    };
    let updated = Product::upsert(&pool, &repriced).await.unwrap();
    assert!(!updated.created);

    let stored = Product::find_by_slug(&pool, "dummy-window").await.unwrap().unwrap();
    assert_eq!(stored.price, 1200);
    assert_eq!(Product::count_by_slug(&pool, "dummy-window").await.unwrap(), 1);

    Product::delete_by_slug(&pool, "dummy-window").await.unwrap();
    close_pool(pool).await;
}

#[tokio::test]
async fn test_restricted_overwrite_keeps_other_fields() {
    let Some(pool) = test_pool().await else { return };
    let slug = unique_slug("poster");

    let original = ProductUpsert {
        description: Some("Matte print".to_string()),
        ..ProductUpsert::new(slug.clone(), "Poster", 2000)
    };
    Product::upsert(&pool, &original).await.unwrap();

    let price_only = ProductUpsert {
        description: Some("should not be written".to_string()),
        ..ProductUpsert::new(slug.clone(), "Renamed Poster", 2500)
    }
    .only(&[ProductField::Price]);
    let outcome = Product::upsert(&pool, &price_only).await.unwrap();

    assert_eq!(outcome.product.price, 2500);
    assert_eq!(outcome.product.name, "Poster");
    assert_eq!(outcome.product.description.as_deref(), Some("Matte print"));

    Product::delete_by_slug(&pool, &slug).await.unwrap();
    close_pool(pool).await;
}

#[tokio::test]
async fn test_invalid_input_never_reaches_store() {
    let Some(pool) = test_pool().await else { return };
    let slug = unique_slug("bad");

    let negative = ProductUpsert::new(slug.clone(), "Broken", -1);
    let err = Product::upsert(&pool, &negative).await.unwrap_err();
    assert!(matches!(err, MaintenanceError::Validation(_)));
    assert_eq!(Product::count_by_slug(&pool, &slug).await.unwrap(), 0);

    close_pool(pool).await;
}

#[tokio::test]
async fn test_hide_test_products_converges() {
    let Some(pool) = test_pool().await else { return };
    let test_slug = unique_slug("fixture");
    let real_slug = unique_slug("real");

    let fixture = ProductUpsert {
        is_test: true,
        visible_in_catalog: true,
        ..ProductUpsert::new(test_slug.clone(), "Fixture", 100)
    };
    Product::upsert(&pool, &fixture).await.unwrap();
    Product::upsert(&pool, &ProductUpsert::new(real_slug.clone(), "Real", 100)).await.unwrap();

    // Scoped to this test's slugs so parallel tests are unaffected
    let update = |slug: &str| {
        BulkUpdate::table("products")
            .set("visible_in_catalog", false)
            .filter("slug", Comparison::Eq, slug.to_string())
            .filter("is_test", Comparison::Eq, true)
            .filter("visible_in_catalog", Comparison::Eq, true)
            .touch_updated_at()
    };

    assert_eq!(update(&test_slug).count_matching(&pool).await.unwrap(), 1);
    assert_eq!(update(&test_slug).execute(&pool).await.unwrap(), 1);
    assert_eq!(update(&test_slug).execute(&pool).await.unwrap(), 0);
    assert_eq!(update(&real_slug).execute(&pool).await.unwrap(), 0);

    let hidden = Product::find_by_slug(&pool, &test_slug).await.unwrap().unwrap();
    let untouched = Product::find_by_slug(&pool, &real_slug).await.unwrap().unwrap();
    assert!(!hidden.visible_in_catalog);
    assert!(untouched.visible_in_catalog);

    Product::delete_by_slug(&pool, &test_slug).await.unwrap();
    Product::delete_by_slug(&pool, &real_slug).await.unwrap();
    close_pool(pool).await;
}

#[tokio::test]
async fn test_bulk_update_without_filter_writes_nothing() {
    let Some(pool) = test_pool().await else { return };

    let err = BulkUpdate::table("products")
        .set("visible_in_catalog", false)
        .execute(&pool)
        .await
        .unwrap_err();
    assert!(matches!(err, MaintenanceError::Validation(_)));

    close_pool(pool).await;
}

#[tokio::test]
async fn test_batch_delete_continues_past_missing_slug() {
    let Some(pool) = test_pool().await else { return };
    let first = unique_slug("batch");
    let missing = unique_slug("missing");
    let last = unique_slug("batch");

    Product::upsert(&pool, &ProductUpsert::new(first.clone(), "First", 10)).await.unwrap();
    Product::upsert(&pool, &ProductUpsert::new(last.clone(), "Last", 10)).await.unwrap();

    let slugs = vec![first.clone(), missing.clone(), last.clone()];
    let report = delete_products_by_slug(&pool, &slugs).await;

    assert_eq!(report.items[0], (first.clone(), ItemOutcome::Applied));
    assert_eq!(report.items[1], (missing, ItemOutcome::NotFound));
    assert_eq!(report.items[2], (last.clone(), ItemOutcome::Applied));
    assert!(!report.has_failures());

    // Re-running is a no-op
    let again = delete_products_by_slug(&pool, &slugs).await;
    assert_eq!(again.not_found(), 3);

    close_pool(pool).await;
}

#[tokio::test]
async fn test_unique_violation_is_surfaced_and_nothing_is_written() {
    let Some(pool) = test_pool().await else { return };
    let kept = unique_slug("kept");
    let other = unique_slug("other");

    Product::upsert(&pool, &ProductUpsert::new(kept.clone(), "Kept", 100)).await.unwrap();
    Product::upsert(&pool, &ProductUpsert::new(other.clone(), "Other", 200)).await.unwrap();

    // Renaming one slug onto the other hits the unique index
    let err = BulkUpdate::table("products")
        .set("slug", kept.clone())
        .set("price", 999)
        .filter("slug", Comparison::Eq, other.clone())
        .execute(&pool)
        .await
        .unwrap_err();

    match err {
        MaintenanceError::ConstraintViolation { constraint, .. } => {
            assert_eq!(constraint, "products_slug_key");
        }
        unexpected => panic!("expected ConstraintViolation, got {:?}", unexpected),
    }

    let kept_row = Product::find_by_slug(&pool, &kept).await.unwrap().unwrap();
    let other_row = Product::find_by_slug(&pool, &other).await.unwrap().unwrap();
    assert_eq!(kept_row.price, 100);
    assert_eq!(other_row.price, 200, "the rejected statement must not partially apply");
    assert_eq!(Product::count_by_slug(&pool, &kept).await.unwrap(), 1);

    Product::delete_by_slug(&pool, &kept).await.unwrap();
    Product::delete_by_slug(&pool, &other).await.unwrap();
    close_pool(pool).await;
}
