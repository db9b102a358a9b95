/// Integration tests for user resolution, request linkage, upload limits and
/// newsletter maintenance
///
/// Run with: cargo test --test account_tests

mod common;

use common::{test_pool, unique_email};
use storefront_shared::db::pool::close_pool;
use storefront_shared::maintenance::bulk::{BulkUpdate, Comparison};
use storefront_shared::maintenance::resolver::{Resolution, UserResolver};
use storefront_shared::models::account::UserProfile;
use storefront_shared::models::newsletter::{NewsletterStatus, NewsletterSubscriber};
use storefront_shared::models::request::{CreateRequest, CustomProductRequest, ProductOrder, Quote};
use storefront_shared::models::user::{CreateUser, User};
use uuid::Uuid;

async fn create_user(pool: &sqlx::PgPool, email: &str, subject: Option<&str>) -> User {
    User::create(
        pool,
        CreateUser {
            email: email.to_string(),
            supabase_user_id: subject.map(str::to_string),
            name: Some("Test User".to_string()),
        },
    )
    .await
    .expect("Failed to create user")
}

#[tokio::test]
async fn test_resolver_falls_back_to_email() {
    let Some(pool) = test_pool().await else { return };
    let email = unique_email("fallback");
    let user = create_user(&pool, &email, None).await;

    // The provider subject has never been linked, so only the email matches
    let resolution = UserResolver::new()
        .by_supabase_id(&format!("sub-{}", Uuid::new_v4()))
        .by_email(&email.to_uppercase())
        .resolve(&pool)
        .await
        .unwrap();

    match resolution {
        Resolution::Found { user: found, matched_by } => {
            assert_eq!(found.id, user.id);
            assert_eq!(matched_by, "email");
        }
        Resolution::NotFound => panic!("expected email fallback to match"),
    }

    User::delete(&pool, user.id).await.unwrap();
    close_pool(pool).await;
}

#[tokio::test]
async fn test_resolver_prefers_provider_subject() {
    let Some(pool) = test_pool().await else { return };
    let subject = format!("sub-{}", Uuid::new_v4());
    let user = create_user(&pool, &unique_email("linked"), Some(&subject)).await;

    let resolution = UserResolver::new()
        .by_supabase_id(&subject)
        .by_email(&user.email)
        .resolve(&pool)
        .await
        .unwrap();

    assert!(matches!(resolution, Resolution::Found { matched_by: "supabase_user_id", .. }));

    User::delete(&pool, user.id).await.unwrap();
    close_pool(pool).await;
}

#[tokio::test]
async fn test_resolver_reports_not_found() {
    let Some(pool) = test_pool().await else { return };

    let resolution = UserResolver::new()
        .by_id(Uuid::new_v4())
        .by_email(&unique_email("nobody"))
        .resolve(&pool)
        .await
        .expect("NotFound must not be an error");

    assert!(matches!(resolution, Resolution::NotFound));
    close_pool(pool).await;
}

#[tokio::test]
async fn test_requests_found_by_user_id_or_email() {
    let Some(pool) = test_pool().await else { return };
    let email = unique_email("requester");
    let user = create_user(&pool, &email, None).await;

    let linked = CustomProductRequest::create(
        &pool,
        CreateRequest {
            user_id: Some(user.id),
            project_type: "frame".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let email_only = CustomProductRequest::create(
        &pool,
        CreateRequest {
            email: Some(email.to_uppercase()),
            project_type: "mural".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let first_quote = Quote::create(&pool, linked.id, 5000, "usd").await.unwrap();
    let second_quote = Quote::create(&pool, linked.id, 4500, "usd").await.unwrap();
    ProductOrder::create(&pool, linked.id, 4500, "usd").await.unwrap();

    let details = CustomProductRequest::list_details_for_user(&pool, user.id, &email)
        .await
        .unwrap();

    assert_eq!(details.len(), 2);
    let ids: Vec<Uuid> = details.iter().map(|d| d.request.id).collect();
    assert!(ids.contains(&linked.id));
    assert!(ids.contains(&email_only.id));

    let linked_details = details.iter().find(|d| d.request.id == linked.id).unwrap();
    let quote_ids: Vec<Uuid> = linked_details.quotes.iter().map(|q| q.id).collect();
    assert_eq!(quote_ids, vec![first_quote.id, second_quote.id]);
    assert!(linked_details.order.is_some());

    let email_details = details.iter().find(|d| d.request.id == email_only.id).unwrap();
    assert!(email_details.quotes.is_empty());
    assert!(email_details.order.is_none());

    User::delete(&pool, user.id).await.unwrap();
    close_pool(pool).await;
}

#[tokio::test]
async fn test_link_requests_converges() {
    let Some(pool) = test_pool().await else { return };
    let email = unique_email("unlinked");
    let user = create_user(&pool, &email, None).await;

    let request = CustomProductRequest::create(
        &pool,
        CreateRequest {
            email: Some(email.clone()),
            project_type: "frame".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(request.user_id.is_none());

    let linked = CustomProductRequest::link_unlinked_by_email(&pool).await.unwrap();
    assert!(linked >= 1);

    let stored = CustomProductRequest::find_by_id(&pool, request.id).await.unwrap().unwrap();
    assert_eq!(stored.user_id, Some(user.id));

    CustomProductRequest::link_unlinked_by_email(&pool).await.unwrap();
    let again = CustomProductRequest::find_by_id(&pool, request.id).await.unwrap().unwrap();
    assert_eq!(again.user_id, Some(user.id));
    assert_eq!(again.updated_at, stored.updated_at, "second run must not touch the row");

    User::delete(&pool, user.id).await.unwrap();
    close_pool(pool).await;
}

#[tokio::test]
async fn test_raise_upload_limit_only_touches_lower_limits() {
    let Some(pool) = test_pool().await else { return };
    let low = create_user(&pool, &unique_email("low"), None).await;
    let high = create_user(&pool, &unique_email("high"), None).await;
    UserProfile::create(&pool, low.id, 3).await.unwrap();
    UserProfile::create(&pool, high.id, 50).await.unwrap();

    let raise = |user_id: Uuid| {
        BulkUpdate::table("user_profiles")
            .set("upload_limit", 10)
            .filter("upload_limit", Comparison::Lt, 10)
            .filter("user_id", Comparison::Eq, user_id)
            .touch_updated_at()
    };

    assert_eq!(raise(low.id).execute(&pool).await.unwrap(), 1);
    assert_eq!(raise(low.id).execute(&pool).await.unwrap(), 0);
    assert_eq!(raise(high.id).execute(&pool).await.unwrap(), 0);

    let low_profile = UserProfile::find_by_user(&pool, low.id).await.unwrap().unwrap();
    let high_profile = UserProfile::find_by_user(&pool, high.id).await.unwrap().unwrap();
    assert_eq!(low_profile.upload_limit, 10);
    assert_eq!(high_profile.upload_limit, 50);

    User::delete(&pool, low.id).await.unwrap();
    User::delete(&pool, high.id).await.unwrap();
    close_pool(pool).await;
}

#[tokio::test]
async fn test_request_status_transition() {
    let Some(pool) = test_pool().await else { return };
    let from = format!("submitted-{}", Uuid::new_v4().simple());
    let to = format!("in_review-{}", Uuid::new_v4().simple());

    let request = CustomProductRequest::create(
        &pool,
        CreateRequest {
            email: Some(unique_email("status")),
            project_type: "frame".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    sqlx::query("UPDATE custom_product_requests SET status = $1 WHERE id = $2")
        .bind(&from)
        .bind(request.id)
        .execute(&pool)
        .await
        .unwrap();

    let update = BulkUpdate::table("custom_product_requests")
        .set("status", to.clone())
        .filter("status", Comparison::Eq, from.clone())
        .touch_updated_at();

    assert_eq!(update.count_matching(&pool).await.unwrap(), 1);
    assert_eq!(update.execute(&pool).await.unwrap(), 1);
    assert_eq!(update.execute(&pool).await.unwrap(), 0);

    let stored = CustomProductRequest::find_by_id(&pool, request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, to);

    sqlx::query("DELETE FROM custom_product_requests WHERE id = $1")
        .bind(request.id)
        .execute(&pool)
        .await
        .unwrap();
    close_pool(pool).await;
}

#[tokio::test]
async fn test_newsletter_subscribe_unsubscribe_cycle() {
    let Some(pool) = test_pool().await else { return };
    let email = unique_email("reader");

    let first = NewsletterSubscriber::subscribe(&pool, &email.to_uppercase()).await.unwrap();
    let second = NewsletterSubscriber::subscribe(&pool, &email).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.email, email);
    assert_eq!(second.status, NewsletterStatus::Active);

    assert!(NewsletterSubscriber::unsubscribe(&pool, &email).await.unwrap());
    assert!(!NewsletterSubscriber::unsubscribe(&pool, &email).await.unwrap());

    let stored = NewsletterSubscriber::find_by_email(&pool, &email).await.unwrap().unwrap();
    assert_eq!(stored.status, NewsletterStatus::Unsubscribed);
    assert!(stored.unsubscribed_at.is_some());

    let back = NewsletterSubscriber::subscribe(&pool, &email).await.unwrap();
    assert_eq!(back.status, NewsletterStatus::Active);
    assert!(back.unsubscribed_at.is_none());

    assert!(!NewsletterSubscriber::unsubscribe(&pool, &unique_email("stranger")).await.unwrap());

    sqlx::query("DELETE FROM newsletter_subscribers WHERE email = $1")
        .bind(&email)
        .execute(&pool)
        .await
        .unwrap();
    close_pool(pool).await;
}
