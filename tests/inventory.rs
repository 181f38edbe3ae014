//! End-to-end checks against a live PostgreSQL database.
//!
//! Every test returns early unless `TEST_DATABASE_URL` points at a database
//! the current user may migrate.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::OnceCell;
use warehouse_rs::AppState;
use warehouse_rs::api::dto::UpdateItemRequest;
use warehouse_rs::config::{DatabaseConfig, JwtConfig};
use warehouse_rs::db::{establish_async_connection_pool, run_pending_migrations};
use warehouse_rs::error::AppError;
use warehouse_rs::external::images::DisabledImageUploader;
use warehouse_rs::models::{ItemWithImages, NewItem};

const SECRET: &str = "integration-secret-integration-secret";

static MIGRATED: OnceCell<()> = OnceCell::const_new();

async fn setup() -> Option<AppState> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    MIGRATED
        .get_or_init(|| async {
            run_pending_migrations(&url).await.unwrap();
        })
        .await;

    let config = DatabaseConfig {
        url,
        max_connections: 16,
        ..Default::default()
    };
    let pool = establish_async_connection_pool(&config).await.unwrap();
    let jwt = JwtConfig {
        secret: SECRET.to_string(),
        expiration_hours: 1,
    };
    Some(AppState::new(pool, jwt, Arc::new(DisabledImageUploader)))
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

async fn add_item(state: &AppState, brand: &str, stock: i32, price: i64) -> ItemWithImages {
    let new_item = NewItem {
        name: unique("filter"),
        part_number: unique("PN"),
        brand: brand.to_string(),
        model: None,
        stock,
        price,
        wholesale_price: price / 2,
    };
    state
        .services
        .inventory
        .add_item(new_item, vec!["https://img.test/a.png".to_string()], Vec::new())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_sale_decrements_stock_and_prices_total() {
    let Some(state) = setup().await else { return };
    let created = add_item(&state, &unique("brand"), 10, 5).await;

    let sale = state
        .services
        .sales
        .make_sale(created.item.id, 3, "Walk-in".to_string())
        .await
        .unwrap();

    assert_eq!(sale.sale.quantity, 3);
    assert_eq!(sale.sale.total_price, 15);
    assert_eq!(sale.sale.customer, "Walk-in");
    assert_eq!(sale.item.stock, 7);

    let reloaded = state.services.inventory.get_item(created.item.id).await.unwrap();
    assert_eq!(reloaded.item.stock, 7);
}

#[tokio::test]
async fn test_sale_beyond_stock_leaves_item_untouched() {
    let Some(state) = setup().await else { return };
    let created = add_item(&state, &unique("brand"), 2, 5).await;

    let err = state
        .services
        .sales
        .make_sale(created.item.id, 5, String::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::InsufficientStock {
            requested: 5,
            available: 2,
            ..
        }
    ));
    let reloaded = state.services.inventory.get_item(created.item.id).await.unwrap();
    assert_eq!(reloaded.item.stock, 2);
}

#[tokio::test]
async fn test_sale_of_unknown_item_is_not_found() {
    let Some(state) = setup().await else { return };

    let err = state
        .services
        .sales
        .make_sale(i32::MAX, 1, String::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { .. }));
}

#[tokio::test]
async fn test_concurrent_sales_never_oversell() {
    let Some(state) = setup().await else { return };
    let created = add_item(&state, &unique("brand"), 5, 1).await;
    let item_id = created.item.id;

    let attempts = (0..10).map(|_| {
        let sales = state.services.sales.clone();
        tokio::spawn(async move { sales.make_sale(item_id, 1, String::new()).await })
    });
    let results: Vec<_> = join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let sold = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(sold, 5);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, AppError::InsufficientStock { .. }))
    );

    let reloaded = state.services.inventory.get_item(item_id).await.unwrap();
    assert_eq!(reloaded.item.stock, 0);
}

#[tokio::test]
async fn test_register_then_login_issues_token_for_user() {
    let Some(state) = setup().await else { return };
    let auth = &state.services.auth;
    let username = unique("clerk");

    let user = auth
        .register(username.clone(), "hunter22".to_string())
        .await
        .unwrap();
    assert_ne!(user.password, "hunter22");

    let token = auth.login(&username, "hunter22".to_string()).await.unwrap();
    let claims = auth.validate_token(&token).unwrap();
    assert_eq!(claims.username, username);
    assert_eq!(claims.user_id().unwrap(), user.id);
}

#[tokio::test]
async fn test_duplicate_username_is_rejected() {
    let Some(state) = setup().await else { return };
    let auth = &state.services.auth;
    let username = unique("clerk");

    auth.register(username.clone(), "hunter22".to_string())
        .await
        .unwrap();
    let err = auth
        .register(username, "other-pass".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Duplicate { .. }));
}

#[tokio::test]
async fn test_wrong_password_and_unknown_user_fail_alike() {
    let Some(state) = setup().await else { return };
    let auth = &state.services.auth;
    let username = unique("clerk");
    auth.register(username.clone(), "hunter22".to_string())
        .await
        .unwrap();

    let wrong_password = auth
        .login(&username, "nope-nope".to_string())
        .await
        .unwrap_err();
    let unknown_user = auth
        .login(&unique("ghost"), "hunter22".to_string())
        .await
        .unwrap_err();

    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    assert!(matches!(wrong_password, AppError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_top_sellers_are_bounded_and_sorted() {
    let Some(state) = setup().await else { return };
    let brand = unique("brand");
    for quantity in 1..=6 {
        let created = add_item(&state, &brand, 100, 1).await;
        state
            .services
            .sales
            .make_sale(created.item.id, quantity, String::new())
            .await
            .unwrap();
    }

    let top = state.services.sales.top_sellers().await.unwrap();
    assert!(top.len() <= 5);
    assert!(top.windows(2).all(|w| w[0].total_sold >= w[1].total_sold));
}

#[tokio::test]
async fn test_sales_by_brand_and_today_include_new_sale() {
    let Some(state) = setup().await else { return };
    let brand = unique("brand");
    let created = add_item(&state, &brand, 4, 9).await;
    let sale = state
        .services
        .sales
        .make_sale(created.item.id, 2, String::new())
        .await
        .unwrap();

    let by_brand = state.services.sales.by_brand(&brand).await.unwrap();
    assert_eq!(by_brand.len(), 1);
    assert_eq!(by_brand[0].sale.id, sale.sale.id);
    assert_eq!(by_brand[0].item.brand, brand);

    let today = state.services.sales.today().await.unwrap();
    assert!(today.iter().any(|s| s.sale.id == sale.sale.id));
}

#[tokio::test]
async fn test_update_applies_known_fields_and_ignores_unknown_keys() {
    let Some(state) = setup().await else { return };
    let created = add_item(&state, &unique("brand"), 3, 10).await;

    let request: UpdateItemRequest = serde_json::from_value(serde_json::json!({
        "stock": 8,
        "price": "12",
        "images": ["https://img.test/b.png"],
        "colour": "red"
    }))
    .unwrap();
    let (patch, urls) = request.into_parts();

    let updated = state
        .services
        .inventory
        .update_item(created.item.id, patch, urls, Vec::new())
        .await
        .unwrap();

    assert_eq!(updated.item.stock, 8);
    assert_eq!(updated.item.price, 12);
    assert_eq!(updated.item.name, created.item.name);
    let urls: Vec<_> = updated.images.iter().map(|i| i.url.as_str()).collect();
    assert_eq!(urls, ["https://img.test/a.png", "https://img.test/b.png"]);
}

#[tokio::test]
async fn test_list_items_filters_by_exact_brand() {
    let Some(state) = setup().await else { return };
    let brand = unique("brand");
    let first = add_item(&state, &brand, 1, 1).await;
    let second = add_item(&state, &brand, 1, 1).await;
    add_item(&state, &format!("{brand}-other"), 1, 1).await;

    let listed = state
        .services
        .inventory
        .list_items(Some(&brand))
        .await
        .unwrap();
    let ids: Vec<_> = listed.iter().map(|i| i.item.id).collect();
    assert_eq!(ids, [first.item.id, second.item.id]);
}
