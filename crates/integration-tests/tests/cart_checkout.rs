//! Catalog, cart, checkout, and tracking end to end.

use bazaar_core::{ProductId, TrackingId};
use bazaar_integration_tests::{
    CUSTOMER_EMAIL, CUSTOMER_PASSWORD, KETTLE_ID, SOLD_OUT_ID, StubBackend, TEAPOT_ID,
    context_for, unreachable_url,
};
use bazaar_storefront::api::ProductQuery;
use bazaar_storefront::cart::{AddOutcome, FileCartStore, MemoryCartStore};
use bazaar_storefront::checkout::CheckoutForm;
use bazaar_storefront::error::ClientError;
use rust_decimal::Decimal;
use secrecy::SecretString;

fn form() -> CheckoutForm {
    CheckoutForm {
        name: "Amna".to_string(),
        address: "12 Mall Road, Lahore".to_string(),
        phone: "0300-1234567".to_string(),
    }
}

#[tokio::test]
async fn test_catalog_normalizes_stock_fields() {
    let backend = StubBackend::start().await;
    let ctx = backend.context(MemoryCartStore::new());

    let products = ctx
        .catalog()
        .products(&ProductQuery::default())
        .await
        .expect("products load");

    let stock: Vec<_> = products
        .iter()
        .map(|p| (p.id.as_i32(), p.available_stock, p.is_purchasable()))
        .collect();
    assert_eq!(
        stock,
        [(KETTLE_ID, 2, true), (TEAPOT_ID, 10, true), (SOLD_OUT_ID, 0, false)]
    );
}

#[tokio::test]
async fn test_catalog_filters_and_caches() {
    let backend = StubBackend::start().await;
    let ctx = backend.context(MemoryCartStore::new());
    let garden = ProductQuery {
        category: Some("Garden".to_string()),
        subcategory: None,
    };

    let first = ctx.catalog().products(&garden).await.expect("products load");
    let second = ctx.catalog().products(&garden).await.expect("products load");
    assert_eq!(first, second);
    assert_eq!(first.len(), 1);
    assert_eq!(backend.state().product_requests, 1);

    ctx.catalog().invalidate().await;
    ctx.catalog().products(&garden).await.expect("products load");
    assert_eq!(backend.state().product_requests, 2);

    let kettles = ProductQuery {
        category: None,
        subcategory: Some("Kettles".to_string()),
    };
    let found = ctx.catalog().products(&kettles).await.expect("products load");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, ProductId::new(KETTLE_ID));
}

#[tokio::test]
async fn test_checkout_clears_cart_and_tracks() {
    let backend = StubBackend::start().await;
    let ctx = backend.context(MemoryCartStore::new());
    ctx.session().restore_session().await;
    ctx.session()
        .login(CUSTOMER_EMAIL, &SecretString::from(CUSTOMER_PASSWORD))
        .await
        .expect("login succeeds");

    let products = ctx
        .catalog()
        .products(&ProductQuery::default())
        .await
        .expect("products load");
    let kettle = products
        .iter()
        .find(|p| p.id == ProductId::new(KETTLE_ID))
        .expect("kettle is seeded");

    assert_eq!(ctx.cart().add_item(kettle), AddOutcome::Added);
    assert_eq!(ctx.cart().add_item(kettle), AddOutcome::Incremented);
    assert_eq!(ctx.cart().add_item(kettle), AddOutcome::AtLimit);
    assert_eq!(ctx.cart().total(), Decimal::from(1000));

    let receipt = ctx.checkout(&form()).await.expect("order accepted");
    assert!(ctx.cart().is_empty());
    assert!(receipt.tracking_id.as_str().starts_with("TRK-"));

    let orders = ctx.my_orders().await.expect("history loads");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].id, receipt.order_id);
    assert_eq!(orders[0].items[0].quantity, 2);

    let info = ctx.track(&receipt.tracking_id).await.expect("order is trackable");
    assert_eq!(info.order_id, receipt.order_id);
    assert_eq!(info.status.as_str(), "pending");
}

#[tokio::test]
async fn test_anonymous_checkout_sends_no_buyer() {
    let backend = StubBackend::start().await;
    let ctx = backend.context(MemoryCartStore::new());
    ctx.session().restore_session().await;

    let products = ctx
        .catalog()
        .products(&ProductQuery::default())
        .await
        .expect("products load");
    ctx.cart().add_item(&products[1]);

    ctx.checkout(&form()).await.expect("order accepted");

    let state = backend.state();
    assert!(state.orders[0]["user_id"].is_null());
    assert_eq!(state.orders[0]["total_amount"], serde_json::json!(1250.5));
}

#[tokio::test]
async fn test_invalid_checkout_keeps_cart() {
    let backend = StubBackend::start().await;
    let ctx = backend.context(MemoryCartStore::new());

    let err = ctx
        .checkout(&CheckoutForm::default())
        .await
        .expect_err("empty form must fail");
    let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.clone()).collect();
    assert_eq!(fields, ["name", "address", "phone", "cart"]);
    assert!(backend.state().orders.is_empty());

    let products = ctx
        .catalog()
        .products(&ProductQuery::default())
        .await
        .expect("products load");

    let offline = context_for(&unreachable_url().await, MemoryCartStore::new());
    offline.cart().add_item(&products[0]);

    let err = offline.checkout(&form()).await.expect_err("backend is down");
    assert!(matches!(err, ClientError::Unreachable(_)));
    assert!(err.is_retryable());
    assert_eq!(offline.cart().item_count(), 1);
}

#[tokio::test]
async fn test_unknown_tracking_id_is_not_found() {
    let backend = StubBackend::start().await;
    let ctx = backend.context(MemoryCartStore::new());

    let err = ctx
        .track(&TrackingId::new("TRK-404"))
        .await
        .expect_err("unknown id");
    assert!(matches!(err, ClientError::NotFound(_)));
}

#[tokio::test]
async fn test_order_history_needs_login() {
    let backend = StubBackend::start().await;
    let ctx = backend.context(MemoryCartStore::new());
    ctx.session().restore_session().await;

    let err = ctx.my_orders().await.expect_err("anonymous");
    assert!(matches!(err, ClientError::Auth(_)));
}

#[tokio::test]
async fn test_cart_survives_restart() {
    let backend = StubBackend::start().await;
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("cart.json");

    let ctx = backend.context(FileCartStore::new(&path));
    let products = ctx
        .catalog()
        .products(&ProductQuery::default())
        .await
        .expect("products load");
    for product in &products {
        ctx.cart().add_item(product);
    }
    let before = ctx.cart().lines();
    drop(ctx);

    let restarted = backend.context(FileCartStore::new(&path));
    assert_eq!(restarted.cart().lines(), before);
    assert_eq!(restarted.cart().item_count(), 2);
}
