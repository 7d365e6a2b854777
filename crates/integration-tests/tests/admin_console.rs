//! Admin console against the stub backend.

use bazaar_core::{CategoryId, OrderStatus, StockStatus, SubcategoryId};
use bazaar_integration_tests::{
    ADMIN_EMAIL, ADMIN_PASSWORD, CUSTOMER_EMAIL, CUSTOMER_PASSWORD, StubBackend,
};
use bazaar_storefront::api::{NewProduct, ProductQuery};
use bazaar_storefront::cart::MemoryCartStore;
use bazaar_storefront::checkout::CheckoutForm;
use bazaar_storefront::error::ClientError;
use bazaar_storefront::state::AppContext;
use rust_decimal::Decimal;
use secrecy::SecretString;

async fn signed_in(backend: &StubBackend, email: &str, password: &str) -> AppContext {
    let ctx = backend.context(MemoryCartStore::new());
    ctx.session().restore_session().await;
    ctx.session()
        .login(email, &SecretString::from(password))
        .await
        .expect("login succeeds");
    ctx
}

fn kettle_v2() -> NewProduct {
    NewProduct {
        name: "Kettle v2".to_string(),
        description: "Quieter whistle".to_string(),
        price: Decimal::new(4_250, 0),
        category_id: CategoryId::new(1),
        subcategory_id: SubcategoryId::new(10),
        quantity: 7,
        variant: "Matte black".to_string(),
        stock_status: StockStatus::InStock,
        image_url: "https://cdn.example.com/kettle-v2.png".to_string(),
    }
}

#[tokio::test]
async fn test_customer_is_refused_locally() {
    let backend = StubBackend::start().await;
    let ctx = signed_in(&backend, CUSTOMER_EMAIL, CUSTOMER_PASSWORD).await;
    let identity = ctx.session().identity();

    let err = ctx
        .admin(identity.as_ref())
        .all_orders()
        .await
        .expect_err("customers are not admins");
    assert!(matches!(err, ClientError::Auth(_)));
}

#[tokio::test]
async fn test_create_product_invalidates_catalog() {
    let backend = StubBackend::start().await;
    let ctx = signed_in(&backend, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let identity = ctx.session().identity();
    let admin = ctx.admin(identity.as_ref());

    let before = ctx
        .catalog()
        .products(&ProductQuery::default())
        .await
        .expect("products load");

    let created = admin.create_product(&kettle_v2()).await.expect("product created");
    assert_eq!(created.available_stock, 7);
    assert_eq!(created.variant.as_deref(), Some("Matte black"));

    let after = ctx
        .catalog()
        .products(&ProductQuery::default())
        .await
        .expect("products load");
    assert_eq!(after.len(), before.len() + 1);
}

#[tokio::test]
async fn test_categories_and_subcategories() {
    let backend = StubBackend::start().await;
    let ctx = signed_in(&backend, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let identity = ctx.session().identity();
    let admin = ctx.admin(identity.as_ref());

    assert_eq!(ctx.catalog().categories().await.expect("categories load").len(), 2);

    let category = admin.create_category("Bath").await.expect("category created");
    let sub = admin
        .create_subcategory(category.id, "Towels")
        .await
        .expect("subcategory created");

    let categories = ctx.catalog().categories().await.expect("categories load");
    let bath = categories
        .iter()
        .find(|c| c.id == category.id)
        .expect("new category listed");
    assert_eq!(bath.subcategories, [sub]);
}

#[tokio::test]
async fn test_order_status_and_summary() {
    let backend = StubBackend::start().await;

    let shopper = backend.context(MemoryCartStore::new());
    let products = shopper
        .catalog()
        .products(&ProductQuery::default())
        .await
        .expect("products load");
    shopper.cart().add_item(&products[0]);
    let receipt = shopper
        .checkout(&CheckoutForm {
            name: "Bilal".to_string(),
            address: "4 Canal View".to_string(),
            phone: "0321-7654321".to_string(),
        })
        .await
        .expect("order accepted");

    let ctx = signed_in(&backend, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let identity = ctx.session().identity();
    let admin = ctx.admin(identity.as_ref());

    let summary = admin.summary().await.expect("summary loads");
    assert_eq!(summary.products, 3);
    assert_eq!(summary.in_stock, 2);
    assert_eq!(summary.out_of_stock, 1);
    assert_eq!(summary.orders, 1);
    assert_eq!(summary.pending_orders, 1);

    let order = admin
        .update_order_status(receipt.order_id, OrderStatus::Shipped)
        .await
        .expect("status updated");
    assert_eq!(order.status, OrderStatus::Shipped);

    let info = shopper.track(&receipt.tracking_id).await.expect("trackable");
    assert_eq!(info.status, OrderStatus::Shipped);
}
