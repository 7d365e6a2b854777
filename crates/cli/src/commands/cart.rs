//! Cart commands. The cart lives in `BAZAAR_CART_PATH` between runs.
//!
//! # Usage
//!
//! ```bash
//! bazaar cart add 12
//! bazaar cart set 12 3
//! bazaar cart remove 12
//! bazaar cart show
//! bazaar cart clear
//! ```

use bazaar_core::ProductId;
use bazaar_storefront::api::ProductQuery;
use bazaar_storefront::cart::AddOutcome;
use bazaar_storefront::state::AppContext;

use super::{CliError, money};

/// Print the cart, refreshing stock figures first when the backend answers.
#[allow(clippy::print_stdout)]
pub async fn show(ctx: &AppContext) {
    match ctx.catalog().products(&ProductQuery::default()).await {
        Ok(products) => {
            ctx.cart().observe_stock(&products);
        }
        Err(e) => tracing::warn!(error = %e, "Could not refresh stock; showing saved cart"),
    }

    let cart = ctx.cart().snapshot();
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in cart.lines() {
        println!(
            "{:>5}  {:<32}  {:>3} x {:>12}  = {:>14}",
            line.product_id.to_string(),
            line.name,
            line.quantity,
            money(line.unit_price).to_string(),
            money(line.subtotal()).to_string()
        );
    }
    println!("{} item(s), total {}", cart.item_count(), money(cart.total()));
}

/// Add one unit of `product_id`.
#[allow(clippy::print_stdout)]
pub async fn add(ctx: &AppContext, product_id: ProductId) -> Result<(), CliError> {
    let products = ctx.catalog().products(&ProductQuery::default()).await?;
    ctx.cart().observe_stock(&products);

    let product = products
        .iter()
        .find(|p| p.id == product_id)
        .ok_or(CliError::UnknownProduct(product_id))?;

    match ctx.cart().add_item(product) {
        AddOutcome::Added | AddOutcome::Incremented => println!(
            "Added {} (now {} in cart).",
            product.name,
            ctx.cart().quantity_of(product_id)
        ),
        AddOutcome::AtLimit => println!(
            "Only {} of {} in stock; your cart already has them all.",
            product.available_stock, product.name
        ),
        AddOutcome::Unavailable => println!("{} is out of stock.", product.name),
    }
    Ok(())
}

/// Remove a line.
#[allow(clippy::print_stdout)]
pub fn remove(ctx: &AppContext, product_id: ProductId) {
    if ctx.cart().remove_item(product_id) {
        println!("Removed product {product_id}.");
    } else {
        println!("Product {product_id} is not in your cart.");
    }
}

/// Set a line's quantity; the cart clamps it to stock.
#[allow(clippy::print_stdout)]
pub fn set(ctx: &AppContext, product_id: ProductId, quantity: i64) {
    ctx.cart().set_quantity(product_id, quantity);
    match ctx.cart().quantity_of(product_id) {
        0 => println!("Product {product_id} is not in your cart."),
        n => println!("Product {product_id}: quantity {n}."),
    }
}

/// Empty the cart.
#[allow(clippy::print_stdout)]
pub fn clear(ctx: &AppContext) {
    ctx.cart().clear();
    println!("Cart cleared.");
}
