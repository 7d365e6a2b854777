//! Administrative commands.
//!
//! # Usage
//!
//! ```bash
//! # Credentials can come from the environment instead of flags
//! export BAZAAR_IDENTIFIER=admin@example.com BAZAAR_PASSWORD=...
//!
//! bazaar admin orders --page 2
//! bazaar admin set-status 41 shipped
//! bazaar admin add-category "Home & Garden"
//! bazaar admin add-subcategory 3 "Cookware"
//! bazaar admin add-product --name Kettle --description "Steel, 1.7L" \
//!     --price 4000 --category-id 3 --subcategory-id 9 --quantity 12 \
//!     --image-url https://cdn.example.com/kettle.png
//! bazaar admin summary
//! ```
//!
//! Signing in as a customer fails every command with an authorization error.

use clap::Args;
use rust_decimal::Decimal;

use bazaar_core::{CategoryId, OrderId, OrderStatus, StockStatus, SubcategoryId};
use bazaar_storefront::admin::AdminConsole;
use bazaar_storefront::api::NewProduct;
use bazaar_storefront::orders::{DEFAULT_PER_PAGE, paginate};

use super::orders::print_orders;
use super::{CliError, money};

/// Fields for a new product.
#[derive(Debug, Args)]
pub struct ProductArgs {
    #[arg(long)]
    name: String,

    #[arg(long)]
    description: String,

    /// Unit price in the store currency
    #[arg(long)]
    price: Decimal,

    #[arg(long)]
    category_id: CategoryId,

    #[arg(long)]
    subcategory_id: SubcategoryId,

    /// Units in stock
    #[arg(long, default_value_t = 0)]
    quantity: u32,

    #[arg(long, default_value = "")]
    variant: String,

    /// `in_stock` or `out_of_stock`
    #[arg(long, default_value = "in_stock")]
    stock_status: StockStatus,

    #[arg(long)]
    image_url: String,
}

impl From<ProductArgs> for NewProduct {
    fn from(args: ProductArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            price: args.price,
            category_id: args.category_id,
            subcategory_id: args.subcategory_id,
            quantity: args.quantity,
            variant: args.variant,
            stock_status: args.stock_status,
            image_url: args.image_url,
        }
    }
}

/// List every order, one page at a time.
pub async fn orders(console: &AdminConsole<'_>, page: usize) -> Result<(), CliError> {
    let orders = console.all_orders().await?;
    print_orders(&paginate(orders, page, DEFAULT_PER_PAGE));
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn set_status(
    console: &AdminConsole<'_>,
    order_id: OrderId,
    status: OrderStatus,
) -> Result<(), CliError> {
    let order = console.update_order_status(order_id, status).await?;
    println!("Order {} is now {}.", order.id, order.status);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn add_category(console: &AdminConsole<'_>, name: &str) -> Result<(), CliError> {
    let category = console.create_category(name).await?;
    println!("Created category {} ({}).", category.name, category.id);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn add_subcategory(
    console: &AdminConsole<'_>,
    category_id: CategoryId,
    name: &str,
) -> Result<(), CliError> {
    let subcategory = console.create_subcategory(category_id, name).await?;
    println!(
        "Created subcategory {} ({}) under category {category_id}.",
        subcategory.name, subcategory.id
    );
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn add_product(console: &AdminConsole<'_>, args: ProductArgs) -> Result<(), CliError> {
    let product = console.create_product(&args.into()).await?;
    println!(
        "Created product {} ({}) at {}.",
        product.name,
        product.id,
        money(product.price)
    );
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn summary(console: &AdminConsole<'_>) -> Result<(), CliError> {
    let summary = console.summary().await?;
    println!("Products:     {}", summary.products);
    println!("  In stock:   {}", summary.in_stock);
    println!("  Sold out:   {}", summary.out_of_stock);
    println!("Orders:       {}", summary.orders);
    println!("  Pending:    {}", summary.pending_orders);
    Ok(())
}
