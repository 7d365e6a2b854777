//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! bazaar products --category Kitchen --search kettle --sort price-desc
//! bazaar categories
//! ```

use bazaar_storefront::api::ProductQuery;
use bazaar_storefront::catalog::{Listing, ProductSort, search_and_sort};
use bazaar_storefront::state::AppContext;

use super::{CliError, money};

/// List products, filtered server-side by category and locally by search.
#[allow(clippy::print_stdout)]
pub async fn products(
    ctx: &AppContext,
    category: Option<String>,
    subcategory: Option<String>,
    search: &str,
    sort: ProductSort,
) -> Result<(), CliError> {
    let query = ProductQuery {
        category,
        subcategory,
    };
    let products = ctx.catalog().products(&query).await?;
    ctx.cart().observe_stock(&products);

    let listing = Listing::from(search_and_sort(products, search, sort));
    if listing == Listing::Empty {
        println!("No products found.");
        return Ok(());
    }

    for product in listing.items() {
        let availability = if product.is_purchasable() {
            format!("{} in stock", product.available_stock)
        } else {
            "out of stock".to_string()
        };
        println!(
            "{:>5}  {:<32}  {:>14}  {}",
            product.id.to_string(),
            product.name,
            money(product.price).to_string(),
            availability
        );
    }
    Ok(())
}

/// Print the category tree.
#[allow(clippy::print_stdout)]
pub async fn categories(ctx: &AppContext) -> Result<(), CliError> {
    let categories = ctx.catalog().categories().await?;
    if categories.is_empty() {
        println!("No categories yet.");
    }

    for category in categories {
        println!("{:>5}  {}", category.id.to_string(), category.name);
        for sub in category.subcategories {
            println!("{:>5}    - {}", sub.id.to_string(), sub.name);
        }
    }
    Ok(())
}
