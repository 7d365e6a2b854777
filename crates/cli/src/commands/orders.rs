//! Order history and tracking commands.

use bazaar_core::{Order, TrackingId};
use bazaar_storefront::orders::{DEFAULT_PER_PAGE, Page, paginate};
use bazaar_storefront::state::AppContext;

use super::{CliError, LoginArgs, money, sign_in};

/// Show one page of the signed-in user's orders.
pub async fn history(ctx: &AppContext, login: &LoginArgs, page: usize) -> Result<(), CliError> {
    sign_in(ctx, login).await?;
    let orders = ctx.my_orders().await?;
    print_orders(&paginate(orders, page, DEFAULT_PER_PAGE));
    Ok(())
}

/// Look up an order by tracking id.
#[allow(clippy::print_stdout)]
pub async fn track(ctx: &AppContext, tracking_id: &str) -> Result<(), CliError> {
    let info = ctx.track(&TrackingId::new(tracking_id)).await?;
    println!("Order {}", info.order_id);
    println!("  Placed: {}", info.date.format("%Y-%m-%d %H:%M UTC"));
    println!("  Status: {}", info.status);
    Ok(())
}

/// Print a page of orders with a pager footer.
#[allow(clippy::print_stdout)]
pub fn print_orders(page: &Page<Order>) {
    if page.items.is_empty() {
        println!("No orders yet.");
        return;
    }

    for order in &page.items {
        let tracking = order
            .tracking_id
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        let placed = order
            .created_at
            .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d").to_string());
        println!(
            "{:>6}  {:<12}  {:<10}  {:<10}  {:>14}",
            order.id.to_string(),
            tracking,
            placed,
            order.status.as_str(),
            money(order.total_amount).to_string()
        );
    }
    println!(
        "Page {} of {} ({} orders)",
        page.page, page.total_pages, page.total_items
    );
}
