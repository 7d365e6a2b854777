//! Checkout command.

use bazaar_storefront::checkout::CheckoutForm;
use bazaar_storefront::error::ClientError;
use bazaar_storefront::state::AppContext;

use super::{CliError, LoginArgs, money, resolve_identity};

/// Submit the cart as an order. Signs in first when credentials are given;
/// otherwise the order is placed anonymously.
#[allow(clippy::print_stdout)]
pub async fn place_order(
    ctx: &AppContext,
    login: &LoginArgs,
    name: String,
    address: String,
    phone: String,
) -> Result<(), CliError> {
    resolve_identity(ctx, login).await?;

    let total = ctx.cart().total();
    let form = CheckoutForm {
        name,
        address,
        phone,
    };

    match ctx.checkout(&form).await {
        Ok(receipt) => {
            println!("Order {} placed, total {}.", receipt.order_id, money(total));
            println!("Tracking ID: {}", receipt.tracking_id);
            Ok(())
        }
        Err(e @ ClientError::Validation(_)) => {
            for error in e.field_errors() {
                println!("  {error}");
            }
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}
