//! Checkout: turns the cart and contact details into a submitted order.

use tracing::{info, instrument};

use bazaar_core::{Identity, OrderItemSubmission, OrderReceipt, OrderSubmission};

use crate::api::ApiClient;
use crate::cart::{Cart, CartManager};
use crate::error::{ClientError, FieldError, Result, add_breadcrumb};

/// Contact details collected at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub name: String,
    pub address: String,
    pub phone: String,
}

impl CheckoutForm {
    /// Check every field, reporting all problems at once.
    #[must_use]
    pub fn field_errors(&self) -> Vec<FieldError> {
        [
            ("name", &self.name, "Name is required"),
            ("address", &self.address, "Address is required"),
            ("phone", &self.phone, "Phone number is required"),
        ]
        .into_iter()
        .filter(|(_, value, _)| value.trim().is_empty())
        .map(|(field, _, message)| FieldError::new(field, message))
        .collect()
    }
}

/// Build the order body from a cart snapshot, the form, and the buyer.
///
/// # Errors
///
/// Returns `ClientError::Validation` listing every missing field, plus a
/// `cart` entry when the cart is empty.
pub fn build_submission(
    form: &CheckoutForm,
    cart: &Cart,
    buyer: Option<&Identity>,
) -> Result<OrderSubmission> {
    let mut errors = form.field_errors();
    if cart.is_empty() {
        errors.push(FieldError::new("cart", "Your cart is empty"));
    }
    if !errors.is_empty() {
        return Err(ClientError::Validation(errors));
    }

    Ok(OrderSubmission {
        name: form.name.trim().to_owned(),
        address: form.address.trim().to_owned(),
        phone: form.phone.trim().to_owned(),
        user_id: buyer.map(|identity| identity.id),
        total_amount: cart.total(),
        items: cart
            .lines()
            .iter()
            .map(|line| OrderItemSubmission {
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.unit_price,
            })
            .collect(),
    })
}

/// Submit the cart as an order and clear it once the backend accepts.
///
/// # Errors
///
/// Returns `ClientError` if validation fails or the backend rejects the
/// order; the cart is left as it was.
#[instrument(skip_all, fields(lines = tracing::field::Empty))]
pub async fn submit(
    api: &ApiClient,
    cart: &CartManager,
    buyer: Option<&Identity>,
    form: &CheckoutForm,
) -> Result<OrderReceipt> {
    let snapshot = cart.snapshot();
    tracing::Span::current().record("lines", snapshot.lines().len());

    let order = build_submission(form, &snapshot, buyer)?;
    add_breadcrumb("checkout", "Submitting order", None);

    let receipt = api.submit_order(&order).await?;

    cart.clear();
    info!(
        order_id = %receipt.order_id,
        tracking_id = %receipt.tracking_id,
        "Order placed"
    );
    Ok(receipt)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use bazaar_core::{Product, ProductId, Role, StockStatus};

    use super::*;
    use crate::cart::MemoryCartStore;
    use crate::session::tests::identity;

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: " Amna ".to_string(),
            address: "12 Mall Road, Lahore".to_string(),
            phone: "0300-1234567".to_string(),
        }
    }

    fn filled_cart() -> Cart {
        let cart = CartManager::new(MemoryCartStore::new());
        let product = Product {
            id: ProductId::new(5),
            name: "Kettle".to_string(),
            description: None,
            price: Decimal::new(49_950, 2),
            category_id: None,
            subcategory_id: None,
            category: None,
            variant: None,
            image_url: None,
            available_stock: 3,
            stock_status: StockStatus::InStock,
        };
        cart.add_item(&product);
        cart.add_item(&product);
        cart.snapshot()
    }

    #[test]
    fn test_reports_every_missing_field() {
        let err = build_submission(&CheckoutForm::default(), &Cart::default(), None).unwrap_err();
        let fields: Vec<_> = err.field_errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["name", "address", "phone", "cart"]);
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let form = CheckoutForm {
            phone: "   ".to_string(),
            ..form()
        };
        let err = build_submission(&form, &filled_cart(), None).unwrap_err();
        assert_eq!(err.field_errors(), [FieldError::new("phone", "Phone number is required")]);
    }

    #[test]
    fn test_builds_submission_from_cart() {
        let buyer = identity(Role::Customer);
        let order = build_submission(&form(), &filled_cart(), Some(&buyer)).unwrap();

        assert_eq!(order.name, "Amna");
        assert_eq!(order.user_id, Some(buyer.id));
        assert_eq!(order.total_amount, Decimal::new(99_900, 2));
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].price, Decimal::new(49_950, 2));
    }

    #[test]
    fn test_anonymous_checkout_has_no_buyer() {
        let order = build_submission(&form(), &filled_cart(), None).unwrap();
        assert!(order.user_id.is_none());
    }
}
