//! Administrative console: order management and catalog authoring.
//!
//! Every operation first checks that the signed-in identity holds an
//! elevated role. The backend enforces the same rule; the local check just
//! avoids a round trip that is bound to fail.

use rust_decimal::Decimal;
use tracing::{info, instrument};

use bazaar_core::{
    Category, CategoryId, Identity, Order, OrderId, OrderStatus, Product, StockStatus,
    Subcategory,
};

use crate::api::{ApiClient, NewCategory, NewProduct, NewSubcategory};
use crate::catalog::Catalog;
use crate::error::{ClientError, FieldError, Result, add_breadcrumb};

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardSummary {
    pub products: usize,
    pub in_stock: usize,
    pub out_of_stock: usize,
    pub orders: usize,
    pub pending_orders: usize,
}

impl DashboardSummary {
    #[must_use]
    pub fn from_data(products: &[Product], orders: &[Order]) -> Self {
        let in_stock = products
            .iter()
            .filter(|p| p.stock_status == StockStatus::InStock)
            .count();

        Self {
            products: products.len(),
            in_stock,
            out_of_stock: products.len() - in_stock,
            orders: orders.len(),
            pending_orders: orders
                .iter()
                .filter(|o| o.status == OrderStatus::Pending)
                .count(),
        }
    }
}

/// Operations available to administrators and moderators.
pub struct AdminConsole<'a> {
    api: &'a ApiClient,
    catalog: &'a Catalog,
    identity: Option<&'a Identity>,
}

impl<'a> AdminConsole<'a> {
    #[must_use]
    pub const fn new(api: &'a ApiClient, catalog: &'a Catalog, identity: Option<&'a Identity>) -> Self {
        Self {
            api,
            catalog,
            identity,
        }
    }

    /// Every order in the store.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Auth` without an elevated identity, or the
    /// mapped backend failure.
    #[instrument(skip(self))]
    pub async fn all_orders(&self) -> Result<Vec<Order>> {
        self.authorize()?;
        Ok(self.api.all_orders().await?)
    }

    /// Move an order to `status`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Auth` without an elevated identity, or the
    /// mapped backend failure.
    #[instrument(skip(self))]
    pub async fn update_order_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order> {
        let admin = self.authorize()?;
        let order = self.api.update_order_status(order_id, status).await?;

        let id = order_id.to_string();
        add_breadcrumb(
            "admin",
            "Updated order status",
            Some(&[("order_id", id.as_str()), ("status", status.as_str())]),
        );
        info!(%order_id, %status, admin_id = %admin.id, "Order status updated");
        Ok(order)
    }

    /// Create a product after local validation.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` listing every invalid field,
    /// `ClientError::Auth` without an elevated identity, or the mapped
    /// backend failure.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product> {
        self.authorize()?;
        let errors = validate_product(product);
        if !errors.is_empty() {
            return Err(ClientError::Validation(errors));
        }

        let created = self.api.create_product(product).await?;
        self.catalog.invalidate().await;
        info!(product_id = %created.id, "Product created");
        Ok(created)
    }

    /// Create a top-level category.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for a blank name,
    /// `ClientError::Auth` without an elevated identity, or the mapped
    /// backend failure.
    #[instrument(skip(self))]
    pub async fn create_category(&self, name: &str) -> Result<Category> {
        self.authorize()?;
        let name = required_name(name, "Category name is required")?;

        let created = self.api.create_category(&NewCategory { name }).await?;
        self.catalog.invalidate().await;
        info!(category_id = %created.id, "Category created");
        Ok(created)
    }

    /// Create a subcategory under `category_id`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for a blank name,
    /// `ClientError::Auth` without an elevated identity, or the mapped
    /// backend failure.
    #[instrument(skip(self))]
    pub async fn create_subcategory(&self, category_id: CategoryId, name: &str) -> Result<Subcategory> {
        self.authorize()?;
        let name = required_name(name, "Subcategory name is required")?;

        let created = self
            .api
            .create_subcategory(category_id, &NewSubcategory { name })
            .await?;
        self.catalog.invalidate().await;
        info!(%category_id, subcategory_id = %created.id, "Subcategory created");
        Ok(created)
    }

    /// Product and order counts for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Auth` without an elevated identity, or the
    /// mapped backend failure.
    pub async fn summary(&self) -> Result<DashboardSummary> {
        self.authorize()?;
        let products = self.catalog.products(&crate::api::ProductQuery::default()).await?;
        let orders = self.api.all_orders().await?;
        Ok(DashboardSummary::from_data(&products, &orders))
    }

    fn authorize(&self) -> Result<&'a Identity> {
        match self.identity {
            Some(identity) if identity.is_elevated() => Ok(identity),
            Some(_) => Err(ClientError::Auth(
                "Administrator access required".to_string(),
            )),
            None => Err(ClientError::Auth("Please log in".to_string())),
        }
    }
}

/// Check a new product, reporting every problem.
#[must_use]
pub fn validate_product(product: &NewProduct) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if product.name.trim().is_empty() {
        errors.push(FieldError::new("name", "Product name is required"));
    }
    if product.description.trim().is_empty() {
        errors.push(FieldError::new("description", "Description is required"));
    }
    if product.price <= Decimal::ZERO {
        errors.push(FieldError::new("price", "Price must be greater than zero"));
    }
    if product.image_url.trim().is_empty() {
        errors.push(FieldError::new("image_url", "Image URL is required"));
    } else if url::Url::parse(product.image_url.trim()).is_err() {
        errors.push(FieldError::new("image_url", "Image URL is not a valid URL"));
    }
    if product.stock_status == StockStatus::InStock && product.quantity == 0 {
        errors.push(FieldError::new(
            "quantity",
            "In-stock products need a quantity above zero",
        ));
    }

    errors
}

fn required_name(name: &str, message: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ClientError::invalid("name", message));
    }
    Ok(name.to_owned())
}
