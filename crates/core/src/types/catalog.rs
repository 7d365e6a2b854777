//! Catalog types: products and their category tree.
//!
//! Product payloads from the backend have carried the stock figure under
//! several different field names over time. [`Product`] deserializes through
//! a private wire record that accepts all of them and resolves a single
//! `available_stock` once, so nothing downstream needs to probe.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId, SubcategoryId};
use super::status::StockStatus;

/// A product as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ProductRecord")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    /// Unit price in the store currency.
    pub price: Decimal,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    /// Category display name, when the backend includes it.
    pub category: Option<String>,
    pub variant: Option<String>,
    pub image_url: Option<String>,
    /// Units available for purchase at last observation.
    pub available_stock: u32,
    pub stock_status: StockStatus,
}

impl Product {
    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub fn is_purchasable(&self) -> bool {
        self.stock_status == StockStatus::InStock && self.available_stock > 0
    }
}

/// Wire shape of a product.
///
/// Each historic field name is its own slot; a payload may carry several
/// at once.
#[derive(Deserialize)]
struct ProductRecord {
    id: ProductId,
    name: String,
    #[serde(default)]
    description: Option<String>,
    price: Decimal,
    #[serde(default)]
    category_id: Option<CategoryId>,
    #[serde(default)]
    subcategory_id: Option<SubcategoryId>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    category_name: Option<String>,
    #[serde(default)]
    variant: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    available_stock: Option<i64>,
    #[serde(default)]
    quantity: Option<i64>,
    #[serde(default)]
    quantity_in_stock: Option<i64>,
    #[serde(default, rename = "quantityAvailable")]
    quantity_available: Option<i64>,
    #[serde(default)]
    stock: Option<i64>,
    #[serde(default, rename = "maxStock")]
    max_stock: Option<i64>,
    #[serde(default)]
    stock_status: Option<StockStatus>,
}

impl ProductRecord {
    /// First stock figure present, newest field name first.
    fn stock(&self) -> Option<i64> {
        self.available_stock
            .or(self.quantity)
            .or(self.quantity_in_stock)
            .or(self.quantity_available)
            .or(self.stock)
            .or(self.max_stock)
    }
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        let available_stock = record
            .stock()
            .map_or(0, |n| u32::try_from(n.max(0)).unwrap_or(u32::MAX));

        let stock_status = record.stock_status.unwrap_or(if available_stock > 0 {
            StockStatus::InStock
        } else {
            StockStatus::OutOfStock
        });

        Self {
            id: record.id,
            name: record.name,
            description: record.description.filter(|d| !d.is_empty()),
            price: record.price,
            category_id: record.category_id,
            subcategory_id: record.subcategory_id,
            category: record.category.or(record.category_name),
            variant: record.variant.filter(|v| !v.is_empty()),
            image_url: record
                .image_url
                .filter(|u| !u.is_empty())
                .or_else(|| record.image.filter(|u| !u.is_empty())),
            available_stock,
            stock_status,
        }
    }
}

/// A top-level product category with its subcategories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

/// A subcategory nested under a [`Category`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub name: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn decode(json: &str) -> Product {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_stock_resolved_from_any_historic_field() {
        for field in [
            "available_stock",
            "quantity",
            "quantity_in_stock",
            "quantityAvailable",
            "stock",
            "maxStock",
        ] {
            let product = decode(&format!(
                r#"{{"id": 1, "name": "Kettle", "price": 500, "{field}": 3}}"#
            ));
            assert_eq!(product.available_stock, 3, "field {field}");
        }
    }

    #[test]
    fn test_several_stock_fields_in_one_payload() {
        let product = decode(
            r#"{"id": 1, "name": "Kettle", "price": 500, "quantity": 3, "quantity_in_stock": 3}"#,
        );
        assert_eq!(product.available_stock, 3);

        let product = decode(
            r#"{"id": 1, "name": "Kettle", "price": 500, "quantity_in_stock": 7, "quantity": 2, "maxStock": 9}"#,
        );
        assert_eq!(product.available_stock, 2);
    }

    #[test]
    fn test_both_category_fields_in_one_payload() {
        let product = decode(
            r#"{"id": 1, "name": "Kettle", "price": 500, "category": "Kitchen", "category_name": "Cookware"}"#,
        );
        assert_eq!(product.category.as_deref(), Some("Kitchen"));

        let product = decode(
            r#"{"id": 1, "name": "Kettle", "price": 500, "image_url": "", "image": "https://cdn.example.com/k.png"}"#,
        );
        assert_eq!(product.image_url.as_deref(), Some("https://cdn.example.com/k.png"));
    }

    #[test]
    fn test_listing_survives_record_with_mixed_fields() {
        let json = r#"[
            {"id": 1, "name": "Kettle", "price": 500, "quantity": 3, "quantity_in_stock": 3},
            {"id": 2, "name": "Teapot", "price": 800, "category": "Kitchen", "category_name": "Kitchen", "stock": 1}
        ]"#;
        let products: Vec<Product> = serde_json::from_str(json).unwrap();
        assert_eq!(products.len(), 2);
        assert!(products.iter().all(Product::is_purchasable));
    }

    #[test]
    fn test_missing_or_negative_stock_is_zero() {
        let product = decode(r#"{"id": 1, "name": "Kettle", "price": 500}"#);
        assert_eq!(product.available_stock, 0);
        assert_eq!(product.stock_status, StockStatus::OutOfStock);

        let product = decode(r#"{"id": 1, "name": "Kettle", "price": 500, "quantity": -4}"#);
        assert_eq!(product.available_stock, 0);
    }

    #[test]
    fn test_price_accepts_number_or_string() {
        let a = decode(r#"{"id": 1, "name": "A", "price": 499.5, "quantity": 1}"#);
        let b = decode(r#"{"id": 1, "name": "A", "price": "499.5", "quantity": 1}"#);
        assert_eq!(a.price, Decimal::new(4995, 1));
        assert_eq!(a.price, b.price);
    }

    #[test]
    fn test_explicit_stock_status_wins() {
        let product = decode(
            r#"{"id": 1, "name": "A", "price": 1, "quantity": 5, "stock_status": "out_of_stock"}"#,
        );
        assert_eq!(product.available_stock, 5);
        assert!(!product.is_purchasable());
    }

    #[test]
    fn test_purchasable() {
        let product = decode(r#"{"id": 1, "name": "A", "price": 1, "quantity": 2}"#);
        assert!(product.is_purchasable());
    }

    #[test]
    fn test_normalized_product_reloads_from_its_own_serialization() {
        let product = decode(
            r#"{"id": 9, "name": "Lamp", "price": "1200", "category_name": "Home", "quantityAvailable": 4, "variant": ""}"#,
        );
        assert_eq!(product.category.as_deref(), Some("Home"));
        assert_eq!(product.variant, None);

        let json = serde_json::to_string(&product).unwrap();
        assert_eq!(decode(&json), product);
    }

    #[test]
    fn test_category_tree() {
        let json = r#"[{"id": 1, "name": "Kitchen", "subcategories": [{"id": 4, "name": "Kettles"}]}, {"id": 2, "name": "Garden"}]"#;
        let categories: Vec<Category> = serde_json::from_str(json).unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].subcategories[0].name, "Kettles");
        assert!(categories[1].subcategories.is_empty());
    }
}
