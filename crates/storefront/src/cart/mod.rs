//! Cart manager: stock-bounded purchase selection, persisted on every change.
//!
//! Stock bounds here are a convenience for the shopper; the backend still
//! validates stock when the order is placed.
//!
//! Invariants held by every line:
//! - `1 <= quantity <= available_stock`
//! - product ids are unique across lines
//! - lines keep insertion order

mod store;

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use bazaar_core::{Product, ProductId};

use crate::error::add_breadcrumb;

pub use store::{CartStore, FileCartStore, MemoryCartStore};

/// One product in the cart with its add-time display snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Most recently observed stock figure for the product.
    pub available_stock: u32,
    pub quantity: u32,
}

impl CartLine {
    fn snapshot(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.price,
            image_url: product.image_url.clone(),
            category: product.category.clone(),
            available_stock: product.available_stock,
            quantity: 1,
        }
    }

    /// `unit_price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// What [`CartManager::add_item`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was inserted with quantity 1.
    Added,
    /// An existing line went up by one.
    Incremented,
    /// The line is already at the product's stock; nothing changed.
    AtLimit,
    /// The product is out of stock; nothing changed.
    Unavailable,
}

impl AddOutcome {
    /// Whether the cart changed.
    #[must_use]
    pub const fn changed(self) -> bool {
        matches!(self, Self::Added | Self::Incremented)
    }
}

/// The persisted cart document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of line subtotals; zero for an empty cart.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Total number of units across lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.line(product_id).map_or(0, |line| line.quantity)
    }

    fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }

    fn can_add(&self, product: &Product) -> bool {
        product.is_purchasable() && self.quantity_of(product.id) < product.available_stock
    }

    fn add(&mut self, product: &Product) -> AddOutcome {
        if !product.is_purchasable() {
            return AddOutcome::Unavailable;
        }

        let Some(line) = self.line_mut(product.id) else {
            self.lines.push(CartLine::snapshot(product));
            return AddOutcome::Added;
        };

        line.available_stock = product.available_stock;
        if line.quantity >= line.available_stock {
            line.quantity = line.available_stock;
            return AddOutcome::AtLimit;
        }
        line.quantity += 1;
        AddOutcome::Incremented
    }

    fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.lines.len() != before
    }

    fn set_quantity(&mut self, product_id: ProductId, quantity: i64) -> bool {
        if quantity < 1 {
            return self.remove(product_id);
        }

        let Some(line) = self.line_mut(product_id) else {
            return false;
        };

        let clamped = u32::try_from(quantity)
            .unwrap_or(u32::MAX)
            .min(line.available_stock);
        if clamped == 0 {
            return self.remove(product_id);
        }
        let changed = line.quantity != clamped;
        line.quantity = clamped;
        changed
    }

    fn observe(&mut self, products: &[Product]) -> bool {
        let mut changed = false;

        self.lines.retain_mut(|line| {
            let Some(product) = products.iter().find(|p| p.id == line.product_id) else {
                return true;
            };

            if !product.is_purchasable() {
                changed = true;
                return false;
            }

            let quantity = line.quantity.min(product.available_stock);
            changed |= quantity != line.quantity || product.available_stock != line.available_stock;
            line.available_stock = product.available_stock;
            line.quantity = quantity;
            true
        });

        changed
    }

    /// Check the line invariants; a stored cart that fails them is discarded.
    fn check(&self) -> Result<(), String> {
        let mut seen = HashSet::with_capacity(self.lines.len());
        for line in &self.lines {
            if line.quantity == 0 {
                return Err(format!("line for product {} has zero quantity", line.product_id));
            }
            if line.quantity > line.available_stock {
                return Err(format!(
                    "line for product {} exceeds available stock",
                    line.product_id
                ));
            }
            if !seen.insert(line.product_id) {
                return Err(format!("duplicate line for product {}", line.product_id));
            }
        }
        Ok(())
    }
}

/// Owns the cart and keeps its store in sync.
///
/// Mutations are serialized behind a mutex and each one that changes the
/// cart writes the full document before returning. A failed write is logged;
/// the in-memory change stands.
pub struct CartManager {
    cart: Mutex<Cart>,
    store: Box<dyn CartStore>,
}

impl std::fmt::Debug for CartManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("cart", &*self.lock())
            .finish_non_exhaustive()
    }
}

impl CartManager {
    /// Rehydrate from `store`.
    ///
    /// Missing, unreadable, or malformed contents yield an empty cart.
    #[must_use]
    pub fn new(store: impl CartStore + 'static) -> Self {
        let cart = rehydrate(&store);
        Self {
            cart: Mutex::new(cart),
            store: Box::new(store),
        }
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.lock().clone()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lock().lines.clone()
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lock().total()
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lock().item_count()
    }

    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.lock().quantity_of(product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Whether [`Self::add_item`] would change the cart for `product`.
    #[must_use]
    pub fn can_add(&self, product: &Product) -> bool {
        self.lock().can_add(product)
    }

    /// Add one unit of `product`.
    ///
    /// Never fails: adding beyond stock or adding an unavailable product is
    /// a no-op reported through the outcome.
    pub fn add_item(&self, product: &Product) -> AddOutcome {
        let mut cart = self.lock();
        let outcome = cart.add(product);
        if outcome.changed() {
            let id = product.id.to_string();
            add_breadcrumb("cart", "Added item", Some(&[("product_id", id.as_str())]));
            self.persist(&cart);
        } else {
            debug!(product_id = %product.id, ?outcome, "Add to cart was a no-op");
        }
        outcome
    }

    /// Delete the line for `product_id`, if any.
    pub fn remove_item(&self, product_id: ProductId) -> bool {
        let mut cart = self.lock();
        let removed = cart.remove(product_id);
        if removed {
            let id = product_id.to_string();
            add_breadcrumb("cart", "Removed item", Some(&[("product_id", id.as_str())]));
            self.persist(&cart);
        }
        removed
    }

    /// Set a line's quantity; below 1 removes the line and above the
    /// recorded stock clamps to it. Absent lines are left alone.
    pub fn set_quantity(&self, product_id: ProductId, quantity: i64) -> bool {
        let mut cart = self.lock();
        let changed = cart.set_quantity(product_id, quantity);
        if changed {
            let id = product_id.to_string();
            let qty = quantity.to_string();
            add_breadcrumb(
                "cart",
                "Updated quantity",
                Some(&[("product_id", id.as_str()), ("quantity", qty.as_str())]),
            );
            self.persist(&cart);
        }
        changed
    }

    /// Apply fresh stock figures from a product listing.
    ///
    /// Quantities clamp to the new stock; lines whose product can no longer
    /// be bought are dropped. Products not in the cart are ignored.
    pub fn observe_stock(&self, products: &[Product]) -> bool {
        let mut cart = self.lock();
        let changed = cart.observe(products);
        if changed {
            debug!(lines = cart.lines.len(), "Cart adjusted to observed stock");
            self.persist(&cart);
        }
        changed
    }

    /// Empty the cart.
    pub fn clear(&self) {
        let mut cart = self.lock();
        cart.lines.clear();
        add_breadcrumb("cart", "Cleared cart", None);
        self.persist(&cart);
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, cart: &Cart) {
        let json = match serde_json::to_string(cart) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cart");
                return;
            }
        };

        if let Err(e) = self.store.save(&json) {
            warn!(error = %e, "Failed to persist cart; change kept in memory only");
        }
    }
}

fn rehydrate(store: &dyn CartStore) -> Cart {
    let contents = match store.load() {
        Ok(Some(contents)) => contents,
        Ok(None) => return Cart::default(),
        Err(e) => {
            warn!(error = %e, "Could not read stored cart; starting empty");
            return Cart::default();
        }
    };

    let cart = match serde_json::from_str::<Cart>(&contents) {
        Ok(cart) => cart,
        Err(e) => {
            warn!(error = %e, "Stored cart is malformed; starting empty");
            return Cart::default();
        }
    };

    if let Err(reason) = cart.check() {
        warn!(%reason, "Stored cart violates cart invariants; starting empty");
        return Cart::default();
    }

    cart
}
