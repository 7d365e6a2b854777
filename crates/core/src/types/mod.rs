//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod email;
pub mod id;
pub mod identity;
pub mod order;
pub mod price;
pub mod status;

pub use catalog::{Category, Product, Subcategory};
pub use email::{Email, EmailError};
pub use id::*;
pub use identity::{Identity, Role, RoleError};
pub use order::{
    Order, OrderItem, OrderItemSubmission, OrderReceipt, OrderSubmission, TrackingId, TrackingInfo,
};
pub use price::{CurrencyCode, Price};
pub use status::*;
