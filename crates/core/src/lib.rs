//! Bazaar Core - Shared domain types.
//!
//! This crate provides the types shared by every Bazaar component:
//! - `storefront` - Client-state library (session, cart, route guard, backend client)
//! - `cli` - Command-line front end over the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients.
//! Backend payloads are normalized into these types once, at the boundary,
//! so the rest of the workspace never probes alternative field names.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, roles, products, orders and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
