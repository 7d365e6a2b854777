//! Bazaar storefront client library.
//!
//! Client-side state for the Bazaar storefront: who is signed in, what is in
//! the cart, which views may render, and a typed client for the backend REST
//! service that owns every business rule. A front end (the `bazaar` CLI, or
//! a UI) builds one [`state::AppContext`] at startup and drives it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod guard;
pub mod orders;
pub mod session;
pub mod state;
