//! `storefront-cart` — the per-user shopping cart domain.

pub mod cart;

pub use cart::{Cart, CartId, CartLineItem};
