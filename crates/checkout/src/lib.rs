//! `storefront-checkout` — the cart-to-order orchestration service.
//!
//! Converts a user's mutable cart into an immutable order: validates the
//! cart, atomically reserves stock, freezes unit prices, persists the order
//! and clears the cart. All or nothing, including under concurrent
//! checkouts of the same products.

pub mod error;
pub mod service;
pub mod view;


pub use error::CheckoutError;
pub use service::CheckoutService;
pub use view::{CartLineView, CartView};
