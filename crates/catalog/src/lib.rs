//! `storefront-catalog` — the product catalog domain.

pub mod product;

pub use product::{Product, ProductId};
