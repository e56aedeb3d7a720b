//! `storefront-store` — persistence boundary for the storefront core.
//!
//! Repository traits plus an in-memory reference backend. The ledger's
//! reservation operations are the serialization point for concurrent
//! checkouts of the same products.

pub mod error;
pub mod memory;
pub mod repository;

pub use error::StoreError;
pub use memory::InMemoryStore;
pub use repository::{
    CartRepository, OrderRepository, ProductRepository, ReservedLine, StockLedger,
    StockReservation, StoreBackend,
};
