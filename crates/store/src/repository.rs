//! Repository and stock-ledger traits.
//!
//! These are the core's only view of persistence. Implementations must make
//! [`StockLedger::reserve_all`] atomic with respect to other reservations:
//! no interleaving may allow two callers to jointly over-draw stock.

use std::sync::Arc;

use storefront_cart::Cart;
use storefront_catalog::{Product, ProductId};
use storefront_core::{Money, UserId};
use storefront_orders::{Order, OrderId};

use crate::error::StoreError;

/// One requested reservation line.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StockReservation {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A granted reservation line: quantity deducted, unit price frozen at the
/// moment of deduction.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReservedLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

/// Product lookup and persistence.
pub trait ProductRepository: Send + Sync {
    fn find_product(&self, id: ProductId) -> Result<Product, StoreError>;
    fn save_product(&self, product: Product) -> Result<(), StoreError>;
}

/// Authoritative quantity-on-hand, mutated only through conditional
/// reservation, release, and administrative restock.
pub trait StockLedger: Send + Sync {
    /// Check-and-decrement every line as one indivisible unit: either every
    /// line is covered and deducted, or nothing is. Returns the granted
    /// lines with unit prices frozen inside the same critical section.
    ///
    /// Equivalent to a conditional `UPDATE … SET qty = qty - :n WHERE
    /// qty >= :n` per line, executed under one transaction.
    fn reserve_all(&self, lines: &[StockReservation]) -> Result<Vec<ReservedLine>, StoreError>;

    /// Conditional decrement for a single product.
    fn check_and_reserve(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<ReservedLine, StoreError> {
        let mut reserved = self.reserve_all(&[StockReservation {
            product_id,
            quantity,
        }])?;
        reserved
            .pop()
            .ok_or_else(|| StoreError::Unavailable("empty reservation result".to_string()))
    }

    /// Compensating restock of previously reserved lines (e.g. order
    /// persistence failed after the reservation succeeded). Best-effort per
    /// line; must not fail the whole release because one product vanished.
    fn release(&self, lines: &[StockReservation]) -> Result<(), StoreError>;

    /// Administrative restock of a single product. Routed through the ledger
    /// so it serializes with reservations.
    fn restock(&self, product_id: ProductId, quantity: u32) -> Result<Product, StoreError>;
}

/// Per-user cart persistence. Carts are created lazily on first access and
/// never deleted.
pub trait CartRepository: Send + Sync {
    fn cart_for_user(&self, user_id: UserId) -> Result<Cart, StoreError>;
    fn save_cart(&self, cart: Cart) -> Result<(), StoreError>;
}

/// Order persistence and user-scoped queries.
pub trait OrderRepository: Send + Sync {
    fn find_order(&self, id: OrderId) -> Result<Order, StoreError>;
    fn save_order(&self, order: Order) -> Result<(), StoreError>;
    /// Compensation path: remove an order whose checkout did not complete.
    fn delete_order(&self, id: OrderId) -> Result<(), StoreError>;
    /// All orders of a user, newest first.
    fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;
}

/// The full persistence surface the checkout service composes.
pub trait StoreBackend:
    ProductRepository + StockLedger + CartRepository + OrderRepository
{
}

impl<T> StoreBackend for T where
    T: ProductRepository + StockLedger + CartRepository + OrderRepository
{
}

impl<S> ProductRepository for Arc<S>
where
    S: ProductRepository + ?Sized,
{
    fn find_product(&self, id: ProductId) -> Result<Product, StoreError> {
        (**self).find_product(id)
    }

    fn save_product(&self, product: Product) -> Result<(), StoreError> {
        (**self).save_product(product)
    }
}

impl<S> StockLedger for Arc<S>
where
    S: StockLedger + ?Sized,
{
    fn reserve_all(&self, lines: &[StockReservation]) -> Result<Vec<ReservedLine>, StoreError> {
        (**self).reserve_all(lines)
    }

    fn check_and_reserve(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<ReservedLine, StoreError> {
        (**self).check_and_reserve(product_id, quantity)
    }

    fn release(&self, lines: &[StockReservation]) -> Result<(), StoreError> {
        (**self).release(lines)
    }

    fn restock(&self, product_id: ProductId, quantity: u32) -> Result<Product, StoreError> {
        (**self).restock(product_id, quantity)
    }
}

impl<S> CartRepository for Arc<S>
where
    S: CartRepository + ?Sized,
{
    fn cart_for_user(&self, user_id: UserId) -> Result<Cart, StoreError> {
        (**self).cart_for_user(user_id)
    }

    fn save_cart(&self, cart: Cart) -> Result<(), StoreError> {
        (**self).save_cart(cart)
    }
}

impl<S> OrderRepository for Arc<S>
where
    S: OrderRepository + ?Sized,
{
    fn find_order(&self, id: OrderId) -> Result<Order, StoreError> {
        (**self).find_order(id)
    }

    fn save_order(&self, order: Order) -> Result<(), StoreError> {
        (**self).save_order(order)
    }

    fn delete_order(&self, id: OrderId) -> Result<(), StoreError> {
        (**self).delete_order(id)
    }

    fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        (**self).orders_for_user(user_id)
    }
}
