//! Checkout orchestration.
//!
//! `CheckoutService` composes the persistence traits into the storefront's
//! application surface: cart mutation with advisory stock checks, the
//! all-or-nothing `place_order` sequence, and user-scoped order queries.
//!
//! ## Checkout execution flow
//!
//! ```text
//! place_order(user_id, placed_at)
//!   ↓
//! 1. Load the user's cart (lazily created; empty cart fails fast)
//!   ↓
//! 2. Reserve every line through the ledger: one indivisible
//!    check-and-decrement that also freezes unit prices
//!   ↓
//! 3. Build the immutable order from the frozen lines (total computed
//!    with the pure pricing calculator)
//!   ↓
//! 4. Persist the order       (on failure: release the reservation)
//!   ↓
//! 5. Clear and save the cart (on failure: delete the order, release)
//! ```
//!
//! Every failure path restores the pre-call state before returning, so
//! partial completion is never observable; transient storage errors are
//! therefore safe to retry wholesale.

use chrono::{DateTime, Utc};

use storefront_cart::Cart;
use storefront_catalog::{Product, ProductId};
use storefront_core::{AggregateId, UserId};
use storefront_orders::{pricing, Order, OrderId, OrderLineItem, OrderStatus};
use storefront_store::{StockReservation, StoreBackend};

use crate::error::CheckoutError;
use crate::view::{CartLineView, CartView};

/// Application service over a storage backend.
#[derive(Debug)]
pub struct CheckoutService<S> {
    store: S,
}

impl<S> CheckoutService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: StoreBackend> CheckoutService<S> {
    /// The user's cart with live prices, per-line subtotals and the running
    /// total. Creates the cart on first access.
    pub fn view_cart(&self, user_id: UserId) -> Result<CartView, CheckoutError> {
        let cart = self.store.cart_for_user(user_id)?;
        self.build_view(&cart)
    }

    /// Add a product to the user's cart, merging into an existing line.
    ///
    /// The stock check here is advisory (a better error earlier); the
    /// authoritative check is the reservation inside [`Self::place_order`].
    pub fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartView, CheckoutError> {
        let product = self.store.find_product(product_id)?;
        if !product.has_stock(quantity) {
            return Err(CheckoutError::InsufficientStock(product.name().to_string()));
        }
        let mut cart = self.store.cart_for_user(user_id)?;
        cart.add_item(product_id, quantity)?;
        self.store.save_cart(cart.clone())?;
        self.build_view(&cart)
    }

    /// Replace the quantity of an existing cart line. Quantity 0 is rejected;
    /// removal is explicit via [`Self::remove_item`].
    pub fn update_item_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartView, CheckoutError> {
        let mut cart = self.store.cart_for_user(user_id)?;
        cart.update_item_quantity(product_id, quantity)?;
        let product = self.store.find_product(product_id)?;
        if !product.has_stock(quantity) {
            return Err(CheckoutError::InsufficientStock(product.name().to_string()));
        }
        self.store.save_cart(cart.clone())?;
        self.build_view(&cart)
    }

    /// Remove a line from the user's cart.
    pub fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartView, CheckoutError> {
        let mut cart = self.store.cart_for_user(user_id)?;
        cart.remove_item(product_id)?;
        self.store.save_cart(cart.clone())?;
        self.build_view(&cart)
    }

    /// Convert the user's cart into an immutable order.
    ///
    /// Stock is checked and decremented for all lines as one indivisible
    /// unit; unit prices are frozen in the same critical section. Either the
    /// order exists, stock is reduced and the cart is empty, or none of it.
    pub fn place_order(
        &self,
        user_id: UserId,
        placed_at: DateTime<Utc>,
    ) -> Result<Order, CheckoutError> {
        let mut cart = self.store.cart_for_user(user_id)?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let requests: Vec<StockReservation> = cart
            .items()
            .iter()
            .map(|line| StockReservation {
                product_id: line.product_id,
                quantity: line.quantity,
            })
            .collect();

        let reserved = self.store.reserve_all(&requests)?;

        let lines: Vec<OrderLineItem> = reserved
            .iter()
            .map(|line| OrderLineItem {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();

        let order = Order::place(OrderId::new(AggregateId::new()), user_id, lines, placed_at)?;

        if let Err(err) = self.store.save_order(order.clone()) {
            self.release_reservation(&requests);
            return Err(err.into());
        }

        cart.clear();
        if let Err(err) = self.store.save_cart(cart) {
            if let Err(delete_err) = self.store.delete_order(order.id_typed()) {
                tracing::error!(
                    order_id = %order.id_typed(),
                    %delete_err,
                    "could not delete order while rolling back checkout"
                );
            }
            self.release_reservation(&requests);
            return Err(err.into());
        }

        tracing::info!(
            order_id = %order.id_typed(),
            user_id = %user_id,
            total = %order.total(),
            lines = order.lines().len(),
            "order placed"
        );
        Ok(order)
    }

    /// All orders of the user, newest first.
    pub fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, CheckoutError> {
        Ok(self.store.orders_for_user(user_id)?)
    }

    /// A single order, verified to belong to the calling user.
    pub fn order_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Order, CheckoutError> {
        let order = self.store.find_order(order_id)?;
        if order.user_id() != user_id {
            return Err(CheckoutError::Unauthorized);
        }
        Ok(order)
    }

    /// Administrative status update; any known status value is accepted.
    pub fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, CheckoutError> {
        let mut order = self.store.find_order(order_id)?;
        order.set_status(status);
        self.store.save_order(order.clone())?;
        Ok(order)
    }

    /// Administrative restock, serialized with reservations by the ledger.
    pub fn restock_product(
        &self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Product, CheckoutError> {
        if quantity == 0 {
            return Err(CheckoutError::InvalidQuantity(
                "quantity must be at least 1".to_string(),
            ));
        }
        Ok(self.store.restock(product_id, quantity)?)
    }

    fn build_view(&self, cart: &Cart) -> Result<CartView, CheckoutError> {
        let mut items = Vec::with_capacity(cart.items().len());
        for line in cart.items() {
            let product = self.store.find_product(line.product_id)?;
            items.push(CartLineView {
                product_id: line.product_id,
                name: product.name().to_string(),
                quantity: line.quantity,
                unit_price: product.price(),
                subtotal: pricing::line_subtotal(product.price(), line.quantity),
            });
        }
        let total = pricing::grand_total(
            items
                .iter()
                .map(|line| (line.unit_price, line.quantity)),
        );
        Ok(CartView {
            cart_id: cart.id_typed(),
            items,
            total,
        })
    }

    fn release_reservation(&self, requests: &[StockReservation]) {
        if let Err(err) = self.store.release(requests) {
            tracing::error!(%err, "could not release reserved stock while rolling back checkout");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use storefront_core::Money;
    use storefront_store::{InMemoryStore, ProductRepository};

    fn money(s: &str) -> Money {
        s.parse().unwrap()
    }

    fn setup() -> (CheckoutService<Arc<InMemoryStore>>, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (CheckoutService::new(Arc::clone(&store)), store)
    }

    fn seed_product(store: &InMemoryStore, name: &str, price: &str, stock: u32) -> ProductId {
        let id = ProductId::new(AggregateId::new());
        let product =
            Product::new(id, name, None, money(price), stock, Utc::now()).unwrap();
        store.save_product(product).unwrap();
        id
    }

    #[test]
    fn view_cart_creates_an_empty_cart_lazily() {
        let (service, _store) = setup();
        let view = service.view_cart(UserId::new()).unwrap();
        assert!(view.items.is_empty());
        assert!(view.total.is_zero());
    }

    #[test]
    fn add_item_prices_the_cart_view() {
        let (service, store) = setup();
        let user_id = UserId::new();
        let widget = seed_product(&store, "Widget", "10.00", 5);

        let view = service.add_item(user_id, widget, 2).unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].name, "Widget");
        assert_eq!(view.items[0].subtotal, money("20.00"));
        assert_eq!(view.total, money("20.00"));
    }

    #[test]
    fn add_item_merges_repeated_products() {
        let (service, store) = setup();
        let user_id = UserId::new();
        let widget = seed_product(&store, "Widget", "10.00", 5);

        service.add_item(user_id, widget, 2).unwrap();
        let view = service.add_item(user_id, widget, 1).unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].quantity, 3);
    }

    #[test]
    fn add_item_rejects_more_than_known_stock() {
        let (service, store) = setup();
        let user_id = UserId::new();
        let widget = seed_product(&store, "Widget", "10.00", 2);

        let err = service.add_item(user_id, widget, 3).unwrap_err();
        match err {
            CheckoutError::InsufficientStock(name) => assert_eq!(name, "Widget"),
            _ => panic!("Expected InsufficientStock error"),
        }
        assert!(service.view_cart(user_id).unwrap().items.is_empty());
    }

    #[test]
    fn add_item_requires_an_existing_product() {
        let (service, _store) = setup();
        let missing = ProductId::new(AggregateId::new());
        let err = service.add_item(UserId::new(), missing, 1).unwrap_err();
        match err {
            CheckoutError::NotFound => {}
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn update_item_quantity_rejects_zero() {
        let (service, store) = setup();
        let user_id = UserId::new();
        let widget = seed_product(&store, "Widget", "10.00", 5);
        service.add_item(user_id, widget, 2).unwrap();

        let err = service.update_item_quantity(user_id, widget, 0).unwrap_err();
        match err {
            CheckoutError::InvalidQuantity(_) => {}
            _ => panic!("Expected InvalidQuantity error"),
        }
        // Quantity unchanged.
        let view = service.view_cart(user_id).unwrap();
        assert_eq!(view.items[0].quantity, 2);
    }

    #[test]
    fn update_item_quantity_applies_the_advisory_stock_check() {
        let (service, store) = setup();
        let user_id = UserId::new();
        let widget = seed_product(&store, "Widget", "10.00", 5);
        service.add_item(user_id, widget, 2).unwrap();

        let err = service.update_item_quantity(user_id, widget, 6).unwrap_err();
        match err {
            CheckoutError::InsufficientStock(_) => {}
            _ => panic!("Expected InsufficientStock error"),
        }
        let view = service.view_cart(user_id).unwrap();
        assert_eq!(view.items[0].quantity, 2);
    }

    #[test]
    fn remove_item_requires_an_existing_line() {
        let (service, store) = setup();
        let widget = seed_product(&store, "Widget", "10.00", 5);
        let err = service.remove_item(UserId::new(), widget).unwrap_err();
        match err {
            CheckoutError::NotFound => {}
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn remove_item_drops_the_line_from_the_view() {
        let (service, store) = setup();
        let user_id = UserId::new();
        let widget = seed_product(&store, "Widget", "10.00", 5);
        let gadget = seed_product(&store, "Gadget", "5.50", 5);
        service.add_item(user_id, widget, 1).unwrap();
        service.add_item(user_id, gadget, 1).unwrap();

        let view = service.remove_item(user_id, widget).unwrap();
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].product_id, gadget);
        assert_eq!(view.total, money("5.50"));
    }

    #[test]
    fn restock_product_rejects_zero_quantity() {
        let (service, store) = setup();
        let widget = seed_product(&store, "Widget", "10.00", 5);
        let err = service.restock_product(widget, 0).unwrap_err();
        match err {
            CheckoutError::InvalidQuantity(_) => {}
            _ => panic!("Expected InvalidQuantity error"),
        }
    }

    #[test]
    fn restock_product_raises_quantity_on_hand() {
        let (service, store) = setup();
        let widget = seed_product(&store, "Widget", "10.00", 2);
        let product = service.restock_product(widget, 3).unwrap();
        assert_eq!(product.stock(), 5);
    }

    #[test]
    fn order_for_user_rejects_foreign_orders() {
        let (service, store) = setup();
        let owner = UserId::new();
        let widget = seed_product(&store, "Widget", "10.00", 5);
        service.add_item(owner, widget, 1).unwrap();
        let order = service.place_order(owner, Utc::now()).unwrap();

        let err = service
            .order_for_user(UserId::new(), order.id_typed())
            .unwrap_err();
        match err {
            CheckoutError::Unauthorized => {}
            _ => panic!("Expected Unauthorized error"),
        }
        // The owner still sees it.
        let fetched = service.order_for_user(owner, order.id_typed()).unwrap();
        assert_eq!(fetched.id_typed(), order.id_typed());
    }

    #[test]
    fn update_order_status_sets_any_known_status() {
        let (service, store) = setup();
        let user_id = UserId::new();
        let widget = seed_product(&store, "Widget", "10.00", 5);
        service.add_item(user_id, widget, 1).unwrap();
        let order = service.place_order(user_id, Utc::now()).unwrap();

        let updated = service
            .update_order_status(order.id_typed(), OrderStatus::Shipped)
            .unwrap();
        assert_eq!(updated.status(), OrderStatus::Shipped);
        let fetched = service.order_for_user(user_id, order.id_typed()).unwrap();
        assert_eq!(fetched.status(), OrderStatus::Shipped);
    }
}
