use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use storefront_cart::{Cart, CartId};
use storefront_catalog::{Product, ProductId};
use storefront_core::{AggregateId, UserId};
use storefront_orders::{Order, OrderId};

use crate::error::StoreError;
use crate::repository::{
    CartRepository, OrderRepository, ProductRepository, ReservedLine, StockLedger,
    StockReservation,
};

/// In-memory storefront backend.
///
/// Intended for tests/dev. Not optimized for performance: the whole product
/// table shares one lock, so reservations of disjoint products serialize
/// too (a SQL backend would get per-row independence from conditional
/// updates).
#[derive(Debug, Default)]
pub struct InMemoryStore {
    products: RwLock<HashMap<ProductId, Product>>,
    carts: RwLock<HashMap<UserId, Cart>>,
    orders: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl ProductRepository for InMemoryStore {
    fn find_product(&self, id: ProductId) -> Result<Product, StoreError> {
        let products = self.products.read().map_err(poisoned)?;
        products.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    fn save_product(&self, product: Product) -> Result<(), StoreError> {
        let mut products = self.products.write().map_err(poisoned)?;
        products.insert(product.id_typed(), product);
        Ok(())
    }
}

impl StockLedger for InMemoryStore {
    fn reserve_all(&self, lines: &[StockReservation]) -> Result<Vec<ReservedLine>, StoreError> {
        if lines.is_empty() {
            return Ok(vec![]);
        }

        // The write lock is held across check and decrement of every line;
        // this is the serialization point for racing checkouts.
        let mut products = self.products.write().map_err(poisoned)?;

        // Check phase: reject the whole batch before touching any stock.
        let mut seen = HashSet::with_capacity(lines.len());
        for line in lines {
            if line.quantity == 0 {
                return Err(StoreError::Rejected(
                    "reservation quantity must be at least 1".to_string(),
                ));
            }
            if !seen.insert(line.product_id) {
                return Err(StoreError::Rejected(format!(
                    "duplicate product in reservation: {}",
                    line.product_id
                )));
            }
            let product = products.get(&line.product_id).ok_or(StoreError::NotFound)?;
            if !product.has_stock(line.quantity) {
                return Err(StoreError::InsufficientStock(product.name().to_string()));
            }
        }

        // Mutate phase: every line is covered, the lock is still held, so
        // none of these deductions can fail.
        let mut reserved = Vec::with_capacity(lines.len());
        for line in lines {
            let product = products
                .get_mut(&line.product_id)
                .ok_or(StoreError::NotFound)?;
            product.deduct(line.quantity)?;
            reserved.push(ReservedLine {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: product.price(),
            });
        }

        Ok(reserved)
    }

    fn release(&self, lines: &[StockReservation]) -> Result<(), StoreError> {
        let mut products = self.products.write().map_err(poisoned)?;
        for line in lines {
            match products.get_mut(&line.product_id) {
                Some(product) => {
                    if let Err(err) = product.restock(line.quantity) {
                        tracing::warn!(
                            product_id = %line.product_id,
                            %err,
                            "could not restock line during release"
                        );
                    }
                }
                None => {
                    tracing::warn!(
                        product_id = %line.product_id,
                        "released product no longer exists"
                    );
                }
            }
        }
        Ok(())
    }

    fn restock(&self, product_id: ProductId, quantity: u32) -> Result<Product, StoreError> {
        let mut products = self.products.write().map_err(poisoned)?;
        let product = products.get_mut(&product_id).ok_or(StoreError::NotFound)?;
        product.restock(quantity)?;
        Ok(product.clone())
    }
}

impl CartRepository for InMemoryStore {
    fn cart_for_user(&self, user_id: UserId) -> Result<Cart, StoreError> {
        let mut carts = self.carts.write().map_err(poisoned)?;
        let cart = carts
            .entry(user_id)
            .or_insert_with(|| Cart::new(CartId::new(AggregateId::new()), user_id));
        Ok(cart.clone())
    }

    fn save_cart(&self, cart: Cart) -> Result<(), StoreError> {
        let mut carts = self.carts.write().map_err(poisoned)?;
        carts.insert(cart.user_id(), cart);
        Ok(())
    }
}

impl OrderRepository for InMemoryStore {
    fn find_order(&self, id: OrderId) -> Result<Order, StoreError> {
        let orders = self.orders.read().map_err(poisoned)?;
        orders.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    fn save_order(&self, order: Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().map_err(poisoned)?;
        orders.insert(order.id_typed(), order);
        Ok(())
    }

    fn delete_order(&self, id: OrderId) -> Result<(), StoreError> {
        let mut orders = self.orders.write().map_err(poisoned)?;
        orders.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().map_err(poisoned)?;
        let mut found: Vec<Order> = orders
            .values()
            .filter(|order| order.user_id() == user_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(found)
    }
}
