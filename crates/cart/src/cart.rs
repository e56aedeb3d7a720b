use serde::{Deserialize, Serialize};

use storefront_catalog::ProductId;
use storefront_core::{AggregateId, DomainError, Entity, UserId};

/// Cart identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(pub AggregateId);

impl CartId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CartId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Cart line: product + desired quantity (always ≥ 1).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Aggregate root: Cart.
///
/// One per user, created lazily on first access and never deleted. Lines are
/// kept in insertion order; a product appears in at most one line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    id: CartId,
    user_id: UserId,
    items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart for a user.
    pub fn new(id: CartId, user_id: UserId) -> Self {
        Self {
            id,
            user_id,
            items: Vec::new(),
        }
    }

    pub fn id_typed(&self) -> CartId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.items
            .iter()
            .find(|line| line.product_id == product_id)
            .map(|line| line.quantity)
    }

    /// Add a product to the cart. If a line for the product already exists,
    /// its quantity is incremented rather than a duplicate line created.
    pub fn add_item(&mut self, product_id: ProductId, quantity: u32) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::invalid_quantity("quantity must be at least 1"));
        }
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|line| line.product_id == product_id)
        {
            line.quantity = line
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| DomainError::invalid_quantity("quantity exceeds representable range"))?;
        } else {
            self.items.push(CartLineItem {
                product_id,
                quantity,
            });
        }
        Ok(())
    }

    /// Replace the quantity of an existing line. Removal via quantity 0 is not
    /// implicit; callers must use [`Cart::remove_item`].
    pub fn update_item_quantity(
        &mut self,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::invalid_quantity(
                "quantity must be at least 1; use remove instead",
            ));
        }
        let line = self
            .items
            .iter_mut()
            .find(|line| line.product_id == product_id)
            .ok_or(DomainError::NotFound)?;
        line.quantity = quantity;
        Ok(())
    }

    /// Remove the line for a product.
    pub fn remove_item(&mut self, product_id: ProductId) -> Result<(), DomainError> {
        let position = self
            .items
            .iter()
            .position(|line| line.product_id == product_id)
            .ok_or(DomainError::NotFound)?;
        self.items.remove(position);
        Ok(())
    }

    /// Drop every line. Called exactly when an order is placed from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl Entity for Cart {
    type Id = CartId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
