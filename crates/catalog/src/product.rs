use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_core::{AggregateId, DomainError, Entity, Money};

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Entity: Product.
///
/// Quantity-on-hand is unsigned, so the stock-never-negative invariant holds
/// by construction; the only downward mutation is the conditional [`Product::deduct`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    description: Option<String>,
    price: Money,
    stock: u32,
    created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        description: Option<String>,
        price: Money,
        stock: u32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            description,
            price,
            stock,
            created_at,
        })
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether quantity-on-hand covers the requested quantity.
    pub fn has_stock(&self, quantity: u32) -> bool {
        self.stock >= quantity
    }

    /// Conditional stock decrement: succeeds only if quantity-on-hand covers
    /// the request, otherwise leaves stock untouched.
    pub fn deduct(&mut self, quantity: u32) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::invalid_quantity("quantity must be at least 1"));
        }
        match self.stock.checked_sub(quantity) {
            Some(remaining) => {
                self.stock = remaining;
                Ok(())
            }
            None => Err(DomainError::insufficient_stock(self.name.clone())),
        }
    }

    /// Administrative restock: the only upward stock mutation.
    pub fn restock(&mut self, quantity: u32) -> Result<(), DomainError> {
        if quantity == 0 {
            return Err(DomainError::invalid_quantity("quantity must be at least 1"));
        }
        self.stock = self
            .stock
            .checked_add(quantity)
            .ok_or_else(|| DomainError::validation("stock exceeds representable range"))?;
        Ok(())
    }

    pub fn set_price(&mut self, price: Money) {
        self.price = price;
    }

    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        self.name = name;
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product_id() -> ProductId {
        ProductId::new(AggregateId::new())
    }

    fn test_product(stock: u32) -> Product {
        Product::new(
            test_product_id(),
            "Widget",
            None,
            "10.00".parse().unwrap(),
            stock,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn new_product_rejects_empty_name() {
        let err = Product::new(
            test_product_id(),
            "   ",
            None,
            Money::ZERO,
            0,
            Utc::now(),
        )
        .unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty name"),
        }
    }

    #[test]
    fn deduct_reduces_stock_when_covered() {
        let mut product = test_product(5);
        product.deduct(3).unwrap();
        assert_eq!(product.stock(), 2);
    }

    #[test]
    fn deduct_allows_taking_the_last_unit() {
        let mut product = test_product(1);
        product.deduct(1).unwrap();
        assert_eq!(product.stock(), 0);
    }

    #[test]
    fn deduct_fails_and_leaves_stock_untouched_when_short() {
        let mut product = test_product(2);
        let err = product.deduct(3).unwrap_err();
        match err {
            DomainError::InsufficientStock(name) => assert_eq!(name, "Widget"),
            _ => panic!("Expected InsufficientStock error"),
        }
        assert_eq!(product.stock(), 2);
    }

    #[test]
    fn deduct_rejects_zero_quantity() {
        let mut product = test_product(2);
        let err = product.deduct(0).unwrap_err();
        match err {
            DomainError::InvalidQuantity(_) => {}
            _ => panic!("Expected InvalidQuantity error"),
        }
        assert_eq!(product.stock(), 2);
    }

    #[test]
    fn restock_accumulates() {
        let mut product = test_product(2);
        product.restock(8).unwrap();
        assert_eq!(product.stock(), 10);
    }

    #[test]
    fn restock_rejects_zero_quantity() {
        let mut product = test_product(2);
        let err = product.restock(0).unwrap_err();
        match err {
            DomainError::InvalidQuantity(_) => {}
            _ => panic!("Expected InvalidQuantity error"),
        }
    }

    #[test]
    fn restock_rejects_overflow() {
        let mut product = test_product(u32::MAX);
        let err = product.restock(1).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for overflow"),
        }
        assert_eq!(product.stock(), u32::MAX);
    }

    #[test]
    fn rename_rejects_empty_name() {
        let mut product = test_product(1);
        let err = product.rename("").unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error"),
        }
        assert_eq!(product.name(), "Widget");
    }

    #[test]
    fn set_price_replaces_the_unit_price() {
        let mut product = test_product(1);
        product.set_price("12.50".parse().unwrap());
        assert_eq!(product.price(), "12.50".parse().unwrap());
    }

    #[test]
    fn has_stock_boundary() {
        let product = test_product(3);
        assert!(product.has_stock(3));
        assert!(!product.has_stock(4));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: deduct succeeds exactly when the quantity is positive
            /// and covered by stock, and never leaves stock negative-equivalent
            /// (i.e. wrapped).
            #[test]
            fn deduct_succeeds_iff_positive_and_covered(
                stock in 0u32..10_000,
                quantity in 0u32..10_000,
            ) {
                let mut product = test_product(stock);
                let result = product.deduct(quantity);
                if quantity > 0 && quantity <= stock {
                    prop_assert!(result.is_ok());
                    prop_assert_eq!(product.stock(), stock - quantity);
                } else {
                    prop_assert!(result.is_err());
                    prop_assert_eq!(product.stock(), stock);
                }
            }

            /// Property: deduct followed by restock of the same quantity
            /// restores the original quantity-on-hand.
            #[test]
            fn deduct_then_restock_restores_stock(
                stock in 1u32..10_000,
                quantity in 1u32..10_000,
            ) {
                prop_assume!(quantity <= stock);
                let mut product = test_product(stock);
                product.deduct(quantity).unwrap();
                product.restock(quantity).unwrap();
                prop_assert_eq!(product.stock(), stock);
            }
        }
    }
}
