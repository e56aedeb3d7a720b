use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storefront_catalog::ProductId;
use storefront_core::{AggregateId, DomainError, Entity, Money, UserId, ValueObject};

use crate::pricing;

/// Order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub AggregateId);

impl OrderId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Order status lifecycle. `Created` is the only status the checkout sets;
/// the rest are administrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Created,
    Paid,
    Shipped,
    Cancelled,
}

/// Order line: a frozen snapshot of product, quantity and the unit price at
/// the time of purchase. Later catalog changes never alter it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderLineItem {
    pub fn subtotal(&self) -> Money {
        pricing::line_subtotal(self.unit_price, self.quantity)
    }
}

impl ValueObject for OrderLineItem {}

/// Aggregate root: Order.
///
/// An immutable record of a completed checkout. The total is computed from
/// the lines at construction, so it always reconciles exactly; the status is
/// the only field that changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    lines: Vec<OrderLineItem>,
    total: Money,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl Order {
    /// Create an order from frozen line snapshots with status `Created`.
    pub fn place(
        id: OrderId,
        user_id: UserId,
        lines: Vec<OrderLineItem>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if lines.is_empty() {
            return Err(DomainError::validation(
                "order must contain at least one line",
            ));
        }
        if lines.iter().any(|line| line.quantity == 0) {
            return Err(DomainError::invalid_quantity("quantity must be at least 1"));
        }
        let total = pricing::grand_total(
            lines
                .iter()
                .map(|line| (line.unit_price, line.quantity)),
        );
        Ok(Self {
            id,
            user_id,
            lines,
            total,
            status: OrderStatus::Created,
            created_at,
        })
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn lines(&self) -> &[OrderLineItem] {
        &self.lines
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Administrative status update. Any known status value is accepted; the
    /// transition set is not validated here.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
