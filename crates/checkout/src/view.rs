//! Read-side cart representation returned to the calling layer.

use serde::Serialize;

use storefront_cart::CartId;
use storefront_catalog::ProductId;
use storefront_core::Money;

/// One priced cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// A cart with per-line subtotals and the running total, priced against the
/// live catalog. Advisory only; checkout re-prices under the reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub cart_id: CartId,
    pub items: Vec<CartLineView>,
    pub total: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::AggregateId;

    #[test]
    fn serializes_the_response_surface() {
        let product_id = ProductId::new(AggregateId::new());
        let view = CartView {
            cart_id: CartId::new(AggregateId::new()),
            items: vec![CartLineView {
                product_id,
                name: "Widget".to_string(),
                quantity: 2,
                unit_price: "10.00".parse().unwrap(),
                subtotal: "20.00".parse().unwrap(),
            }],
            total: "20.00".parse().unwrap(),
        };

        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["items"][0]["name"], "Widget");
        assert_eq!(value["items"][0]["subtotal"], "20.00");
        assert_eq!(value["total"], "20.00");
    }
}
