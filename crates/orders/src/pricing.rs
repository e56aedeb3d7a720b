//! Pure pricing/total calculation.
//!
//! No side effects, no I/O; exact decimal arithmetic throughout.

use storefront_core::Money;

/// Subtotal of a single line: unit price × quantity.
pub fn line_subtotal(unit_price: Money, quantity: u32) -> Money {
    unit_price.times(quantity)
}

/// Grand total of an ordered sequence of (unit price, quantity) pairs.
pub fn grand_total<I>(lines: I) -> Money
where
    I: IntoIterator<Item = (Money, u32)>,
{
    lines
        .into_iter()
        .map(|(unit_price, quantity)| line_subtotal(unit_price, quantity))
        .sum()
}
