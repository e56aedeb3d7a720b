//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: they represent
/// concepts where identity doesn't matter, only the values do. To "modify" a
/// value object, create a new one. [`crate::Money`] is the canonical example:
/// two `Money` values of the same amount are interchangeable.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
