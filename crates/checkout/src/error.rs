//! Service-level error model: the flattened union of domain and storage
//! failures the calling layer sees.

use thiserror::Error;

use storefront_core::DomainError;
use storefront_store::StoreError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// Checkout attempted on a cart with no line items. No mutation occurred.
    #[error("cart is empty")]
    EmptyCart,

    /// A line item's requested quantity exceeds the product's
    /// quantity-on-hand; carries the offending product's name. No mutation
    /// occurred. Not retryable without changing the request.
    #[error("insufficient stock for product: {0}")]
    InsufficientStock(String),

    /// A non-positive quantity was supplied to a cart or stock mutation.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// The referenced cart/product/order does not exist.
    #[error("not found")]
    NotFound,

    /// A value failed validation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A conflicting state was detected.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller does not own the referenced resource.
    #[error("unauthorized")]
    Unauthorized,

    /// Persistence is (possibly transiently) unavailable. The whole
    /// operation may be retried: no partial side effects were committed.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<DomainError> for CheckoutError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => CheckoutError::Validation(msg),
            DomainError::InvalidQuantity(msg) => CheckoutError::InvalidQuantity(msg),
            DomainError::InvalidId(msg) => CheckoutError::Validation(msg),
            DomainError::NotFound => CheckoutError::NotFound,
            DomainError::EmptyCart => CheckoutError::EmptyCart,
            DomainError::InsufficientStock(product) => CheckoutError::InsufficientStock(product),
            DomainError::Conflict(msg) => CheckoutError::Conflict(msg),
            DomainError::Unauthorized => CheckoutError::Unauthorized,
        }
    }
}

impl From<StoreError> for CheckoutError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => CheckoutError::NotFound,
            StoreError::InsufficientStock(product) => CheckoutError::InsufficientStock(product),
            StoreError::Rejected(msg) => CheckoutError::Validation(msg),
            StoreError::Unavailable(msg) => CheckoutError::Unavailable(msg),
        }
    }
}
