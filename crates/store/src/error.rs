//! Storage error model.

use thiserror::Error;

use storefront_core::DomainError;

/// Error raised at the persistence boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The referenced record does not exist.
    #[error("record not found")]
    NotFound,

    /// A reservation could not cover a line item; carries the offending
    /// product's name.
    #[error("insufficient stock for product: {0}")]
    InsufficientStock(String),

    /// The backend rejected a malformed request (e.g. a zero-quantity or
    /// duplicate-product reservation line).
    #[error("rejected: {0}")]
    Rejected(String),

    /// The backend is (possibly transiently) unavailable. Safe to retry:
    /// no partial state was committed.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<DomainError> for StoreError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::NotFound => StoreError::NotFound,
            DomainError::InsufficientStock(product) => StoreError::InsufficientStock(product),
            other => StoreError::Rejected(other.to_string()),
        }
    }
}
