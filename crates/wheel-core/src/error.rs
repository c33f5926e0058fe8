//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
///
/// Every variant is recoverable: a rejected operation leaves the session
/// exactly as it was.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An item was rejected on add (empty name or non-positive weight).
    #[error("invalid item: {0}")]
    InvalidItem(String),

    /// A draw was requested against an empty pool.
    #[error("the pool is empty")]
    EmptyPool,

    /// A draw was requested but every item has weight zero.
    #[error("no items with a positive weight are available")]
    NoAvailableItems,

    /// A draw was requested while another spin is still in flight.
    #[error("a draw is already in progress")]
    ConcurrentDraw,

    /// No item exists at the given pool index.
    #[error("no item at index {0}")]
    ItemNotFound(usize),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
