//! Cart error types.

use common::ProductId;
use thiserror::Error;

/// Errors raised when a proposed cart change is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The proposed quantity exceeds the product's available stock.
    #[error("Maximum quantity reached ({available} available).")]
    MaximumQuantityReached {
        product_id: ProductId,
        available: u32,
    },
}

impl CartError {
    /// Returns the product the rejection is about.
    pub fn product_id(&self) -> ProductId {
        match self {
            CartError::MaximumQuantityReached { product_id, .. } => *product_id,
        }
    }
}
