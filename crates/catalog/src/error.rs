//! Catalog error types.

use thiserror::Error;

/// Errors that can occur while pulling or decoding catalog data.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog endpoint could not be reached or answered with a failure.
    #[error("Failed to fetch products: {0}")]
    Fetch(String),

    /// The catalog endpoint rejected the credential.
    #[error("Catalog request was not authorized")]
    Unauthorized,

    /// The response body did not match the expected shape.
    #[error("Catalog decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
