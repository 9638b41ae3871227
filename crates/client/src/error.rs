//! Client error types.

use cart::CartError;
use catalog::CatalogError;
use checkout::CheckoutError;
use common::ProductId;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by the storefront client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built or a request could not be sent.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// Login or registration was refused; carries the user-facing message.
    #[error("{0}")]
    Auth(String),

    /// The credential file could not be read or written.
    #[error("Credential storage error: {0}")]
    Credentials(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The push channel failed.
    #[error("Push channel error: {0}")]
    Push(String),

    /// A push frame could not be understood.
    #[error("Malformed push frame: {0}")]
    MalformedFrame(String),

    /// The product is not in the catalog.
    #[error("Unknown product {0}")]
    UnknownProduct(ProductId),

    /// An operation needs a credential and none is stored.
    #[error("Not logged in")]
    NotLoggedIn,

    /// A command line could not be parsed.
    #[error("{0}")]
    Usage(String),
}

/// Convenience type alias for client results.
pub type Result<T> = std::result::Result<T, ClientError>;
