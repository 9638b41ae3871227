//! Storefront client.
//!
//! Wires the catalog, cart and checkout crates to the outside world:
//! - [`StorefrontApi`] talks HTTP to every endpoint under `API_BASE_URL`
//! - [`PushTransport`] feeds socket.io `productUpdated` batches into the catalog
//! - [`CredentialStore`] keeps the auth credential between runs
//! - [`Session`] owns one user's catalog, cart and checkout

pub mod auth;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod push;
pub mod session;

pub use auth::{AuthGateway, LOGIN_FAILED_MESSAGE, REGISTRATION_FAILED_MESSAGE, RegisterRequest};
pub use config::{Config, ConfigError};
pub use credentials::{CredentialStore, FileCredentialStore, InMemoryCredentialStore, TOKEN_KEY};
pub use error::{ClientError, Result};
pub use http::StorefrontApi;
pub use push::{PushFrame, PushHandle, PushTransport};
pub use session::Session;
