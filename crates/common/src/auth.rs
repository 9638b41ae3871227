//! Bearer credential used for authenticated catalog and order requests.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

/// Bearer token returned by the login endpoint.
///
/// The raw value is only reachable through [`AuthToken::bearer`] and
/// [`AuthToken::expose`]; `Debug` output is redacted.
#[derive(Clone)]
pub struct AuthToken(Arc<SecretString>);

impl AuthToken {
    /// Wraps a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(Arc::new(SecretString::from(token.into())))
    }

    /// Returns the raw token value.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Returns the `Authorization` header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.expose())
    }

    /// Returns true if the token is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.expose().trim().is_empty()
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken([REDACTED])")
    }
}
