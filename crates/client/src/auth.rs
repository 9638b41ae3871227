//! Login and registration port.

use async_trait::async_trait;
use common::AuthToken;
use secrecy::SecretString;

use crate::Result;

/// Shown when the login endpoint refuses the credentials.
pub const LOGIN_FAILED_MESSAGE: &str = "Invalid email or password";

/// Shown when registration fails without a server message.
pub const REGISTRATION_FAILED_MESSAGE: &str = "Registration failed";

/// Fields sent to `POST /api/auth/register`. Field validation is left to the
/// server.
#[derive(Debug)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub address: String,
    pub password: SecretString,
}

/// Where credentials come from.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchanges email and password for a credential.
    async fn login(&self, email: &str, password: &SecretString) -> Result<AuthToken>;

    /// Creates an account. Does not log in.
    async fn register(&self, request: &RegisterRequest) -> Result<()>;
}
