//! Durable storage for the auth credential.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use common::AuthToken;
use serde::{Deserialize, Serialize};

use crate::Result;

/// The single key the credential is stored under.
pub const TOKEN_KEY: &str = "token";

/// Where the auth credential survives between runs.
///
/// Only the credential is durable; cart and catalog live in memory.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the stored credential, if any.
    async fn load(&self) -> Result<Option<AuthToken>>;

    async fn save(&self, token: &AuthToken) -> Result<()>;

    /// Forgets the stored credential.
    async fn clear(&self) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredCredentials {
    #[serde(default)]
    token: Option<String>,
}

/// Keeps the credential in a JSON file: `{"token": "..."}`.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<AuthToken>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let stored: StoredCredentials = serde_json::from_str(&raw)?;
        Ok(stored
            .token
            .map(AuthToken::new)
            .filter(|token| !token.is_blank()))
    }

    async fn save(&self, token: &AuthToken) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(&StoredCredentials {
            token: Some(token.expose().to_string()),
        })?;
        tokio::fs::write(&self.path, body).await?;
        tracing::debug!(path = %self.path.display(), key = TOKEN_KEY, "credential saved");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory credential store for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    token: Arc<RwLock<Option<AuthToken>>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds a credential.
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::default();
        *store.token.write().unwrap_or_else(PoisonError::into_inner) = Some(AuthToken::new(token));
        store
    }

    pub fn current(&self) -> Option<AuthToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load(&self) -> Result<Option<AuthToken>> {
        Ok(self.current())
    }

    async fn save(&self, token: &AuthToken) -> Result<()> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
