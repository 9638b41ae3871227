//! Catalog source trait and in-memory implementation.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use common::{AuthToken, Product};

use crate::error::CatalogError;

/// Where the full catalog is pulled from (`GET /products`).
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetches every product record using the given credential.
    async fn fetch_products(&self, token: &AuthToken) -> Result<Vec<Product>, CatalogError>;
}

#[async_trait]
impl<T: CatalogSource + ?Sized> CatalogSource for Arc<T> {
    async fn fetch_products(&self, token: &AuthToken) -> Result<Vec<Product>, CatalogError> {
        (**self).fetch_products(token).await
    }
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: Vec<Product>,
    fetch_count: usize,
    fail_with: Option<String>,
    delay: Option<Duration>,
}

/// In-memory catalog source for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogSource {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalogSource {
    /// Creates a source serving the given products.
    pub fn new(products: Vec<Product>) -> Self {
        let source = Self::default();
        source.set_products(products);
        source
    }

    /// Replaces the products served by subsequent fetches.
    pub fn set_products(&self, products: Vec<Product>) {
        self.write().products = products;
    }

    /// Configures the source to fail every fetch with the given reason.
    pub fn set_fail_with(&self, reason: Option<&str>) {
        self.write().fail_with = reason.map(str::to_string);
    }

    /// Delays every fetch, to simulate a slow pull.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.write().delay = delay;
    }

    /// Returns the number of fetches performed.
    pub fn fetch_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .fetch_count
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, InMemoryCatalogState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalogSource {
    async fn fetch_products(&self, token: &AuthToken) -> Result<Vec<Product>, CatalogError> {
        // Products are captured at request time, not after the delay.
        let (delay, outcome) = {
            let mut state = self.write();
            state.fetch_count += 1;
            let outcome = if token.is_blank() {
                Err(CatalogError::Unauthorized)
            } else if let Some(reason) = &state.fail_with {
                Err(CatalogError::Fetch(reason.clone()))
            } else {
                Ok(state.products.clone())
            };
            (state.delay, outcome)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        outcome
    }
}
