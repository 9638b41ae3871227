//! Last-known product records, merged from snapshots and push batches.

use std::collections::BTreeMap;
use std::sync::Arc;

use common::{Product, ProductId};
use tokio::sync::RwLock;

use crate::position::SyncPosition;

/// Product records keyed by id.
///
/// Every write replaces whole records; nothing here ever patches a single
/// field, so applying the same batch twice leaves the snapshot unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    products: BTreeMap<ProductId, Product>,
}

impl CatalogSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from a list of products. Later duplicates win.
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        let mut snapshot = Self::new();
        snapshot.replace_all(products);
        snapshot
    }

    /// Drops every record and installs the given ones.
    pub fn replace_all(&mut self, products: impl IntoIterator<Item = Product>) {
        self.products = products.into_iter().map(|p| (p.id, p)).collect();
    }

    /// Replaces the stored record for every id in the batch, in batch order.
    ///
    /// Ids not yet in the snapshot are inserted, since batches carry whole
    /// records. Ids not mentioned in the batch are left untouched.
    pub fn merge(&mut self, batch: &[Product]) {
        for product in batch {
            self.products.insert(product.id, product.clone());
        }
    }

    /// Returns the record for an id.
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.get(&id)
    }

    /// Returns all records ordered by id.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

struct CatalogState {
    snapshot: CatalogSnapshot,
    position: SyncPosition,
    closed: bool,
}

/// Shared handle to the session's catalog.
///
/// Cloning the handle shares the same underlying records. Once
/// [`CatalogCache::close`] has been called, late snapshots and batches are
/// ignored so responses that outlive the session cannot resurrect it.
#[derive(Clone)]
pub struct CatalogCache {
    state: Arc<RwLock<CatalogState>>,
}

impl CatalogCache {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(CatalogState {
                snapshot: CatalogSnapshot::new(),
                position: SyncPosition::zero(),
                closed: false,
            })),
        }
    }

    /// Installs a full catalog, replacing every record.
    ///
    /// Returns false if the cache has been closed.
    pub async fn replace_all(&self, products: Vec<Product>) -> bool {
        let mut state = self.state.write().await;
        if state.closed {
            tracing::debug!(count = products.len(), "ignoring snapshot for closed catalog");
            return false;
        }
        state.snapshot.replace_all(products);
        state.position = state.position.after_snapshot();
        true
    }

    /// Merges a push batch (last write wins per id).
    ///
    /// Returns false if the cache has been closed.
    pub async fn merge(&self, batch: &[Product]) -> bool {
        let mut state = self.state.write().await;
        if state.closed {
            tracing::debug!(count = batch.len(), "ignoring batch for closed catalog");
            return false;
        }
        state.snapshot.merge(batch);
        state.position = state.position.after_batch();
        true
    }

    /// Gets the current record for a product.
    pub async fn get(&self, id: ProductId) -> Option<Product> {
        self.state.read().await.snapshot.get(id).cloned()
    }

    /// Gets all products ordered by id.
    pub async fn products(&self) -> Vec<Product> {
        self.state.read().await.snapshot.products().cloned().collect()
    }

    /// Returns a copy of the current records.
    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.state.read().await.snapshot.clone()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.snapshot.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.snapshot.is_empty()
    }

    pub async fn position(&self) -> SyncPosition {
        self.state.read().await.position
    }

    /// Marks the cache as torn down. Records stay readable.
    pub async fn close(&self) {
        self.state.write().await.closed = true;
    }

    pub async fn is_closed(&self) -> bool {
        self.state.read().await.closed
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}
