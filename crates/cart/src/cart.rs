//! Shared cart handle.

use std::sync::Arc;

use catalog::CatalogSnapshot;
use common::{Product, ProductId};
use tokio::sync::RwLock;

use crate::error::CartError;
use crate::guard::{QuantityGuard, ValidationErrors};
use crate::store::CartStore;
use crate::view::CartView;

#[derive(Debug, Default)]
struct CartState {
    store: CartStore,
    guard: QuantityGuard,
}

/// The cart as seen by the rest of the client.
///
/// Bundles the [`CartStore`] with its [`QuantityGuard`] so that every
/// increase goes through the guard. Each call runs as one whole transition
/// under the write lock. Cloning shares the same cart.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    state: Arc<RwLock<CartState>>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of `product`, guarded by its current stock.
    pub async fn add(&self, product: &Product) -> Result<u32, CartError> {
        let mut state = self.state.write().await;
        let CartState { store, guard } = &mut *state;
        let quantity = guard.propose_add(store, product)?;
        tracing::debug!(product_id = %product.id, quantity, "added to cart");
        Ok(quantity)
    }

    /// Sets an absolute quantity for `product`, guarded by its current stock.
    pub async fn set_quantity(
        &self,
        product: &Product,
        quantity: i64,
    ) -> Result<Option<u32>, CartError> {
        let mut state = self.state.write().await;
        let CartState { store, guard } = &mut *state;
        let result = guard.propose(store, product, quantity)?;
        tracing::debug!(product_id = %product.id, ?result, "cart quantity set");
        Ok(result)
    }

    /// Removes a product. Never rejected.
    pub async fn remove(&self, id: ProductId) {
        let mut state = self.state.write().await;
        state.store.remove_from_cart(id);
        state.guard.acknowledge(id);
    }

    /// Empties the cart and its validation errors.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.store.clear_cart();
        state.guard.reset();
    }

    /// Returns a copy of the current quantities.
    pub async fn store(&self) -> CartStore {
        self.state.read().await.store.clone()
    }

    pub async fn errors(&self) -> ValidationErrors {
        self.state.read().await.guard.errors().clone()
    }

    pub async fn error_for(&self, id: ProductId) -> Option<String> {
        self.state
            .read()
            .await
            .guard
            .errors()
            .get(id)
            .map(str::to_string)
    }

    /// Joins the current cart with `catalog`.
    pub async fn view(&self, catalog: &CatalogSnapshot) -> CartView {
        CartView::join(&self.state.read().await.store, catalog)
    }

    pub async fn total_quantity(&self) -> u64 {
        self.state.read().await.store.total_quantity()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.store.is_empty()
    }
}
