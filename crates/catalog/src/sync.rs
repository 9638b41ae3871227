//! Initial catalog pull and push-channel subscriptions.

use std::sync::Arc;

use common::{AuthToken, Notification, Notifier, Product};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;

use crate::Result;
use crate::cache::CatalogCache;
use crate::feed::{InventoryFeed, ProductBatch};
use crate::source::CatalogSource;

/// Keeps a [`CatalogCache`] in line with the server.
///
/// The sync supports:
/// - Initial pull: replaces the whole cache with a fresh snapshot
/// - Subscription: merges every push batch into the cache until unsubscribed
/// - Resync: a full re-pull when a subscription falls behind the feed
pub struct InventorySync<S, N> {
    inner: Arc<SyncInner<S, N>>,
    feed: InventoryFeed,
}

struct SyncInner<S, N> {
    source: S,
    cache: CatalogCache,
    notifier: N,
}

impl<S, N> InventorySync<S, N>
where
    S: CatalogSource + 'static,
    N: Notifier + 'static,
{
    /// Creates a sync that fills `cache` from `source` and `feed`.
    pub fn new(source: S, cache: CatalogCache, feed: InventoryFeed, notifier: N) -> Self {
        Self {
            inner: Arc::new(SyncInner {
                source,
                cache,
                notifier,
            }),
            feed,
        }
    }

    /// Returns the cache this sync writes to.
    pub fn cache(&self) -> &CatalogCache {
        &self.inner.cache
    }

    /// Returns the feed this sync subscribes to.
    pub fn feed(&self) -> &InventoryFeed {
        &self.feed
    }

    /// Pulls the full catalog and installs it, replacing every record.
    ///
    /// On failure the cache keeps its last-known records (empty if this was
    /// the first pull). Returns the number of products installed.
    #[tracing::instrument(skip_all)]
    pub async fn initial_pull(&self, token: &AuthToken) -> Result<usize> {
        self.inner.pull(token).await
    }

    /// Starts merging push batches into the cache.
    ///
    /// Batches published after this call returns are guaranteed to reach the
    /// subscription. `token` is used for a full re-pull if the subscription
    /// lags behind the feed; without one, missed batches are only logged.
    pub fn subscribe(&self, token: Option<AuthToken>) -> Subscription {
        let rx = self.feed.receiver();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let inner = Arc::clone(&self.inner);

        let handle = tokio::spawn(async move {
            inner.run(rx, shutdown_rx, token).await;
        });

        tracing::info!("inventory subscription started");
        Subscription {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }
}

impl<S, N> SyncInner<S, N>
where
    S: CatalogSource,
    N: Notifier,
{
    async fn pull(&self, token: &AuthToken) -> Result<usize> {
        let products = match self.source.fetch_products(token).await {
            Ok(products) => products,
            Err(e) => {
                metrics::counter!("catalog_fetch_failures_total").increment(1);
                tracing::warn!(error = %e, "catalog pull failed, keeping last-known records");
                return Err(e);
            }
        };

        let count = products.len();
        if self.cache.replace_all(products).await {
            metrics::counter!("catalog_snapshots_installed_total").increment(1);
            tracing::info!(products = count, "catalog snapshot installed");
        }
        Ok(count)
    }

    async fn merge(&self, batch: &[Product]) {
        if self.cache.merge(batch).await {
            metrics::counter!("catalog_batches_merged_total").increment(1);
            tracing::debug!(products = batch.len(), "push batch merged");
            self.notifier.notify(Notification::StockUpdated {
                products: batch.len(),
            });
        }
    }

    async fn run(
        &self,
        mut rx: broadcast::Receiver<ProductBatch>,
        mut shutdown: oneshot::Receiver<()>,
        token: Option<AuthToken>,
    ) {
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("inventory subscription cancelled");
                    break;
                }
                received = rx.recv() => match received {
                    Ok(batch) => self.merge(&batch).await,
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "inventory subscription lagged");
                        if let Some(token) = &token {
                            // A failed resync is already logged by pull.
                            let _ = self.pull(token).await;
                        }
                    }
                    Err(RecvError::Closed) => {
                        tracing::info!("inventory feed closed");
                        break;
                    }
                },
            }
        }
    }
}

/// Handle to a live push-channel subscription.
///
/// [`Subscription::unsubscribe`] stops the listener and waits for it to
/// finish. Dropping the handle aborts the listener.
pub struct Subscription {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Returns true while the listener task is running.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops merging push batches and waits for the listener to exit.
    pub async fn unsubscribe(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
            && !e.is_cancelled()
        {
            tracing::warn!(error = %e, "inventory subscription task failed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
