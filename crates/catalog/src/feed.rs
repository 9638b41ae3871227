//! In-process push channel carrying `productUpdated` batches.

use std::sync::Arc;

use common::Product;
use tokio::sync::broadcast;

/// Name of the push event that carries inventory batches.
pub const PRODUCT_UPDATED_EVENT: &str = "productUpdated";

/// Default number of batches buffered per subscriber.
pub const DEFAULT_FEED_CAPACITY: usize = 256;

/// A batch of updated product records, shared between subscribers.
pub type ProductBatch = Arc<Vec<Product>>;

/// Fan-out channel between a push transport and catalog subscriptions.
///
/// A transport publishes each inbound batch; every live subscription gets
/// its own copy in arrival order.
#[derive(Clone)]
pub struct InventoryFeed {
    tx: broadcast::Sender<ProductBatch>,
}

impl InventoryFeed {
    /// Creates a feed buffering up to `capacity` batches per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes a batch to every live subscriber.
    ///
    /// Returns the number of subscribers that will see it. With no
    /// subscribers the batch is dropped.
    pub fn publish(&self, batch: Vec<Product>) -> usize {
        self.tx.send(Arc::new(batch)).unwrap_or(0)
    }

    /// Returns the number of live subscribers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Returns a raw receiver for batches published from now on.
    pub fn receiver(&self) -> broadcast::Receiver<ProductBatch> {
        self.tx.subscribe()
    }
}

impl Default for InventoryFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_publish_without_subscribers_is_dropped() {
        let feed = InventoryFeed::default();
        assert_eq!(feed.publish(vec![]), 0);
    }

    #[tokio::test]
    async fn test_subscribers_receive_batches_in_order() {
        let feed = InventoryFeed::new(8);
        let mut rx = feed.receiver();

        let a = Product::new(1, "A", "", Decimal::ONE, 1);
        let b = Product::new(2, "B", "", Decimal::ONE, 2);
        assert_eq!(feed.publish(vec![a.clone()]), 1);
        feed.publish(vec![b.clone()]);

        assert_eq!(*rx.recv().await.unwrap(), vec![a]);
        assert_eq!(*rx.recv().await.unwrap(), vec![b]);
    }

    #[test]
    fn test_receiver_count_tracks_drops() {
        let feed = InventoryFeed::default();
        let rx = feed.receiver();
        assert_eq!(feed.receiver_count(), 1);
        drop(rx);
        assert_eq!(feed.receiver_count(), 0);
    }
}
