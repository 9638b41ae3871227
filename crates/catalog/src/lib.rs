//! Catalog cache and inventory synchronization.
//!
//! This crate keeps the client's view of the product catalog current:
//! - [`CatalogCache`] holds the last-known product records
//! - [`InventorySync`] installs the initial snapshot and merges push batches
//! - [`InventoryFeed`] is the in-process push channel a transport publishes to
//! - [`CatalogSource`] is the port the initial pull goes through

pub mod cache;
pub mod error;
pub mod feed;
pub mod position;
pub mod source;
pub mod sync;

pub use cache::{CatalogCache, CatalogSnapshot};
pub use error::{CatalogError, Result};
pub use feed::{DEFAULT_FEED_CAPACITY, InventoryFeed, PRODUCT_UPDATED_EVENT, ProductBatch};
pub use position::SyncPosition;
pub use source::{CatalogSource, InMemoryCatalogSource};
pub use sync::{InventorySync, Subscription};
