//! Notification port used in place of toast rendering.

use std::sync::{Arc, Mutex, PoisonError};

use rust_decimal::Decimal;

use crate::ProductId;

/// A user-facing event raised by the storefront core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A push batch was merged into the catalog.
    StockUpdated { products: usize },

    /// A proposed quantity was rejected by the guard.
    QuantityRejected {
        product_id: ProductId,
        message: String,
    },

    /// The order endpoint accepted the order.
    OrderPlaced { total_items: u64, total: Decimal },

    /// Checkout failed; the cart was left untouched.
    OrderFailed { message: String },
}

impl Notification {
    /// Returns the text a user would see for this notification.
    pub fn message(&self) -> String {
        match self {
            Notification::StockUpdated { .. } => "Product stock updated!".to_string(),
            Notification::QuantityRejected { message, .. } => message.clone(),
            Notification::OrderPlaced { .. } => "Order placed successfully!".to_string(),
            Notification::OrderFailed { message } => message.clone(),
        }
    }

    /// Returns true for notifications that report a failure.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Notification::QuantityRejected { .. } | Notification::OrderFailed { .. }
        )
    }
}

/// Receives notifications from the core.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// Writes notifications to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        if notification.is_error() {
            tracing::warn!(message = %notification.message(), "notification");
        } else {
            tracing::info!(message = %notification.message(), "notification");
        }
    }
}

/// Keeps every notification in memory, for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    received: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of everything received so far.
    pub fn received(&self) -> Vec<Notification> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self) -> usize {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns the most recent notification.
    pub fn last(&self) -> Option<Notification> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
