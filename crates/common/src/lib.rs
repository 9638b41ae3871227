//! Shared types for the storefront client.
//!
//! - [`Product`] and [`ProductId`]: catalog records as the server sends them
//! - [`AuthToken`]: the bearer credential
//! - [`Notifier`]: the port through which the core reports user-facing events

pub mod auth;
pub mod notify;
pub mod types;

pub use auth::AuthToken;
pub use notify::{Notification, Notifier, RecordingNotifier, TracingNotifier};
pub use types::{Product, ProductId};
