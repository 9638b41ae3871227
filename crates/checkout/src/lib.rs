//! Checkout flow for the storefront client.
//!
//! [`CheckoutSubmitter`] drives `Idle → Submitting → (Succeeded | Failed)`:
//! it joins the cart with the catalog, sends one order through an
//! [`OrderGateway`] and reconciles the cart with the answer.

pub mod error;
pub mod gateway;
pub mod order;
pub mod state;
pub mod submitter;

pub use error::{CheckoutError, ORDER_FAILED_FALLBACK, Result, TRANSPORT_FAILED_FALLBACK};
pub use gateway::{InMemoryOrderGateway, OrderGateway};
pub use order::{OrderLine, OrderReceipt, OrderRequest};
pub use state::CheckoutState;
pub use submitter::{CheckoutOutcome, CheckoutSubmitter};
