//! Order gateway trait and in-memory implementation.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use common::AuthToken;

use crate::error::CheckoutError;
use crate::order::{OrderReceipt, OrderRequest};

/// Where orders are placed (`POST /update-products-quantity`).
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Sends one order-placement request.
    async fn place_order(
        &self,
        token: &AuthToken,
        order: &OrderRequest,
    ) -> Result<OrderReceipt, CheckoutError>;
}

#[async_trait]
impl<T: OrderGateway + ?Sized> OrderGateway for Arc<T> {
    async fn place_order(
        &self,
        token: &AuthToken,
        order: &OrderRequest,
    ) -> Result<OrderReceipt, CheckoutError> {
        (**self).place_order(token, order).await
    }
}

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    orders: Vec<OrderRequest>,
    failure: Option<CheckoutError>,
    delay: Option<Duration>,
}

/// In-memory order gateway for testing.
///
/// Records every request it receives, accepted or not.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderGateway {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryOrderGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every order with the given server message (`None` clears).
    pub fn set_reject_with(&self, message: Option<&str>) {
        self.write().failure = message.map(|m| CheckoutError::rejected(Some(m.to_string())));
    }

    /// Fails every order before a response arrives (`None` clears).
    pub fn set_transport_failure(&self, reason: Option<&str>) {
        self.write().failure = reason.map(|r| CheckoutError::Transport(r.to_string()));
    }

    /// Delays every response, to keep a submission in flight.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.write().delay = delay;
    }

    /// Returns every request received so far.
    pub fn orders(&self) -> Vec<OrderRequest> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .orders
            .clone()
    }

    pub fn order_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .orders
            .len()
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryGatewayState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl OrderGateway for InMemoryOrderGateway {
    async fn place_order(
        &self,
        token: &AuthToken,
        order: &OrderRequest,
    ) -> Result<OrderReceipt, CheckoutError> {
        let (delay, outcome) = {
            let mut state = self.write();
            state.orders.push(order.clone());
            let outcome = if token.is_blank() {
                Err(CheckoutError::Unauthorized)
            } else if let Some(failure) = &state.failure {
                Err(failure.clone())
            } else {
                Ok(OrderReceipt {
                    message: Some("Order placed".to_string()),
                })
            };
            (state.delay, outcome)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        outcome
    }
}
