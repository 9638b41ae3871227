//! Checkout submission.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use cart::{Cart, CartView};
use catalog::CatalogCache;
use chrono::{DateTime, Utc};
use common::{AuthToken, Notification, Notifier};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{CheckoutError, Result};
use crate::gateway::OrderGateway;
use crate::order::{OrderReceipt, OrderRequest};
use crate::state::CheckoutState;

/// Result of an accepted order.
#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub attempt_id: Uuid,
    pub order: OrderRequest,
    pub receipt: OrderReceipt,
    pub placed_at: DateTime<Utc>,
}

impl CheckoutOutcome {
    pub fn total_items(&self) -> u64 {
        self.order.total_items()
    }

    pub fn total(&self) -> Decimal {
        self.order.total()
    }
}

/// Turns the cart into an order and reconciles the cart with the answer.
///
/// At most one submission is in flight at a time. The state lock is never
/// held across an await.
pub struct CheckoutSubmitter<G, N> {
    gateway: G,
    notifier: N,
    state: Mutex<CheckoutState>,
}

impl<G, N> CheckoutSubmitter<G, N>
where
    G: OrderGateway,
    N: Notifier,
{
    pub fn new(gateway: G, notifier: N) -> Self {
        Self {
            gateway,
            notifier,
            state: Mutex::new(CheckoutState::Idle),
        }
    }

    /// Returns the current checkout state.
    pub fn state(&self) -> CheckoutState {
        *self.lock()
    }

    /// Submits the current cart as an order.
    ///
    /// 1. Rejects re-entry while another submission is in flight
    /// 2. Without a credential, fails before any request is sent
    /// 3. Joins the cart with the catalog; an empty join fails without a request
    /// 4. Sends exactly one order request built from the join
    /// 5. On success clears the cart; on failure leaves it as it was
    ///
    /// Catalog stock is not decremented locally after a success; the next
    /// push batch carries the server's new stock.
    #[tracing::instrument(skip_all, fields(attempt_id = tracing::field::Empty))]
    pub async fn submit(
        &self,
        cart: &Cart,
        catalog: &CatalogCache,
        token: Option<&AuthToken>,
    ) -> Result<CheckoutOutcome> {
        let Some(token) = token.filter(|t| !t.is_blank()) else {
            return Err(self.fail_before_request(CheckoutError::Unauthorized));
        };

        let view: CartView = cart.view(&catalog.snapshot().await).await;
        if view.is_empty() {
            return Err(self.fail_before_request(CheckoutError::EmptyCart));
        }
        self.begin()?;

        let attempt_id = Uuid::new_v4();
        tracing::Span::current().record("attempt_id", tracing::field::display(attempt_id));
        metrics::counter!("checkout_attempts_total").increment(1);

        let order = OrderRequest::from_view(&view);
        tracing::info!(
            lines = order.products.len(),
            total_items = order.total_items(),
            "submitting order"
        );

        let started = Instant::now();
        let response = self.gateway.place_order(token, &order).await;
        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());

        match response {
            Ok(receipt) => {
                cart.clear().await;
                self.set_state(CheckoutState::Succeeded);
                metrics::counter!("checkout_succeeded_total").increment(1);
                tracing::info!("order placed");

                let outcome = CheckoutOutcome {
                    attempt_id,
                    order,
                    receipt,
                    placed_at: Utc::now(),
                };
                self.notifier.notify(Notification::OrderPlaced {
                    total_items: outcome.total_items(),
                    total: outcome.total(),
                });
                Ok(outcome)
            }
            Err(e) => {
                self.set_state(CheckoutState::Failed);
                metrics::counter!("checkout_failed_total").increment(1);
                tracing::warn!(error = %e, "order failed, cart kept");
                self.notifier.notify(Notification::OrderFailed {
                    message: e.user_message(),
                });
                Err(e)
            }
        }
    }

    /// Claims the single submission slot.
    fn begin(&self) -> Result<()> {
        let mut state = self.lock();
        if !state.can_submit() {
            tracing::debug!("checkout already in flight");
            return Err(CheckoutError::AlreadySubmitting);
        }
        *state = CheckoutState::Submitting;
        Ok(())
    }

    /// Moves straight to `Failed` without sending anything, unless another
    /// submission is in flight.
    fn fail_before_request(&self, error: CheckoutError) -> CheckoutError {
        {
            let mut state = self.lock();
            if !state.can_submit() {
                return CheckoutError::AlreadySubmitting;
            }
            *state = CheckoutState::Failed;
        }
        metrics::counter!("checkout_failed_total").increment(1);
        tracing::warn!(error = %error, "checkout aborted before request");
        self.notifier.notify(Notification::OrderFailed {
            message: error.user_message(),
        });
        error
    }

    fn set_state(&self, next: CheckoutState) {
        *self.lock() = next;
    }

    fn lock(&self) -> MutexGuard<'_, CheckoutState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
