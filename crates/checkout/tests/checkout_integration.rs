//! Integration tests for checkout against a live-updating catalog.

use std::sync::Arc;
use std::time::Duration;

use cart::Cart;
use catalog::CatalogCache;
use checkout::{CheckoutError, CheckoutState, CheckoutSubmitter, InMemoryOrderGateway};
use common::{AuthToken, Notification, Product, ProductId, RecordingNotifier};
use rust_decimal::Decimal;

fn product(id: i64, price_cents: i64, stock: u32) -> Product {
    Product::new(id, format!("Product {id}"), "", Decimal::new(price_cents, 2), stock)
}

struct TestHarness {
    submitter: Arc<CheckoutSubmitter<InMemoryOrderGateway, RecordingNotifier>>,
    gateway: InMemoryOrderGateway,
    notifier: RecordingNotifier,
    cart: Cart,
    catalog: CatalogCache,
    token: AuthToken,
}

impl TestHarness {
    async fn new(products: Vec<Product>) -> Self {
        let gateway = InMemoryOrderGateway::new();
        let notifier = RecordingNotifier::new();
        let catalog = CatalogCache::new();
        catalog.replace_all(products).await;
        Self {
            submitter: Arc::new(CheckoutSubmitter::new(gateway.clone(), notifier.clone())),
            gateway,
            notifier,
            cart: Cart::new(),
            catalog,
            token: AuthToken::new("token-123"),
        }
    }

    async fn put(&self, id: i64, quantity: i64) {
        let product = self.catalog.get(ProductId::new(id)).await.unwrap();
        self.cart.set_quantity(&product, quantity).await.unwrap();
    }

    async fn submit(&self) -> checkout::Result<checkout::CheckoutOutcome> {
        self.submitter
            .submit(&self.cart, &self.catalog, Some(&self.token))
            .await
    }
}

#[tokio::test]
async fn test_success_then_failure_scenario() {
    let h = TestHarness::new(vec![product(1, 1000, 5), product(2, 250, 5)]).await;
    h.put(1, 1).await;
    h.put(2, 4).await;

    h.submit().await.unwrap();
    assert!(h.cart.is_empty().await);
    assert!(matches!(
        h.notifier.last(),
        Some(Notification::OrderPlaced { total_items: 5, .. })
    ));

    h.put(1, 2).await;
    h.gateway.set_reject_with(Some("Out of stock"));
    let err = h.submit().await.unwrap_err();

    assert_eq!(err.user_message(), "Out of stock");
    assert_eq!(h.cart.store().await.quantity(ProductId::new(1)), Some(2));
    assert_eq!(h.submitter.state(), CheckoutState::Failed);
}

#[tokio::test]
async fn test_payload_uses_current_catalog_attributes() {
    let h = TestHarness::new(vec![product(1, 1000, 5)]).await;
    h.put(1, 2).await;

    // Price changes after the item went into the cart.
    h.catalog.merge(&[product(1, 800, 5)]).await;
    let outcome = h.submit().await.unwrap();

    assert_eq!(outcome.order.products[0].price, Decimal::new(800, 2));
    assert_eq!(outcome.total(), Decimal::new(1600, 2));
}

#[tokio::test]
async fn test_cart_ids_missing_from_catalog_are_not_sent() {
    let h = TestHarness::new(vec![product(1, 1000, 5), product(2, 1000, 5)]).await;
    h.put(1, 1).await;
    h.put(2, 1).await;
    h.catalog.replace_all(vec![product(1, 1000, 5)]).await;

    let outcome = h.submit().await.unwrap();

    assert_eq!(outcome.order.products.len(), 1);
    assert_eq!(outcome.order.products[0].id, ProductId::new(1));
}

#[tokio::test]
async fn test_stale_entry_is_submitted_as_is() {
    let h = TestHarness::new(vec![product(1, 1000, 5)]).await;
    h.put(1, 4).await;
    h.catalog.merge(&[product(1, 1000, 2)]).await;

    h.submit().await.unwrap();

    assert_eq!(h.gateway.orders()[0].products[0].quantity, 4);
}

#[tokio::test]
async fn test_no_local_stock_decrement_after_success() {
    let h = TestHarness::new(vec![product(1, 1000, 5)]).await;
    h.put(1, 3).await;

    h.submit().await.unwrap();

    let stock = h.catalog.get(ProductId::new(1)).await.unwrap().available_stock;
    assert_eq!(stock, 5);
}

#[tokio::test(start_paused = true)]
async fn test_second_submit_while_in_flight_is_rejected() {
    let h = TestHarness::new(vec![product(1, 1000, 5)]).await;
    h.put(1, 1).await;
    h.gateway.set_delay(Some(Duration::from_secs(5)));

    let submitter = Arc::clone(&h.submitter);
    let cart = h.cart.clone();
    let catalog = h.catalog.clone();
    let token = h.token.clone();
    let first = tokio::spawn(async move { submitter.submit(&cart, &catalog, Some(&token)).await });

    while h.submitter.state() != CheckoutState::Submitting {
        tokio::task::yield_now().await;
    }
    let second = h.submit().await;
    assert_eq!(second.unwrap_err(), CheckoutError::AlreadySubmitting);
    assert_eq!(h.submitter.state(), CheckoutState::Submitting);

    first.await.unwrap().unwrap();
    assert_eq!(h.gateway.order_count(), 1);
    assert_eq!(h.submitter.state(), CheckoutState::Succeeded);
}

#[tokio::test]
async fn test_missing_credential_scenario() {
    let h = TestHarness::new(vec![product(1, 1000, 5)]).await;
    h.put(1, 2).await;

    let result = h.submitter.submit(&h.cart, &h.catalog, None).await;

    assert_eq!(result.unwrap_err(), CheckoutError::Unauthorized);
    assert_eq!(h.gateway.order_count(), 0);
    assert_eq!(h.cart.total_quantity().await, 2);
}
