//! A signed-in storefront session.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use cart::{Cart, CartView};
use catalog::{CatalogCache, CatalogSource, InventoryFeed, InventorySync, Subscription};
use checkout::{CheckoutOutcome, CheckoutState, CheckoutSubmitter, OrderGateway};
use common::{AuthToken, Notification, Notifier, Product, ProductId};
use secrecy::SecretString;

use crate::auth::{AuthGateway, RegisterRequest};
use crate::credentials::CredentialStore;
use crate::{ClientError, Result};

/// Owns everything one user session needs: catalog, push subscription,
/// cart and checkout.
///
/// Lifecycle:
/// - [`Session::start`] subscribes to the push feed and pulls the catalog
/// - cart operations look products up in the catalog and go through the guard
/// - [`Session::shutdown`] unsubscribes and closes the catalog, so late
///   responses are dropped
pub struct Session<B, C> {
    backend: B,
    credentials: C,
    notifier: Arc<dyn Notifier>,
    sync: InventorySync<B, Arc<dyn Notifier>>,
    cart: Cart,
    submitter: CheckoutSubmitter<B, Arc<dyn Notifier>>,
    token: RwLock<Option<AuthToken>>,
    subscription: Mutex<Option<Subscription>>,
}

impl<B, C> Session<B, C>
where
    B: CatalogSource + OrderGateway + AuthGateway + Clone + 'static,
    C: CredentialStore,
{
    /// Creates a session whose push subscription listens on `feed`.
    pub fn new(
        backend: B,
        credentials: C,
        feed: InventoryFeed,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let sync = InventorySync::new(
            backend.clone(),
            CatalogCache::new(),
            feed,
            Arc::clone(&notifier),
        );
        let submitter = CheckoutSubmitter::new(backend.clone(), Arc::clone(&notifier));
        Self {
            backend,
            credentials,
            notifier,
            sync,
            cart: Cart::new(),
            submitter,
            token: RwLock::new(None),
            subscription: Mutex::new(None),
        }
    }

    pub fn catalog(&self) -> &CatalogCache {
        self.sync.cache()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn token(&self) -> Option<AuthToken> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn checkout_state(&self) -> CheckoutState {
        self.submitter.state()
    }

    /// Loads the stored credential, subscribes to push updates and pulls
    /// the catalog.
    ///
    /// Without a credential the session stays usable with an empty catalog
    /// and `Ok(0)` is returned. An unreadable credential counts as none. A
    /// failed pull is returned but leaves the subscription running.
    #[tracing::instrument(skip_all)]
    pub async fn start(&self) -> Result<usize> {
        let token = match self.credentials.load().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "stored credential unreadable, starting signed out");
                None
            }
        };
        self.set_token(token.clone());
        self.resubscribe(token.clone()).await;

        match token {
            Some(token) => Ok(self.sync.initial_pull(&token).await?),
            None => {
                tracing::info!("no stored credential, catalog stays empty until login");
                Ok(0)
            }
        }
    }

    /// Stops push updates and closes the catalog.
    ///
    /// Requests still in flight finish, but their results are ignored.
    pub async fn shutdown(&self) {
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe().await;
        }
        self.catalog().close().await;
        tracing::info!("session shut down");
    }

    /// Logs in, stores the credential and refreshes the catalog.
    #[tracing::instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<usize> {
        let token = self.backend.login(email, password).await?;
        self.credentials.save(&token).await?;
        self.set_token(Some(token.clone()));
        tracing::info!("logged in");

        // Resubscribe first so the pull covers anything pushed in between.
        self.resubscribe(Some(token.clone())).await;
        Ok(self.sync.initial_pull(&token).await?)
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<()> {
        self.backend.register(request).await?;
        tracing::info!("account registered");
        Ok(())
    }

    /// Forgets the credential. Cart and catalog are kept, and push updates
    /// keep merging without a credential to re-pull with.
    pub async fn logout(&self) -> Result<()> {
        self.credentials.clear().await?;
        self.set_token(None);
        self.resubscribe(None).await;
        tracing::info!("logged out");
        Ok(())
    }

    pub async fn products(&self) -> Vec<Product> {
        self.catalog().products().await
    }

    /// Adds one unit of a product.
    pub async fn add(&self, id: ProductId) -> Result<u32> {
        let product = self.product(id).await?;
        self.cart
            .add(&product)
            .await
            .map_err(|e| self.rejected(e))
    }

    /// Sets an absolute quantity; zero or less removes the product.
    pub async fn set_quantity(&self, id: ProductId, quantity: i64) -> Result<Option<u32>> {
        if quantity <= 0 {
            self.cart.remove(id).await;
            return Ok(None);
        }
        let product = self.product(id).await?;
        self.cart
            .set_quantity(&product, quantity)
            .await
            .map_err(|e| self.rejected(e))
    }

    pub async fn remove(&self, id: ProductId) {
        self.cart.remove(id).await;
    }

    /// Joins the cart with the current catalog.
    pub async fn cart_view(&self) -> CartView {
        self.cart.view(&self.catalog().snapshot().await).await
    }

    /// Number of units in the cart.
    pub async fn cart_badge(&self) -> u64 {
        self.cart.total_quantity().await
    }

    /// Submits the cart as an order using the current credential.
    pub async fn checkout(&self) -> Result<CheckoutOutcome> {
        let token = self.token();
        Ok(self
            .submitter
            .submit(&self.cart, self.catalog(), token.as_ref())
            .await?)
    }

    async fn product(&self, id: ProductId) -> Result<Product> {
        self.catalog()
            .get(id)
            .await
            .ok_or(ClientError::UnknownProduct(id))
    }

    fn rejected(&self, error: cart::CartError) -> ClientError {
        self.notifier.notify(Notification::QuantityRejected {
            product_id: error.product_id(),
            message: error.to_string(),
        });
        error.into()
    }

    fn set_token(&self, token: Option<AuthToken>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    async fn resubscribe(&self, token: Option<AuthToken>) {
        let previous = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(previous) = previous {
            previous.unsubscribe().await;
        }

        let subscription = self.sync.subscribe(token);
        *self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(subscription);
    }
}
