//! Application context composed at the root and passed by reference.

use std::sync::Arc;

use bazaar_core::{Identity, Order, OrderReceipt, TrackingId, TrackingInfo};

use crate::admin::AdminConsole;
use crate::api::{ApiClient, ApiError};
use crate::cart::{CartManager, CartStore, FileCartStore};
use crate::catalog::Catalog;
use crate::checkout::{self, CheckoutForm};
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::guard::RouteGuard;
use crate::orders;
use crate::session::SessionManager;

/// Everything a front end needs, constructed once.
///
/// Cheaply cloneable via `Arc`; clones share the session, cart, and caches.
/// Tests build isolated instances with [`AppContext::with_store`].
#[derive(Clone)]
pub struct AppContext {
    inner: Arc<AppContextInner>,
}

struct AppContextInner {
    config: StorefrontConfig,
    api: ApiClient,
    session: SessionManager<ApiClient>,
    cart: CartManager,
    catalog: Catalog,
}

impl AppContext {
    /// Build the context with the cart persisted at `config.cart_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig) -> std::result::Result<Self, ApiError> {
        let store = FileCartStore::new(&config.cart_path);
        Self::with_store(config, store)
    }

    /// Build the context with an explicit cart store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_store(
        config: StorefrontConfig,
        store: impl CartStore + 'static,
    ) -> std::result::Result<Self, ApiError> {
        let api = ApiClient::new(&config.api)?;
        let session = SessionManager::new(api.clone());
        let cart = CartManager::new(store);
        let catalog = Catalog::new(api.clone(), config.catalog_ttl);

        Ok(Self {
            inner: Arc::new(AppContextInner {
                config,
                api,
                session,
                cart,
                catalog,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn session(&self) -> &SessionManager<ApiClient> {
        &self.inner.session
    }

    #[must_use]
    pub fn cart(&self) -> &CartManager {
        &self.inner.cart
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// A route guard following this context's session.
    #[must_use]
    pub fn route_guard(&self) -> RouteGuard {
        RouteGuard::new(self.inner.session.subscribe())
    }

    /// Place an order for the current cart as the current identity.
    ///
    /// # Errors
    ///
    /// See [`checkout::submit`].
    pub async fn checkout(&self, form: &CheckoutForm) -> Result<OrderReceipt> {
        let buyer = self.inner.session.identity();
        checkout::submit(&self.inner.api, &self.inner.cart, buyer.as_ref(), form).await
    }

    /// Orders placed by the signed-in identity.
    ///
    /// # Errors
    ///
    /// See [`orders::my_orders`].
    pub async fn my_orders(&self) -> Result<Vec<Order>> {
        let identity = self.inner.session.identity();
        orders::my_orders(&self.inner.api, identity.as_ref()).await
    }

    /// Anonymous order lookup.
    ///
    /// # Errors
    ///
    /// See [`orders::track`].
    pub async fn track(&self, tracking_id: &TrackingId) -> Result<TrackingInfo> {
        orders::track(&self.inner.api, tracking_id).await
    }

    /// Admin operations for `identity`.
    ///
    /// Take the identity from [`SessionManager::identity`]; it is passed in
    /// so the console borrows a stable snapshot.
    #[must_use]
    pub fn admin<'a>(&'a self, identity: Option<&'a Identity>) -> AdminConsole<'a> {
        AdminConsole::new(&self.inner.api, &self.inner.catalog, identity)
    }
}
