//! Backend REST API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP(S) with `reqwest`
//! - The backend owns all business rules; this client only moves data
//! - Session credential is a cookie kept in the client's cookie store
//! - Accounts created through registration additionally receive a bearer
//!   token, which is attached to every subsequent request until logout
//! - Every request is bounded by the configured timeout
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config.api)?;
//! let products = client.products(&ProductQuery::default()).await?;
//! ```

mod wire;

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use bazaar_core::{
    Category, CategoryId, Identity, Order, OrderId, OrderReceipt, OrderStatus, OrderSubmission,
    Product, Subcategory, TrackingId, TrackingInfo,
};

use crate::config::ApiConfig;

pub use wire::{
    Credentials, NewCategory, NewProduct, NewSubcategory, ProductQuery, Registration,
    RegisteredAccount,
};
use wire::{ErrorBody, StatusUpdate};

/// Maximum number of response-body characters kept in error messages and logs.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not complete (connection refused, timeout, TLS...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// The backend answered with a body that does not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status of a non-success response, if that is what this is.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the request never produced a response.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront backend.
///
/// Cheaply cloneable; clones share the cookie store and bearer token.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    bearer: RwLock<Option<SecretString>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                bearer: RwLock::new(None),
            }),
        })
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Remember a bearer token issued at registration.
    pub fn set_bearer_token(&self, token: SecretString) {
        *self
            .inner
            .bearer
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Forget any bearer token.
    pub fn clear_bearer_token(&self) {
        *self
            .inner
            .bearer
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether a bearer token is currently attached to requests.
    #[must_use]
    pub fn has_bearer_token(&self) -> bool {
        self.inner
            .bearer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    // =========================================================================
    // Request plumbing
    // =========================================================================

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        let bearer = self
            .inner
            .bearer
            .read()
            .unwrap_or_else(PoisonError::into_inner);

        match bearer.as_ref() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Send a request and decode a JSON body.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send_raw(builder).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncate(&body),
                "Failed to parse backend response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request, check the status, and return the body text.
    async fn send_raw(&self, builder: RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!(status = %status, body = %truncate(&body), "Backend returned non-success status");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        Ok(body)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Ask the backend who the ambient session belongs to.
    ///
    /// Returns `Ok(None)` when the backend reports that there is no valid
    /// session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for transport failures and unexpected statuses.
    #[instrument(skip(self))]
    pub async fn current_identity(&self) -> Result<Option<Identity>, ApiError> {
        let url = self.endpoint("auth/me")?;
        match self.send::<Option<Identity>>(self.request(Method::GET, url)).await {
            Ok(identity) => Ok(identity),
            Err(ApiError::Status { status, .. })
                if status == StatusCode::UNAUTHORIZED.as_u16()
                    || status == StatusCode::FORBIDDEN.as_u16() =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Submit login credentials. The response body is ignored; identity is
    /// always re-read through [`Self::current_identity`].
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or is rejected.
    #[instrument(skip(self, credentials), fields(identifier = %credentials.identifier))]
    pub async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let url = self.endpoint("auth/login")?;
        self.send_raw(self.request(Method::POST, url).json(credentials))
            .await?;
        Ok(())
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or is rejected.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<RegisteredAccount, ApiError> {
        let url = self.endpoint("auth/register")?;
        self.send(self.request(Method::POST, url).json(registration))
            .await
    }

    /// Ask the backend to end the session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or is rejected.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        let url = self.endpoint("auth/logout")?;
        self.send_raw(
            self.request(Method::POST, url)
                .json(&serde_json::json!({})),
        )
        .await?;
        Ok(())
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// List products, optionally filtered by category and subcategory.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let mut url = self.endpoint("api/products")?;
        query.apply(&mut url);
        self.send(self.request(Method::GET, url)).await
    }

    /// List categories with their nested subcategories.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let url = self.endpoint("api/categories")?;
        self.send(self.request(Method::GET, url)).await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or is rejected.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ApiError> {
        let url = self.endpoint("api/products")?;
        self.send(self.request(Method::POST, url).json(product))
            .await
    }

    /// Create a top-level category.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or is rejected.
    #[instrument(skip(self))]
    pub async fn create_category(&self, category: &NewCategory) -> Result<Category, ApiError> {
        let url = self.endpoint("api/categories")?;
        self.send(self.request(Method::POST, url).json(category))
            .await
    }

    /// Create a subcategory under `category_id`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or is rejected.
    #[instrument(skip(self))]
    pub async fn create_subcategory(
        &self,
        category_id: CategoryId,
        subcategory: &NewSubcategory,
    ) -> Result<Subcategory, ApiError> {
        let url = self.endpoint(&format!("api/categories/{category_id}/subcategories"))?;
        self.send(self.request(Method::POST, url).json(subcategory))
            .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or is rejected.
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    pub async fn submit_order(&self, order: &OrderSubmission) -> Result<OrderReceipt, ApiError> {
        let url = self.endpoint("api/orders")?;
        self.send(self.request(Method::POST, url).json(order)).await
    }

    /// Orders placed by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or is rejected.
    #[instrument(skip(self))]
    pub async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        let url = self.endpoint("api/user/orders")?;
        self.send(self.request(Method::GET, url)).await
    }

    /// Every order in the store (administrators only).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or is rejected.
    #[instrument(skip(self))]
    pub async fn all_orders(&self) -> Result<Vec<Order>, ApiError> {
        let url = self.endpoint("api/admin/orders")?;
        self.send(self.request(Method::GET, url)).await
    }

    /// Move an order to `status` (administrators only).
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or is rejected.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let url = self.endpoint(&format!("api/admin/orders/{order_id}/status"))?;
        self.send(
            self.request(Method::PUT, url)
                .json(&StatusUpdate { status }),
        )
        .await
    }

    /// Anonymous status lookup by tracking id.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails; unknown ids are a 404 status.
    #[instrument(skip_all, fields(tracking_id = %tracking_id))]
    pub async fn track_order(&self, tracking_id: &TrackingId) -> Result<TrackingInfo, ApiError> {
        let mut url = self.endpoint("api/trackorder/")?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(tracking_id.as_str());
        self.send(self.request(Method::GET, url)).await
    }
}

/// Pull a human-readable message out of an error response body.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body)
        && let Some(message) = parsed.into_message()
    {
        return message;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    } else {
        truncate(trimmed)
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
