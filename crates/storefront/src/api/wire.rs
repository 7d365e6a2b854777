//! Request and response bodies exchanged with the backend.

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use bazaar_core::{CategoryId, Email, Identity, OrderStatus, StockStatus, SubcategoryId};

/// Login form body.
#[derive(Debug, Serialize)]
pub struct Credentials {
    /// Email address or username.
    pub identifier: String,
    #[serde(serialize_with = "expose_secret")]
    pub password: SecretString,
}

/// Registration form body.
#[derive(Debug, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: Email,
    #[serde(serialize_with = "expose_secret")]
    pub password: SecretString,
}

/// Successful registration response.
#[derive(Debug, Deserialize)]
pub struct RegisteredAccount {
    /// Freshly issued identity; no round trip to `/auth/me` is needed.
    pub user: Identity,
    /// Bearer token for subsequent requests, when the backend issues one.
    #[serde(default, deserialize_with = "optional_secret")]
    pub token: Option<SecretString>,
}

/// Filter for product listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

impl ProductQuery {
    /// Append the filter to `url` as query parameters.
    pub(crate) fn apply(&self, url: &mut Url) {
        let pairs = [
            ("category", self.category.as_deref()),
            ("subcategory", self.subcategory.as_deref()),
        ];

        if pairs.iter().all(|(_, value)| value.is_none()) {
            return;
        }

        let mut query = url.query_pairs_mut();
        for (key, value) in pairs {
            if let Some(value) = value {
                query.append_pair(key, value);
            }
        }
    }
}

/// Body for `POST /api/products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category_id: CategoryId,
    pub subcategory_id: SubcategoryId,
    pub quantity: u32,
    pub variant: String,
    pub stock_status: StockStatus,
    pub image_url: String,
}

/// Body for `POST /api/categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCategory {
    pub name: String,
}

/// Body for `POST /api/categories/{id}/subcategories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewSubcategory {
    pub name: String,
}

/// Body for `PUT /api/admin/orders/{id}/status`.
#[derive(Debug, Serialize)]
pub(crate) struct StatusUpdate {
    pub status: OrderStatus,
}

/// Error payload; the backend uses either `error` or `message`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .filter(|m| !m.trim().is_empty())
    }
}

fn expose_secret<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn optional_secret<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<SecretString>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|token| !token.is_empty())
        .map(SecretString::from))
}
