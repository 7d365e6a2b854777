//! Product catalog with an in-memory response cache.
//!
//! Listings and the category tree are cached with `moka` for the configured
//! TTL. Admin writes call [`Catalog::invalidate`] so new entities show up
//! immediately.

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use bazaar_core::{Category, Product};

use crate::api::{ApiClient, ProductQuery};
use crate::error::Result;

/// Cache key for catalog responses.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Products(ProductQuery),
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Products(Arc<Vec<Product>>),
    Categories(Arc<Vec<Category>>),
}

/// Cached read access to products and categories.
#[derive(Clone)]
pub struct Catalog {
    api: ApiClient,
    /// `None` when caching is disabled (zero TTL).
    cache: Option<Cache<CacheKey, CacheValue>>,
}

impl Catalog {
    #[must_use]
    pub fn new(api: ApiClient, ttl: Duration) -> Self {
        let cache = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(256)
                .time_to_live(ttl)
                .build()
        });

        Self { api, cache }
    }

    /// List products matching `query`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the backend cannot be reached or the payload
    /// is malformed.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let key = CacheKey::Products(query.clone());
        if let Some(CacheValue::Products(products)) = self.cached(&key).await {
            debug!("Cache hit for products");
            return Ok(products.as_ref().clone());
        }

        let products = self.api.products(query).await?;
        self.store(key, CacheValue::Products(Arc::new(products.clone())))
            .await;
        Ok(products)
    }

    /// List categories with their subcategories.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the backend cannot be reached or the payload
    /// is malformed.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>> {
        if let Some(CacheValue::Categories(categories)) = self.cached(&CacheKey::Categories).await {
            debug!("Cache hit for categories");
            return Ok(categories.as_ref().clone());
        }

        let categories = self.api.categories().await?;
        self.store(
            CacheKey::Categories,
            CacheValue::Categories(Arc::new(categories.clone())),
        )
        .await;
        Ok(categories)
    }

    /// Drop every cached response.
    pub async fn invalidate(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
            cache.run_pending_tasks().await;
        }
    }

    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        match &self.cache {
            Some(cache) => cache.get(key).await,
            None => None,
        }
    }

    async fn store(&self, key: CacheKey, value: CacheValue) {
        if let Some(cache) = &self.cache {
            cache.insert(key, value).await;
        }
    }
}

/// Sort order for product listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    #[default]
    Name,
    PriceAsc,
    PriceDesc,
}

impl ProductSort {
    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            Self::PriceAsc => a.price.cmp(&b.price),
            Self::PriceDesc => b.price.cmp(&a.price),
        }
    }
}

impl FromStr for ProductSort {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "price-asc" | "price_asc" => Ok(Self::PriceAsc),
            "price-desc" | "price_desc" => Ok(Self::PriceDesc),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Filter `products` by a case-insensitive substring over name and
/// description, then sort. A blank search matches everything. The sort is
/// stable.
#[must_use]
pub fn search_and_sort(mut products: Vec<Product>, search: &str, sort: ProductSort) -> Vec<Product> {
    let needle = search.trim().to_lowercase();
    if !needle.is_empty() {
        products.retain(|product| {
            product.name.to_lowercase().contains(&needle)
                || product
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        });
    }

    products.sort_by(|a, b| sort.compare(a, b));
    products
}

/// State of a list view, keeping "not loaded yet" apart from "no results".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Listing<T> {
    #[default]
    Loading,
    Empty,
    Items(Vec<T>),
}

impl<T> Listing<T> {
    #[must_use]
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Empty
        } else {
            Self::Items(items)
        }
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        match self {
            Self::Items(items) => items,
            Self::Loading | Self::Empty => &[],
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_items(items)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use bazaar_core::{ProductId, StockStatus};

    use super::*;
    use crate::config::ApiConfig;

    fn product(id: i32, name: &str, description: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: Some(description.to_string()),
            price: Decimal::from(price),
            category_id: None,
            subcategory_id: None,
            category: None,
            variant: None,
            image_url: None,
            available_stock: 1,
            stock_status: StockStatus::InStock,
        }
    }

    fn sample() -> Vec<Product> {
        vec![
            product(1, "teapot", "Ceramic, holds 1L", 1500),
            product(2, "Kettle", "Steel, whistles", 4000),
            product(3, "Mug", "Ceramic mug", 600),
        ]
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_search_matches_name_and_description() {
        let found = search_and_sort(sample(), "CERAMIC", ProductSort::Name);
        assert_eq!(names(&found), ["Mug", "teapot"]);

        let found = search_and_sort(sample(), "kett", ProductSort::Name);
        assert_eq!(names(&found), ["Kettle"]);

        let found = search_and_sort(sample(), "   ", ProductSort::Name);
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_sort_orders() {
        assert_eq!(
            names(&search_and_sort(sample(), "", ProductSort::Name)),
            ["Kettle", "Mug", "teapot"]
        );
        assert_eq!(
            names(&search_and_sort(sample(), "", ProductSort::PriceAsc)),
            ["Mug", "teapot", "Kettle"]
        );
        assert_eq!(
            names(&search_and_sort(sample(), "", ProductSort::PriceDesc)),
            ["Kettle", "teapot", "Mug"]
        );
    }

    #[test]
    fn test_sort_from_str() {
        assert_eq!("price-asc".parse::<ProductSort>().unwrap(), ProductSort::PriceAsc);
        assert_eq!("PRICE_DESC".parse::<ProductSort>().unwrap(), ProductSort::PriceDesc);
        assert!("rating".parse::<ProductSort>().is_err());
    }

    #[test]
    fn test_listing_distinguishes_empty_from_loading() {
        let loading: Listing<u8> = Listing::default();
        assert!(loading.is_loading());
        assert!(loading.items().is_empty());

        assert_eq!(Listing::<u8>::from(vec![]), Listing::Empty);
        assert_eq!(Listing::from(vec![1, 2]).items(), [1, 2]);
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_cache() {
        let api = ApiClient::new(&ApiConfig::new("http://localhost:5000").unwrap()).unwrap();
        let catalog = Catalog::new(api, Duration::ZERO);
        assert!(catalog.cache.is_none());
        assert!(catalog.cached(&CacheKey::Categories).await.is_none());
        catalog.invalidate().await;
    }
}
