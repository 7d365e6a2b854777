//! Order history and anonymous tracking.

use tracing::instrument;

use bazaar_core::{Identity, Order, TrackingId, TrackingInfo};

use crate::api::ApiClient;
use crate::error::{ClientError, Result};

/// Orders per page in history views.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Orders placed by `identity`.
///
/// # Errors
///
/// Returns `ClientError::Auth` when nobody is signed in, or the mapped
/// backend failure.
#[instrument(skip_all)]
pub async fn my_orders(api: &ApiClient, identity: Option<&Identity>) -> Result<Vec<Order>> {
    if identity.is_none() {
        return Err(ClientError::Auth(
            "Please log in to see your orders".to_string(),
        ));
    }
    Ok(api.my_orders().await?)
}

/// Look up an order's status by tracking id. Works without signing in.
///
/// # Errors
///
/// Returns `ClientError::Validation` for a blank id, `ClientError::NotFound`
/// for an unknown one, or the mapped backend failure.
#[instrument(skip_all, fields(tracking_id = %tracking_id))]
pub async fn track(api: &ApiClient, tracking_id: &TrackingId) -> Result<TrackingInfo> {
    if tracking_id.as_str().is_empty() {
        return Err(ClientError::invalid("tracking_id", "Tracking ID is required"));
    }

    api.track_order(tracking_id).await.map_err(|e| match ClientError::from(e) {
        ClientError::NotFound(_) => {
            ClientError::NotFound(format!("No order found with tracking ID {tracking_id}"))
        }
        other => other,
    })
}

/// One page of a longer list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually shown.
    pub page: usize,
    /// At least 1, even for an empty list.
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Slice `items` into the requested 1-based page.
///
/// Out-of-range page numbers clamp to the first or last page. A
/// `per_page` of 0 falls back to [`DEFAULT_PER_PAGE`].
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = if per_page == 0 { DEFAULT_PER_PAGE } else { per_page };
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let items = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();

    Page {
        items,
        page,
        total_pages,
        total_items,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;

    #[test]
    fn test_paginate_pages() {
        let page = paginate((1..=25).collect(), 2, 10);
        assert_eq!(page.items, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 3);
        assert!(page.has_previous());
        assert!(page.has_next());

        let last = paginate((1..=25).collect(), 3, 10);
        assert_eq!(last.items, [21, 22, 23, 24, 25]);
        assert!(!last.has_next());
    }

    #[test]
    fn test_paginate_clamps() {
        let page = paginate((1..=5).collect::<Vec<i32>>(), 9, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 5);

        let page = paginate((1..=30).collect::<Vec<i32>>(), 0, 10);
        assert_eq!(page.page, 1);

        let page = paginate((1..=30).collect::<Vec<i32>>(), 99, 10);
        assert_eq!(page.page, 3);
    }

    #[test]
    fn test_paginate_empty_and_default_size() {
        let page = paginate(Vec::<i32>::new(), 1, 10);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
        assert!(!page.has_next());

        let page = paginate((1..=15).collect::<Vec<i32>>(), 1, 0);
        assert_eq!(page.items.len(), DEFAULT_PER_PAGE);
    }

    #[tokio::test]
    async fn test_my_orders_requires_identity() {
        let api = ApiClient::new(&ApiConfig::new("http://127.0.0.1:9").unwrap()).unwrap();
        let err = my_orders(&api, None).await.unwrap_err();
        assert!(matches!(err, ClientError::Auth(_)));
    }
}
