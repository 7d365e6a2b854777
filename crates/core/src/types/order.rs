//! Order types: submissions built by the client and orders returned by the
//! backend.
//!
//! The client never mutates an [`Order`] after submission; it only displays
//! what the backend reports.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{OrderId, ProductId, UserId};
use super::status::OrderStatus;

/// Backend-issued opaque identifier for anonymous order status lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackingId(String);

impl TrackingId {
    /// Wrap a tracking identifier, trimming surrounding whitespace.
    #[must_use]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TrackingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line of an order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItemSubmission {
    pub product_id: ProductId,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Payload for `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSubmission {
    pub name: String,
    pub address: String,
    pub phone: String,
    /// Present when the buyer is signed in; anonymous checkout is allowed.
    pub user_id: Option<UserId>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub items: Vec<OrderItemSubmission>,
}

/// Backend acknowledgement of a submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReceiptRecord")]
pub struct OrderReceipt {
    pub order_id: OrderId,
    pub tracking_id: TrackingId,
}

#[derive(Deserialize)]
struct ReceiptRecord {
    #[serde(default)]
    order_id: Option<OrderId>,
    #[serde(default)]
    id: Option<OrderId>,
    tracking_id: TrackingId,
}

impl TryFrom<ReceiptRecord> for OrderReceipt {
    type Error = &'static str;

    fn try_from(record: ReceiptRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            order_id: record.order_id.or(record.id).ok_or("missing field `order_id`")?,
            tracking_id: record.tracking_id,
        })
    }
}

/// A line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
}

/// A placed order as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub tracking_id: Option<TrackingId>,
    pub status: OrderStatus,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// Result of an anonymous tracking lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TrackingRecord")]
pub struct TrackingInfo {
    pub order_id: OrderId,
    pub date: DateTime<Utc>,
    pub status: OrderStatus,
}

#[derive(Deserialize)]
struct TrackingRecord {
    #[serde(default)]
    order_id: Option<OrderId>,
    #[serde(default)]
    id: Option<OrderId>,
    #[serde(default)]
    date: Option<DateTime<Utc>>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    status: OrderStatus,
}

impl TryFrom<TrackingRecord> for TrackingInfo {
    type Error = &'static str;

    fn try_from(record: TrackingRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            order_id: record.order_id.or(record.id).ok_or("missing field `order_id`")?,
            date: record.date.or(record.created_at).ok_or("missing field `date`")?,
            status: record.status,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_sends_amounts_as_numbers() {
        let submission = OrderSubmission {
            name: "Amna".to_string(),
            address: "12 Mall Road".to_string(),
            phone: "0300-0000000".to_string(),
            user_id: None,
            total_amount: Decimal::from(1_000),
            items: vec![OrderItemSubmission {
                product_id: ProductId::new(1),
                quantity: 2,
                price: Decimal::from(500),
            }],
        };

        let value = serde_json::to_value(&submission).unwrap();
        assert_eq!(value["total_amount"], serde_json::json!(1000.0));
        assert_eq!(value["items"][0]["price"], serde_json::json!(500.0));
        assert_eq!(value["items"][0]["product_id"], serde_json::json!(1));
        assert!(value["user_id"].is_null());
    }

    #[test]
    fn test_receipt_accepts_id_alias() {
        let receipt: OrderReceipt =
            serde_json::from_str(r#"{"id": 12, "tracking_id": "TRK-9F2A"}"#).unwrap();
        assert_eq!(receipt.order_id, OrderId::new(12));
        assert_eq!(receipt.tracking_id.as_str(), "TRK-9F2A");
    }

    #[test]
    fn test_receipt_with_both_id_fields() {
        let receipt: OrderReceipt = serde_json::from_str(
            r#"{"id": 12, "order_id": 12, "tracking_id": "TRK-9F2A"}"#,
        )
        .unwrap();
        assert_eq!(receipt.order_id, OrderId::new(12));

        assert!(serde_json::from_str::<OrderReceipt>(r#"{"tracking_id": "TRK-1"}"#).is_err());
    }

    #[test]
    fn test_order_decodes_sparse_payload() {
        let order: Order = serde_json::from_str(
            r#"{"id": 3, "status": "shipped", "items": [{"name": "Kettle", "quantity": 1, "price": "500"}]}"#,
        )
        .unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.tracking_id, None);
        assert_eq!(order.items[0].price, Decimal::from(500));
    }

    #[test]
    fn test_tracking_info() {
        let info: TrackingInfo = serde_json::from_str(
            r#"{"order_id": 3, "date": "2026-03-01T10:00:00Z", "status": "pending"}"#,
        )
        .unwrap();
        assert_eq!(info.status, OrderStatus::Pending);

        let info: TrackingInfo = serde_json::from_str(
            r#"{"id": 3, "order_id": 3, "created_at": "2026-03-01T10:00:00Z", "date": "2026-03-02T10:00:00Z", "status": "shipped"}"#,
        )
        .unwrap();
        assert_eq!(info.order_id, OrderId::new(3));
        assert_eq!(info.date.to_rfc3339(), "2026-03-02T10:00:00+00:00");
    }

    #[test]
    fn test_tracking_id_trims() {
        assert_eq!(TrackingId::new("  abc ").as_str(), "abc");
    }
}
