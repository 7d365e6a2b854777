//! Status enums for products and orders.

use serde::{Deserialize, Serialize};

/// Backend-asserted availability flag for a product.
///
/// Independent of the numeric stock count: a product may carry stock and still
/// be marked out of stock by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    #[default]
    InStock,
    OutOfStock,
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InStock => write!(f, "in_stock"),
            Self::OutOfStock => write!(f, "out_of_stock"),
        }
    }
}

impl std::str::FromStr for StockStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in_stock" => Ok(Self::InStock),
            "out_of_stock" => Ok(Self::OutOfStock),
            _ => Err(format!("invalid stock status: {s}")),
        }
    }
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Accepted,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Accepted,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Whether the order has reached a final state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_display_matches_wire() {
        for status in OrderStatus::ALL {
            let wire = serde_json::to_string(&status).unwrap();
            assert_eq!(wire, format!("\"{status}\""));
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }

    #[test]
    fn test_stock_status_parse() {
        assert_eq!("out_of_stock".parse::<StockStatus>().unwrap(), StockStatus::OutOfStock);
        assert!("sold_out".parse::<StockStatus>().is_err());
    }
}
