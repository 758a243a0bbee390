//! Order record, line items and the status vocabulary.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::OrderError;

/// Lifecycle status of an order.
///
/// Discriminants are the wire ordinals and must never change. `Unspecified`
/// is the protobuf zero value; it is never a legal stored status. A stored
/// document carrying an unknown status name reads back as `Unspecified`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum OrderStatus {
    Pending = 1,
    Paid = 2,
    Cancelled = 3,
    Failed = 4,
    // Catch-all for unknown names, so it has to stay last.
    #[default]
    #[serde(rename = "ORDER_STATUS_UNSPECIFIED", other)]
    Unspecified = 0,
}

impl OrderStatus {
    /// Statuses an order may be stored with.
    pub const ALLOWED: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Paid,
        OrderStatus::Cancelled,
        OrderStatus::Failed,
    ];

    /// Look up a status by wire ordinal. Unknown ordinals return `None`.
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(OrderStatus::Unspecified),
            1 => Some(OrderStatus::Pending),
            2 => Some(OrderStatus::Paid),
            3 => Some(OrderStatus::Cancelled),
            4 => Some(OrderStatus::Failed),
            _ => None,
        }
    }

    pub fn as_wire(self) -> i32 {
        self as i32
    }

    /// Enum name as stored in the document store and shown in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Unspecified => "ORDER_STATUS_UNSPECIFIED",
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Failed => "FAILED",
        }
    }

    pub fn is_allowed(self) -> bool {
        Self::ALLOWED.contains(&self)
    }

    /// `PAID`, `FAILED` and `CANCELLED`. Informational only; the store does
    /// not refuse transitions out of a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Paid | OrderStatus::Failed | OrderStatus::Cancelled
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ORDER_STATUS_UNSPECIFIED" => Ok(OrderStatus::Unspecified),
            "PENDING" => Ok(OrderStatus::Pending),
            "PAID" => Ok(OrderStatus::Paid),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            "FAILED" => Ok(OrderStatus::Failed),
            other => Err(OrderError::InvalidArgument(format!(
                "unsupported status {:?}",
                other
            ))),
        }
    }
}

/// One line of an order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub quantity: i32,
    pub price: f64,
}

impl OrderItem {
    pub fn new(product_id: impl Into<String>, quantity: i32, price: f64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            price,
        }
    }

    pub fn line_total(&self) -> f64 {
        f64::from(self.quantity) * self.price
    }

    fn validate(&self) -> Result<(), OrderError> {
        if self.product_id.is_empty() {
            return Err(OrderError::invalid("product_id is required"));
        }
        if self.quantity <= 0 {
            return Err(OrderError::invalid("quantity must be positive"));
        }
        if self.price.is_nan() || self.price < 0.0 {
            return Err(OrderError::invalid("price must be non-negative"));
        }
        if !self.price.is_finite() {
            return Err(OrderError::invalid("price must be finite"));
        }
        Ok(())
    }
}

/// Input to order creation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: String,
    pub items: Vec<OrderItem>,
}

impl NewOrder {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            items: Vec::new(),
        }
    }

    pub fn item(mut self, product_id: impl Into<String>, quantity: i32, price: f64) -> Self {
        self.items.push(OrderItem::new(product_id, quantity, price));
        self
    }

    /// Check every precondition of order creation, in the order callers
    /// see them reported.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.user_id.is_empty() {
            return Err(OrderError::invalid("user_id is required"));
        }
        if self.items.is_empty() {
            return Err(OrderError::invalid("items are required"));
        }
        self.items.iter().try_for_each(OrderItem::validate)?;
        if !self.total_amount().is_finite() {
            return Err(OrderError::invalid("total_amount out of range"));
        }
        Ok(())
    }

    /// Sum of quantity × price over all items.
    pub fn total_amount(&self) -> f64 {
        self.items.iter().map(OrderItem::line_total).sum()
    }
}

/// The authoritative order record, one document per order.
///
/// `total_amount` is fixed at creation; only `status` and `updated_at`
/// change afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Build a `PENDING` order from a validated creation request.
    pub fn place(order_id: impl Into<String>, request: NewOrder, now: DateTime<Utc>) -> Self {
        let total_amount = request.total_amount();
        Self {
            order_id: order_id.into(),
            user_id: request.user_id,
            items: request.items,
            total_amount,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}
