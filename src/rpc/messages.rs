//! Wire messages for the order service (prost, standard protobuf encoding,
//! no `.proto` file).
//!
//! `status` fields carry the `OrderStatus` ordinal as a plain int32, which is
//! wire-compatible with a protobuf enum.

use chrono::{DateTime, Utc};

use crate::order::{self, OrderError, OrderStatus};

#[derive(Clone, PartialEq, prost::Message)]
pub struct OrderItem {
    #[prost(string, tag = "1")]
    pub product_id: String,
    #[prost(int32, tag = "2")]
    pub quantity: i32,
    #[prost(double, tag = "3")]
    pub price: f64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Order {
    #[prost(string, tag = "1")]
    pub order_id: String,
    #[prost(string, tag = "2")]
    pub user_id: String,
    #[prost(message, repeated, tag = "3")]
    pub items: Vec<OrderItem>,
    #[prost(double, tag = "4")]
    pub total_amount: f64,
    #[prost(int32, tag = "5")]
    pub status: i32,
    #[prost(message, optional, tag = "6")]
    pub created_at: Option<prost_types::Timestamp>,
    #[prost(message, optional, tag = "7")]
    pub updated_at: Option<prost_types::Timestamp>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CreateOrderRequest {
    #[prost(string, tag = "1")]
    pub user_id: String,
    #[prost(message, repeated, tag = "2")]
    pub items: Vec<OrderItem>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CreateOrderResponse {
    #[prost(message, optional, tag = "1")]
    pub order: Option<Order>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetOrderRequest {
    #[prost(string, tag = "1")]
    pub order_id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetOrderResponse {
    #[prost(message, optional, tag = "1")]
    pub order: Option<Order>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UpdateOrderStatusRequest {
    #[prost(string, tag = "1")]
    pub order_id: String,
    #[prost(int32, tag = "2")]
    pub status: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct UpdateOrderStatusResponse {
    #[prost(message, optional, tag = "1")]
    pub order: Option<Order>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

fn to_timestamp(at: DateTime<Utc>) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: at.timestamp(),
        nanos: at.timestamp_subsec_nanos() as i32,
    }
}

fn from_timestamp(
    ts: Option<prost_types::Timestamp>,
    field: &str,
) -> Result<DateTime<Utc>, OrderError> {
    let ts = ts.ok_or_else(|| OrderError::Internal(format!("response missing {}", field)))?;
    DateTime::from_timestamp(ts.seconds, ts.nanos.max(0) as u32)
        .ok_or_else(|| OrderError::Internal(format!("response has invalid {}", field)))
}

impl From<order::OrderItem> for OrderItem {
    fn from(item: order::OrderItem) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
            price: item.price,
        }
    }
}

impl From<OrderItem> for order::OrderItem {
    fn from(item: OrderItem) -> Self {
        order::OrderItem::new(item.product_id, item.quantity, item.price)
    }
}

impl From<order::Order> for Order {
    fn from(order: order::Order) -> Self {
        Self {
            order_id: order.order_id,
            user_id: order.user_id,
            items: order.items.into_iter().map(OrderItem::from).collect(),
            total_amount: order.total_amount,
            status: order.status.as_wire(),
            created_at: Some(to_timestamp(order.created_at)),
            updated_at: Some(to_timestamp(order.updated_at)),
        }
    }
}

impl TryFrom<Order> for order::Order {
    type Error = OrderError;

    fn try_from(wire: Order) -> Result<Self, Self::Error> {
        Ok(order::Order {
            order_id: wire.order_id,
            user_id: wire.user_id,
            items: wire.items.into_iter().map(order::OrderItem::from).collect(),
            total_amount: wire.total_amount,
            status: OrderStatus::from_wire(wire.status).unwrap_or_default(),
            created_at: from_timestamp(wire.created_at, "created_at")?,
            updated_at: from_timestamp(wire.updated_at, "updated_at")?,
        })
    }
}

impl From<CreateOrderRequest> for order::NewOrder {
    fn from(request: CreateOrderRequest) -> Self {
        order::NewOrder {
            user_id: request.user_id,
            items: request.items.into_iter().map(order::OrderItem::from).collect(),
        }
    }
}

/// Unwrap the `order` field every response carries.
pub(crate) fn required_order(order: Option<Order>) -> Result<order::Order, OrderError> {
    order
        .ok_or_else(|| OrderError::Internal("response missing order".into()))?
        .try_into()
}
