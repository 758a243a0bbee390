//! OrderService - create, read and re-status orders.
//!
//! The service owns validation and error mapping; storage is behind
//! [`OrderStore`] and event emission behind [`Publisher`]. Both transports
//! (gRPC server and in-process callers) go through this type.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::{NewOrder, Order, OrderError, OrderStatus, OrderStore, StoreError};
use crate::bus::{PublishExt, Publisher};
use crate::events::OrderCreated;

pub struct OrderService {
    store: Arc<dyn OrderStore>,
    publisher: Arc<dyn Publisher>,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>, publisher: Arc<dyn Publisher>) -> Self {
        Self { store, publisher }
    }

    /// Validate, persist as `PENDING`, then announce `order.created`.
    ///
    /// The event goes out only after the record is durable. Publishing is
    /// best-effort: if it fails the order still exists and the call still
    /// succeeds, but nothing downstream will ever process it.
    pub async fn create_order(&self, request: NewOrder) -> Result<Order, OrderError> {
        request.validate()?;

        let order = Order::place(Uuid::new_v4().to_string(), request, Utc::now());
        self.store
            .insert(&order)
            .await
            .map_err(|e| internal("failed to persist order", e))?;

        tracing::info!(
            order_id = %order.order_id,
            user_id = %order.user_id,
            amount = order.total_amount,
            "order created"
        );

        let event = OrderCreated::new(
            order.order_id.clone(),
            order.user_id.clone(),
            order.total_amount,
            order.created_at,
        );
        if let Err(e) = self.publisher.publish_event(&event).await {
            tracing::warn!(
                error = %e,
                order_id = %order.order_id,
                "failed to publish order.created"
            );
        }

        Ok(order)
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Order, OrderError> {
        if order_id.is_empty() {
            return Err(OrderError::invalid("order_id is required"));
        }

        self.store
            .get(order_id)
            .await
            .map_err(|e| internal("failed to load order", e))?
            .ok_or_else(not_found)
    }

    /// Overwrite the status of an existing order.
    ///
    /// There is no transition check: any allowed status replaces any other,
    /// terminal or not. Concurrent callers resolve as last write wins.
    pub async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        if order_id.is_empty() {
            return Err(OrderError::invalid("order_id is required"));
        }
        if !status.is_allowed() {
            return Err(OrderError::invalid("status is required"));
        }

        let order = self
            .store
            .update_status(order_id, status, Utc::now())
            .await
            .map_err(|e| internal("failed to update order", e))?
            .ok_or_else(not_found)?;

        tracing::info!(order_id, status = %status, "order status updated");
        Ok(order)
    }
}

fn not_found() -> OrderError {
    OrderError::NotFound("order not found".into())
}

fn internal(context: &str, err: StoreError) -> OrderError {
    tracing::error!(error = %err, "{}", context);
    OrderError::Internal(format!("{}: {}", context, err))
}
