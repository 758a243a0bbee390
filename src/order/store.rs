//! OrderStore - document storage for order records.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Order, OrderStatus, StoreError};

/// Document storage for orders, one document per order keyed by `order_id`.
///
/// Implementations must enforce uniqueness of `order_id` and must apply
/// `update_status` as a single atomic find-and-modify. No other guarantee is
/// required: concurrent status updates resolve as last write wins.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Insert a new order. Fails with `DuplicateKey` if the id exists.
    async fn insert(&self, order: &Order) -> Result<(), StoreError>;

    /// Get an order by id. Returns `None` if absent.
    async fn get(&self, order_id: &str) -> Result<Option<Order>, StoreError>;

    /// Set `status` and `updated_at` and return the post-image.
    /// Returns `None` (and writes nothing) if the order does not exist.
    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Order>, StoreError>;
}

#[async_trait]
impl<S: OrderStore + ?Sized> OrderStore for Arc<S> {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        (**self).insert(order).await
    }

    async fn get(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        (**self).get(order_id).await
    }

    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Order>, StoreError> {
        (**self).update_status(order_id, status, updated_at).await
    }
}
