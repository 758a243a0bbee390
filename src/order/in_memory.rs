//! InMemoryOrderStore - HashMap-backed document store for tests and local runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Order, OrderStatus, OrderStore, StoreError};

/// In-memory order store.
///
/// Documents are kept as serialized JSON, keyed by `order_id`, so reads
/// always return a fresh copy the way a real document store would.
/// Clone-friendly via Arc.
#[derive(Clone)]
pub struct InMemoryOrderStore {
    documents: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    available: Arc<AtomicBool>,
}

impl Default for InMemoryOrderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Simulate the backend going away. While unavailable every operation
    /// fails with `StoreError::Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store switched off".into()))
        }
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("lock poisoned".into())
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        self.check_available()?;
        let bytes = serde_json::to_vec(order)?;
        let mut documents = self.documents.write().map_err(poisoned)?;

        if documents.contains_key(&order.order_id) {
            return Err(StoreError::DuplicateKey(order.order_id.clone()));
        }
        documents.insert(order.order_id.clone(), bytes);
        Ok(())
    }

    async fn get(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        self.check_available()?;
        let documents = self.documents.read().map_err(poisoned)?;

        match documents.get(order_id) {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes)?)),
            None => Ok(None),
        }
    }

    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Order>, StoreError> {
        self.check_available()?;
        // The write lock is held across read-modify-write, which makes this
        // the atomic find-and-modify the trait requires.
        let mut documents = self.documents.write().map_err(poisoned)?;

        let Some(bytes) = documents.get_mut(order_id) else {
            return Ok(None);
        };
        let mut order: Order = serde_json::from_slice(bytes)?;
        order.status = status;
        order.updated_at = updated_at;
        *bytes = serde_json::to_vec(&order)?;

        Ok(Some(order))
    }
}
