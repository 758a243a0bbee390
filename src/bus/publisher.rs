//! Core publisher trait for the event bus.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::events::EventPayload;

/// Error type for bus operations.
#[derive(Debug, Error)]
pub enum BusError {
    /// Serialization of the payload failed
    #[error("encode failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// The broker connection refused or failed the operation
    #[error("bus transport error: {0}")]
    Transport(String),

    /// The bus has been shut down
    #[error("bus closed")]
    Closed,
}

/// Trait for publishing raw payloads on a subject.
///
/// Delivery is best-effort: `Ok(())` means the bus accepted the message,
/// not that anyone received it. A message published while no subscriber
/// listens on its subject is lost.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), BusError>;
}

#[async_trait]
impl<P: Publisher + ?Sized> Publisher for Arc<P> {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), BusError> {
        (**self).publish(subject, payload).await
    }
}

/// Typed publishing of event payloads on their own subject.
#[async_trait]
pub trait PublishExt: Publisher {
    async fn publish_event<E: EventPayload>(&self, event: &E) -> Result<(), BusError> {
        let payload = event.encode()?;
        self.publish(E::SUBJECT, payload).await
    }
}

impl<P: Publisher + ?Sized> PublishExt for P {}
