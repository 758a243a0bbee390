//! NATS-backed bus. Requires the `nats` feature.

use async_trait::async_trait;
use futures::StreamExt;

use super::{BusError, Message, Publisher, QueueSubscriber, Subscription};

/// Bus over a core NATS connection (no JetStream).
///
/// Reconnection and buffering while disconnected are left to the client
/// library; connection events are logged.
#[derive(Clone, Debug)]
pub struct NatsBus {
    client: async_nats::Client,
}

impl NatsBus {
    pub async fn connect(url: &str, client_name: &str) -> Result<Self, BusError> {
        let client = async_nats::ConnectOptions::new()
            .name(client_name)
            .event_callback(|event| async move {
                tracing::warn!(%event, "nats connection event");
            })
            .connect(url)
            .await
            .map_err(|e| BusError::Transport(format!("connect to {}: {}", url, e)))?;

        tracing::info!(url, client_name, "connected to nats");
        Ok(Self { client })
    }

    /// Push anything buffered by the client out to the server.
    pub async fn flush(&self) -> Result<(), BusError> {
        self.client
            .flush()
            .await
            .map_err(|e| BusError::Transport(e.to_string()))
    }
}

#[async_trait]
impl Publisher for NatsBus {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), BusError> {
        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| BusError::Transport(e.to_string()))
    }
}

#[async_trait]
impl QueueSubscriber for NatsBus {
    async fn queue_subscribe(
        &self,
        subject: &str,
        queue_group: &str,
    ) -> Result<Subscription, BusError> {
        let subscriber = self
            .client
            .queue_subscribe(subject.to_string(), queue_group.to_string())
            .await
            .map_err(|e| BusError::Transport(e.to_string()))?;

        let messages = subscriber.map(|m| Message::new(m.subject.to_string(), m.payload.to_vec()));
        Ok(Subscription::new(subject, queue_group, messages))
    }
}
