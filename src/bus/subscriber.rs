//! Core subscriber trait for the event bus.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{BoxStream, Stream, StreamExt};

use super::{BusError, Message};

/// Trait for joining a queue group on a subject.
///
/// Every queue group subscribed to a subject receives each message, and
/// within a group exactly one member gets it. Nothing is acknowledged: once
/// a member has the message the bus forgets it.
#[async_trait]
pub trait QueueSubscriber: Send + Sync {
    async fn queue_subscribe(
        &self,
        subject: &str,
        queue_group: &str,
    ) -> Result<Subscription, BusError>;
}

#[async_trait]
impl<S: QueueSubscriber + ?Sized> QueueSubscriber for Arc<S> {
    async fn queue_subscribe(
        &self,
        subject: &str,
        queue_group: &str,
    ) -> Result<Subscription, BusError> {
        (**self).queue_subscribe(subject, queue_group).await
    }
}

/// A live queue-group membership. Dropping it leaves the group.
pub struct Subscription {
    subject: String,
    queue_group: String,
    messages: BoxStream<'static, Message>,
}

impl Subscription {
    pub fn new<S>(subject: impl Into<String>, queue_group: impl Into<String>, messages: S) -> Self
    where
        S: Stream<Item = Message> + Send + 'static,
    {
        Self {
            subject: subject.into(),
            queue_group: queue_group.into(),
            messages: messages.boxed(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn queue_group(&self) -> &str {
        &self.queue_group
    }

    /// Wait for the next message. `None` once the bus has closed the
    /// subscription.
    pub async fn next(&mut self) -> Option<Message> {
        self.messages.next().await
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("subject", &self.subject)
            .field("queue_group", &self.queue_group)
            .finish_non_exhaustive()
    }
}
