//! In-memory bus for tests and single-process runs.
//!
//! Mirrors the delivery semantics of a core NATS server: fan-out across
//! queue groups, one member per group, no persistence and no redelivery.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::{BusError, Message, Publisher, QueueSubscriber, Subscription};

struct QueueGroup {
    name: String,
    members: Vec<mpsc::UnboundedSender<Message>>,
    next: usize,
}

impl QueueGroup {
    /// Hand the message to one live member, round-robin. Members whose
    /// subscription was dropped are pruned on the way.
    fn deliver(&mut self, mut message: Message) -> bool {
        self.members.retain(|member| !member.is_closed());
        while !self.members.is_empty() {
            let index = self.next % self.members.len();
            self.next = self.next.wrapping_add(1);
            match self.members[index].send(message) {
                Ok(()) => return true,
                Err(mpsc::error::SendError(returned)) => {
                    self.members.remove(index);
                    message = returned;
                }
            }
        }
        false
    }
}

#[derive(Default)]
struct BusState {
    /// subject -> queue groups listening on it
    subjects: HashMap<String, Vec<QueueGroup>>,
    /// Every accepted publish, delivered or not. Unbounded until
    /// `clear_published`.
    published: Vec<Message>,
    closed: bool,
}

/// In-memory bus.
///
/// Clone-friendly via Arc; all clones share the same subjects.
///
/// Every accepted publish is kept for inspection and the log is never
/// trimmed on its own. Meant for tests and short local runs; long-lived
/// processes should call `clear_published` or use `NatsBus`.
///
/// ```
/// use order_fulfillment::bus::{InMemoryBus, Publisher, QueueSubscriber};
///
/// # tokio_test_block(async {
/// let bus = InMemoryBus::new();
/// let mut sub = bus.queue_subscribe("order.created", "billing-workers").await.unwrap();
///
/// bus.publish("order.created", b"{}".to_vec()).await.unwrap();
/// assert_eq!(sub.next().await.unwrap().payload, b"{}");
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryBus {
    state: Arc<Mutex<BusState>>,
    fail_publishes: Arc<AtomicBool>,
}

impl InMemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent publish fail with a transport error, as if the
    /// broker connection were down.
    pub fn set_fail_publishes(&self, fail: bool) {
        self.fail_publishes.store(fail, Ordering::SeqCst);
    }

    /// Get all accepted messages in publish order.
    pub fn published(&self) -> Vec<Message> {
        self.state().published.clone()
    }

    /// Drop the publish log. Subscriptions are untouched.
    pub fn clear_published(&self) {
        self.state().published.clear();
    }

    /// Get accepted messages on one subject.
    pub fn published_on(&self, subject: &str) -> Vec<Message> {
        self.state()
            .published
            .iter()
            .filter(|m| m.subject == subject)
            .cloned()
            .collect()
    }

    /// Number of live members across all queue groups on a subject.
    pub fn subscriber_count(&self, subject: &str) -> usize {
        self.state()
            .subjects
            .get(subject)
            .map(|groups| {
                groups
                    .iter()
                    .flat_map(|g| g.members.iter())
                    .filter(|m| !m.is_closed())
                    .count()
            })
            .unwrap_or(0)
    }

    /// Close the bus. Open subscriptions end and later calls fail with
    /// `BusError::Closed`.
    pub fn close(&self) {
        let mut state = self.state();
        state.closed = true;
        state.subjects.clear();
    }
}

#[async_trait]
impl Publisher for InMemoryBus {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> Result<(), BusError> {
        if self.fail_publishes.load(Ordering::SeqCst) {
            return Err(BusError::Transport(format!(
                "publish on {} rejected",
                subject
            )));
        }

        let mut state = self.state();
        if state.closed {
            return Err(BusError::Closed);
        }

        let message = Message::new(subject, payload);
        state.published.push(message.clone());

        let mut delivered = false;
        if let Some(groups) = state.subjects.get_mut(subject) {
            for group in groups.iter_mut() {
                delivered |= group.deliver(message.clone());
            }
        }
        if !delivered {
            tracing::debug!(subject, "no subscriber, message lost");
        }
        Ok(())
    }
}

#[async_trait]
impl QueueSubscriber for InMemoryBus {
    async fn queue_subscribe(
        &self,
        subject: &str,
        queue_group: &str,
    ) -> Result<Subscription, BusError> {
        let mut state = self.state();
        if state.closed {
            return Err(BusError::Closed);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let groups = state.subjects.entry(subject.to_string()).or_default();
        match groups.iter_mut().find(|g| g.name == queue_group) {
            Some(group) => group.members.push(tx),
            None => groups.push(QueueGroup {
                name: queue_group.to_string(),
                members: vec![tx],
                next: 0,
            }),
        }

        Ok(Subscription::new(
            subject,
            queue_group,
            UnboundedReceiverStream::new(rx),
        ))
    }
}
