//! Event bus - subject-addressed, fire-and-forget messaging
//!
//! The services never call each other's queues directly; they publish JSON
//! payloads on subjects and join queue groups to consume them.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 spawn_worker (per queue group)                │
//! │  - subscribe → loop { next → timeout(handle) }               │
//! │  - WorkerStats: handled / dropped / timed_out                │
//! └──────────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │              Publisher + QueueSubscriber traits               │
//! │  Publisher: publish(subject, payload)                        │
//! │  QueueSubscriber: queue_subscribe(subject, group)            │
//! └──────────────────────────────────────────────────────────────┘
//!                 │                              │
//!                 ▼                              ▼
//!        ┌───────────────┐             ┌─────────────────┐
//!        │  InMemoryBus  │             │     NatsBus     │
//!        │ (tests, local)│             │ (feature nats)  │
//!        └───────────────┘             └─────────────────┘
//! ```
//!
//! Delivery is at-most-once. No acks, no redelivery, no dead letters.

mod in_memory;
mod message;
#[cfg(feature = "nats")]
mod nats;
mod publisher;
mod subscriber;
mod worker;

pub use in_memory::InMemoryBus;
pub use message::Message;
#[cfg(feature = "nats")]
pub use nats::NatsBus;
pub use publisher::{BusError, PublishExt, Publisher};
pub use subscriber::{QueueSubscriber, Subscription};
pub use worker::{spawn_worker, MessageHandler, WorkerHandle, WorkerStats};
