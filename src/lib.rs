//! Event-driven order fulfillment.
//!
//! Three services cooperate without calling each other's queues directly:
//!
//! ```text
//! client ─► OrderService.create_order ─► store ─► order.created
//!                                                     │ billing-workers
//!                                                     ▼
//!                                             PaymentProcessor
//!                                     order.paid / order.failed ─► update_status
//!                                                     │ notification-workers
//!                                                     ▼
//!                                                 Notifier ─► update_status ─► notify
//! ```
//!
//! Delivery is at-most-once and unordered. Status updates carry no
//! transition guard, so the two outcome writes converge as last write wins.

pub mod app;
pub mod billing;
pub mod bus;
pub mod config;
mod error;
pub mod events;
pub mod notification;
pub mod order;
pub mod outcome;
pub mod rpc;
pub mod telemetry;

pub use bus::{InMemoryBus, Message, Publisher, QueueSubscriber};
pub use error::HandlerError;
pub use order::{
    InMemoryOrderStore, NewOrder, Order, OrderError, OrderItem, OrderService, OrderStatus,
    OrderStore, StoreError,
};
pub use outcome::{record_outcome, PaymentOutcome};
pub use rpc::{OrderClient, StatusUpdater};
