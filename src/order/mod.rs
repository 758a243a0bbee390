//! Orders - the authoritative record and the operations that change it.
//!
//! ## Lifecycle
//!
//! ```text
//!   create_order ──► PENDING ──update_status──► PAID | FAILED | CANCELLED | PENDING
//!                                   ▲                       │
//!                                   └───────────────────────┘
//! ```
//!
//! Only membership in the allowed set is checked on update; the previous
//! status is never consulted. `total_amount` is computed once at creation.

mod error;
mod in_memory;
mod model;
#[cfg(feature = "postgres")]
mod postgres;
mod service;
mod store;

pub use error::{OrderError, StoreError};
pub use in_memory::InMemoryOrderStore;
pub use model::{NewOrder, Order, OrderItem, OrderStatus};
#[cfg(feature = "postgres")]
pub use postgres::PostgresOrderStore;
pub use service::OrderService;
pub use store::OrderStore;
