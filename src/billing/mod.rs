//! Payment simulator.
//!
//! Stands in for a payment gateway: waits a while, flips a weighted coin,
//! announces `order.paid` or `order.failed` and writes the terminal status
//! back to the order store.

mod policy;
mod processor;

pub use policy::{LatencyPolicy, PaymentDecider};
pub use processor::PaymentProcessor;
