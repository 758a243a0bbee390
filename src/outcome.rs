//! Payment outcomes and the single path that writes them back to the store.
//!
//! Both the payment simulator and the notifier record the same outcome for
//! the same order. The second write is redundant under normal operation and
//! is kept: when the two race, whichever lands last wins, which is the same
//! value unless something upstream diverged.

use std::fmt;

use crate::error::HandlerError;
use crate::order::{Order, OrderStatus};
use crate::rpc::StatusUpdater;

/// Result of a simulated payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentOutcome {
    Paid,
    Failed,
}

impl PaymentOutcome {
    /// Terminal order status this outcome implies.
    pub fn status(self) -> OrderStatus {
        match self {
            PaymentOutcome::Paid => OrderStatus::Paid,
            PaymentOutcome::Failed => OrderStatus::Failed,
        }
    }
}

impl fmt::Display for PaymentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentOutcome::Paid => f.write_str("paid"),
            PaymentOutcome::Failed => f.write_str("failed"),
        }
    }
}

/// Write `outcome` to the order store. One attempt, no retry.
pub async fn record_outcome<U>(
    updater: &U,
    order_id: &str,
    outcome: PaymentOutcome,
) -> Result<Order, HandlerError>
where
    U: StatusUpdater + ?Sized,
{
    let status = outcome.status();
    updater
        .update_order_status(order_id, status)
        .await
        .map_err(|e| HandlerError::status_update(order_id, e))
}
