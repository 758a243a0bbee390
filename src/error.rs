use thiserror::Error;

use crate::events::PayloadError;
use crate::order::OrderError;

/// Why a bus message handler gave up on a message.
///
/// There is no redelivery, so every variant means the message is dropped.
/// The worker logs it and moves on.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("unexpected subject {0}")]
    UnexpectedSubject(String),

    #[error("failed to update order {order_id} status: {source}")]
    StatusUpdate {
        order_id: String,
        #[source]
        source: OrderError,
    },
}

impl HandlerError {
    pub fn status_update(order_id: impl Into<String>, source: OrderError) -> Self {
        HandlerError::StatusUpdate {
            order_id: order_id.into(),
            source,
        }
    }
}
