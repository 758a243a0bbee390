use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::outcome::PaymentOutcome;

/// What the customer is told about their order.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub order_id: String,
    pub user_id: String,
    pub outcome: PaymentOutcome,
    /// Amount for a payment, reason for a failure.
    pub detail: String,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            PaymentOutcome::Paid => write!(
                f,
                "user {}: order {} paid ({})",
                self.user_id, self.order_id, self.detail
            ),
            PaymentOutcome::Failed => write!(
                f,
                "user {}: order {} failed ({})",
                self.user_id, self.order_id, self.detail
            ),
        }
    }
}

/// Where notifications go.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Emits each notification as an `info` log line.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, notification: &Notification) {
        tracing::info!(
            order_id = %notification.order_id,
            user_id = %notification.user_id,
            outcome = %notification.outcome,
            "notification: {}",
            notification
        );
    }
}

/// Collects rendered notifications in memory.
#[derive(Clone, Debug, Default)]
pub struct BufferSink {
    buffer: Arc<Mutex<Vec<String>>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer(buffer: Arc<Mutex<Vec<String>>>) -> Self {
        Self { buffer }
    }

    pub fn lines(&self) -> Vec<String> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl NotificationSink for BufferSink {
    fn notify(&self, notification: &Notification) {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.to_string());
    }
}
