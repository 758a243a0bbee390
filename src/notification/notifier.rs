use std::sync::Arc;

use async_trait::async_trait;

use super::{Notification, NotificationSink};
use crate::bus::{Message, MessageHandler};
use crate::error::HandlerError;
use crate::events::{EventPayload, OrderFailed, OrderPaid, SUBJECT_ORDER_FAILED, SUBJECT_ORDER_PAID};
use crate::outcome::{record_outcome, PaymentOutcome};
use crate::rpc::StatusUpdater;

/// Consumes `order.paid` and `order.failed`: records the outcome on the
/// order, then notifies the customer. The notification is skipped when the
/// status update fails.
pub struct Notifier {
    updater: Arc<dyn StatusUpdater>,
    sink: Arc<dyn NotificationSink>,
}

impl Notifier {
    pub fn new(updater: Arc<dyn StatusUpdater>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { updater, sink }
    }

    fn notification(message: &Message) -> Result<Notification, HandlerError> {
        match message.subject.as_str() {
            SUBJECT_ORDER_PAID => {
                let paid = OrderPaid::decode(&message.payload)?;
                Ok(Notification {
                    detail: format!("{:.2}", paid.total_amount),
                    order_id: paid.order_id,
                    user_id: paid.user_id,
                    outcome: PaymentOutcome::Paid,
                })
            }
            SUBJECT_ORDER_FAILED => {
                let failed = OrderFailed::decode(&message.payload)?;
                Ok(Notification {
                    order_id: failed.order_id,
                    user_id: failed.user_id,
                    outcome: PaymentOutcome::Failed,
                    detail: failed.reason,
                })
            }
            other => Err(HandlerError::UnexpectedSubject(other.to_string())),
        }
    }
}

#[async_trait]
impl MessageHandler for Notifier {
    async fn handle(&self, message: Message) -> Result<(), HandlerError> {
        let notification = Self::notification(&message)?;

        record_outcome(
            self.updater.as_ref(),
            &notification.order_id,
            notification.outcome,
        )
        .await?;

        self.sink.notify(&notification);
        Ok(())
    }
}
