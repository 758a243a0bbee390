//! PaymentProcessor - consumes `order.created`, simulates a payment and
//! reports the outcome.
//!
//! Per message:
//!
//! ```text
//! RECEIVED → VALIDATED → (latency) → DECIDED → PUBLISHED → RPC-UPDATED
//! ```
//!
//! A publish failure is logged and the status update still happens. A
//! status-update failure is returned to the worker, which logs it; there is
//! no retry, so the order may stay `PENDING` after its outcome event went out.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{LatencyPolicy, PaymentDecider};
use crate::bus::{BusError, Message, MessageHandler, PublishExt, Publisher};
use crate::error::HandlerError;
use crate::events::{EventPayload, OrderCreated, OrderFailed, OrderPaid, SUBJECT_ORDER_CREATED};
use crate::outcome::{record_outcome, PaymentOutcome};
use crate::rpc::StatusUpdater;

pub struct PaymentProcessor {
    publisher: Arc<dyn Publisher>,
    updater: Arc<dyn StatusUpdater>,
    decider: PaymentDecider,
    latency: LatencyPolicy,
    rng: Mutex<StdRng>,
}

impl PaymentProcessor {
    pub fn new(
        publisher: Arc<dyn Publisher>,
        updater: Arc<dyn StatusUpdater>,
        decider: PaymentDecider,
    ) -> Self {
        Self {
            publisher,
            updater,
            decider,
            latency: LatencyPolicy::default(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_latency(mut self, latency: LatencyPolicy) -> Self {
        self.latency = latency;
        self
    }

    /// Seed the random source for reproducible decisions and delays.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Draw the delay and the decision value together; the lock is never
    /// held across the sleep.
    fn draw(&self) -> (std::time::Duration, f64) {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let delay = self.latency.sample(&mut *rng);
        (delay, rng.gen::<f64>())
    }

    async fn publish_outcome(
        &self,
        created: &OrderCreated,
        outcome: PaymentOutcome,
    ) -> Result<(), BusError> {
        let now = Utc::now();
        match outcome {
            PaymentOutcome::Paid => {
                self.publisher
                    .publish_event(&OrderPaid::for_order(created, now))
                    .await
            }
            PaymentOutcome::Failed => {
                self.publisher
                    .publish_event(&OrderFailed::declined(created, now))
                    .await
            }
        }
    }
}

#[async_trait]
impl MessageHandler for PaymentProcessor {
    async fn handle(&self, message: Message) -> Result<(), HandlerError> {
        if message.subject != SUBJECT_ORDER_CREATED {
            return Err(HandlerError::UnexpectedSubject(message.subject));
        }
        tracing::debug!(subject = %message.subject, "RECEIVED");

        let created = OrderCreated::decode(&message.payload)?;
        let order_id = created.order_id.as_str();
        tracing::debug!(order_id, user_id = %created.user_id, "VALIDATED");

        let (delay, draw) = self.draw();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let outcome = self.decider.decide(draw);
        tracing::info!(
            order_id,
            amount = created.total_amount,
            %outcome,
            delay_ms = delay.as_millis() as u64,
            "DECIDED"
        );

        match self.publish_outcome(&created, outcome).await {
            Ok(()) => tracing::debug!(order_id, %outcome, "PUBLISHED"),
            Err(e) => tracing::warn!(
                error = %e,
                order_id,
                %outcome,
                "failed to publish payment outcome, updating status anyway"
            ),
        }

        let order = record_outcome(self.updater.as_ref(), order_id, outcome).await?;
        tracing::info!(order_id, status = %order.status, "RPC-UPDATED");
        Ok(())
    }
}
