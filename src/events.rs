//! Bus payloads and routing names for the fulfillment choreography.
//!
//! | Subject         | Producer       | Queue group            |
//! |-----------------|----------------|------------------------|
//! | `order.created` | order store    | `billing-workers`      |
//! | `order.paid`    | billing        | `notification-workers` |
//! | `order.failed`  | billing        | `notification-workers` |
//!
//! Payloads are JSON with stable field names and unix-second timestamps.
//! They carry no idempotency key: a redelivered payload is indistinguishable
//! from a new one.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SUBJECT_ORDER_CREATED: &str = "order.created";
pub const SUBJECT_ORDER_PAID: &str = "order.paid";
pub const SUBJECT_ORDER_FAILED: &str = "order.failed";

pub const QUEUE_BILLING: &str = "billing-workers";
pub const QUEUE_NOTIFICATION: &str = "notification-workers";

/// Reason carried by every `order.failed` event.
pub const PAYMENT_DECLINED: &str = "payment declined";

/// Why a payload was rejected. Either way the message is dropped.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("payload missing {0}")]
    MissingField(&'static str),
}

/// A JSON payload published on one fixed subject.
pub trait EventPayload: Serialize + DeserializeOwned + Send + Sync {
    const SUBJECT: &'static str;

    /// Shape checks beyond what deserialization enforces.
    fn validate(&self) -> Result<(), PayloadError>;

    fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode and validate in one step.
    fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        let payload: Self = serde_json::from_slice(bytes)?;
        payload.validate()?;
        Ok(payload)
    }
}

fn require(value: &str, field: &'static str) -> Result<(), PayloadError> {
    if value.is_empty() {
        Err(PayloadError::MissingField(field))
    } else {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderCreated {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub created_at: i64,
}

impl OrderCreated {
    pub fn new(
        order_id: impl Into<String>,
        user_id: impl Into<String>,
        total_amount: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            user_id: user_id.into(),
            total_amount,
            created_at: created_at.timestamp(),
        }
    }
}

impl EventPayload for OrderCreated {
    const SUBJECT: &'static str = SUBJECT_ORDER_CREATED;

    fn validate(&self) -> Result<(), PayloadError> {
        require(&self.order_id, "order_id")?;
        require(&self.user_id, "user_id")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderPaid {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub paid_at: i64,
}

impl OrderPaid {
    pub fn for_order(created: &OrderCreated, paid_at: DateTime<Utc>) -> Self {
        Self {
            order_id: created.order_id.clone(),
            user_id: created.user_id.clone(),
            total_amount: created.total_amount,
            paid_at: paid_at.timestamp(),
        }
    }
}

impl EventPayload for OrderPaid {
    const SUBJECT: &'static str = SUBJECT_ORDER_PAID;

    fn validate(&self) -> Result<(), PayloadError> {
        require(&self.order_id, "order_id")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderFailed {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub failed_at: i64,
}

impl OrderFailed {
    pub fn declined(created: &OrderCreated, failed_at: DateTime<Utc>) -> Self {
        Self {
            order_id: created.order_id.clone(),
            user_id: created.user_id.clone(),
            reason: PAYMENT_DECLINED.to_string(),
            failed_at: failed_at.timestamp(),
        }
    }
}

impl EventPayload for OrderFailed {
    const SUBJECT: &'static str = SUBJECT_ORDER_FAILED;

    fn validate(&self) -> Result<(), PayloadError> {
        require(&self.order_id, "order_id")
    }
}
