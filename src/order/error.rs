use thiserror::Error;

/// Errors returned by the order store API.
///
/// The three variants are the only distinctions callers can act on:
/// bad input, missing order, or an infrastructure failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl OrderError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        OrderError::InvalidArgument(msg.into())
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, OrderError::InvalidArgument(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, OrderError::NotFound(_))
    }
}

/// Errors raised by a document store backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Unique index on `order_id` rejected the insert.
    #[error("duplicate order id {0}")]
    DuplicateKey(String),

    #[error("document serialization error: {0}")]
    Serde(String),

    #[error("document store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err.to_string())
    }
}
