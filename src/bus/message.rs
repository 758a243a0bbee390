//! Bus message envelope.

/// A message as delivered by the bus: the subject it was published on and
/// its raw payload bytes. There is no id and no metadata; the bus offers no
/// acknowledgement or redelivery to hang them on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub subject: String,
    pub payload: Vec<u8>,
}

impl Message {
    pub fn new(subject: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            subject: subject.into(),
            payload,
        }
    }

    /// Create a message with a string payload.
    pub fn with_string_payload(subject: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::new(subject, payload.into().into_bytes())
    }

    /// Get the payload as a string (if valid UTF-8).
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}
