//! Customer notification for payment outcomes.

mod notifier;
mod sink;

pub use notifier::Notifier;
pub use sink::{BufferSink, LogSink, Notification, NotificationSink};
