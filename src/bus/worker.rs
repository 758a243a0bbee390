//! Queue-group worker: pulls messages off a subscription and feeds them to a
//! handler, one at a time, each under its own deadline.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{BusError, Message, QueueSubscriber};
use crate::error::HandlerError;

/// Handles messages delivered to a worker.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: Message) -> Result<(), HandlerError>;
}

#[async_trait]
impl<H: MessageHandler + ?Sized> MessageHandler for Arc<H> {
    async fn handle(&self, message: Message) -> Result<(), HandlerError> {
        (**self).handle(message).await
    }
}

/// Statistics from a worker run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Messages the handler completed.
    pub handled: usize,
    /// Messages the handler rejected, or that arrived after shutdown began.
    pub dropped: usize,
    /// Messages abandoned at the per-message deadline.
    pub timed_out: usize,
}

#[derive(Default)]
struct Counters {
    handled: AtomicUsize,
    dropped: AtomicUsize,
    timed_out: AtomicUsize,
}

impl Counters {
    fn snapshot(&self) -> WorkerStats {
        WorkerStats {
            handled: self.handled.load(Ordering::SeqCst),
            dropped: self.dropped.load(Ordering::SeqCst),
            timed_out: self.timed_out.load(Ordering::SeqCst),
        }
    }
}

/// Handle to a running worker task. Drop or call `stop()` to shut down.
pub struct WorkerHandle {
    subject: String,
    queue_group: String,
    shutdown: CancellationToken,
    counters: Arc<Counters>,
    task: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn queue_group(&self) -> &str {
        &self.queue_group
    }

    /// Counts so far. The worker keeps running.
    pub fn stats(&self) -> WorkerStats {
        self.counters.snapshot()
    }

    /// Stop the worker and wait for it to finish. A message already in the
    /// handler is allowed to complete (within its deadline). Returns stats.
    pub async fn stop(mut self) -> WorkerStats {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, subject = %self.subject, "worker task failed");
            }
        }
        self.counters.snapshot()
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Join `queue_group` on `subject` and process messages in the background.
///
/// The subscription is established before this returns, so anything
/// published afterwards reaches the group. Messages are handled strictly one
/// after another; horizontal scale comes from running more workers in the
/// same group. Each message gets `budget` to complete; on expiry the handler
/// future is dropped and the message is lost.
///
/// Stops when `shutdown` (or the returned handle) is cancelled, or when the
/// bus ends the subscription.
pub async fn spawn_worker<S, H>(
    subscriber: &S,
    subject: &str,
    queue_group: &str,
    handler: H,
    budget: Duration,
    shutdown: CancellationToken,
) -> Result<WorkerHandle, BusError>
where
    S: QueueSubscriber + ?Sized,
    H: MessageHandler + 'static,
{
    let mut subscription = subscriber.queue_subscribe(subject, queue_group).await?;
    tracing::info!(subject, queue_group, "worker subscribed");

    let shutdown = shutdown.child_token();
    let counters = Arc::new(Counters::default());

    let task = {
        let shutdown = shutdown.clone();
        let counters = Arc::clone(&counters);
        let subject = subject.to_string();

        tokio::spawn(async move {
            loop {
                let message = tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    next = subscription.next() => match next {
                        Some(message) => message,
                        None => {
                            tracing::info!(subject = %subject, "subscription closed");
                            break;
                        }
                    },
                };

                if shutdown.is_cancelled() {
                    tracing::warn!(subject = %message.subject, "shutting down, message dropped");
                    counters.dropped.fetch_add(1, Ordering::SeqCst);
                    continue;
                }

                let received_on = message.subject.clone();
                match tokio::time::timeout(budget, handler.handle(message)).await {
                    Ok(Ok(())) => {
                        counters.handled.fetch_add(1, Ordering::SeqCst);
                    }
                    Ok(Err(e)) => {
                        tracing::warn!(error = %e, subject = %received_on, "message dropped");
                        counters.dropped.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(_) => {
                        tracing::warn!(
                            subject = %received_on,
                            budget_ms = budget.as_millis() as u64,
                            "message handling timed out"
                        );
                        counters.timed_out.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
            tracing::info!(subject = %subject, "worker stopped");
        })
    };

    Ok(WorkerHandle {
        subject: subject.to_string(),
        queue_group: queue_group.to_string(),
        shutdown,
        counters,
        task: Some(task),
    })
}
