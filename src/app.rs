//! Explicit wiring of the three services.
//!
//! Every dependency is passed in: the binaries hand over a NATS bus and a
//! gRPC client, the tests an in-memory bus and an in-process order service.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::billing::PaymentProcessor;
use crate::bus::{spawn_worker, BusError, Publisher, QueueSubscriber, WorkerHandle};
use crate::config::StoreConfig;
use crate::events::{
    QUEUE_BILLING, QUEUE_NOTIFICATION, SUBJECT_ORDER_CREATED, SUBJECT_ORDER_FAILED,
    SUBJECT_ORDER_PAID,
};
use crate::notification::Notifier;
use crate::order::{InMemoryOrderStore, OrderService, OrderStore};
use crate::rpc::serve_grpc;

/// Open the document store the configuration names.
pub async fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn OrderStore>> {
    match config {
        StoreConfig::InMemory => {
            tracing::warn!("DOCUMENT_STORE_URL not set, orders are kept in memory only");
            Ok(Arc::new(InMemoryOrderStore::new()))
        }
        #[cfg(feature = "postgres")]
        StoreConfig::Postgres { url, table } => {
            let store = crate::order::PostgresOrderStore::connect(url, table)
                .await
                .context("failed to open document store")?;
            tracing::info!(table = %table, "document store ready");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "postgres"))]
        StoreConfig::Postgres { .. } => {
            anyhow::bail!("DOCUMENT_STORE_URL is set but this build lacks the postgres feature")
        }
    }
}

/// A running order service: the gRPC server plus the service it fronts.
pub struct RunningOrderService {
    pub service: Arc<OrderService>,
    pub local_addr: SocketAddr,
    server: JoinHandle<Result<(), tonic::transport::Error>>,
}

impl RunningOrderService {
    /// Wait for the server to stop (after the shutdown token fires).
    pub async fn wait(self) -> anyhow::Result<()> {
        self.server
            .await
            .context("gRPC server task failed")?
            .context("gRPC server error")
    }
}

/// Bind `addr` and serve the order API until `shutdown` is cancelled.
pub async fn start_order_service(
    store: Arc<dyn OrderStore>,
    publisher: Arc<dyn Publisher>,
    addr: SocketAddr,
    shutdown: CancellationToken,
) -> anyhow::Result<RunningOrderService> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let local_addr = listener.local_addr()?;

    let service = Arc::new(OrderService::new(store, publisher));
    let server = tokio::spawn(serve_grpc(
        service.clone(),
        listener,
        shutdown.cancelled_owned(),
    ));

    Ok(RunningOrderService {
        service,
        local_addr,
        server,
    })
}

/// Join `billing-workers` on `order.created`.
pub async fn start_billing_service<S>(
    subscriber: &S,
    processor: PaymentProcessor,
    handler_timeout: Duration,
    shutdown: CancellationToken,
) -> Result<WorkerHandle, BusError>
where
    S: QueueSubscriber + ?Sized,
{
    spawn_worker(
        subscriber,
        SUBJECT_ORDER_CREATED,
        QUEUE_BILLING,
        processor,
        handler_timeout,
        shutdown,
    )
    .await
}

/// Join `notification-workers` on `order.paid` and `order.failed`, one
/// worker per subject sharing the notifier.
pub async fn start_notification_service<S>(
    subscriber: &S,
    notifier: Notifier,
    handler_timeout: Duration,
    shutdown: CancellationToken,
) -> Result<Vec<WorkerHandle>, BusError>
where
    S: QueueSubscriber + ?Sized,
{
    let notifier = Arc::new(notifier);
    let mut workers = Vec::with_capacity(2);
    for subject in [SUBJECT_ORDER_PAID, SUBJECT_ORDER_FAILED] {
        let worker = spawn_worker(
            subscriber,
            subject,
            QUEUE_NOTIFICATION,
            notifier.clone(),
            handler_timeout,
            shutdown.clone(),
        )
        .await?;
        workers.push(worker);
    }
    Ok(workers)
}

/// Stop workers in order and log what each one did.
pub async fn stop_workers(workers: Vec<WorkerHandle>) {
    for worker in workers {
        let subject = worker.subject().to_string();
        let stats = worker.stop().await;
        tracing::info!(
            subject = %subject,
            handled = stats.handled,
            dropped = stats.dropped,
            timed_out = stats.timed_out,
            "worker drained"
        );
    }
}
