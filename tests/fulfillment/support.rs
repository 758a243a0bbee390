//! Shared wiring: in-memory bus, in-memory store, in-process order service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use order_fulfillment::app;
use order_fulfillment::billing::{LatencyPolicy, PaymentDecider, PaymentProcessor};
use order_fulfillment::bus::{InMemoryBus, WorkerHandle};
use order_fulfillment::notification::{BufferSink, Notifier};
use order_fulfillment::{
    InMemoryOrderStore, NewOrder, Order, OrderError, OrderService, OrderStatus, StatusUpdater,
};
use tokio_util::sync::CancellationToken;

pub const BUDGET: Duration = Duration::from_secs(10);

pub struct Stack {
    pub bus: InMemoryBus,
    pub store: InMemoryOrderStore,
    pub orders: Arc<OrderService>,
    pub shutdown: CancellationToken,
}

impl Stack {
    pub fn new() -> Self {
        let bus = InMemoryBus::new();
        let store = InMemoryOrderStore::new();
        let orders = Arc::new(OrderService::new(
            Arc::new(store.clone()),
            Arc::new(bus.clone()),
        ));
        Self {
            bus,
            store,
            orders,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn processor(&self, rate: f64, updater: Arc<dyn StatusUpdater>) -> PaymentProcessor {
        PaymentProcessor::new(Arc::new(self.bus.clone()), updater, PaymentDecider::new(rate))
            .with_latency(LatencyPolicy::None)
            .with_seed(7)
    }

    pub async fn billing(&self, rate: f64) -> WorkerHandle {
        self.billing_with(self.processor(rate, self.orders.clone()), BUDGET)
            .await
    }

    pub async fn billing_with(&self, processor: PaymentProcessor, budget: Duration) -> WorkerHandle {
        app::start_billing_service(&self.bus, processor, budget, self.shutdown.clone())
            .await
            .unwrap()
    }

    pub async fn notification(&self) -> (Vec<WorkerHandle>, BufferSink) {
        self.notification_with(self.orders.clone()).await
    }

    pub async fn notification_with(
        &self,
        updater: Arc<dyn StatusUpdater>,
    ) -> (Vec<WorkerHandle>, BufferSink) {
        let sink = BufferSink::new();
        let notifier = Notifier::new(updater, Arc::new(sink.clone()));
        let workers =
            app::start_notification_service(&self.bus, notifier, BUDGET, self.shutdown.clone())
                .await
                .unwrap();
        (workers, sink)
    }

    pub async fn place(&self, user: &str) -> Order {
        self.orders
            .create_order(NewOrder::new(user).item("p1", 2, 10.0))
            .await
            .unwrap()
    }

    pub async fn status(&self, order_id: &str) -> OrderStatus {
        self.orders.get_order(order_id).await.unwrap().status
    }
}

/// Poll `check` until it holds or two seconds pass.
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..400 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}

/// Total messages a set of workers has finished with, however it ended.
pub fn settled(workers: &[&WorkerHandle]) -> usize {
    workers
        .iter()
        .map(|w| {
            let s = w.stats();
            s.handled + s.dropped + s.timed_out
        })
        .sum()
}

/// Status updater that records every call before forwarding it.
pub struct CountingUpdater {
    inner: Arc<OrderService>,
    pub calls: Mutex<Vec<(String, OrderStatus)>>,
    pub count: AtomicUsize,
}

impl CountingUpdater {
    pub fn new(inner: Arc<OrderService>) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            count: AtomicUsize::new(0),
        }
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusUpdater for CountingUpdater {
    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        self.calls
            .lock()
            .unwrap()
            .push((order_id.to_string(), status));
        self.count.fetch_add(1, Ordering::SeqCst);
        self.inner.update_status(order_id, status).await
    }
}
