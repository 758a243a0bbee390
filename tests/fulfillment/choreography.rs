//! The whole flow on one in-memory bus: order service, billing, notifier.

use std::sync::Arc;
use std::time::Duration;

use order_fulfillment::billing::LatencyPolicy;
use order_fulfillment::events::{
    EventPayload, OrderFailed, OrderPaid, PAYMENT_DECLINED, SUBJECT_ORDER_FAILED,
    SUBJECT_ORDER_PAID,
};
use order_fulfillment::OrderStatus;

use crate::support::{eventually, settled, CountingUpdater, Stack, BUDGET};

#[tokio::test]
async fn approved_payment_ends_paid_and_notified() {
    let stack = Stack::new();
    let billing = stack.billing(1.0).await;
    let (notifiers, sink) = stack.notification().await;

    let order = stack.place("u1").await;

    assert!(eventually(|| sink.lines().len() == 1).await);
    assert_eq!(stack.status(&order.order_id).await, OrderStatus::Paid);

    let paid = stack.bus.published_on(SUBJECT_ORDER_PAID);
    assert_eq!(paid.len(), 1);
    let event = OrderPaid::decode(&paid[0].payload).unwrap();
    assert_eq!(event.order_id, order.order_id);
    assert_eq!(event.user_id, "u1");
    assert_eq!(event.total_amount, 20.0);
    assert!(stack.bus.published_on(SUBJECT_ORDER_FAILED).is_empty());

    assert_eq!(billing.stats().handled, 1);
    assert_eq!(notifiers.iter().map(|w| w.stats().handled).sum::<usize>(), 1);
    assert!(sink.lines()[0].contains("20.00"));
}

#[tokio::test]
async fn declined_payment_ends_failed_and_notified() {
    let stack = Stack::new();
    let _billing = stack.billing(0.0).await;
    let (_notifiers, sink) = stack.notification().await;

    let order = stack.place("u2").await;

    assert!(eventually(|| sink.lines().len() == 1).await);
    assert_eq!(stack.status(&order.order_id).await, OrderStatus::Failed);

    let failed = stack.bus.published_on(SUBJECT_ORDER_FAILED);
    assert_eq!(failed.len(), 1);
    let event = OrderFailed::decode(&failed[0].payload).unwrap();
    assert_eq!(event.order_id, order.order_id);
    assert_eq!(event.reason, PAYMENT_DECLINED);
    assert!(sink.lines()[0].contains(PAYMENT_DECLINED));
}

#[tokio::test]
async fn both_consumers_write_the_same_outcome() {
    let stack = Stack::new();
    let counting = Arc::new(CountingUpdater::new(stack.orders.clone()));
    let billing = stack
        .billing_with(stack.processor(1.0, counting.clone()), BUDGET)
        .await;
    let (notifiers, sink) = stack.notification_with(counting.clone()).await;

    let first = stack.place("u1").await;
    let second = stack.place("u2").await;

    assert!(eventually(|| sink.lines().len() == 2 && counting.count() == 4).await);

    let calls = counting.calls.lock().unwrap().clone();
    for order in [&first, &second] {
        let writes: Vec<_> = calls.iter().filter(|(id, _)| id == &order.order_id).collect();
        assert_eq!(writes.len(), 2);
        assert!(writes.iter().all(|(_, status)| *status == OrderStatus::Paid));
        assert_eq!(stack.status(&order.order_id).await, OrderStatus::Paid);
    }

    let all: Vec<_> = std::iter::once(&billing).chain(notifiers.iter()).collect();
    assert_eq!(settled(&all), 4);
}

#[tokio::test]
async fn store_outage_leaves_order_pending_after_outcome_is_published() {
    let stack = Stack::new();
    let processor = stack
        .processor(1.0, stack.orders.clone())
        .with_latency(LatencyPolicy::Fixed(Duration::from_millis(100)));
    let billing = stack.billing_with(processor, BUDGET).await;
    let (notifiers, sink) = stack.notification().await;

    let order = stack.place("u1").await;
    stack.store.set_available(false);

    assert!(eventually(|| billing.stats().dropped == 1).await);
    assert!(eventually(|| notifiers.iter().map(|w| w.stats().dropped).sum::<usize>() == 1).await);
    stack.store.set_available(true);

    assert_eq!(stack.bus.published_on(SUBJECT_ORDER_PAID).len(), 1);
    assert_eq!(stack.status(&order.order_id).await, OrderStatus::Pending);
    assert!(sink.lines().is_empty());
}

#[tokio::test]
async fn lost_outcome_publish_still_records_the_status() {
    let stack = Stack::new();
    let processor = stack
        .processor(1.0, stack.orders.clone())
        .with_latency(LatencyPolicy::Fixed(Duration::from_millis(50)));
    let billing = stack.billing_with(processor, BUDGET).await;
    let (_notifiers, sink) = stack.notification().await;

    let order = stack.place("u1").await;
    stack.bus.set_fail_publishes(true);

    assert!(eventually(|| billing.stats().handled == 1).await);
    stack.bus.set_fail_publishes(false);

    assert_eq!(stack.status(&order.order_id).await, OrderStatus::Paid);
    assert!(stack.bus.published_on(SUBJECT_ORDER_PAID).is_empty());
    assert!(sink.lines().is_empty());
}

#[tokio::test]
async fn many_orders_with_mixed_outcomes_all_settle() {
    let stack = Stack::new();
    let _billing = stack.billing(0.5).await;
    let (_notifiers, sink) = stack.notification().await;

    let mut ids = Vec::new();
    for i in 0..20 {
        ids.push(stack.place(&format!("u{}", i)).await.order_id);
    }

    assert!(eventually(|| sink.lines().len() == 20).await);
    let paid = stack.bus.published_on(SUBJECT_ORDER_PAID).len();
    let failed = stack.bus.published_on(SUBJECT_ORDER_FAILED).len();
    assert_eq!(paid + failed, 20);

    let mut paid_seen = 0;
    for id in &ids {
        match stack.status(id).await {
            OrderStatus::Paid => paid_seen += 1,
            OrderStatus::Failed => {}
            other => panic!("order {} left {:?}", id, other),
        }
    }
    assert_eq!(paid_seen, paid);
}
