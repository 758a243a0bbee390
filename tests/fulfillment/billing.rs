//! Payment simulator behind a queue-group worker.

use std::time::Duration;

use order_fulfillment::billing::LatencyPolicy;
use order_fulfillment::events::{
    EventPayload, OrderFailed, SUBJECT_ORDER_CREATED, SUBJECT_ORDER_FAILED, SUBJECT_ORDER_PAID,
};
use order_fulfillment::{OrderStatus, Publisher};

use crate::support::{eventually, settled, Stack};

#[tokio::test]
async fn certain_success_pays_every_order() {
    let stack = Stack::new();
    let worker = stack.billing(1.0).await;

    let mut ids = Vec::new();
    for _ in 0..10 {
        ids.push(stack.place("u1").await.order_id);
    }
    assert!(eventually(|| settled(&[&worker]) == 10).await);

    for id in &ids {
        assert_eq!(stack.status(id).await, OrderStatus::Paid);
    }
    assert_eq!(stack.bus.published_on(SUBJECT_ORDER_PAID).len(), 10);
    assert!(stack.bus.published_on(SUBJECT_ORDER_FAILED).is_empty());
    assert_eq!(worker.stop().await.handled, 10);
}

#[tokio::test]
async fn out_of_range_rates_are_clamped() {
    let stack = Stack::new();
    let generous = stack.billing(3.5).await;
    let id = stack.place("u1").await.order_id;
    assert!(eventually(|| settled(&[&generous]) == 1).await);
    generous.stop().await;
    assert_eq!(stack.status(&id).await, OrderStatus::Paid);

    let stingy = stack.billing(-2.0).await;
    let id = stack.place("u2").await.order_id;
    assert!(eventually(|| settled(&[&stingy]) == 1).await);
    stingy.stop().await;
    assert_eq!(stack.status(&id).await, OrderStatus::Failed);
}

#[tokio::test]
async fn zero_rate_fails_every_order_with_declined_reason() {
    let stack = Stack::new();
    let worker = stack.billing(0.0).await;

    for _ in 0..5 {
        stack.place("u1").await;
    }
    assert!(eventually(|| settled(&[&worker]) == 5).await);

    let failed = stack.bus.published_on(SUBJECT_ORDER_FAILED);
    assert_eq!(failed.len(), 5);
    for message in failed {
        let event = OrderFailed::decode(&message.payload).unwrap();
        assert_eq!(event.reason, "payment declined");
        assert_eq!(stack.status(&event.order_id).await, OrderStatus::Failed);
    }
    assert!(stack.bus.published_on(SUBJECT_ORDER_PAID).is_empty());
}

#[tokio::test]
async fn malformed_created_events_are_dropped() {
    let stack = Stack::new();
    let worker = stack.billing(1.0).await;

    for payload in [
        b"garbage".to_vec(),
        br#"{"order_id":"o-1","total_amount":3.0}"#.to_vec(),
        br#"{"user_id":"u1"}"#.to_vec(),
    ] {
        stack.bus.publish(SUBJECT_ORDER_CREATED, payload).await.unwrap();
    }
    assert!(eventually(|| settled(&[&worker]) == 3).await);

    let stats = worker.stop().await;
    assert_eq!(stats.dropped, 3);
    assert_eq!(stats.handled, 0);
    assert!(stack.bus.published_on(SUBJECT_ORDER_PAID).is_empty());
    assert!(stack.bus.published_on(SUBJECT_ORDER_FAILED).is_empty());
}

#[tokio::test]
async fn deadline_expiry_abandons_before_side_effects() {
    let stack = Stack::new();
    let processor = stack
        .processor(1.0, stack.orders.clone())
        .with_latency(LatencyPolicy::Fixed(Duration::from_millis(300)));
    let worker = stack
        .billing_with(processor, Duration::from_millis(30))
        .await;

    let id = stack.place("u1").await.order_id;
    assert!(eventually(|| settled(&[&worker]) == 1).await);

    let stats = worker.stop().await;
    assert_eq!(stats.timed_out, 1);
    // The handler was still in its latency wait: nothing published, nothing written.
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert!(stack.bus.published_on(SUBJECT_ORDER_PAID).is_empty());
    assert_eq!(stack.status(&id).await, OrderStatus::Pending);
}

#[tokio::test]
async fn competing_members_process_each_order_once() {
    let stack = Stack::new();
    let first = stack.billing(1.0).await;
    let second = stack.billing(1.0).await;

    for _ in 0..12 {
        stack.place("u1").await;
    }
    assert!(eventually(|| settled(&[&first, &second]) == 12).await);

    assert_eq!(stack.bus.published_on(SUBJECT_ORDER_PAID).len(), 12);
    let a = first.stop().await.handled;
    let b = second.stop().await.handled;
    assert_eq!(a + b, 12);
    assert!(a > 0 && b > 0);
}

#[tokio::test]
async fn order_created_before_billing_subscribes_is_lost() {
    let stack = Stack::new();
    let early = stack.place("u1").await.order_id;

    let worker = stack.billing(1.0).await;
    let late = stack.place("u2").await.order_id;
    assert!(eventually(|| settled(&[&worker]) == 1).await);

    assert_eq!(stack.status(&early).await, OrderStatus::Pending);
    assert_eq!(stack.status(&late).await, OrderStatus::Paid);
    assert_eq!(worker.stop().await.handled, 1);
}
