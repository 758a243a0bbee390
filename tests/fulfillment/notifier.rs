//! Notifier behind its two queue-group workers.

use chrono::Utc;
use order_fulfillment::events::{
    EventPayload, OrderCreated, OrderFailed, OrderPaid, SUBJECT_ORDER_FAILED, SUBJECT_ORDER_PAID,
};
use order_fulfillment::{OrderStatus, Publisher};

use crate::support::{eventually, settled, Stack};

fn created_for(order: &order_fulfillment::Order) -> OrderCreated {
    OrderCreated::new(
        order.order_id.clone(),
        order.user_id.clone(),
        order.total_amount,
        order.created_at,
    )
}

#[tokio::test]
async fn outcome_events_update_and_notify() {
    let stack = Stack::new();
    let (workers, sink) = stack.notification().await;
    assert_eq!(workers.len(), 2);

    let paid_order = stack.place("u1").await;
    let failed_order = stack.place("u2").await;

    let paid = OrderPaid::for_order(&created_for(&paid_order), Utc::now());
    let failed = OrderFailed::declined(&created_for(&failed_order), Utc::now());
    stack
        .bus
        .publish(SUBJECT_ORDER_PAID, paid.encode().unwrap())
        .await
        .unwrap();
    stack
        .bus
        .publish(SUBJECT_ORDER_FAILED, failed.encode().unwrap())
        .await
        .unwrap();

    assert!(eventually(|| sink.lines().len() == 2).await);
    assert_eq!(stack.status(&paid_order.order_id).await, OrderStatus::Paid);
    assert_eq!(stack.status(&failed_order.order_id).await, OrderStatus::Failed);

    let lines = sink.lines();
    assert!(lines.iter().any(|l| l.contains(&paid_order.order_id) && l.contains("paid")));
    assert!(lines
        .iter()
        .any(|l| l.contains(&failed_order.order_id) && l.contains("payment declined")));
}

#[tokio::test]
async fn outcome_overwrites_any_previous_status() {
    let stack = Stack::new();
    let (workers, sink) = stack.notification().await;
    let order = stack.place("u1").await;
    stack
        .orders
        .update_status(&order.order_id, OrderStatus::Cancelled)
        .await
        .unwrap();

    let paid = OrderPaid::for_order(&created_for(&order), Utc::now());
    stack
        .bus
        .publish(SUBJECT_ORDER_PAID, paid.encode().unwrap())
        .await
        .unwrap();

    assert!(eventually(|| sink.lines().len() == 1).await);
    assert_eq!(stack.status(&order.order_id).await, OrderStatus::Paid);
    drop(workers);
}

#[tokio::test]
async fn bad_outcome_events_are_dropped_without_notifying() {
    let stack = Stack::new();
    let (workers, sink) = stack.notification().await;
    let order = stack.place("u1").await;

    stack
        .bus
        .publish(SUBJECT_ORDER_PAID, b"}{".to_vec())
        .await
        .unwrap();
    stack
        .bus
        .publish(SUBJECT_ORDER_FAILED, br#"{"reason":"payment declined"}"#.to_vec())
        .await
        .unwrap();
    let ghost = OrderCreated::new("ghost", "u9", 1.0, Utc::now());
    stack
        .bus
        .publish(
            SUBJECT_ORDER_PAID,
            OrderPaid::for_order(&ghost, Utc::now()).encode().unwrap(),
        )
        .await
        .unwrap();

    let all: Vec<_> = workers.iter().collect();
    assert!(eventually(|| settled(&all) == 3).await);

    let dropped: usize = workers.iter().map(|w| w.stats().dropped).sum();
    assert_eq!(dropped, 3);
    assert!(sink.lines().is_empty());
    assert_eq!(stack.status(&order.order_id).await, OrderStatus::Pending);
}

#[tokio::test]
async fn stopped_notifier_leaves_the_group() {
    let stack = Stack::new();
    let (workers, sink) = stack.notification().await;
    assert_eq!(stack.bus.subscriber_count(SUBJECT_ORDER_PAID), 1);

    stack.shutdown.cancel();
    for worker in workers {
        worker.stop().await;
    }
    assert_eq!(stack.bus.subscriber_count(SUBJECT_ORDER_PAID), 0);
    assert_eq!(stack.bus.subscriber_count(SUBJECT_ORDER_FAILED), 0);

    let order = stack.place("u1").await;
    let paid = OrderPaid::for_order(&created_for(&order), Utc::now());
    stack
        .bus
        .publish(SUBJECT_ORDER_PAID, paid.encode().unwrap())
        .await
        .unwrap();
    assert!(sink.lines().is_empty());
    assert_eq!(stack.status(&order.order_id).await, OrderStatus::Pending);
}
