//! Postgres document store against a live database.
//!
//! Runs only with `--features postgres` and `ORDER_FULFILLMENT_TEST_POSTGRES_URL`
//! set; otherwise each test returns early. Every test uses its own table.

#![cfg(feature = "postgres")]

use std::env;

use chrono::{Duration, Utc};
use order_fulfillment::order::PostgresOrderStore;
use order_fulfillment::{NewOrder, Order, OrderStatus, OrderStore, StoreError};
use sqlx::postgres::PgPoolOptions;

fn postgres_url() -> Option<String> {
    env::var("ORDER_FULFILLMENT_TEST_POSTGRES_URL")
        .ok()
        .filter(|value| !value.trim().is_empty())
}

async fn store() -> Option<(PostgresOrderStore, String)> {
    let url = postgres_url()?;
    let table = format!("orders_test_{}", uuid::Uuid::new_v4().simple());
    let store = PostgresOrderStore::connect(&url, &table)
        .await
        .expect("should connect to postgres");
    Some((store, table))
}

async fn drop_table(table: &str) {
    let Some(url) = postgres_url() else { return };
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .expect("should connect to postgres for cleanup");
    sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
        .execute(&pool)
        .await
        .expect("should drop test table");
}

fn order(id: &str) -> Order {
    Order::place(id, NewOrder::new("u1").item("p1", 2, 10.0), Utc::now())
}

#[tokio::test]
async fn second_insert_of_same_id_is_duplicate_key() {
    let Some((store, table)) = store().await else { return };

    store.insert(&order("o-1")).await.unwrap();
    let err = store.insert(&order("o-1")).await.unwrap_err();
    assert!(matches!(err, StoreError::DuplicateKey(id) if id == "o-1"));

    drop_table(&table).await;
}

#[tokio::test]
async fn update_returns_merged_post_image() {
    let Some((store, table)) = store().await else { return };

    let original = order("o-1");
    store.insert(&original).await.unwrap();

    let later = original.created_at + Duration::seconds(5);
    let updated = store
        .update_status("o-1", OrderStatus::Paid, later)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.status, OrderStatus::Paid);
    assert_eq!(updated.updated_at, later);
    assert_eq!(updated.created_at, original.created_at);
    assert_eq!(updated.items, original.items);
    assert_eq!(updated.total_amount, original.total_amount);
    assert_eq!(store.get("o-1").await.unwrap().unwrap(), updated);

    drop_table(&table).await;
}

#[tokio::test]
async fn update_of_missing_order_creates_nothing() {
    let Some((store, table)) = store().await else { return };

    let result = store
        .update_status("ghost", OrderStatus::Paid, Utc::now())
        .await
        .unwrap();
    assert!(result.is_none());
    assert!(store.get("ghost").await.unwrap().is_none());

    drop_table(&table).await;
}
