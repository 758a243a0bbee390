//! PostgresOrderStore - orders as JSONB documents in a single Postgres table.
//!
//! Requires the `postgres` feature. The table holds one row per order:
//!
//! ```text
//! order_id  TEXT PRIMARY KEY    -- the uniqueness constraint
//! document  JSONB NOT NULL      -- the full order record
//! ```

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;

use super::{Order, OrderStatus, OrderStore, StoreError};

/// Order store backed by a Postgres JSONB column.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
    table: String,
}

fn unavailable(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

impl PostgresOrderStore {
    /// Connect, then create the table and its uniqueness constraint if missing.
    pub async fn connect(url: &str, table: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(unavailable)?;
        let store = Self::new(pool, table)?;
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Wrap an existing pool. `table` must be a plain identifier.
    pub fn new(pool: PgPool, table: &str) -> Result<Self, StoreError> {
        let valid = !table.is_empty()
            && table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !table.starts_with(|c: char| c.is_ascii_digit());
        if !valid {
            return Err(StoreError::Unavailable(format!(
                "invalid table name {:?}",
                table
            )));
        }
        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (order_id TEXT PRIMARY KEY, document JSONB NOT NULL)",
            self.table
        );
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO {} (order_id, document) VALUES ($1, $2)",
            self.table
        );
        let result = sqlx::query(&sql)
            .bind(&order.order_id)
            .bind(Json(order))
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::DuplicateKey(order.order_id.clone()))
            }
            Err(e) => Err(unavailable(e)),
        }
    }

    async fn get(&self, order_id: &str) -> Result<Option<Order>, StoreError> {
        let sql = format!("SELECT document FROM {} WHERE order_id = $1", self.table);
        let document = sqlx::query_scalar::<_, Json<Order>>(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(document.map(|Json(order)| order))
    }

    async fn update_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Order>, StoreError> {
        // Single statement: the row lock makes this find-and-modify atomic.
        let sql = format!(
            "UPDATE {} SET document = document || jsonb_build_object('status', $2::text, 'updated_at', $3::text) \
             WHERE order_id = $1 RETURNING document",
            self.table
        );
        let document = sqlx::query_scalar::<_, Json<Order>>(&sql)
            .bind(order_id)
            .bind(status.as_str())
            .bind(updated_at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            .fetch_optional(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(document.map(|Json(order)| order))
    }
}
