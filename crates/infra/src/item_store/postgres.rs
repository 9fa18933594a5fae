//! Postgres-backed item store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL code | StoreError |
//! |------------|-----------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | any | `Backend` |
//! | PoolClosed / PoolTimedOut / Io / other | n/a | `Backend` |
//!
//! No retries happen here; retry policy belongs to the pool configuration.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use catalog_core::ItemId;
use catalog_items::Item;

use super::{ItemStore, StoreError};

const UNIQUE_VIOLATION: &str = "23505";

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS items (
    id           UUID PRIMARY KEY,
    name         TEXT NOT NULL,
    description  TEXT NOT NULL,
    price        DOUBLE PRECISION NOT NULL,
    created_date TIMESTAMPTZ NOT NULL
)
"#;

/// Item store over a single `items` table.
#[derive(Debug, Clone)]
pub struct PostgresItemStore {
    pool: Arc<PgPool>,
}

impl PostgresItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Connect and make sure the `items` table exists.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }
}

fn row_to_item(row: &PgRow) -> Result<Item, sqlx::Error> {
    let id: Uuid = row.try_get("id")?;
    let name: String = row.try_get("name")?;
    let description: String = row.try_get("description")?;
    let price: f64 = row.try_get("price")?;
    let created_date: DateTime<Utc> = row.try_get("created_date")?;

    Ok(Item::restore(
        ItemId::from_uuid(id),
        name,
        description,
        price,
        created_date,
    ))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    StoreError::Backend(format!("{operation}: {err}"))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

#[async_trait]
impl ItemStore for PostgresItemStore {
    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn get_by_id(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, description, price, created_date FROM items WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_by_id", e))?;

        row.as_ref()
            .map(row_to_item)
            .transpose()
            .map_err(|e| map_sqlx_error("get_by_id", e))
    }

    #[instrument(skip(self), err)]
    async fn get_all(&self) -> Result<Vec<Item>, StoreError> {
        let rows = sqlx::query("SELECT id, name, description, price, created_date FROM items")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_all", e))?;

        rows.iter()
            .map(row_to_item)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("get_all", e))
    }

    #[instrument(skip(self, item), fields(item_id = %item.id()), err)]
    async fn create(&self, item: &Item) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO items (id, name, description, price, created_date) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(item.id().as_uuid())
        .bind(item.name())
        .bind(item.description())
        .bind(item.price())
        .bind(item.created_date())
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Conflict(item.id())
            } else {
                map_sqlx_error("create", e)
            }
        })?;
        Ok(())
    }

    #[instrument(skip(self, item), fields(item_id = %item.id()), err)]
    async fn update(&self, item: &Item) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE items SET name = $2, description = $3, price = $4 WHERE id = $1",
        )
        .bind(item.id().as_uuid())
        .bind(item.name())
        .bind(item.description())
        .bind(item.price())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(item.id()));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(item_id = %id), err)]
    async fn remove(&self, id: ItemId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
