//! Persisted item records.
//!
//! `ItemStore` is the narrow boundary the catalog uses to reach its storage
//! engine. Backends decide how records are kept (map, table, document); the
//! catalog only relies on the five operations below. Failures are surfaced
//! to the caller and never retried here.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use catalog_core::ItemId;
use catalog_items::Item;

pub use in_memory::InMemoryItemStore;
pub use postgres::PostgresItemStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// `update`/`remove` targeted an id with no live record.
    #[error("item {0} not found")]
    NotFound(ItemId),

    /// `create` targeted an id that is already taken.
    #[error("item {0} already exists")]
    Conflict(ItemId),

    /// Transient backend failure (connection, timeout, lock poisoning).
    #[error("storage backend failure: {0}")]
    Backend(String),
}

#[async_trait]
pub trait ItemStore: Send + Sync {
    /// `Ok(None)` when no live item has this id.
    async fn get_by_id(&self, id: ItemId) -> Result<Option<Item>, StoreError>;

    /// Every live item, in no particular order.
    async fn get_all(&self) -> Result<Vec<Item>, StoreError>;

    async fn create(&self, item: &Item) -> Result<(), StoreError>;

    /// Replace the record with the same id; it must already exist.
    async fn update(&self, item: &Item) -> Result<(), StoreError>;

    async fn remove(&self, id: ItemId) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> ItemStore for Arc<S>
where
    S: ItemStore + ?Sized,
{
    async fn get_by_id(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        (**self).get_by_id(id).await
    }

    async fn get_all(&self) -> Result<Vec<Item>, StoreError> {
        (**self).get_all().await
    }

    async fn create(&self, item: &Item) -> Result<(), StoreError> {
        (**self).create(item).await
    }

    async fn update(&self, item: &Item) -> Result<(), StoreError> {
        (**self).update(item).await
    }

    async fn remove(&self, id: ItemId) -> Result<(), StoreError> {
        (**self).remove(id).await
    }
}
