use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::RwLock;

use async_trait::async_trait;

use catalog_core::ItemId;
use catalog_items::Item;

use super::{ItemStore, StoreError};

/// In-memory item store.
///
/// Intended for tests/dev. Last write wins; there is no versioning.
#[derive(Debug, Default)]
pub struct InMemoryItemStore {
    items: RwLock<HashMap<ItemId, Item>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn get_by_id(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.get(&id).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Item>, StoreError> {
        let items = self.items.read().map_err(|_| poisoned())?;
        Ok(items.values().cloned().collect())
    }

    async fn create(&self, item: &Item) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        match items.entry(item.id()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(item.id())),
            Entry::Vacant(slot) => {
                slot.insert(item.clone());
                Ok(())
            }
        }
    }

    async fn update(&self, item: &Item) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        match items.get_mut(&item.id()) {
            Some(existing) => {
                *existing = item.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(item.id())),
        }
    }

    async fn remove(&self, id: ItemId) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|_| poisoned())?;
        items.remove(&id).map(|_| ()).ok_or(StoreError::NotFound(id))
    }
}
