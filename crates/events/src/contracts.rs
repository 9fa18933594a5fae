//! Wire contracts published to the message bus.
//!
//! Field order and presence are part of the contract: consumers deserialize
//! these shapes directly, so fields are never added, removed or reordered
//! without a new event version.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use catalog_core::ItemId;

use crate::Event;

pub const ITEM_CREATED: &str = "catalog.item.created";
pub const ITEM_UPDATED: &str = "catalog.item.updated";
pub const ITEM_DELETED: &str = "catalog.item.deleted";

/// Event: an item was created (snapshot of the committed record).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemCreated {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub price: f64,
}

/// Event: an item's name/description/price changed (post-update values).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdated {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub price: f64,
}

/// Event: an item was removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDeleted {
    pub id: ItemId,
}

/// Every event the catalog emits.
///
/// Serializes as the bare contract (no tag); the variant travels as the
/// envelope's `event_type`. Use [`CatalogEvent::decode`] to read one back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CatalogEvent {
    ItemCreated(ItemCreated),
    ItemUpdated(ItemUpdated),
    ItemDeleted(ItemDeleted),
}

impl CatalogEvent {
    /// Id of the item the event is about.
    pub fn item_id(&self) -> ItemId {
        match self {
            CatalogEvent::ItemCreated(e) => e.id,
            CatalogEvent::ItemUpdated(e) => e.id,
            CatalogEvent::ItemDeleted(e) => e.id,
        }
    }

    /// Rebuild an event from its topic and JSON payload.
    pub fn decode(event_type: &str, payload: JsonValue) -> Result<Self, DecodeError> {
        match event_type {
            ITEM_CREATED => Ok(Self::ItemCreated(serde_json::from_value(payload)?)),
            ITEM_UPDATED => Ok(Self::ItemUpdated(serde_json::from_value(payload)?)),
            ITEM_DELETED => Ok(Self::ItemDeleted(serde_json::from_value(payload)?)),
            other => Err(DecodeError::UnknownType(other.to_string())),
        }
    }
}

impl Event for CatalogEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CatalogEvent::ItemCreated(_) => ITEM_CREATED,
            CatalogEvent::ItemUpdated(_) => ITEM_UPDATED,
            CatalogEvent::ItemDeleted(_) => ITEM_DELETED,
        }
    }

    fn version(&self) -> u32 {
        1
    }
}

impl From<ItemCreated> for CatalogEvent {
    fn from(value: ItemCreated) -> Self {
        Self::ItemCreated(value)
    }
}

impl From<ItemUpdated> for CatalogEvent {
    fn from(value: ItemUpdated) -> Self {
        Self::ItemUpdated(value)
    }
}

impl From<ItemDeleted> for CatalogEvent {
    fn from(value: ItemDeleted) -> Self {
        Self::ItemDeleted(value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unknown event type '{0}'")]
    UnknownType(String),

    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}
