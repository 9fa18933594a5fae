use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::ItemId;
use catalog_items::{Item, ItemInput};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
}

impl From<CreateItemRequest> for ItemInput {
    fn from(body: CreateItemRequest) -> Self {
        ItemInput::new(body.name, body.description, body.price)
    }
}

impl From<UpdateItemRequest> for ItemInput {
    fn from(body: UpdateItemRequest) -> Self {
        ItemInput::new(body.name, body.description, body.price)
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub created_date: DateTime<Utc>,
}

impl From<&Item> for ItemDto {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id(),
            name: item.name().to_string(),
            description: item.description().to_string(),
            price: item.price(),
            created_date: item.created_date(),
        }
    }
}
