use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult, ItemId};
use catalog_events::{ItemCreated, ItemDeleted, ItemUpdated};

/// Caller-supplied fields for creating or replacing an item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInput {
    pub name: String,
    pub description: String,
    pub price: f64,
}

impl ItemInput {
    pub fn new(name: impl Into<String>, description: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
        }
    }

    /// Reject inputs no catalog entry should carry.
    ///
    /// - `name` must contain a non-whitespace character
    /// - `price` must be finite and non-negative
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if !self.price.is_finite() {
            return Err(DomainError::validation("price must be a finite number"));
        }
        if self.price < 0.0 {
            return Err(DomainError::validation("price cannot be negative"));
        }
        Ok(())
    }
}

/// A sellable catalog item.
///
/// `id` and `created_date` are fixed at creation; only `name`, `description`
/// and `price` change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    name: String,
    description: String,
    price: f64,
    created_date: DateTime<Utc>,
}

impl Item {
    /// Build a brand-new item with a freshly generated id.
    pub fn create(input: ItemInput, now: DateTime<Utc>) -> DomainResult<Self> {
        input.validate()?;
        Ok(Self::with_id(ItemId::new(), input, now))
    }

    /// Rebuild an item from stored fields (no validation).
    pub fn restore(
        id: ItemId,
        name: String,
        description: String,
        price: f64,
        created_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            price,
            created_date,
        }
    }

    fn with_id(id: ItemId, input: ItemInput, created_date: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            description: input.description,
            price: input.price,
            created_date,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    /// Overwrite the mutable fields in place.
    pub fn apply_update(&mut self, input: ItemInput) -> DomainResult<()> {
        input.validate()?;
        self.name = input.name;
        self.description = input.description;
        self.price = input.price;
        Ok(())
    }

    pub fn created_event(&self) -> ItemCreated {
        ItemCreated {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
        }
    }

    pub fn updated_event(&self) -> ItemUpdated {
        ItemUpdated {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
        }
    }

    pub fn deleted_event(&self) -> ItemDeleted {
        ItemDeleted { id: self.id }
    }
}
