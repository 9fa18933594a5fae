//! Catalog orchestration: authorize, touch the store, then notify.
//!
//! ```text
//! caller ─▶ authorize(policy) ─▶ ItemStore (commit) ─▶ EventPublisher (submit)
//! ```
//!
//! Mutation and notification are two independent steps. A publish failure
//! after the store committed is logged and swallowed: the request succeeds
//! and consumers miss one notification.

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use catalog_auth::{AuthzError, Policy, Principal, authorize, explain};
use catalog_core::{DomainError, ItemId};
use catalog_events::{CatalogEvent, Event};
use catalog_items::{Item, ItemInput};

use crate::item_store::{ItemStore, StoreError};
use crate::publisher::EventPublisher;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ServiceError {
    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error("item {0} not found")]
    NotFound(ItemId),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => ServiceError::NotFound(id),
            other => ServiceError::Store(other),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) | DomainError::InvalidId(msg) => ServiceError::Validation(msg),
        }
    }
}

/// Item use cases behind the HTTP surface.
#[derive(Debug, Clone)]
pub struct CatalogService<S, P> {
    store: S,
    publisher: P,
}

impl<S, P> CatalogService<S, P>
where
    S: ItemStore,
    P: EventPublisher,
{
    pub fn new(store: S, publisher: P) -> Self {
        Self { store, publisher }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    #[instrument(name = "catalog.list_items", skip_all, fields(subject = %caller.subject()))]
    pub async fn list_items(&self, caller: &Principal) -> Result<Vec<Item>, ServiceError> {
        guard(caller, Policy::ReadOrAdmin)?;
        Ok(self.store.get_all().await?)
    }

    #[instrument(name = "catalog.get_item", skip_all, fields(subject = %caller.subject(), item_id = %id))]
    pub async fn get_item(&self, caller: &Principal, id: ItemId) -> Result<Item, ServiceError> {
        guard(caller, Policy::ReadOrAdmin)?;
        self.store.get_by_id(id).await?.ok_or(ServiceError::NotFound(id))
    }

    /// Persist a new item and announce it with the values read back from the
    /// store. Nothing is published when the read-back comes up empty.
    #[instrument(
        name = "catalog.create_item",
        skip_all,
        fields(subject = %caller.subject(), item_id = tracing::field::Empty)
    )]
    pub async fn create_item(&self, caller: &Principal, input: ItemInput) -> Result<Item, ServiceError> {
        guard(caller, Policy::Write)?;

        let item = Item::create(input, Utc::now())?;
        let id = item.id();
        tracing::Span::current().record("item_id", tracing::field::display(id));

        self.store.create(&item).await?;

        let stored = self.store.get_by_id(id).await?.ok_or_else(|| {
            tracing::warn!(%id, "created item could not be read back");
            ServiceError::NotFound(id)
        })?;

        self.notify(stored.created_event().into());
        tracing::info!(%id, "item created");
        Ok(stored)
    }

    /// Overwrite name, description and price. Id and creation date stay put.
    #[instrument(name = "catalog.update_item", skip_all, fields(subject = %caller.subject(), item_id = %id))]
    pub async fn update_item(&self, caller: &Principal, id: ItemId, input: ItemInput) -> Result<(), ServiceError> {
        guard(caller, Policy::Write)?;
        input.validate()?;

        let mut item = self.store.get_by_id(id).await?.ok_or(ServiceError::NotFound(id))?;
        item.apply_update(input)?;
        self.store.update(&item).await?;

        self.notify(item.updated_event().into());
        tracing::info!(%id, "item updated");
        Ok(())
    }

    #[instrument(name = "catalog.delete_item", skip_all, fields(subject = %caller.subject(), item_id = %id))]
    pub async fn delete_item(&self, caller: &Principal, id: ItemId) -> Result<(), ServiceError> {
        guard(caller, Policy::Write)?;

        let item = self.store.get_by_id(id).await?.ok_or(ServiceError::NotFound(id))?;
        let deleted = item.deleted_event();
        self.store.remove(item.id()).await?;

        self.notify(deleted.into());
        tracing::info!(%id, "item deleted");
        Ok(())
    }

    fn notify(&self, event: CatalogEvent) {
        let event_type = event.event_type();
        let item_id = event.item_id();
        if let Err(e) = self.publisher.publish(event) {
            tracing::warn!(event_type, %item_id, error = %e, "event not submitted; notification lost");
        }
    }
}

fn guard(caller: &Principal, policy: Policy) -> Result<(), ServiceError> {
    authorize(caller, policy).map_err(|e| {
        let explanation = explain(caller, policy);
        tracing::info!(
            policy = %policy,
            subject = %explanation.subject,
            reason = %explanation.reason,
            "authorization denied"
        );
        ServiceError::from(e)
    })
}
