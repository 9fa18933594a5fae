//! Infrastructure layer: item storage, event delivery, configuration, and
//! the catalog orchestration service that ties them together.

pub mod catalog_service;
pub mod config;
pub mod event_bus;
pub mod item_store;
pub mod publisher;

pub use catalog_service::{CatalogService, ServiceError};
pub use config::{BusBackend, ConfigError, Settings, StoreBackend};
#[cfg(feature = "redis")]
pub use event_bus::{RedisBusError, RedisPubSubEventBus};
pub use item_store::{InMemoryItemStore, ItemStore, PostgresItemStore, StoreError};
pub use publisher::{
    ChannelEventPublisher, EventPublisher, PublishError, PublishQueue, PublisherRelay, RelayStats,
};
