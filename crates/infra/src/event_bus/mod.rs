//! Infrastructure-backed event bus implementations.
//!
//! The bus abstraction itself lives in `catalog-events`; this module adds the
//! broker-backed transports.

#[cfg(feature = "redis")]
pub mod redis_pubsub;

#[cfg(feature = "redis")]
pub use redis_pubsub::{RedisBusError, RedisPubSubEventBus};

/// Channel pattern matching every catalog item topic.
pub const CATALOG_CHANNEL_PATTERN: &str = "catalog.item.*";
