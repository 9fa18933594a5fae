//! Fire-and-forget event submission.
//!
//! The catalog hands events to an `EventPublisher` after a store mutation has
//! committed. Submission is the only guarantee: once `publish` returns `Ok`,
//! the event is queued for delivery, not delivered. There is no outbox and no
//! compensating action, so a failed submission is a lost notification.

pub mod channel;

use std::sync::Arc;

use thiserror::Error;

use catalog_events::CatalogEvent;

pub use channel::{ChannelEventPublisher, PublishQueue, PublisherRelay, RelayStats};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The delivery queue is at capacity.
    #[error("publish queue is full")]
    QueueFull,

    /// The relay is gone (shut down or crashed).
    #[error("publish queue is closed")]
    Closed,
}

/// Submits domain events for delivery without waiting on the broker.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: CatalogEvent) -> Result<(), PublishError>;
}

impl<P> EventPublisher for Arc<P>
where
    P: EventPublisher + ?Sized,
{
    fn publish(&self, event: CatalogEvent) -> Result<(), PublishError> {
        (**self).publish(event)
    }
}
