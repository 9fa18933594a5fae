//! Channel-backed publisher and its relay.
//!
//! ```text
//! CatalogService ──publish──▶ [bounded mpsc] ──relay (blocking task)──▶ EventBus
//! ```
//!
//! The service only pays for a `try_send`. The relay runs on the blocking
//! pool because bus clients (Redis) are synchronous.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

use catalog_events::{CatalogEvent, EventBus, EventEnvelope};

use super::{EventPublisher, PublishError};

/// Publisher that enqueues envelopes for a [`PublisherRelay`].
#[derive(Debug, Clone)]
pub struct ChannelEventPublisher {
    tx: mpsc::Sender<EventEnvelope<CatalogEvent>>,
}

/// Receiving half handed to the relay.
#[derive(Debug)]
pub struct PublishQueue {
    rx: mpsc::Receiver<EventEnvelope<CatalogEvent>>,
}

impl ChannelEventPublisher {
    /// Create a publisher and the queue it feeds. `capacity` must be > 0.
    pub fn bounded(capacity: usize) -> (Self, PublishQueue) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, PublishQueue { rx })
    }
}

impl EventPublisher for ChannelEventPublisher {
    fn publish(&self, event: CatalogEvent) -> Result<(), PublishError> {
        self.tx
            .try_send(EventEnvelope::wrap(event))
            .map_err(|e| match e {
                TrySendError::Full(_) => PublishError::QueueFull,
                TrySendError::Closed(_) => PublishError::Closed,
            })
    }
}

/// Drains a [`PublishQueue`] onto an [`EventBus`].
///
/// Bus failures are logged and the envelope is dropped. The relay stops once
/// every publisher handle has been dropped and the queue is empty.
pub struct PublisherRelay;

impl PublisherRelay {
    /// Must be called from within a tokio runtime.
    pub fn spawn<B>(queue: PublishQueue, bus: B) -> JoinHandle<RelayStats>
    where
        B: EventBus<EventEnvelope<CatalogEvent>> + 'static,
    {
        let PublishQueue { mut rx } = queue;
        tokio::task::spawn_blocking(move || {
            let mut stats = RelayStats::default();
            while let Some(envelope) = rx.blocking_recv() {
                let event_type = envelope.event_type().to_string();
                let item_id = envelope.payload().item_id();
                match bus.publish(envelope) {
                    Ok(()) => {
                        stats.delivered += 1;
                        tracing::debug!(%event_type, %item_id, "event handed to bus");
                    }
                    Err(e) => {
                        stats.dropped += 1;
                        tracing::warn!(%event_type, %item_id, error = ?e, "bus publish failed; notification lost");
                    }
                }
            }
            tracing::info!(delivered = stats.delivered, dropped = stats.dropped, "publisher relay stopped");
            stats
        })
    }
}

/// Counters reported when the relay stops.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RelayStats {
    pub delivered: u64,
    pub dropped: u64,
}
