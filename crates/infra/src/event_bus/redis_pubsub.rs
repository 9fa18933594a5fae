//! Redis pub/sub-backed catalog event bus (optional).
//!
//! Each envelope is published as JSON on a channel named after its event type
//! (`catalog.item.created`, ...). Redis pub/sub is not durable: subscribers
//! that are offline miss messages.

use std::sync::mpsc;
use std::thread;

use redis::Commands;
use serde_json::Value as JsonValue;

use catalog_events::{CatalogEvent, EventBus, EventEnvelope, Subscription};

use super::CATALOG_CHANNEL_PATTERN;

#[derive(Debug, thiserror::Error)]
pub enum RedisBusError {
    #[error("redis: {0}")]
    Redis(String),

    #[error("serialize: {0}")]
    Serialize(String),
}

/// Redis pub/sub bus for catalog event envelopes.
#[derive(Debug, Clone)]
pub struct RedisPubSubEventBus {
    client: redis::Client,
}

impl RedisPubSubEventBus {
    pub fn new(redis_url: impl AsRef<str>) -> Result<Self, RedisBusError> {
        let client =
            redis::Client::open(redis_url.as_ref()).map_err(|e| RedisBusError::Redis(e.to_string()))?;
        Ok(Self { client })
    }
}

/// Rebuild a typed envelope from its wire form. `None` for foreign topics or
/// payloads that don't match their contract.
fn decode_envelope(raw: &str) -> Option<EventEnvelope<CatalogEvent>> {
    let envelope: EventEnvelope<JsonValue> = serde_json::from_str(raw).ok()?;
    let event_type = envelope.event_type().to_string();
    let payload = envelope.payload().clone();
    match CatalogEvent::decode(&event_type, payload) {
        Ok(event) => Some(envelope.map(|_| event)),
        Err(e) => {
            tracing::debug!(%event_type, error = %e, "skipping undecodable message");
            None
        }
    }
}

impl EventBus<EventEnvelope<CatalogEvent>> for RedisPubSubEventBus {
    type Error = RedisBusError;

    fn publish(&self, message: EventEnvelope<CatalogEvent>) -> Result<(), Self::Error> {
        let payload =
            serde_json::to_string(&message).map_err(|e| RedisBusError::Serialize(e.to_string()))?;

        let mut conn = self
            .client
            .get_connection()
            .map_err(|e| RedisBusError::Redis(e.to_string()))?;

        let _: i64 = conn
            .publish(message.event_type(), payload)
            .map_err(|e| RedisBusError::Redis(e.to_string()))?;

        Ok(())
    }

    fn subscribe(&self) -> Subscription<EventEnvelope<CatalogEvent>> {
        let (tx, rx) = mpsc::channel();
        let client = self.client.clone();

        // Forwarding thread; exits when the subscriber drops or the connection fails.
        thread::spawn(move || {
            let mut conn = match client.get_connection() {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!(error = %e, "redis subscribe: connection failed");
                    return;
                }
            };

            let mut pubsub = conn.as_pubsub();
            if let Err(e) = pubsub.psubscribe(CATALOG_CHANNEL_PATTERN) {
                tracing::warn!(error = %e, "redis subscribe: psubscribe failed");
                return;
            }

            loop {
                let msg = match pubsub.get_message() {
                    Ok(m) => m,
                    Err(_) => return,
                };

                let raw: String = match msg.get_payload() {
                    Ok(p) => p,
                    Err(_) => continue,
                };

                let Some(envelope) = decode_envelope(&raw) else {
                    continue;
                };

                if tx.send(envelope).is_err() {
                    return;
                }
            }
        });

        Subscription::new(rx)
    }
}
