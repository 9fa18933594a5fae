use std::sync::Arc;

use anyhow::Context;

use catalog_events::{CatalogEvent, EventBus, EventEnvelope, InMemoryEventBus};
use catalog_infra::{
    BusBackend, CatalogService, ChannelEventPublisher, EventPublisher, InMemoryItemStore, ItemStore,
    PostgresItemStore, PublishQueue, PublisherRelay, RedisPubSubEventBus, Settings, StoreBackend,
};

pub type DynCatalogService = CatalogService<Arc<dyn ItemStore>, Arc<dyn EventPublisher>>;

pub type InMemoryCatalogBus = InMemoryEventBus<EventEnvelope<CatalogEvent>>;

/// Everything the handlers need, shared behind an `Arc`.
#[derive(Clone)]
pub struct AppServices {
    catalog: Arc<DynCatalogService>,
}

impl AppServices {
    pub fn new(store: Arc<dyn ItemStore>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            catalog: Arc::new(CatalogService::new(store, publisher)),
        }
    }

    pub fn catalog(&self) -> &DynCatalogService {
        &self.catalog
    }

    /// In-memory store and bus, for local runs and tests.
    ///
    /// The bus is returned so callers can subscribe to delivered envelopes.
    /// Must be called from within a tokio runtime.
    pub fn in_memory(queue_capacity: usize) -> (Self, Arc<InMemoryCatalogBus>) {
        let bus = Arc::new(InMemoryCatalogBus::new());
        let (publisher, queue) = ChannelEventPublisher::bounded(queue_capacity);
        spawn_relay(queue, bus.clone());

        let services = Self::new(Arc::new(InMemoryItemStore::new()), Arc::new(publisher));
        (services, bus)
    }

    pub async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let store: Arc<dyn ItemStore> = match &settings.store {
            StoreBackend::Memory => {
                tracing::info!("item store: in-memory");
                Arc::new(InMemoryItemStore::new())
            }
            StoreBackend::Postgres { database_url } => {
                tracing::info!("item store: postgres");
                let store = PostgresItemStore::connect(database_url)
                    .await
                    .context("failed to connect to postgres")?;
                Arc::new(store)
            }
        };

        let (publisher, queue) = ChannelEventPublisher::bounded(settings.publish_queue_capacity);

        match &settings.bus {
            BusBackend::Memory => {
                tracing::info!("event bus: in-memory");
                let bus = Arc::new(InMemoryCatalogBus::new());
                spawn_event_log(bus.as_ref());
                spawn_relay(queue, bus);
            }
            BusBackend::Redis { url } => {
                tracing::info!("event bus: redis pub/sub");
                let bus = RedisPubSubEventBus::new(url).context("invalid REDIS_URL")?;
                spawn_relay(queue, bus);
            }
        }

        Ok(Self::new(store, Arc::new(publisher)))
    }
}

fn spawn_relay<B>(queue: PublishQueue, bus: B)
where
    B: EventBus<EventEnvelope<CatalogEvent>> + 'static,
{
    // Detached: the relay stops on its own once every publisher is dropped.
    let _ = PublisherRelay::spawn(queue, bus);
}

/// With no external consumers, delivered events are only logged.
fn spawn_event_log(bus: &InMemoryCatalogBus) {
    let sub = bus.subscribe();
    tokio::task::spawn_blocking(move || {
        while let Ok(envelope) = sub.recv() {
            tracing::debug!(
                event_type = envelope.event_type(),
                event_id = %envelope.event_id(),
                item_id = %envelope.payload().item_id(),
                "event delivered"
            );
        }
    });
}
