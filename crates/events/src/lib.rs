//! Catalog domain events: wire contracts, envelopes and bus mechanics.
//!
//! Downstream services (inventory, pricing, trading) depend on the
//! `contracts` module only; everything else is transport plumbing.

pub mod bus;
pub mod contracts;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use contracts::{CatalogEvent, DecodeError, ItemCreated, ItemDeleted, ItemUpdated};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
