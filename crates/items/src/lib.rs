//! Catalog items domain module.
//!
//! Business rules for sellable items, implemented as deterministic domain
//! logic (no IO, no HTTP, no storage).

pub mod item;

pub use item::{Item, ItemInput};
