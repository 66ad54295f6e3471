//! Capability interfaces for catalog content.
//!
//! Cards, relics and damage types are data, not engine behavior. The engine
//! only sees them through the traits defined here, resolved once per entity
//! at battle setup:
//! - [`CatalogEntry`]: applies a card or relic to a stat entity
//! - [`DamageTypeStrategy`]: hooks a combatant's element into damage resolution

mod entry;
mod registry;
mod strategy;

pub use entry::{CatalogKind, StatBonusEntry};
pub use registry::{CatalogEntry, CatalogError, CatalogRegistry};
pub use strategy::{DamageKind, DamageTypeStrategy, OnHit, Ultimate};
