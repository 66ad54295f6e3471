//! Data-driven battle content and loaders.
//!
//! This crate reads the files that feed an encounter:
//! - Battle configuration (TOML)
//! - Card and relic catalog (RON)
//! - Party rosters and foe groups (RON)
//!
//! All loaders deserialize battle-core types directly through serde.

pub mod loaders;

pub use loaders::{
    CatalogLoader, CombatantTemplate, ConfigLoader, EncounterFile, EncounterLoader, LoadResult,
    RosterFile, RosterLoader,
};
