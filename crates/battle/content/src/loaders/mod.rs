//! Content loaders for reading battle data from files.

pub mod catalog;
pub mod combatants;
pub mod config;

pub use catalog::CatalogLoader;
pub use combatants::{CombatantTemplate, EncounterFile, EncounterLoader, RosterFile, RosterLoader};
pub use config::ConfigLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
