//! Card and relic catalog loader.

use std::path::Path;

use battle_core::{CatalogRegistry, StatBonusEntry};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub entries: Vec<StatBonusEntry>,
}

/// Loader for the card/relic catalog from RON files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load catalog entries from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<StatBonusEntry>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<StatBonusEntry>> {
        let catalog: CatalogFile = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse catalog RON: {}", e))?;

        let mut seen = std::collections::HashSet::new();
        for entry in &catalog.entries {
            if !seen.insert(entry.id.as_str()) {
                anyhow::bail!("Duplicate catalog id `{}`", entry.id);
            }
        }

        Ok(catalog.entries)
    }

    /// Load a catalog file straight into a registry.
    pub fn load_registry(path: &Path) -> LoadResult<CatalogRegistry> {
        let mut registry = CatalogRegistry::new();
        for entry in Self::load(path)? {
            registry.register(entry);
        }
        tracing::debug!(target: "content::catalog", entries = registry.len(), path = %path.display(), "Catalog loaded");
        Ok(registry)
    }
}
