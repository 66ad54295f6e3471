//! File-based RosterRepository implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use battle_core::RosterSnapshot;

use crate::repository::{RepositoryError, Result, RosterRepository};
use crate::session::RunId;

/// File-based implementation of RosterRepository.
///
/// Stores each roster as `roster_{run_id}.json`. Writes go to a temp file
/// first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileRosterRepository {
    base_dir: PathBuf,
}

impl FileRosterRepository {
    /// Create a new file-based roster repository.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    /// Get the path to a roster file.
    fn roster_path(&self, run_id: &RunId) -> Result<PathBuf> {
        let id = run_id.as_str();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(RepositoryError::CorruptedData(format!(
                "run id `{}` is not usable as a file name",
                id
            )));
        }
        Ok(self.base_dir.join(format!("roster_{}.json", id)))
    }
}

#[async_trait]
impl RosterRepository for FileRosterRepository {
    async fn load(&self, run_id: &RunId) -> Result<Option<RosterSnapshot>> {
        let path = self.roster_path(run_id)?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RepositoryError::Io(e)),
        };
        let roster: RosterSnapshot =
            serde_json::from_slice(&bytes).map_err(|e| RepositoryError::Json(e.to_string()))?;

        tracing::debug!("Loaded roster[{}] from {}", run_id, path.display());

        Ok(Some(roster))
    }

    async fn save(&self, roster: &RosterSnapshot) -> Result<()> {
        let run_id = RunId::new(roster.run_id.clone());
        let path = self.roster_path(&run_id)?;
        let temp_path = path.with_extension("json.tmp");

        let bytes =
            serde_json::to_vec_pretty(roster).map_err(|e| RepositoryError::Json(e.to_string()))?;

        // Write to temp file
        tokio::fs::write(&temp_path, bytes).await?;

        // Atomic rename
        tokio::fs::rename(&temp_path, &path).await?;

        tracing::debug!("Saved roster[{}] to {}", run_id, path.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use battle_core::{BaseStats, CombatantId, Side, StatEntity};

    use super::*;

    fn roster(run: &str) -> RosterSnapshot {
        let member = StatEntity::new(CombatantId(1), "Hero", Side::Party, BaseStats::default());
        RosterSnapshot::new(run, vec![member]).with_cards(["focus"])
    }

    #[tokio::test]
    async fn save_then_load_returns_same_roster() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileRosterRepository::new(dir.path()).unwrap();
        let stored = roster("run-1");

        repo.save(&stored).await.unwrap();
        let loaded = repo.load(&RunId::from("run-1")).await.unwrap();

        assert_eq!(loaded, Some(stored));
        assert!(repo.exists(&RunId::from("run-1")).await.unwrap());
    }

    #[tokio::test]
    async fn missing_roster_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileRosterRepository::new(dir.path()).unwrap();
        assert_eq!(repo.load(&RunId::from("nobody")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn path_traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileRosterRepository::new(dir.path()).unwrap();
        let err = repo.load(&RunId::from("../escape")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::CorruptedData(_)));
    }
}
