use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use battle_core::RosterSnapshot;

use crate::repository::{RepositoryError, Result, RosterRepository};
use crate::session::RunId;

/// In-memory implementation of RosterRepository
#[derive(Debug, Default)]
pub struct InMemoryRosterRepository {
    rosters: RwLock<HashMap<RunId, RosterSnapshot>>,
}

impl InMemoryRosterRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository holding `rosters`.
    pub fn with_rosters(rosters: impl IntoIterator<Item = RosterSnapshot>) -> Self {
        let rosters = rosters
            .into_iter()
            .map(|roster| (RunId::new(roster.run_id.clone()), roster))
            .collect();
        Self {
            rosters: RwLock::new(rosters),
        }
    }
}

#[async_trait]
impl RosterRepository for InMemoryRosterRepository {
    async fn load(&self, run_id: &RunId) -> Result<Option<RosterSnapshot>> {
        let rosters = self
            .rosters
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(rosters.get(run_id).cloned())
    }

    async fn save(&self, roster: &RosterSnapshot) -> Result<()> {
        let mut rosters = self
            .rosters
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        rosters.insert(RunId::new(roster.run_id.clone()), roster.clone());
        Ok(())
    }
}
