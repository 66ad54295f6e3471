//! Repository contracts for loading and saving rosters.

use async_trait::async_trait;
use battle_core::RosterSnapshot;

use super::Result;
use crate::session::RunId;

/// Persistence collaborator for party rosters.
///
/// Implementations must be safe to share between battle tasks; the runtime's
/// run-id claim keeps two battles from writing the same roster.
#[async_trait]
pub trait RosterRepository: Send + Sync {
    /// Load the roster for `run_id`, if one is stored.
    async fn load(&self, run_id: &RunId) -> Result<Option<RosterSnapshot>>;

    /// Store `roster` under its own run id, replacing any previous copy.
    async fn save(&self, roster: &RosterSnapshot) -> Result<()>;

    /// Check if a roster exists
    async fn exists(&self, run_id: &RunId) -> Result<bool> {
        Ok(self.load(run_id).await?.is_some())
    }
}
