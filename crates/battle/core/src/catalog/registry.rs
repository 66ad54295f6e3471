//! Id → entry registry consulted at battle setup.

use core::fmt;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::CatalogKind;
use crate::effects::EffectManager;
use crate::error::{BattleError, ErrorSeverity};
use crate::rewards::RewardCandidate;
use crate::stats::StatEntity;

/// A card or relic the engine can apply to a combatant.
pub trait CatalogEntry: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    fn kind(&self) -> CatalogKind;

    /// Star rating used by the reward resolver.
    fn stars(&self) -> u32;

    /// Applies `stacks` copies of this entry to `entity`.
    ///
    /// Applying again replaces the previous application.
    fn apply(&self, entity: &mut StatEntity, effects: &mut EffectManager, stacks: u32);
}

/// Errors raised by catalog lookups.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown catalog entry `{0}`")]
    UnknownEntry(String),
}

impl BattleError for CatalogError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownEntry(_) => "catalog.unknown_entry",
        }
    }
}

/// Registry resolving catalog ids to entries.
#[derive(Clone, Debug, Default)]
pub struct CatalogRegistry {
    entries: HashMap<String, Arc<dyn CatalogEntry>>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entry, replacing any entry with the same id.
    pub fn register(&mut self, entry: impl CatalogEntry + 'static) {
        self.entries.insert(entry.id().to_string(), Arc::new(entry));
    }

    pub fn get(&self, id: &str) -> Result<&Arc<dyn CatalogEntry>, CatalogError> {
        self.entries
            .get(id)
            .ok_or_else(|| CatalogError::UnknownEntry(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reward candidates of a given kind, sorted by id for stable draws.
    pub fn candidates(&self, kind: CatalogKind) -> Vec<RewardCandidate> {
        let mut candidates: Vec<RewardCandidate> = self
            .entries
            .values()
            .filter(|entry| entry.kind() == kind)
            .map(|entry| RewardCandidate::new(entry.id(), entry.stars()))
            .collect();
        candidates.sort_by(|a, b| a.id.cmp(&b.id));
        candidates
    }

    /// Applies every owned id to `entity`; duplicate ids stack.
    ///
    /// Unknown ids are reported and skipped so one stale save entry cannot
    /// block a battle. Returns the ids that were not found.
    pub fn apply_owned(
        &self,
        entity: &mut StatEntity,
        effects: &mut EffectManager,
        owned: &[String],
    ) -> Vec<CatalogError> {
        let mut stacks: BTreeMap<&str, u32> = BTreeMap::new();
        for id in owned {
            *stacks.entry(id.as_str()).or_insert(0) += 1;
        }

        let mut missing = Vec::new();
        for (id, count) in stacks {
            match self.get(id) {
                Ok(entry) => entry.apply(entity, effects, count),
                Err(error) => {
                    tracing::warn!(
                        target: "battle::catalog",
                        entity = %entity.id,
                        %error,
                        "Skipping unknown catalog entry"
                    );
                    missing.push(error);
                }
            }
        }
        missing
    }
}
