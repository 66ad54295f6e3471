//! Encounter input and outcome types.

use std::fmt;
use std::sync::Arc;

use battle_core::{
    CombatantId, EncounterTier, ItemReward, RewardBundle, RewardPool, StatEntity,
};
use serde::{Deserialize, Serialize};

use crate::events::ProgressSnapshot;
use crate::session::RunId;

/// Callback invoked with a snapshot after every state-changing step.
pub type ProgressCallback = Arc<dyn Fn(&ProgressSnapshot) + Send + Sync>;

/// Room metadata that shapes enrage and loot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterMeta {
    pub tier: EncounterTier,
    pub loop_count: u32,
    /// Overrides the tier's configured enrage threshold.
    pub enrage_threshold: Option<u32>,
}

impl EncounterMeta {
    pub fn new(tier: EncounterTier) -> Self {
        Self {
            tier,
            loop_count: 1,
            enrage_threshold: None,
        }
    }

    pub fn with_loop(mut self, loop_count: u32) -> Self {
        self.loop_count = loop_count.max(1);
        self
    }

    pub fn with_enrage_threshold(mut self, threshold: u32) -> Self {
        self.enrage_threshold = Some(threshold);
        self
    }
}

impl Default for EncounterMeta {
    fn default() -> Self {
        Self::new(EncounterTier::Normal)
    }
}

/// Everything the turn loop needs to run one encounter.
#[derive(Clone)]
pub struct EncounterInput {
    pub run_id: RunId,
    pub party: Vec<StatEntity>,
    pub foes: Vec<StatEntity>,
    pub meta: EncounterMeta,
    /// Persistent rare-drop-rate; per-kill credit is added during the battle.
    pub rare_drop_rate: f64,
    pub reward_pool: RewardPool,
    pub progress: Option<ProgressCallback>,
}

impl EncounterInput {
    pub fn new(run_id: impl Into<RunId>, party: Vec<StatEntity>, foes: Vec<StatEntity>) -> Self {
        Self {
            run_id: run_id.into(),
            party,
            foes,
            meta: EncounterMeta::default(),
            rare_drop_rate: 1.0,
            reward_pool: RewardPool::default(),
            progress: None,
        }
    }

    pub fn with_meta(mut self, meta: EncounterMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_rare_drop_rate(mut self, rdr: f64) -> Self {
        self.rare_drop_rate = rdr;
        self
    }

    pub fn with_reward_pool(mut self, pool: RewardPool) -> Self {
        self.reward_pool = pool;
        self
    }

    pub fn with_progress(mut self, callback: impl Fn(&ProgressSnapshot) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for EncounterInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncounterInput")
            .field("run_id", &self.run_id)
            .field("party", &self.party.len())
            .field("foes", &self.foes.len())
            .field("meta", &self.meta)
            .field("rare_drop_rate", &self.rare_drop_rate)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Result of a finished encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleOutcome {
    pub victory: bool,
    pub turns_taken: u32,
    pub gold: u64,
    pub experience: u64,
    pub cards: Vec<String>,
    pub relics: Vec<String>,
    pub items: Vec<ItemReward>,
    pub survivors: Vec<CombatantId>,
    pub final_party_hp: Vec<(CombatantId, u64)>,
    /// Rare-drop-rate after per-kill credit.
    pub rare_drop_rate: f64,
    pub enrage_stacks: u32,
    /// Party members after battle, effects cleared; used for roster write-back.
    #[serde(skip)]
    pub party: Vec<StatEntity>,
}

impl BattleOutcome {
    pub fn rewards(&self) -> RewardBundle {
        RewardBundle {
            gold: self.gold,
            experience: self.experience,
            cards: self.cards.clone(),
            relics: self.relics.clone(),
            items: self.items.clone(),
        }
    }
}
