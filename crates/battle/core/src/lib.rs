//! Deterministic combat rules shared by the runtime and offline tools.
//!
//! `battle-core` defines the canonical encounter mechanics (stat entities,
//! effects, turn ordering, damage math, enrage escalation and loot) and
//! exposes synchronous APIs free of I/O. The async turn loop that drives
//! these pieces lives in the runtime crate; every random draw is taken from
//! a caller-supplied [`rand::Rng`] so a fixed seed reproduces a battle.
pub mod catalog;
pub mod combat;
pub mod config;
pub mod effects;
pub mod engine;
pub mod error;
pub mod rewards;
pub mod roster;
pub mod stats;

pub use catalog::{
    CatalogEntry, CatalogError, CatalogKind, CatalogRegistry, DamageKind, DamageTypeStrategy,
    OnHit, StatBonusEntry, Ultimate,
};
pub use combat::{DamageOutcome, HealOutcome, apply_damage, apply_healing, mitigate};
pub use config::{BattleConfig, DiminishingRule, DiminishingTable};
pub use effects::{DamageOverTime, EffectManager, HealOverTime, StatModifier, TickReport};
pub use engine::{ActionQueue, EnrageState, EnrageUpdate, QueueEntry, QueueError};
pub use error::{BattleError, ErrorSeverity};
pub use rewards::{
    EncounterTier, ItemReward, RewardBundle, RewardCandidate, RewardInput, RewardPool,
    RewardResolver,
};
pub use roster::RosterSnapshot;
pub use stats::{BaseStats, CombatantId, Side, StatEffect, StatEntity, StatKind};
