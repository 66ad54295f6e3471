//! Post-victory loot.
//!
//! [`RewardResolver`] turns battle telemetry into gold, experience, cards,
//! relics and upgrade items. Star ratings come from per-tier tables and are
//! bumped at extreme rare-drop-rate values.

mod resolver;
mod tier;

pub use resolver::{
    ItemReward, RewardBundle, RewardCandidate, RewardInput, RewardPool, RewardResolver,
};
pub use tier::EncounterTier;
