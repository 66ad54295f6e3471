//! Combat stat records.
//!
//! A [`StatEntity`] carries base values plus an ordered ledger of
//! [`StatEffect`]s. Every runtime accessor resolves to
//! `clamp(base + Σ effect deltas)` for its [`StatKind`], so buffs and debuffs
//! never mutate base values and can always be detached cleanly.

pub mod effect;
pub mod entity;
pub mod kind;

pub use effect::StatEffect;
pub use entity::{BaseStats, CombatantId, Side, StatEntity};
pub use kind::StatKind;
