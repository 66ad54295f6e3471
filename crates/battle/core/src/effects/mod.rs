//! Timed effects and the per-turn effect manager.
//!
//! Tick order is fixed: damage-over-time, then heal-over-time (only if the
//! target survived), then stat modifiers. Later stages read state mutated by
//! earlier ones, so the order must not change.

mod dot;
mod manager;
mod modifier;

pub use dot::{DamageOverTime, HealOverTime};
pub use manager::{EffectManager, TickReport};
pub use modifier::StatModifier;
