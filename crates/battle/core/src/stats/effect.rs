//! Additive stat effects stored on a [`super::StatEntity`].

use std::collections::BTreeMap;

use super::StatKind;

/// A named bundle of additive stat deltas.
///
/// The name is the effect's key on an entity: adding an effect whose name is
/// already present replaces the old one instead of stacking.
///
/// Duration semantics:
/// - `-1`: permanent (relics, cards, modifiers that track their own lifetime)
/// - `0`: expired, pruned before the next read
/// - `>0`: remaining ticks
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatEffect {
    pub name: String,
    pub deltas: BTreeMap<StatKind, f64>,
    duration: i32,
    pub source: String,
}

impl StatEffect {
    pub const PERMANENT: i32 = -1;

    pub fn new(name: impl Into<String>, duration: i32, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            deltas: BTreeMap::new(),
            duration: duration.max(Self::PERMANENT),
            source: source.into(),
        }
    }

    /// Creates a permanent effect.
    pub fn permanent(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(name, Self::PERMANENT, source)
    }

    /// Adds (or accumulates) a delta for a stat.
    pub fn with_delta(mut self, stat: StatKind, delta: f64) -> Self {
        *self.deltas.entry(stat).or_insert(0.0) += delta;
        self
    }

    pub fn duration(&self) -> i32 {
        self.duration
    }

    pub fn is_permanent(&self) -> bool {
        self.duration == Self::PERMANENT
    }

    pub fn is_expired(&self) -> bool {
        self.duration == 0
    }

    /// Contribution of this effect to `stat`.
    pub fn delta(&self, stat: StatKind) -> f64 {
        self.deltas.get(&stat).copied().unwrap_or(0.0)
    }

    /// Advances a timed effect by one tick. Permanent effects are untouched.
    pub fn tick(&mut self) {
        if self.duration > 0 {
            self.duration -= 1;
        }
    }
}
