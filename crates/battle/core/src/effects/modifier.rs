//! Stat modifiers: timed, id-keyed wrappers around a [`StatEffect`].

use std::collections::BTreeMap;

use crate::config::DiminishingTable;
use crate::stats::{StatEffect, StatEntity, StatKind};

/// Deltas and/or multipliers against named stats.
///
/// The modifier materializes into a [`StatEffect`] named after its id on the
/// first [`StatModifier::apply`], and detaches it again on
/// [`StatModifier::remove`]. Positive additive deltas are scaled by the
/// diminishing-returns table unless the modifier bypasses it; multipliers
/// resolve to a delta against the stat's value at apply time.
#[derive(Clone, Debug, PartialEq)]
pub struct StatModifier {
    pub id: String,
    /// Remaining turns; `-1` never expires.
    pub turns: i32,
    pub deltas: BTreeMap<StatKind, f64>,
    pub multipliers: BTreeMap<StatKind, f64>,
    pub bypass_diminishing: bool,
    pub source: String,
    applied: Option<StatEffect>,
}

impl StatModifier {
    pub const PERMANENT: i32 = -1;

    pub fn new(id: impl Into<String>, turns: i32) -> Self {
        let id = id.into();
        Self {
            source: id.clone(),
            id,
            turns: turns.max(Self::PERMANENT),
            deltas: BTreeMap::new(),
            multipliers: BTreeMap::new(),
            bypass_diminishing: false,
            applied: None,
        }
    }

    pub fn with_delta(mut self, stat: StatKind, delta: f64) -> Self {
        self.deltas.insert(stat, delta);
        self
    }

    pub fn with_multiplier(mut self, stat: StatKind, multiplier: f64) -> Self {
        self.multipliers.insert(stat, multiplier);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn bypassing_diminishing(mut self) -> Self {
        self.bypass_diminishing = true;
        self
    }

    pub fn is_applied(&self) -> bool {
        self.applied.is_some()
    }

    /// The effect currently installed on the entity, if applied.
    pub fn effect(&self) -> Option<&StatEffect> {
        self.applied.as_ref()
    }

    /// Installs this modifier's effect on `entity`, replacing a previous application.
    pub fn apply(&mut self, entity: &mut StatEntity, diminishing: &DiminishingTable) -> &StatEffect {
        self.remove(entity);

        let mut effect = StatEffect::permanent(self.id.clone(), self.source.clone());
        for (&stat, &delta) in &self.deltas {
            let scaled = if delta > 0.0 && !self.bypass_diminishing {
                delta * diminishing.effectiveness(stat, entity.stat(stat))
            } else {
                delta
            };
            effect = effect.with_delta(stat, scaled);
        }
        for (&stat, &multiplier) in &self.multipliers {
            let current = entity.stat(stat);
            effect = effect.with_delta(stat, current * (multiplier - 1.0));
        }

        entity.add_effect(effect.clone());
        self.applied.insert(effect)
    }

    /// Detaches the installed effect. Returns true if anything was removed.
    pub fn remove(&mut self, entity: &mut StatEntity) -> bool {
        match self.applied.take() {
            Some(effect) => entity.remove_effect(&effect.name).is_some(),
            None => false,
        }
    }

    /// Advances the modifier by one turn, detaching it when it runs out.
    ///
    /// Returns true if the modifier expired on this tick.
    pub fn tick(&mut self, entity: &mut StatEntity) -> bool {
        if self.turns <= 0 {
            return false;
        }
        self.turns -= 1;
        if self.turns == 0 {
            self.remove(entity);
            return true;
        }
        false
    }
}
