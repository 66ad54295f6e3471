//! Data-driven catalog entries.

use core::fmt;
use std::collections::BTreeMap;

use super::CatalogEntry;
use crate::effects::{EffectManager, StatModifier};
use crate::stats::{StatEntity, StatKind};

/// Whether an entry is awarded as a card or as a relic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CatalogKind {
    Card,
    Relic,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CatalogKind::Card => "card",
            CatalogKind::Relic => "relic",
        };
        write!(f, "{}", label)
    }
}

/// Card or relic whose whole effect is a permanent stat modifier.
///
/// Relic copies stack: `n` copies apply `n ×` the deltas and a multiplier of
/// `1 + n × (m - 1)`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatBonusEntry {
    pub id: String,
    pub name: String,
    pub kind: CatalogKind,
    pub stars: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub deltas: BTreeMap<StatKind, f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub multipliers: BTreeMap<StatKind, f64>,
}

impl StatBonusEntry {
    pub fn new(id: impl Into<String>, kind: CatalogKind, stars: u32) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind,
            stars,
            deltas: BTreeMap::new(),
            multipliers: BTreeMap::new(),
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

    /// Key of the modifier this entry installs on an entity.
    pub fn modifier_id(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }
}

impl CatalogEntry for StatBonusEntry {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> CatalogKind {
        self.kind
    }

    fn stars(&self) -> u32 {
        self.stars
    }

    fn apply(&self, entity: &mut StatEntity, effects: &mut EffectManager, stacks: u32) {
        if stacks == 0 {
            return;
        }
        let n = stacks as f64;
        let mut modifier = StatModifier::new(self.modifier_id(), StatModifier::PERMANENT)
            .with_source(self.modifier_id());
        for (&stat, &delta) in &self.deltas {
            modifier = modifier.with_delta(stat, delta * n);
        }
        for (&stat, &multiplier) in &self.multipliers {
            modifier = modifier.with_multiplier(stat, 1.0 + n * (multiplier - 1.0));
        }
        effects.add_modifier(entity, modifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiminishingTable;
    use crate::stats::{BaseStats, CombatantId, Side};

    #[test]
    fn relic_copies_stack() {
        let mut entity = StatEntity::new(CombatantId(1), "A", Side::Party, BaseStats::default());
        let mut effects = EffectManager::new(DiminishingTable::empty());
        let relic = StatBonusEntry::new("whetstone", CatalogKind::Relic, 1)
            .with_delta(StatKind::Atk, 10.0)
            .with_multiplier(StatKind::Defense, 1.1);

        relic.apply(&mut entity, &mut effects, 3);

        assert_eq!(entity.atk(), 130.0);
        assert!((entity.defense() - 65.0).abs() < 1e-9);
        assert!(entity.has_effect("relic:whetstone"));
    }

    #[test]
    fn reapplying_replaces_previous_copy() {
        let mut entity = StatEntity::new(CombatantId(1), "A", Side::Party, BaseStats::default());
        let mut effects = EffectManager::new(DiminishingTable::empty());
        let card = StatBonusEntry::new("focus", CatalogKind::Card, 2).with_delta(StatKind::Atk, 5.0);

        card.apply(&mut entity, &mut effects, 1);
        card.apply(&mut entity, &mut effects, 1);

        assert_eq!(entity.atk(), 105.0);
    }
}
