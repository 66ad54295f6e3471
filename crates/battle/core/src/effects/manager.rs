//! Per-entity effect bookkeeping.

use std::collections::HashMap;

use tracing::debug;

use super::{DamageOverTime, HealOverTime, StatModifier};
use crate::config::DiminishingTable;
use crate::stats::{CombatantId, StatEntity};

/// What happened during one [`EffectManager::tick`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub dot_damage: u64,
    pub hot_healing: u64,
    pub expired_dots: Vec<String>,
    pub expired_hots: Vec<String>,
    pub expired_modifiers: Vec<String>,
    pub expired_effects: Vec<String>,
    /// The entity was alive before the tick and is dead after it.
    pub died: bool,
}

#[derive(Clone, Debug, Default)]
struct EntityEffects {
    dots: Vec<DamageOverTime>,
    hots: Vec<HealOverTime>,
    modifiers: Vec<StatModifier>,
}

impl EntityEffects {
    fn is_empty(&self) -> bool {
        self.dots.is_empty() && self.hots.is_empty() && self.modifiers.is_empty()
    }
}

/// Owns every damage-over-time, heal-over-time and stat modifier in a battle.
///
/// Effects are keyed by the combatant they sit on; the manager never holds a
/// reference to the entity itself, callers pass it in for each operation.
#[derive(Clone, Debug)]
pub struct EffectManager {
    diminishing: DiminishingTable,
    entries: HashMap<CombatantId, EntityEffects>,
}

impl EffectManager {
    pub fn new(diminishing: DiminishingTable) -> Self {
        Self {
            diminishing,
            entries: HashMap::new(),
        }
    }

    pub fn diminishing(&self) -> &DiminishingTable {
        &self.diminishing
    }

    pub fn add_dot(&mut self, target: CombatantId, dot: DamageOverTime) {
        if dot.is_expired() {
            return;
        }
        debug!(target: "battle::effects", %target, id = %dot.id, damage = dot.damage, turns = dot.turns, "DoT applied");
        self.entries.entry(target).or_default().dots.push(dot);
    }

    pub fn add_hot(&mut self, target: CombatantId, hot: HealOverTime) {
        if hot.is_expired() {
            return;
        }
        debug!(target: "battle::effects", %target, id = %hot.id, healing = hot.healing, turns = hot.turns, "HoT applied");
        self.entries.entry(target).or_default().hots.push(hot);
    }

    /// Applies `modifier` to `entity`, replacing a live modifier with the same id.
    pub fn add_modifier(&mut self, entity: &mut StatEntity, mut modifier: StatModifier) {
        if modifier.turns == 0 {
            return;
        }
        let entry = self.entries.entry(entity.id).or_default();
        if let Some(index) = entry.modifiers.iter().position(|m| m.id == modifier.id) {
            let mut previous = entry.modifiers.remove(index);
            previous.remove(entity);
        }
        modifier.apply(entity, &self.diminishing);
        debug!(target: "battle::effects", entity = %entity.id, id = %modifier.id, turns = modifier.turns, "Modifier applied");
        entry.modifiers.push(modifier);
    }

    /// Detaches the modifier `id` from `entity`. Returns true if it existed.
    pub fn remove_modifier(&mut self, entity: &mut StatEntity, id: &str) -> bool {
        let Some(entry) = self.entries.get_mut(&entity.id) else {
            return false;
        };
        match entry.modifiers.iter().position(|m| m.id == id) {
            Some(index) => {
                let mut modifier = entry.modifiers.remove(index);
                modifier.remove(entity);
                true
            }
            None => false,
        }
    }

    pub fn modifier(&self, target: CombatantId, id: &str) -> Option<&StatModifier> {
        self.entries
            .get(&target)?
            .modifiers
            .iter()
            .find(|m| m.id == id)
    }

    pub fn dots(&self, target: CombatantId) -> &[DamageOverTime] {
        self.entries
            .get(&target)
            .map(|e| e.dots.as_slice())
            .unwrap_or(&[])
    }

    pub fn hots(&self, target: CombatantId) -> &[HealOverTime] {
        self.entries
            .get(&target)
            .map(|e| e.hots.as_slice())
            .unwrap_or(&[])
    }

    pub fn modifiers(&self, target: CombatantId) -> &[StatModifier] {
        self.entries
            .get(&target)
            .map(|e| e.modifiers.as_slice())
            .unwrap_or(&[])
    }

    /// True if no effect of any kind is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(EntityEffects::is_empty)
    }

    /// Advances every effect on `entity` by one turn.
    ///
    /// DoTs tick first; if one kills the entity the remaining DoTs are skipped
    /// and no HoT ticks. Modifiers and ledger durations tick last.
    pub fn tick(&mut self, entity: &mut StatEntity) -> TickReport {
        let mut report = TickReport::default();
        let was_alive = entity.is_alive();

        if let Some(entry) = self.entries.get_mut(&entity.id) {
            let mut index = 0;
            while index < entry.dots.len() && entity.is_alive() {
                report.dot_damage += entry.dots[index].tick(entity);
                let killed = !entity.is_alive();
                if killed || entry.dots[index].is_expired() {
                    report.expired_dots.push(entry.dots.remove(index).id);
                } else {
                    index += 1;
                }
                if killed {
                    break;
                }
            }

            if entity.is_alive() {
                for hot in &mut entry.hots {
                    report.hot_healing += hot.tick(entity);
                }
                entry.hots.retain(|hot| {
                    if hot.is_expired() {
                        report.expired_hots.push(hot.id.clone());
                        false
                    } else {
                        true
                    }
                });
            }

            entry.modifiers.retain_mut(|modifier| {
                if modifier.tick(entity) {
                    report.expired_modifiers.push(modifier.id.clone());
                    false
                } else {
                    true
                }
            });
        }

        report.expired_effects = entity.tick_effects();
        report.died = was_alive && !entity.is_alive();

        if report.dot_damage > 0 || report.hot_healing > 0 || report.died {
            debug!(
                target: "battle::effects",
                entity = %entity.id,
                dot_damage = report.dot_damage,
                hot_healing = report.hot_healing,
                died = report.died,
                "Effects ticked"
            );
        }

        report
    }

    /// Removes every modifier, DoT and HoT from the battle.
    ///
    /// Installed modifier effects are detached from their entities. Entities
    /// missing from `entities` simply lose their bookkeeping.
    pub fn cleanup(&mut self, entities: &mut [StatEntity]) {
        for entity in entities.iter_mut() {
            if let Some(mut entry) = self.entries.remove(&entity.id) {
                for modifier in &mut entry.modifiers {
                    modifier.remove(entity);
                }
            }
        }
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{BaseStats, Side, StatKind};

    fn entity() -> StatEntity {
        StatEntity::new(CombatantId(7), "E", Side::Foe, BaseStats::default())
    }

    fn manager() -> EffectManager {
        EffectManager::new(DiminishingTable::empty())
    }

    #[test]
    fn fatal_dot_skips_remaining_dots_and_hots() {
        let mut e = entity().with_hp(30);
        let mut effects = manager();
        effects.add_dot(e.id, DamageOverTime::new("first", 50, 3));
        effects.add_dot(e.id, DamageOverTime::new("second", 50, 3));
        effects.add_hot(e.id, HealOverTime::new("regen", 100, 3));

        let report = effects.tick(&mut e);

        assert!(report.died);
        assert_eq!(report.dot_damage, 30);
        assert_eq!(report.hot_healing, 0);
        assert_eq!(report.expired_dots, vec!["first".to_string()]);
        assert_eq!(effects.dots(e.id).len(), 1);
        assert_eq!(effects.dots(e.id)[0].turns, 3);
        assert_eq!(effects.hots(e.id)[0].turns, 3);
    }

    #[test]
    fn hot_reads_state_after_dot() {
        let mut e = entity().with_hp(1000);
        let mut effects = manager();
        effects.add_dot(e.id, DamageOverTime::new("burn", 100, 1));
        effects.add_hot(e.id, HealOverTime::new("regen", 60, 2));

        let report = effects.tick(&mut e);

        assert_eq!(report.dot_damage, 100);
        assert_eq!(report.hot_healing, 60);
        assert_eq!(e.hp, 960);
        assert_eq!(report.expired_dots, vec!["burn".to_string()]);
    }

    #[test]
    fn modifier_expires_through_tick() {
        let mut e = entity();
        let mut effects = manager();
        effects.add_modifier(&mut e, StatModifier::new("guard", 1).with_delta(StatKind::Defense, 25.0));
        assert_eq!(e.defense(), 75.0);

        let report = effects.tick(&mut e);

        assert_eq!(report.expired_modifiers, vec!["guard".to_string()]);
        assert_eq!(e.defense(), 50.0);
        assert!(effects.modifiers(e.id).is_empty());
    }

    #[test]
    fn same_modifier_id_replaces() {
        let mut e = entity();
        let mut effects = manager();
        effects.add_modifier(&mut e, StatModifier::new("rage", 5).with_delta(StatKind::Atk, 10.0));
        effects.add_modifier(&mut e, StatModifier::new("rage", 5).with_delta(StatKind::Atk, 30.0));
        assert_eq!(e.atk(), 130.0);
        assert_eq!(effects.modifiers(e.id).len(), 1);
    }

    #[test]
    fn cleanup_removes_everything() {
        let mut e = entity();
        let mut effects = manager();
        effects.add_modifier(&mut e, StatModifier::new("rage", -1).with_delta(StatKind::Atk, 10.0));
        effects.add_dot(e.id, DamageOverTime::new("bleed", 5, 10));
        effects.add_hot(e.id, HealOverTime::new("regen", 5, 10));

        let mut entities = vec![e];
        effects.cleanup(&mut entities);

        assert!(effects.is_empty());
        assert_eq!(entities[0].atk(), 100.0);
        assert!(entities[0].effects().is_empty());
    }
}
