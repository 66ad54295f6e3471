//! The mutable combat record for party members, foes and summons.

use core::fmt;

use super::{StatEffect, StatKind};
use crate::catalog::DamageKind;

/// Stable identifier of a combatant within one encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantId(pub u32);

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which side of the encounter a combatant fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Side {
    Party,
    Foe,
}

impl Side {
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Party => Self::Foe,
            Self::Foe => Self::Party,
        }
    }
}

/// Base values before any effect contribution.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BaseStats {
    pub max_hp: f64,
    pub atk: f64,
    pub defense: f64,
    pub crit_rate: f64,
    pub crit_damage: f64,
    pub mitigation: f64,
    pub vitality: f64,
    pub speed: f64,
    pub dodge_odds: f64,
    pub regain: f64,
    pub effect_hit_rate: f64,
    pub effect_resistance: f64,
}

impl BaseStats {
    pub fn get(&self, stat: StatKind) -> f64 {
        match stat {
            StatKind::MaxHp => self.max_hp,
            StatKind::Atk => self.atk,
            StatKind::Defense => self.defense,
            StatKind::CritRate => self.crit_rate,
            StatKind::CritDamage => self.crit_damage,
            StatKind::Mitigation => self.mitigation,
            StatKind::Vitality => self.vitality,
            StatKind::Speed => self.speed,
            StatKind::DodgeOdds => self.dodge_odds,
            StatKind::Regain => self.regain,
            StatKind::EffectHitRate => self.effect_hit_rate,
            StatKind::EffectResistance => self.effect_resistance,
        }
    }

    pub fn set(&mut self, stat: StatKind, value: f64) {
        let slot = match stat {
            StatKind::MaxHp => &mut self.max_hp,
            StatKind::Atk => &mut self.atk,
            StatKind::Defense => &mut self.defense,
            StatKind::CritRate => &mut self.crit_rate,
            StatKind::CritDamage => &mut self.crit_damage,
            StatKind::Mitigation => &mut self.mitigation,
            StatKind::Vitality => &mut self.vitality,
            StatKind::Speed => &mut self.speed,
            StatKind::DodgeOdds => &mut self.dodge_odds,
            StatKind::Regain => &mut self.regain,
            StatKind::EffectHitRate => &mut self.effect_hit_rate,
            StatKind::EffectResistance => &mut self.effect_resistance,
        };
        *slot = value;
    }
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            max_hp: 1000.0,
            atk: 100.0,
            defense: 50.0,
            crit_rate: 0.05,
            crit_damage: 2.0,
            mitigation: 1.0,
            vitality: 1.0,
            speed: 100.0,
            dodge_odds: 0.05,
            regain: 0.0,
            effect_hit_rate: 1.0,
            effect_resistance: 0.0,
        }
    }
}

/// Mutable combat-stat record for any combatant.
///
/// All fields exist from construction; "not yet initialized" is expressed as
/// the documented default (no shields, one action per turn, empty ultimate
/// gauge, aggro weight 1.0).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatEntity {
    pub id: CombatantId,
    pub name: String,
    pub side: Side,
    pub level: u32,
    pub hp: u64,
    pub shields: u64,
    pub base: BaseStats,
    effects: Vec<StatEffect>,
    pub damage_kind: DamageKind,

    // Action economy
    pub actions_per_turn: u32,
    pub action_points: u32,
    pub action_value: f64,
    pub base_action_value: f64,

    // Ultimate gauge
    pub ultimate_charge: u32,
    pub ultimate_ready: bool,

    // Target weighting
    pub base_aggro: f64,
    pub aggro_modifier: f64,

    /// Excess healing converts into shields instead of being discarded.
    pub overheal_enabled: bool,
}

impl StatEntity {
    pub fn new(id: CombatantId, name: impl Into<String>, side: Side, base: BaseStats) -> Self {
        let hp = StatKind::MaxHp.clamp_value(base.max_hp).floor() as u64;
        Self {
            id,
            name: name.into(),
            side,
            level: 1,
            hp,
            shields: 0,
            base,
            effects: Vec::new(),
            damage_kind: DamageKind::Generic,
            actions_per_turn: 1,
            action_points: 0,
            action_value: 0.0,
            base_action_value: 0.0,
            ultimate_charge: 0,
            ultimate_ready: false,
            base_aggro: 1.0,
            aggro_modifier: 0.0,
            overheal_enabled: false,
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_hp(mut self, hp: u64) -> Self {
        self.hp = hp.min(self.max_hp());
        self
    }

    pub fn with_damage_kind(mut self, kind: DamageKind) -> Self {
        self.damage_kind = kind;
        self
    }

    pub fn with_aggro(mut self, base_aggro: f64) -> Self {
        self.base_aggro = base_aggro;
        self
    }

    pub fn with_actions_per_turn(mut self, actions: u32) -> Self {
        self.actions_per_turn = actions.max(1);
        self
    }

    pub fn with_overheal(mut self, enabled: bool) -> Self {
        self.overheal_enabled = enabled;
        self
    }

    // ===== runtime stats =====

    /// Runtime value of `stat`: base plus active effect deltas, clamped.
    pub fn stat(&self, stat: StatKind) -> f64 {
        stat.clamp_value(self.base.get(stat) + self.effect_total(stat))
    }

    /// Sum of every live effect's contribution to `stat`.
    pub fn effect_total(&self, stat: StatKind) -> f64 {
        self.effects
            .iter()
            .filter(|effect| !effect.is_expired())
            .map(|effect| effect.delta(stat))
            .sum()
    }

    pub fn max_hp(&self) -> u64 {
        self.stat(StatKind::MaxHp).floor() as u64
    }

    pub fn atk(&self) -> f64 {
        self.stat(StatKind::Atk)
    }

    pub fn defense(&self) -> f64 {
        self.stat(StatKind::Defense)
    }

    pub fn crit_rate(&self) -> f64 {
        self.stat(StatKind::CritRate)
    }

    pub fn crit_damage(&self) -> f64 {
        self.stat(StatKind::CritDamage)
    }

    pub fn mitigation(&self) -> f64 {
        self.stat(StatKind::Mitigation)
    }

    pub fn vitality(&self) -> f64 {
        self.stat(StatKind::Vitality)
    }

    pub fn speed(&self) -> f64 {
        self.stat(StatKind::Speed)
    }

    pub fn dodge_odds(&self) -> f64 {
        self.stat(StatKind::DodgeOdds)
    }

    pub fn regain(&self) -> f64 {
        self.stat(StatKind::Regain)
    }

    pub fn effect_hit_rate(&self) -> f64 {
        self.stat(StatKind::EffectHitRate)
    }

    pub fn effect_resistance(&self) -> f64 {
        self.stat(StatKind::EffectResistance)
    }

    /// Weight used when an opponent picks a target.
    pub fn aggro(&self) -> f64 {
        let aggro = self.base_aggro * (1.0 + self.aggro_modifier);
        if aggro.is_finite() { aggro.max(0.0) } else { 0.0 }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Current HP as a fraction of max HP.
    pub fn hp_fraction(&self) -> f64 {
        self.hp as f64 / self.max_hp().max(1) as f64
    }

    // ===== effect ledger =====

    pub fn effects(&self) -> &[StatEffect] {
        &self.effects
    }

    pub fn has_effect(&self, name: &str) -> bool {
        self.effects.iter().any(|effect| effect.name == name)
    }

    /// Adds an effect, replacing any effect with the same name.
    ///
    /// Returns the replaced effect, if any.
    pub fn add_effect(&mut self, effect: StatEffect) -> Option<StatEffect> {
        let replaced = self.remove_effect(&effect.name);
        if !effect.is_expired() {
            self.effects.push(effect);
        }
        self.clamp_hp();
        replaced
    }

    /// Removes the effect named `name`.
    pub fn remove_effect(&mut self, name: &str) -> Option<StatEffect> {
        let index = self.effects.iter().position(|effect| effect.name == name)?;
        let removed = self.effects.remove(index);
        self.clamp_hp();
        Some(removed)
    }

    /// Removes every effect tagged with `source`. Returns the number removed.
    pub fn remove_effects_by_source(&mut self, source: &str) -> usize {
        let before = self.effects.len();
        self.effects.retain(|effect| effect.source != source);
        self.clamp_hp();
        before - self.effects.len()
    }

    /// Advances timed effects by one tick and prunes expired ones.
    ///
    /// Returns the names of effects that expired.
    pub fn tick_effects(&mut self) -> Vec<String> {
        for effect in &mut self.effects {
            effect.tick();
        }
        let expired: Vec<String> = self
            .effects
            .iter()
            .filter(|effect| effect.is_expired())
            .map(|effect| effect.name.clone())
            .collect();
        if !expired.is_empty() {
            self.effects.retain(|effect| !effect.is_expired());
            self.clamp_hp();
        }
        expired
    }

    pub fn clear_effects(&mut self) {
        self.effects.clear();
        self.clamp_hp();
    }

    fn clamp_hp(&mut self) {
        let max_hp = self.max_hp();
        if self.hp > max_hp {
            self.hp = max_hp;
        }
    }

    // ===== ultimate gauge =====

    /// Adds ultimate charge. Returns true if the ultimate became ready.
    pub fn add_ultimate_charge(&mut self, amount: u32, cap: u32) -> bool {
        if self.ultimate_ready {
            return false;
        }
        self.ultimate_charge = self.ultimate_charge.saturating_add(amount).min(cap);
        if self.ultimate_charge >= cap {
            self.ultimate_ready = true;
            return true;
        }
        false
    }

    /// Spends a ready ultimate. Returns false if it was not ready.
    pub fn consume_ultimate(&mut self) -> bool {
        if !self.ultimate_ready {
            return false;
        }
        self.ultimate_ready = false;
        self.ultimate_charge = 0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity() -> StatEntity {
        StatEntity::new(CombatantId(1), "Ally", Side::Party, BaseStats::default())
    }

    #[test]
    fn runtime_stat_includes_effects() {
        let mut e = entity();
        e.add_effect(StatEffect::permanent("buff", "test").with_delta(StatKind::Atk, 25.0));
        e.add_effect(StatEffect::new("debuff", 3, "test").with_delta(StatKind::Atk, -5.0));
        assert_eq!(e.atk(), 120.0);
    }

    #[test]
    fn same_name_replaces_instead_of_stacking() {
        let mut e = entity();
        e.add_effect(StatEffect::permanent("buff", "a").with_delta(StatKind::Atk, 25.0));
        let replaced =
            e.add_effect(StatEffect::permanent("buff", "b").with_delta(StatKind::Atk, 10.0));
        assert!(replaced.is_some());
        assert_eq!(e.effects().len(), 1);
        assert_eq!(e.atk(), 110.0);
    }

    #[test]
    fn runtime_stats_are_clamped() {
        let mut e = entity();
        e.add_effect(
            StatEffect::permanent("crush", "test")
                .with_delta(StatKind::Mitigation, -50.0)
                .with_delta(StatKind::DodgeOdds, 4.0),
        );
        assert_eq!(e.mitigation(), 0.1);
        assert_eq!(e.dodge_odds(), 1.0);
    }

    #[test]
    fn expired_effects_are_pruned_on_tick() {
        let mut e = entity();
        e.add_effect(StatEffect::new("short", 1, "test").with_delta(StatKind::Defense, 10.0));
        e.add_effect(StatEffect::permanent("long", "test").with_delta(StatKind::Defense, 1.0));
        let expired = e.tick_effects();
        assert_eq!(expired, vec!["short".to_string()]);
        assert_eq!(e.defense(), 51.0);
    }

    #[test]
    fn removing_max_hp_buff_clamps_hp() {
        let mut e = entity();
        e.add_effect(StatEffect::permanent("vigor", "relic:x").with_delta(StatKind::MaxHp, 500.0));
        e.hp = 1500;
        assert_eq!(e.remove_effects_by_source("relic:x"), 1);
        assert_eq!(e.hp, 1000);
    }

    #[test]
    fn ultimate_charge_caps_and_resets() {
        let mut e = entity();
        assert!(!e.add_ultimate_charge(10, 15));
        assert!(e.add_ultimate_charge(10, 15));
        assert_eq!(e.ultimate_charge, 15);
        assert!(e.consume_ultimate());
        assert_eq!(e.ultimate_charge, 0);
        assert!(!e.consume_ultimate());
    }

    #[test]
    fn aggro_is_never_negative() {
        let mut e = entity().with_aggro(2.0);
        e.aggro_modifier = -3.0;
        assert_eq!(e.aggro(), 0.0);
    }
}
