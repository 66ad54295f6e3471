//! Damage-over-time and heal-over-time effects.

use crate::stats::{CombatantId, StatEntity};

/// Flat damage applied straight to HP once per tick, bypassing mitigation and shields.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageOverTime {
    pub id: String,
    pub damage: u64,
    pub turns: u32,
    pub source: Option<CombatantId>,
}

impl DamageOverTime {
    pub fn new(id: impl Into<String>, damage: u64, turns: u32) -> Self {
        Self {
            id: id.into(),
            damage,
            turns,
            source: None,
        }
    }

    pub fn with_source(mut self, source: CombatantId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.turns == 0
    }

    /// Applies one tick to `target`. Returns the HP actually removed.
    pub fn tick(&mut self, target: &mut StatEntity) -> u64 {
        if self.is_expired() || !target.is_alive() {
            return 0;
        }
        let dealt = self.damage.min(target.hp);
        target.hp -= dealt;
        self.turns -= 1;
        dealt
    }
}

/// Flat healing applied straight to HP once per tick, capped at max HP.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealOverTime {
    pub id: String,
    pub healing: u64,
    pub turns: u32,
    pub source: Option<CombatantId>,
}

impl HealOverTime {
    pub fn new(id: impl Into<String>, healing: u64, turns: u32) -> Self {
        Self {
            id: id.into(),
            healing,
            turns,
            source: None,
        }
    }

    pub fn with_source(mut self, source: CombatantId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.turns == 0
    }

    /// Applies one tick to `target`. Returns the HP actually restored.
    pub fn tick(&mut self, target: &mut StatEntity) -> u64 {
        if self.is_expired() || !target.is_alive() {
            return 0;
        }
        let missing = target.max_hp().saturating_sub(target.hp);
        let healed = self.healing.min(missing);
        target.hp += healed;
        self.turns -= 1;
        healed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{BaseStats, Side};

    fn target() -> StatEntity {
        StatEntity::new(CombatantId(2), "T", Side::Foe, BaseStats::default())
    }

    #[test]
    fn dot_ignores_shields() {
        let mut t = target();
        t.shields = 500;
        let mut dot = DamageOverTime::new("poison", 40, 2);
        assert_eq!(dot.tick(&mut t), 40);
        assert_eq!(t.hp, 960);
        assert_eq!(t.shields, 500);
        assert_eq!(dot.turns, 1);
    }

    #[test]
    fn dot_cannot_overkill() {
        let mut t = target().with_hp(10);
        let mut dot = DamageOverTime::new("poison", 40, 5);
        assert_eq!(dot.tick(&mut t), 10);
        assert!(!t.is_alive());
        assert_eq!(dot.tick(&mut t), 0);
    }

    #[test]
    fn hot_caps_at_max_hp() {
        let mut t = target().with_hp(990);
        let mut hot = HealOverTime::new("regen", 40, 1);
        assert_eq!(hot.tick(&mut t), 10);
        assert_eq!(t.hp, 1000);
        assert!(hot.is_expired());
    }
}
