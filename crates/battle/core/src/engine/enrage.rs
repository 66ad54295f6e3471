use tracing::info;

use crate::config::BattleConfig;
use crate::effects::DamageOverTime;
use crate::stats::StatEntity;

/// Result of advancing the enrage counter by one turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnrageUpdate {
    /// Enrage switched on during this update.
    pub activated: bool,
    /// The stack count grew; foe attack modifiers must be refreshed.
    pub stacks_changed: bool,
    /// A bleed wave must be applied to every living combatant.
    pub bleed_due: bool,
}

/// Time-pressure escalation.
///
/// Once the turn counter passes `threshold`, stacks equal the number of turns
/// beyond it. `active` and `stacks` are monotonic within an encounter.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnrageState {
    pub threshold: u32,
    stacks: u32,
    active: bool,
    damage_per_stack: f64,
    bleed_interval: u32,
    bleed_fraction: f64,
    bleed_turns: u32,
}

impl EnrageState {
    /// Modifier id installed on foes while enraged.
    pub const ATTACK_MODIFIER_ID: &'static str = "enrage_atk";
    /// DoT id used by enrage bleed waves.
    pub const BLEED_ID: &'static str = "enrage_bleed";

    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            stacks: 0,
            active: false,
            damage_per_stack: BattleConfig::ENRAGE_DAMAGE_PER_STACK,
            bleed_interval: BattleConfig::ENRAGE_BLEED_INTERVAL,
            bleed_fraction: BattleConfig::ENRAGE_BLEED_FRACTION,
            bleed_turns: BattleConfig::ENRAGE_BLEED_TURNS,
        }
    }

    /// Builds the state from configuration, picking the boss or normal fuse.
    pub fn from_config(config: &BattleConfig, boss: bool) -> Self {
        Self {
            threshold: config.enrage_threshold(boss),
            stacks: 0,
            active: false,
            damage_per_stack: config.enrage_damage_per_stack,
            bleed_interval: config.enrage_bleed_interval.max(1),
            bleed_fraction: config.enrage_bleed_fraction,
            bleed_turns: config.enrage_bleed_turns,
        }
    }

    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn stacks(&self) -> u32 {
        self.stacks
    }

    /// Advances the state to `turn`.
    pub fn update(&mut self, turn: u32) -> EnrageUpdate {
        let mut update = EnrageUpdate::default();
        if turn <= self.threshold {
            return update;
        }

        if !self.active {
            self.active = true;
            update.activated = true;
            info!(target: "battle::enrage", turn, threshold = self.threshold, "Enrage activated");
        }

        let stacks = turn - self.threshold;
        if stacks > self.stacks {
            self.stacks = stacks;
            update.stacks_changed = true;
            update.bleed_due = self.stacks % self.bleed_interval.max(1) == 0;
        }
        update
    }

    /// Damage-taken increase (and healing-received reduction) as a fraction.
    pub fn percent(&self) -> f64 {
        if self.active {
            self.damage_per_stack * f64::from(self.stacks)
        } else {
            0.0
        }
    }

    /// Attack multiplier placed on every foe.
    pub fn attack_multiplier(&self) -> f64 {
        1.0 + 2.0 * f64::from(self.stacks)
    }

    /// Bleed for one combatant, scaled by stacks and the target's max HP.
    pub fn bleed_for(&self, target: &StatEntity) -> DamageOverTime {
        let raw = target.max_hp() as f64 * self.bleed_fraction * f64::from(self.stacks);
        let damage = (raw.floor() as u64).max(1);
        DamageOverTime::new(Self::BLEED_ID, damage, self.bleed_turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{BaseStats, CombatantId, Side};

    #[test]
    fn inactive_until_threshold_passed() {
        let mut state = EnrageState::new(100);
        for turn in 1..=100 {
            assert_eq!(state.update(turn), EnrageUpdate::default());
        }
        assert!(!state.is_active());
        assert_eq!(state.percent(), 0.0);
    }

    #[test]
    fn activates_once_with_turns_beyond_threshold() {
        let mut state = EnrageState::new(100);
        let first = state.update(101);
        assert!(first.activated && first.stacks_changed);
        assert_eq!(state.stacks(), 1);

        let second = state.update(103);
        assert!(!second.activated);
        assert_eq!(state.stacks(), 3);
        assert!((state.percent() - 4.05).abs() < 1e-9);
        assert_eq!(state.attack_multiplier(), 7.0);
    }

    #[test]
    fn stacks_never_decrease() {
        let mut state = EnrageState::new(10);
        state.update(20);
        let update = state.update(15);
        assert!(!update.stacks_changed);
        assert_eq!(state.stacks(), 10);
        assert!(state.is_active());
    }

    #[test]
    fn bleed_every_ten_stacks() {
        let mut state = EnrageState::new(0);
        let due: Vec<u32> = (1..=30).filter(|&turn| state.update(turn).bleed_due).collect();
        assert_eq!(due, vec![10, 20, 30]);
    }

    #[test]
    fn bleed_scales_with_max_hp_and_stacks() {
        let mut state = EnrageState::new(0);
        state.update(20);
        let target = StatEntity::new(CombatantId(1), "T", Side::Party, BaseStats::default());
        let bleed = state.bleed_for(&target);
        assert_eq!(bleed.damage, 100);
        assert_eq!(bleed.turns, 10);

        let mut tiny = BaseStats::default();
        tiny.max_hp = 10.0;
        let small = StatEntity::new(CombatantId(2), "S", Side::Foe, tiny);
        assert_eq!(state.bleed_for(&small).damage, 1);
    }

    #[test]
    fn boss_config_uses_longer_fuse() {
        let state = EnrageState::from_config(&BattleConfig::default(), true);
        assert_eq!(state.threshold, 500);
    }
}
