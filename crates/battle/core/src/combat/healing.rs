use tracing::debug;

use crate::config::BattleConfig;
use crate::stats::StatEntity;

/// Result of a heal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealOutcome {
    /// HP actually restored.
    pub healed: u64,
    /// Shields gained from overhealing.
    pub shield_gained: u64,
}

/// Heals `target` by `amount × healer_vitality × target_vitality`.
///
/// Enrage reduces the result by `(1 - enrage_percent)`, floored at zero. A
/// positive request always restores at least one point. Healing stops at max
/// HP unless the target has overheal enabled, in which case the excess turns
/// into shields: fully when unshielded, at
/// [`BattleConfig::OVERHEAL_SHIELD_EFFECTIVENESS`] otherwise. Dead targets
/// cannot be healed.
pub fn apply_healing(
    healer_vitality: f64,
    target: &mut StatEntity,
    amount: f64,
    enrage_percent: f64,
) -> HealOutcome {
    let mut outcome = HealOutcome::default();
    if !target.is_alive() || amount.is_nan() || amount <= 0.0 {
        return outcome;
    }

    let mut value = amount * healer_vitality.max(0.0) * target.vitality();
    if enrage_percent.is_finite() && enrage_percent > 0.0 {
        value *= (1.0 - enrage_percent).max(0.0);
    }
    let value = (value.floor() as u64).max(1);

    let missing = target.max_hp().saturating_sub(target.hp);
    let healed = value.min(missing);
    target.hp += healed;
    outcome.healed = healed;

    let excess = value - healed;
    if target.overheal_enabled && excess > 0 {
        let gained = if target.shields == 0 {
            excess
        } else {
            (excess as f64 * BattleConfig::OVERHEAL_SHIELD_EFFECTIVENESS).floor() as u64
        };
        target.shields = target.shields.saturating_add(gained);
        outcome.shield_gained = gained;
    }

    debug!(
        target: "battle::combat",
        target = %target.id,
        healed = outcome.healed,
        shield_gained = outcome.shield_gained,
        "Healing applied"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{BaseStats, CombatantId, Side};

    fn target(hp: u64) -> StatEntity {
        StatEntity::new(CombatantId(1), "Ally", Side::Party, BaseStats::default()).with_hp(hp)
    }

    #[test]
    fn heals_up_to_max_hp() {
        let mut t = target(900);
        let outcome = apply_healing(1.0, &mut t, 250.0, 0.0);
        assert_eq!(outcome, HealOutcome { healed: 100, shield_gained: 0 });
        assert_eq!(t.hp, 1000);
    }

    #[test]
    fn vitality_scales_both_ends() {
        let mut t = target(100);
        t.base.vitality = 1.5;
        let outcome = apply_healing(2.0, &mut t, 100.0, 0.0);
        assert_eq!(outcome.healed, 300);
    }

    #[test]
    fn enrage_reduces_but_floors_to_one() {
        let mut t = target(100);
        assert_eq!(apply_healing(1.0, &mut t, 100.0, 0.5).healed, 50);
        assert_eq!(apply_healing(1.0, &mut t, 100.0, 4.05).healed, 1);
    }

    #[test]
    fn overheal_becomes_full_shield_when_unshielded() {
        let mut t = target(950).with_overheal(true);
        let outcome = apply_healing(1.0, &mut t, 150.0, 0.0);
        assert_eq!(outcome, HealOutcome { healed: 50, shield_gained: 100 });
        assert_eq!(t.shields, 100);
    }

    #[test]
    fn overheal_on_shielded_target_is_diminished() {
        let mut t = target(1000).with_overheal(true);
        t.shields = 10;
        let outcome = apply_healing(1.0, &mut t, 100.0, 0.0);
        assert_eq!(outcome.shield_gained, 20);
        assert_eq!(t.shields, 30);
    }

    #[test]
    fn dead_or_zero_requests_are_no_ops() {
        let mut dead = target(1000);
        dead.hp = 0;
        assert_eq!(apply_healing(1.0, &mut dead, 100.0, 0.0), HealOutcome::default());
        let mut t = target(10);
        assert_eq!(apply_healing(1.0, &mut t, 0.0, 0.0), HealOutcome::default());
        assert_eq!(t.hp, 10);
    }
}
