//! Damage-type strategies.

use crate::combat::DamageOutcome;
use crate::effects::DamageOverTime;
use crate::stats::StatEntity;

/// Side effects requested by a strategy after a successful hit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OnHit {
    /// Grants the attacker an immediate extra turn.
    pub bonus_turn: bool,
    /// Damage-over-time placed on the target.
    pub damage_over_time: Option<DamageOverTime>,
}

/// Ultimate action declared by a damage type.
///
/// Strategies describe the ultimate; the turn loop executes it against the
/// live combatants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Ultimate {
    /// Heals every living ally (the user included) by a fraction of their max HP.
    HealAllies { fraction: f64 },
    /// Hits every living opponent with `scale × atk`.
    SweepFoes { scale: f64 },
}

/// Trait for element-specific combat hooks.
///
/// # Design Pattern: Strategy
/// Every hook has a documented no-op default, so an implementation only
/// overrides what its element changes.
pub trait DamageTypeStrategy: Send + Sync {
    /// Get the damage type's name (for logs and snapshots)
    fn name(&self) -> &'static str;

    /// Scale outgoing damage before mitigation.
    fn on_damage(&self, _attacker: &StatEntity, amount: f64) -> f64 {
        amount // Default: no change
    }

    /// Scale incoming damage before mitigation.
    fn on_damage_taken(&self, _target: &StatEntity, amount: f64) -> f64 {
        amount // Default: no change
    }

    /// React to a resolved hit.
    fn on_hit(&self, _attacker: &StatEntity, _target: &StatEntity, _outcome: &DamageOutcome) -> OnHit {
        OnHit::default()
    }

    /// Ultimate fired once the attacker's charge is full.
    fn ultimate(&self) -> Option<Ultimate> {
        None
    }
}

/// Damage types understood by the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DamageKind {
    #[default]
    Generic,
    Fire,
    Light,
    Wind,
}

impl DamageKind {
    /// Resolves the strategy backing this damage type.
    pub fn strategy(&self) -> &'static dyn DamageTypeStrategy {
        match self {
            Self::Generic => &Generic,
            Self::Fire => &Fire,
            Self::Light => &Light,
            Self::Wind => &Wind,
        }
    }
}

/// Generic: no element hooks.
#[derive(Clone, Copy, Debug)]
pub struct Generic;

impl DamageTypeStrategy for Generic {
    fn name(&self) -> &'static str {
        "Generic"
    }
}

/// Fire: hits harder the more HP the attacker is missing and leaves a burn.
#[derive(Clone, Copy, Debug)]
pub struct Fire;

impl Fire {
    const BURN_TURNS: u32 = 3;
    const BURN_DIVISOR: u64 = 10;
}

impl DamageTypeStrategy for Fire {
    fn name(&self) -> &'static str {
        "Fire"
    }

    fn on_damage(&self, attacker: &StatEntity, amount: f64) -> f64 {
        let missing = (1.0 - attacker.hp_fraction()).clamp(0.0, 1.0);
        amount * (1.0 + missing)
    }

    fn on_hit(&self, attacker: &StatEntity, _target: &StatEntity, outcome: &DamageOutcome) -> OnHit {
        if outcome.hp_damage == 0 {
            return OnHit::default();
        }
        let burn = (outcome.hp_damage / Self::BURN_DIVISOR).max(1);
        OnHit {
            bonus_turn: false,
            damage_over_time: Some(
                DamageOverTime::new("fire_burn", burn, Self::BURN_TURNS).with_source(attacker.id),
            ),
        }
    }
}

/// Light: ultimate mends the whole party.
#[derive(Clone, Copy, Debug)]
pub struct Light;

impl DamageTypeStrategy for Light {
    fn name(&self) -> &'static str {
        "Light"
    }

    fn ultimate(&self) -> Option<Ultimate> {
        Some(Ultimate::HealAllies { fraction: 0.25 })
    }
}

/// Wind: critical hits grant an immediate extra turn; ultimate hits every foe.
#[derive(Clone, Copy, Debug)]
pub struct Wind;

impl DamageTypeStrategy for Wind {
    fn name(&self) -> &'static str {
        "Wind"
    }

    fn on_hit(&self, _attacker: &StatEntity, _target: &StatEntity, outcome: &DamageOutcome) -> OnHit {
        OnHit {
            bonus_turn: outcome.critical,
            damage_over_time: None,
        }
    }

    fn ultimate(&self) -> Option<Ultimate> {
        Some(Ultimate::SweepFoes { scale: 0.6 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{BaseStats, CombatantId, Side};

    fn attacker() -> StatEntity {
        StatEntity::new(CombatantId(1), "A", Side::Party, BaseStats::default())
    }

    #[test]
    fn generic_hooks_are_no_ops() {
        let strategy = DamageKind::Generic.strategy();
        let a = attacker();
        assert_eq!(strategy.on_damage(&a, 42.0), 42.0);
        assert_eq!(strategy.on_damage_taken(&a, 42.0), 42.0);
        assert_eq!(
            strategy.on_hit(&a, &a, &DamageOutcome::default()),
            OnHit::default()
        );
        assert!(strategy.ultimate().is_none());
    }

    #[test]
    fn fire_scales_with_missing_hp() {
        let mut a = attacker();
        assert_eq!(Fire.on_damage(&a, 100.0), 100.0);
        a.hp = 500;
        assert_eq!(Fire.on_damage(&a, 100.0), 150.0);
    }

    #[test]
    fn fire_burn_follows_hp_damage() {
        let a = attacker();
        let outcome = DamageOutcome {
            amount: 95,
            hp_damage: 95,
            ..DamageOutcome::default()
        };
        let dot = Fire.on_hit(&a, &a, &outcome).damage_over_time.unwrap();
        assert_eq!(dot.damage, 9);
        assert_eq!(dot.turns, 3);
        assert_eq!(dot.source, Some(CombatantId(1)));
    }

    #[test]
    fn wind_crit_grants_bonus_turn() {
        let a = attacker();
        let crit = DamageOutcome {
            critical: true,
            ..DamageOutcome::default()
        };
        assert!(Wind.on_hit(&a, &a, &crit).bonus_turn);
        assert!(!Wind.on_hit(&a, &a, &DamageOutcome::default()).bonus_turn);
    }
}
