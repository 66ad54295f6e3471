use rand::Rng;
use tracing::debug;

use super::EPSILON;
use crate::stats::StatEntity;

/// Result of a single hit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageOutcome {
    /// Final damage after mitigation, crit and enrage scaling.
    pub amount: u64,
    pub shield_absorbed: u64,
    pub hp_damage: u64,
    /// Damage past the target's remaining HP.
    pub overkill: u64,
    pub critical: bool,
    pub dodged: bool,
    /// The hit took the target from alive to dead.
    pub killed: bool,
}

/// Mitigation transform:
/// `min(raw, safe_cap)² · attacker_vitality / (defense² · target_vitality · target_mitigation)`.
///
/// `safe_cap = sqrt(f64::MAX / growth)` with `growth = attacker_vitality / divisor`
/// keeps the square from overflowing. Divisors are floored at [`EPSILON`].
/// Defense is clamped to `[0, f64::MAX]`, so infinite defense mitigates everything.
/// Never panics and never returns NaN; non-positive input yields zero.
pub fn mitigate(
    raw: f64,
    attacker_vitality: f64,
    defense: f64,
    target_vitality: f64,
    target_mitigation: f64,
) -> f64 {
    if raw.is_nan() || raw <= 0.0 {
        return 0.0;
    }

    let attacker_vitality = attacker_vitality.max(EPSILON);
    // NaN reads as no defense; infinite defense saturates.
    let defense = if defense.is_nan() { 0.0 } else { defense.clamp(0.0, f64::MAX) };
    let divisor = (defense * defense * target_vitality.max(EPSILON) * target_mitigation.max(EPSILON))
        .max(EPSILON);

    let growth = (attacker_vitality / divisor).min(f64::MAX);
    let safe_cap = (f64::MAX / growth).sqrt();
    let capped = raw.min(safe_cap);

    let mut mitigated = capped * capped * attacker_vitality / divisor;
    if !mitigated.is_finite() {
        mitigated = capped * growth * capped;
    }
    if mitigated.is_nan() {
        return 0.0;
    }
    mitigated.min(f64::MAX)
}

/// Resolves one hit of `raw` damage from `attacker` onto `target`.
///
/// Order: dodge draw, crit draw, mitigation, enrage scaling, floor to at least
/// one, then shields before HP. A dodge consumes no crit draw.
pub fn apply_damage<R: Rng + ?Sized>(
    attacker: &StatEntity,
    target: &mut StatEntity,
    raw: f64,
    enrage_percent: f64,
    rng: &mut R,
) -> DamageOutcome {
    let mut outcome = DamageOutcome::default();
    if !target.is_alive() || raw.is_nan() || raw <= 0.0 {
        return outcome;
    }

    if rng.gen_range(0.0..1.0) < target.dodge_odds() {
        outcome.dodged = true;
        debug!(target: "battle::combat", attacker = %attacker.id, target = %target.id, "Dodged");
        return outcome;
    }

    let mut amount = raw;
    if rng.gen_range(0.0..1.0) < attacker.crit_rate() {
        outcome.critical = true;
        amount *= attacker.crit_damage();
    }

    let mut mitigated = mitigate(
        amount,
        attacker.vitality(),
        target.defense(),
        target.vitality(),
        target.mitigation(),
    );
    if enrage_percent.is_finite() && enrage_percent > 0.0 {
        mitigated = (mitigated * (1.0 + enrage_percent)).min(f64::MAX);
    }

    // Saturating cast; any intended hit lands for at least one.
    let amount = (mitigated.floor() as u64).max(1);
    outcome.amount = amount;

    let absorbed = amount.min(target.shields);
    target.shields -= absorbed;
    outcome.shield_absorbed = absorbed;

    let remaining = amount - absorbed;
    let hp_damage = remaining.min(target.hp);
    target.hp -= hp_damage;
    outcome.hp_damage = hp_damage;
    outcome.overkill = remaining - hp_damage;
    outcome.killed = !target.is_alive();

    debug!(
        target: "battle::combat",
        attacker = %attacker.id,
        target = %target.id,
        amount,
        critical = outcome.critical,
        killed = outcome.killed,
        "Damage applied"
    );
    outcome
}
