use battle_core::{
    ActionQueue, BaseStats, CombatantId, DiminishingRule, DiminishingTable, Side, StatEntity,
    StatKind, StatModifier, apply_damage, apply_healing, mitigate,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn entity(id: u32, side: Side, hp: f64, defense: f64) -> StatEntity {
    let mut base = BaseStats::default();
    base.max_hp = hp;
    base.defense = defense;
    StatEntity::new(CombatantId(id), "E", side, base)
}

proptest! {
    #[test]
    fn mitigation_is_finite_and_non_negative(
        raw in prop::num::f64::ANY,
        vitality in prop::num::f64::ANY,
        defense in prop::num::f64::ANY,
        target_vitality in prop::num::f64::ANY,
        mitigation in prop::num::f64::ANY,
    ) {
        let result = mitigate(raw, vitality, defense, target_vitality, mitigation);
        prop_assert!(result.is_finite());
        prop_assert!(result >= 0.0);
    }

    #[test]
    fn mitigation_is_monotonic_in_raw(a in 0.0f64..1e6, b in 0.0f64..1e6, defense in 0.0f64..1e4) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(mitigate(low, 1.0, defense, 1.0, 1.0) <= mitigate(high, 1.0, defense, 1.0, 1.0));
    }

    #[test]
    fn damage_never_heals(seed in any::<u64>(), atk in 0.0f64..1e5, defense in 0.0f64..1e4, shields in 0u64..1000) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let attacker = entity(1, Side::Party, 1000.0, 0.0);
        let mut target = entity(2, Side::Foe, 5000.0, defense);
        target.shields = shields;

        let outcome = apply_damage(&attacker, &mut target, atk, 0.0, &mut rng);

        prop_assert!(target.hp <= 5000);
        prop_assert!(target.shields <= shields);
        prop_assert_eq!(outcome.shield_absorbed + outcome.hp_damage + outcome.overkill, outcome.amount);
        if atk > 0.0 && !outcome.dodged {
            prop_assert!(outcome.amount >= 1);
        }
    }

    #[test]
    fn healing_never_lowers_hp(hp in 1u64..1000, amount in -100.0f64..5000.0, enrage in 0.0f64..10.0) {
        let mut target = entity(1, Side::Party, 1000.0, 0.0).with_hp(hp);
        let outcome = apply_healing(1.0, &mut target, amount, enrage);
        prop_assert!(target.hp >= hp);
        prop_assert!(target.hp <= target.max_hp());
        prop_assert_eq!(target.hp - hp, outcome.healed);
    }

    #[test]
    fn diminishing_effectiveness_is_monotonic(a in 0.0f64..1e5, b in 0.0f64..1e5) {
        let rule = DiminishingRule::new(500.0, 2.0, 0.0);
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let (e_low, e_high) = (rule.effectiveness(low), rule.effectiveness(high));
        prop_assert!(e_high <= e_low);
        prop_assert!((DiminishingRule::MIN_EFFECTIVENESS..=1.0).contains(&e_high));
    }

    #[test]
    fn modifier_removal_restores_stats(
        atk in 0.0f64..5000.0,
        delta in -500.0f64..500.0,
        multiplier in 0.1f64..3.0,
    ) {
        let mut target = entity(1, Side::Party, 1000.0, 50.0);
        target.base.atk = atk;
        let before: Vec<f64> = [StatKind::Atk, StatKind::Defense, StatKind::Speed]
            .iter()
            .map(|&stat| target.stat(stat))
            .collect();

        let mut modifier = StatModifier::new("buff", 3)
            .with_delta(StatKind::Atk, delta)
            .with_multiplier(StatKind::Defense, multiplier);
        modifier.apply(&mut target, &DiminishingTable::default());
        modifier.remove(&mut target);

        let after: Vec<f64> = [StatKind::Atk, StatKind::Defense, StatKind::Speed]
            .iter()
            .map(|&stat| target.stat(stat))
            .collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn every_living_combatant_eventually_acts(speeds in prop::collection::vec(1.0f64..400.0, 1..8)) {
        let mut queue = ActionQueue::new(10_000.0);
        for (i, &speed) in speeds.iter().enumerate() {
            queue.insert(CombatantId(i as u32), speed);
        }

        let mut seen = vec![false; speeds.len()];
        // Within one gauge of the slowest combatant, every other combatant
        // acts at most speed + 1 times.
        for _ in 0..(speeds.len() * 400 + 1) {
            let id = queue.next_actor().unwrap();
            seen[id.0 as usize] = true;
            if seen.iter().all(|&s| s) {
                break;
            }
        }
        prop_assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn equal_speeds_rotate_in_insertion_order(speed in 1.0f64..400.0, count in 1usize..8, rounds in 1usize..5) {
        let mut queue = ActionQueue::new(10_000.0);
        for i in 0..count {
            queue.insert(CombatantId(i as u32), speed);
        }

        for turn in 0..count * rounds {
            let id = queue.next_actor().unwrap();
            prop_assert_eq!(id, CombatantId((turn % count) as u32));
        }
    }
}
