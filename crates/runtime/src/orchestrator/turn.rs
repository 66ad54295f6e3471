//! A single actor's turn: action points, attacks, ultimates and escalation.

use battle_core::{
    CombatantId, EnrageState, Side, StatEntity, StatKind, StatModifier, Ultimate, apply_damage, apply_healing,
};
use tracing::{debug, info, trace, warn};

use super::Battle;
use crate::api::{Result, RuntimeError, TurnAction};
use crate::events::CombatEvent;

impl Battle {
    /// Spends every action point of `actor`, then ticks its effects.
    pub(super) async fn take_turn(&mut self, actor: CombatantId) -> Result<()> {
        let enrage_percent = self.enrage.percent();
        let Some(entity) = self.combatants.get_mut(actor) else {
            return Ok(());
        };
        if !entity.is_alive() {
            return Ok(());
        }
        let side = entity.side;
        entity.action_points = entity.actions_per_turn.max(1);

        let regain = entity.regain();
        if regain > 0.0 {
            let vitality = entity.vitality();
            let outcome = apply_healing(vitality, entity, regain, enrage_percent);
            if outcome.healed > 0 || outcome.shield_gained > 0 {
                self.publish(CombatEvent::Healing {
                    turn: self.turn,
                    healer: actor,
                    target: actor,
                    outcome,
                });
            }
        }
        self.recorder.record(actor, format!("turn {}: started", self.turn));

        let provider = self.providers.for_side(side);
        while self.has_action_point(actor) && !self.is_decided() {
            if !self.try_ultimate(actor) {
                let view = self.snapshot(Some(actor));
                let action = provider
                    .provide_action(actor, &view)
                    .await
                    .map_err(|err| match err {
                        RuntimeError::Provider { .. } => err,
                        other => RuntimeError::Provider {
                            kind: side.into(),
                            reason: other.to_string(),
                        },
                    })?;
                self.perform(actor, side, action);
            }

            let cap = self.config.ultimate_charge_cap;
            if let Some(entity) = self.combatants.get_mut(actor) {
                entity.action_points = entity.action_points.saturating_sub(1);
                if entity.add_ultimate_charge(1, cap) {
                    debug!(target: "runtime::orchestrator", %actor, "Ultimate ready");
                }
            }

            if !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
        }

        self.tick_effects(actor)?;
        self.prune_summons();
        Ok(())
    }

    fn has_action_point(&self, actor: CombatantId) -> bool {
        self.combatants
            .get(actor)
            .is_some_and(|entity| entity.is_alive() && entity.action_points > 0)
    }

    fn perform(&mut self, actor: CombatantId, side: Side, action: TurnAction) {
        match action {
            TurnAction::Attack { target } => {
                let target = target
                    .filter(|id| {
                        self.combatants
                            .get(*id)
                            .is_some_and(|e| e.side != side && e.is_alive())
                    })
                    .or_else(|| self.combatants.pick_target(side.opposite(), &mut self.rng));
                match target {
                    Some(target) => self.attack(actor, target, 1.0),
                    None => debug!(target: "runtime::orchestrator", %actor, "No valid target"),
                }
            }
            TurnAction::Summon(summon) => self.summon(actor, side, *summon),
            TurnAction::Wait => {
                trace!(target: "runtime::orchestrator", %actor, "Waiting");
                self.recorder.record(actor, format!("turn {}: waited", self.turn));
            }
        }
    }

    /// Resolves one hit, strategy hooks included.
    fn attack(&mut self, actor: CombatantId, target: CombatantId, scale: f64) {
        let enrage_percent = self.enrage.percent();
        let Some((attacker, defender)) = self.combatants.pair_mut(actor, target) else {
            return;
        };
        if !attacker.is_alive() || !defender.is_alive() {
            return;
        }

        let attacker_strategy = attacker.damage_kind.strategy();
        let raw = attacker_strategy.on_damage(attacker, attacker.atk() * scale);
        let raw = defender.damage_kind.strategy().on_damage_taken(defender, raw);
        let outcome = apply_damage(attacker, defender, raw, enrage_percent, &mut self.rng);
        let on_hit = if outcome.dodged {
            Default::default()
        } else {
            attacker_strategy.on_hit(attacker, defender, &outcome)
        };
        let attacker_name = attacker.name.clone();
        let defender_name = defender.name.clone();

        let line = if outcome.dodged {
            format!("turn {}: {} dodged {}", self.turn, defender_name, attacker_name)
        } else {
            format!(
                "turn {}: {} hit {} for {}{}",
                self.turn,
                attacker_name,
                defender_name,
                outcome.amount,
                if outcome.critical { " (crit)" } else { "" }
            )
        };
        self.recorder.record(actor, line.clone());
        self.recorder.record(target, line);
        self.publish(CombatEvent::Damage {
            turn: self.turn,
            attacker: actor,
            target,
            outcome: outcome.clone(),
        });

        if on_hit.bonus_turn {
            match self.queue.grant_bonus_turn(actor) {
                Ok(()) => self.publish(CombatEvent::BonusTurn {
                    turn: self.turn,
                    actor,
                }),
                Err(err) => warn!(target: "runtime::orchestrator", error = %err, "Bonus turn dropped"),
            }
        }
        if let Some(dot) = on_hit.damage_over_time
            && !outcome.killed
        {
            self.effects.add_dot(target, dot.with_source(actor));
        }
        if outcome.killed {
            self.handle_death(target, Some(actor));
        }
    }

    /// Fires the actor's ultimate if it is charged and its damage type has one.
    fn try_ultimate(&mut self, actor: CombatantId) -> bool {
        let Some(entity) = self.combatants.get_mut(actor) else {
            return false;
        };
        if !entity.ultimate_ready {
            return false;
        }
        let strategy = entity.damage_kind.strategy();
        let Some(ultimate) = strategy.ultimate() else {
            return false;
        };
        entity.consume_ultimate();
        let side = entity.side;
        let vitality = entity.vitality();

        info!(target: "runtime::orchestrator", %actor, kind = strategy.name(), turn = self.turn, "Ultimate fired");
        self.recorder
            .record(actor, format!("turn {}: ultimate {}", self.turn, strategy.name()));
        self.publish(CombatEvent::Ultimate {
            turn: self.turn,
            actor,
            kind: strategy.name().to_string(),
        });

        match ultimate {
            Ultimate::HealAllies { fraction } => {
                let enrage_percent = self.enrage.percent();
                for ally in self.combatants.living_ids(side) {
                    let Some(target) = self.combatants.get_mut(ally) else {
                        continue;
                    };
                    let amount = target.max_hp() as f64 * fraction;
                    let outcome = apply_healing(vitality, target, amount, enrage_percent);
                    self.publish(CombatEvent::Healing {
                        turn: self.turn,
                        healer: actor,
                        target: ally,
                        outcome,
                    });
                }
            }
            Ultimate::SweepFoes { scale } => {
                for foe in self.combatants.living_ids(side.opposite()) {
                    self.attack(actor, foe, scale);
                }
            }
        }
        true
    }

    fn summon(&mut self, summoner: CombatantId, side: Side, mut summon: StatEntity) {
        if self.combatants.contains(summon.id) {
            warn!(target: "runtime::orchestrator", %summoner, summon = %summon.id, "Summon id already in use");
            return;
        }
        summon.side = side;
        let id = summon.id;
        self.queue.insert(id, summon.speed());
        self.combatants.push(summon);
        self.summons.insert(id);
        self.sync_action_values();

        debug!(target: "runtime::orchestrator", %summoner, summon = %id, "Summoned");
        self.recorder.record(summoner, format!("turn {}: summoned {}", self.turn, id));
        self.publish(CombatEvent::Summoned {
            turn: self.turn,
            summoner,
            summon: id,
        });
    }

    /// Marks a combatant dead and credits unique foe kills.
    fn handle_death(&mut self, id: CombatantId, killer: Option<CombatantId>) {
        self.queue.set_alive(id, false);
        self.publish(CombatEvent::Defeated {
            turn: self.turn,
            combatant: id,
        });

        let is_foe = self.combatants.get(id).is_some_and(|e| e.side == Side::Foe);
        if is_foe && !self.summons.contains(&id) && self.credited.insert(id) {
            self.rare_drop_rate += self.config.rdr_per_kill;
            debug!(
                target: "runtime::orchestrator",
                foe = %id,
                killer = ?killer,
                rare_drop_rate = self.rare_drop_rate,
                "Foe defeated"
            );
        }
    }

    fn tick_effects(&mut self, actor: CombatantId) -> Result<()> {
        let Some(entity) = self.combatants.get_mut(actor) else {
            return Ok(());
        };
        let report = self.effects.tick(entity);
        let speed = entity.speed();
        let alive = entity.is_alive();

        if report.dot_damage > 0 {
            self.publish(CombatEvent::EffectDamage {
                turn: self.turn,
                target: actor,
                amount: report.dot_damage,
            });
            self.recorder
                .record(actor, format!("turn {}: took {} effect damage", self.turn, report.dot_damage));
        }
        if report.died {
            self.handle_death(actor, None);
        }
        if alive && !report.expired_modifiers.is_empty() {
            self.queue.refresh_speed(actor, speed)?;
        }
        Ok(())
    }

    /// Drops dead summons from the queue and the field.
    fn prune_summons(&mut self) {
        let dead: Vec<CombatantId> = self
            .summons
            .iter()
            .copied()
            .filter(|id| self.combatants.get(*id).is_none_or(|e| !e.is_alive()))
            .collect();
        for id in dead {
            self.queue.remove(id);
            self.combatants.remove(id);
            self.summons.remove(&id);
        }
    }

    /// Advances enrage and applies its effects to the field.
    pub(super) fn escalate(&mut self) {
        let update = self.enrage.update(self.turn);
        if update.activated {
            self.publish(CombatEvent::EnrageActivated { turn: self.turn });
        }

        if update.stacks_changed {
            let multiplier = self.enrage.attack_multiplier();
            for foe in self.combatants.iter_mut().filter(|e| e.side == Side::Foe && e.is_alive()) {
                let modifier = StatModifier::new(EnrageState::ATTACK_MODIFIER_ID, StatModifier::PERMANENT)
                    .with_multiplier(StatKind::Atk, multiplier)
                    .bypassing_diminishing();
                self.effects.add_modifier(foe, modifier);
            }
        }

        if update.bleed_due {
            let stacks = self.enrage.stacks();
            for entity in self.combatants.iter().filter(|e| e.is_alive()) {
                self.effects.add_dot(entity.id, self.enrage.bleed_for(entity));
            }
            info!(target: "runtime::orchestrator", turn = self.turn, stacks, "Enrage bleed applied");
            self.publish(CombatEvent::EnrageBleed {
                turn: self.turn,
                stacks,
            });
        }
    }
}
