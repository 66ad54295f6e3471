//! Event types for different topics.

use battle_core::{
    ActionQueue, CombatantId, DamageOutcome, EnrageState, HealOutcome, Side, StatEntity,
};
use serde::{Deserialize, Serialize};

use crate::orchestrator::BattlePhase;
use crate::session::{RunId, SessionId};

/// Read-only view of one combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantView {
    pub id: CombatantId,
    pub name: String,
    pub side: Side,
    pub hp: u64,
    pub max_hp: u64,
    pub shields: u64,
    pub alive: bool,
    pub ultimate_charge: u32,
    pub ultimate_ready: bool,
    pub effects: Vec<String>,
}

impl From<&StatEntity> for CombatantView {
    fn from(entity: &StatEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name.clone(),
            side: entity.side,
            hp: entity.hp,
            max_hp: entity.max_hp(),
            shields: entity.shields,
            alive: entity.is_alive(),
            ultimate_charge: entity.ultimate_charge,
            ultimate_ready: entity.ultimate_ready,
            effects: entity.effects().iter().map(|effect| effect.name.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrageView {
    pub active: bool,
    pub stacks: u32,
    pub percent: f64,
}

impl From<&EnrageState> for EnrageView {
    fn from(state: &EnrageState) -> Self {
        Self {
            active: state.is_active(),
            stacks: state.stacks(),
            percent: state.percent(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueueView {
    pub id: CombatantId,
    pub action_value: f64,
}

/// Structured battle state emitted after every state-changing step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub run_id: RunId,
    pub session: SessionId,
    pub turn: u32,
    pub phase: BattlePhase,
    pub party: Vec<CombatantView>,
    pub foes: Vec<CombatantView>,
    pub enrage: EnrageView,
    pub action_queue: Vec<QueueView>,
    pub active_actor: Option<CombatantId>,
}

impl ProgressSnapshot {
    #[allow(clippy::too_many_arguments)]
    pub fn capture(
        run_id: &RunId,
        session: SessionId,
        turn: u32,
        phase: BattlePhase,
        combatants: &[StatEntity],
        enrage: &EnrageState,
        queue: &ActionQueue,
        active_actor: Option<CombatantId>,
    ) -> Self {
        let side = |side: Side| {
            combatants
                .iter()
                .filter(|entity| entity.side == side)
                .map(CombatantView::from)
                .collect()
        };
        Self {
            run_id: run_id.clone(),
            session,
            turn,
            phase,
            party: side(Side::Party),
            foes: side(Side::Foe),
            enrage: EnrageView::from(enrage),
            action_queue: queue
                .preview()
                .into_iter()
                .map(|entry| QueueView {
                    id: entry.id,
                    action_value: entry.action_value,
                })
                .collect(),
            active_actor,
        }
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&CombatantView> {
        self.party.iter().chain(&self.foes).find(|view| view.id == id)
    }
}

/// Individual combat resolutions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    Damage {
        turn: u32,
        attacker: CombatantId,
        target: CombatantId,
        outcome: DamageOutcome,
    },
    Healing {
        turn: u32,
        healer: CombatantId,
        target: CombatantId,
        outcome: HealOutcome,
    },
    EffectDamage {
        turn: u32,
        target: CombatantId,
        amount: u64,
    },
    Defeated {
        turn: u32,
        combatant: CombatantId,
    },
    BonusTurn {
        turn: u32,
        actor: CombatantId,
    },
    Ultimate {
        turn: u32,
        actor: CombatantId,
        kind: String,
    },
    Summoned {
        turn: u32,
        summoner: CombatantId,
        summon: CombatantId,
    },
    EnrageActivated {
        turn: u32,
    },
    EnrageBleed {
        turn: u32,
        stacks: u32,
    },
}

/// Session lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    Started {
        run_id: RunId,
        session: SessionId,
    },
    Completed {
        run_id: RunId,
        session: SessionId,
        victory: bool,
        turns: u32,
    },
    Failed {
        run_id: RunId,
        session: SessionId,
        reason: String,
    },
}
