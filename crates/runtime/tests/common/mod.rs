#![allow(dead_code)]

use std::time::Duration;

use async_trait::async_trait;
use battle_core::{BaseStats, CombatantId, RosterSnapshot, Side, StatEntity};
use battle_runtime::{ActionProvider, ProgressSnapshot, Result, RuntimeConfig, RuntimeError, TurnAction};

pub fn config() -> RuntimeConfig {
    RuntimeConfig::default().with_seed(7)
}

/// Party member that one-shots anything with default defense.
pub fn hero(id: u32) -> StatEntity {
    let stats = BaseStats {
        atk: 2000.0,
        speed: 200.0,
        dodge_odds: 0.0,
        crit_rate: 0.0,
        ..BaseStats::default()
    };
    StatEntity::new(CombatantId(id), format!("hero-{id}"), Side::Party, stats)
}

pub fn weakling(id: u32) -> StatEntity {
    let stats = BaseStats {
        max_hp: 10.0,
        atk: 1.0,
        dodge_odds: 0.0,
        crit_rate: 0.0,
        ..BaseStats::default()
    };
    StatEntity::new(CombatantId(id), format!("weakling-{id}"), Side::Party, stats)
}

pub fn slime(id: u32) -> StatEntity {
    let stats = BaseStats {
        max_hp: 100.0,
        atk: 10.0,
        dodge_odds: 0.0,
        crit_rate: 0.0,
        ..BaseStats::default()
    };
    StatEntity::new(CombatantId(id), format!("slime-{id}"), Side::Foe, stats).with_level(3)
}

pub fn brute(id: u32) -> StatEntity {
    let stats = BaseStats {
        atk: 5000.0,
        dodge_odds: 0.0,
        crit_rate: 0.0,
        ..BaseStats::default()
    };
    StatEntity::new(CombatantId(id), format!("brute-{id}"), Side::Foe, stats)
}

/// Sturdy party member that regains HP every turn.
pub fn guardian(id: u32) -> StatEntity {
    let stats = BaseStats {
        max_hp: 100_000.0,
        regain: 50.0,
        dodge_odds: 0.0,
        crit_rate: 0.0,
        ..BaseStats::default()
    };
    StatEntity::new(CombatantId(id), format!("guardian-{id}"), Side::Party, stats)
}

/// Foe whose unenraged hit lands for exactly 16 against default defense.
pub fn bruiser(id: u32) -> StatEntity {
    let stats = BaseStats {
        atk: 200.0,
        dodge_odds: 0.0,
        crit_rate: 0.0,
        ..BaseStats::default()
    };
    StatEntity::new(CombatantId(id), format!("bruiser-{id}"), Side::Foe, stats)
}

pub fn roster(run_id: &str, party: Vec<StatEntity>) -> RosterSnapshot {
    RosterSnapshot::new(run_id, party)
}

/// Sleeps before attacking, to stall a turn.
pub struct SlowProvider(pub Duration);

#[async_trait]
impl ActionProvider for SlowProvider {
    async fn provide_action(&self, _actor: CombatantId, _view: &ProgressSnapshot) -> Result<TurnAction> {
        tokio::time::sleep(self.0).await;
        Ok(TurnAction::Attack { target: None })
    }
}

/// Fails on the first request.
pub struct FailingProvider;

#[async_trait]
impl ActionProvider for FailingProvider {
    async fn provide_action(&self, _actor: CombatantId, _view: &ProgressSnapshot) -> Result<TurnAction> {
        Err(RuntimeError::InvalidEncounter("script exhausted".into()))
    }
}
