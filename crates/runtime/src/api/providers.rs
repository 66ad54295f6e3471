//! Asynchronous abstraction for sourcing combatant intent.
//!
//! Runtime users plug in [`ActionProvider`] implementations so the turn loop
//! can run with human input, scripted fixtures, or AI policies.
use async_trait::async_trait;
use battle_core::{CombatantId, StatEntity};

use super::errors::Result;
use crate::events::ProgressSnapshot;

/// What an actor does with one action point.
#[derive(Clone, Debug, PartialEq)]
pub enum TurnAction {
    /// Basic attack. `None` lets the orchestrator pick an aggro-weighted target.
    Attack { target: Option<CombatantId> },
    /// Brings a new combatant onto the actor's side.
    Summon(Box<StatEntity>),
    /// Spend the action point doing nothing.
    Wait,
}

/// Trait for providing actions based on the current battle view.
///
/// Different implementations can handle:
/// - Player input (from UI/CLI)
/// - Foe AI decisions
/// - Scripted/replayed actions
/// - Testing fixtures
#[async_trait]
pub trait ActionProvider: Send + Sync {
    /// Provide an action for `actor` given a read-only battle snapshot.
    async fn provide_action(&self, actor: CombatantId, view: &ProgressSnapshot) -> Result<TurnAction>;
}

/// Attacks an aggro-weighted target every time.
pub struct AutoActionProvider;

#[async_trait]
impl ActionProvider for AutoActionProvider {
    async fn provide_action(&self, _actor: CombatantId, _view: &ProgressSnapshot) -> Result<TurnAction> {
        Ok(TurnAction::Attack { target: None })
    }
}

/// A provider that always waits. Useful for testing or as a fallback.
pub struct WaitActionProvider;

#[async_trait]
impl ActionProvider for WaitActionProvider {
    async fn provide_action(&self, _actor: CombatantId, _view: &ProgressSnapshot) -> Result<TurnAction> {
        Ok(TurnAction::Wait)
    }
}
