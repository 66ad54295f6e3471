//! Async orchestration for battle encounters.
//!
//! This crate drives the synchronous rules in `battle-core` through a turn
//! loop with per-turn timeouts, cross-session abort and persistence hooks.
//! Consumers embed [`BattleRuntime`] to start encounters, subscribe to events
//! and query session status.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the facade and builder
//! - [`api`] exposes errors and the action-provider abstraction
//! - [`orchestrator`] runs a single encounter's turn loop
//! - [`session`] tracks run-id claims, abort signals and session status
//! - [`events`] provides the topic-based event bus
//! - [`repository`] persists rosters between battles
//! - [`diagnostics`] records recent actor history and writes timeout artifacts
pub mod api;
pub mod config;
pub mod diagnostics;
pub mod encounter;
pub mod events;
pub mod orchestrator;
pub mod repository;
pub mod runtime;
pub mod session;

pub use api::{
    ActionProvider, AutoActionProvider, ProviderKind, Result, RuntimeError, TurnAction,
    WaitActionProvider,
};
pub use config::RuntimeConfig;
pub use diagnostics::{DiagnosticArtifact, TurnRecorder};
pub use encounter::{BattleOutcome, EncounterInput, EncounterMeta, ProgressCallback};
pub use events::{
    CombatEvent, CombatantView, EnrageView, Event, EventBus, ProgressSnapshot, QueueView,
    SessionEvent, Topic,
};
pub use orchestrator::{Battle, BattlePhase, Providers};
pub use repository::{
    FileRosterRepository, InMemoryRosterRepository, RepositoryError, RosterRepository,
};
pub use runtime::{BattleHandle, BattleRuntime, BattleRuntimeBuilder};
pub use session::{AbortSignal, RunId, SessionClaim, SessionId, SessionRegistry, SessionStatus};
