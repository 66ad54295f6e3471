//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from the turn loop, session claims, repositories and
//! action providers so callers get one typed failure per encounter.
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use battle_core::{BattleError, CombatantId, ErrorSeverity, QueueError};
use thiserror::Error;

pub use crate::repository::RepositoryError;
use crate::session::{RunId, SessionId};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("another battle claimed run {run_id}; both sessions were aborted")]
    ConcurrentSession { run_id: RunId },

    #[error("battle session {session} for run {run_id} was aborted")]
    Aborted { run_id: RunId, session: SessionId },

    #[error("actor {actor} exceeded the {timeout:?} turn timeout on turn {turn}")]
    TurnTimeout {
        actor: CombatantId,
        turn: u32,
        timeout: Duration,
        /// Diagnostic dump, when it could be written.
        artifact: Option<PathBuf>,
    },

    #[error("invalid encounter: {0}")]
    InvalidEncounter(String),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("no roster stored for run {0}")]
    RosterNotFound(RunId),

    #[error("{kind} action provider failed: {reason}")]
    Provider { kind: ProviderKind, reason: String },

    #[error("battle task join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

impl RuntimeError {
    /// True if the encounter ended without rewards because of this error.
    pub fn is_session_fatal(&self) -> bool {
        self.severity().is_fatal()
    }

    /// Generic message suitable for end users.
    pub fn user_message(&self) -> &'static str {
        "battle error"
    }
}

impl BattleError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ConcurrentSession { .. } | Self::Aborted { .. } | Self::TurnTimeout { .. } => {
                ErrorSeverity::SessionFatal
            }
            Self::InvalidEncounter(_) | Self::RosterNotFound(_) => ErrorSeverity::Validation,
            Self::Queue(err) => err.severity(),
            Self::Provider { .. } | Self::Repository(_) => ErrorSeverity::SessionFatal,
            Self::WorkerJoin(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ConcurrentSession { .. } => "runtime.concurrent_session",
            Self::Aborted { .. } => "runtime.aborted",
            Self::TurnTimeout { .. } => "runtime.turn_timeout",
            Self::InvalidEncounter(_) => "runtime.invalid_encounter",
            Self::Queue(err) => err.error_code(),
            Self::Repository(_) => "runtime.repository",
            Self::RosterNotFound(_) => "runtime.roster_not_found",
            Self::Provider { .. } => "runtime.provider",
            Self::WorkerJoin(_) => "runtime.worker_join",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    Party,
    Foe,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProviderKind::Party => "party",
            ProviderKind::Foe => "foe",
        };
        write!(f, "{}", label)
    }
}

impl From<battle_core::Side> for ProviderKind {
    fn from(side: battle_core::Side) -> Self {
        match side {
            battle_core::Side::Party => Self::Party,
            battle_core::Side::Foe => Self::Foe,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_failures_are_fatal_and_generic() {
        let err = RuntimeError::TurnTimeout {
            actor: CombatantId(3),
            turn: 12,
            timeout: Duration::from_secs(35),
            artifact: None,
        };
        assert!(err.is_session_fatal());
        assert_eq!(err.error_code(), "runtime.turn_timeout");
        assert_eq!(err.user_message(), "battle error");
        assert!(err.to_string().contains("actor #3"));
    }

    #[test]
    fn empty_queue_is_recoverable() {
        let err = RuntimeError::from(QueueError::Empty);
        assert!(!err.is_session_fatal());
        assert!(err.severity().is_recoverable());
    }

    #[test]
    fn provider_failures_name_their_side() {
        let err = RuntimeError::Provider {
            kind: battle_core::Side::Foe.into(),
            reason: "script exhausted".into(),
        };
        assert!(err.is_session_fatal());
        assert_eq!(err.error_code(), "runtime.provider");
        assert_eq!(err.to_string(), "foe action provider failed: script exhausted");
    }
}
