//! Common error infrastructure for battle-core.
//!
//! Domain-specific errors (e.g. [`crate::engine::QueueError`]) are defined next
//! to the component that raises them. This module provides the shared
//! severity classification the runtime uses to decide between absorbing a
//! failure locally and tearing a session down.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the encounter continues (dodge, no valid target, empty reward roll)
/// - **Validation**: caller supplied inconsistent input (unknown combatant, unknown catalog id)
/// - **SessionFatal**: the encounter must end without rewards
/// - **Internal**: an invariant was violated; indicates a bug
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    SessionFatal,
    Internal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::SessionFatal => "session-fatal",
            Self::Internal => "internal",
        }
    }

    /// Returns true if the encounter may continue after this error.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error must end the session.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::SessionFatal | Self::Internal)
    }
}

/// Common trait for all battle-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
