//! Run-id claims, abort signals and externally visible session status.
//!
//! Every battle task registers a [`SessionClaim`] for its run id. Before each
//! turn the task calls [`SessionClaim::ensure_exclusive`]; if any other
//! session holds a claim on the same run, every claimant is aborted and
//! marked as failed. Neither side produces rewards.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{Result, RuntimeError};

/// Identifier of a persistent run (one party's save).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RunId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for RunId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of a single battle task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Externally visible state of a battle session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SessionStatus {
    Running,
    Completed,
    Error(String),
}

impl SessionStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Cooperative cancellation flag shared by a battle task and its registry.
///
/// Cloning is cheap; every clone observes the same flag.
#[derive(Clone, Debug)]
pub struct AbortSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl AbortSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Raises the flag. Idempotent.
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the flag is raised.
    pub async fn aborted(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so `wait_for` cannot fail here.
        let _ = rx.wait_for(|aborted| *aborted).await;
    }
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct ActiveSession {
    id: SessionId,
    abort: AbortSignal,
}

#[derive(Debug)]
struct SessionRecord {
    run_id: RunId,
    status: SessionStatus,
}

#[derive(Debug, Default)]
struct RegistryState {
    next_id: u64,
    active: HashMap<RunId, Vec<ActiveSession>>,
    records: HashMap<SessionId, SessionRecord>,
}

/// Shared registry of battle sessions.
#[derive(Clone, Debug, Default)]
pub struct SessionRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new session on `run_id`. Conflicts surface on the next
    /// [`SessionClaim::ensure_exclusive`] call of any claimant.
    pub fn claim(&self, run_id: RunId) -> SessionClaim {
        let abort = AbortSignal::new();
        let mut state = self.lock();
        state.next_id += 1;
        let id = SessionId(state.next_id);
        state.active.entry(run_id.clone()).or_default().push(ActiveSession {
            id,
            abort: abort.clone(),
        });
        state.records.insert(
            id,
            SessionRecord {
                run_id: run_id.clone(),
                status: SessionStatus::Running,
            },
        );
        drop(state);

        debug!(target: "runtime::session", %run_id, session = %id, "Session claimed");
        SessionClaim {
            registry: self.clone(),
            run_id,
            id,
            abort,
        }
    }

    pub fn status(&self, session: SessionId) -> Option<SessionStatus> {
        self.lock().records.get(&session).map(|record| record.status.clone())
    }

    /// Statuses of every session ever started for `run_id`, oldest first.
    pub fn run_statuses(&self, run_id: &RunId) -> Vec<(SessionId, SessionStatus)> {
        let state = self.lock();
        let mut statuses: Vec<(SessionId, SessionStatus)> = state
            .records
            .iter()
            .filter(|(_, record)| &record.run_id == run_id)
            .map(|(&id, record)| (id, record.status.clone()))
            .collect();
        statuses.sort_by_key(|(id, _)| *id);
        statuses
    }

    /// Number of live claims on `run_id`.
    pub fn active_count(&self, run_id: &RunId) -> usize {
        self.lock().active.get(run_id).map_or(0, Vec::len)
    }

    /// Aborts every live session on `run_id`.
    pub fn abort_run(&self, run_id: &RunId, reason: &str) -> usize {
        let mut state = self.lock();
        let ids: Vec<SessionId> = match state.active.get(run_id) {
            Some(sessions) => sessions
                .iter()
                .map(|session| {
                    session.abort.abort();
                    session.id
                })
                .collect(),
            None => return 0,
        };
        for id in &ids {
            if let Some(record) = state.records.get_mut(id) {
                record.status = SessionStatus::Error(reason.to_string());
            }
        }
        ids.len()
    }

    fn set_status(&self, session: SessionId, status: SessionStatus) {
        if let Some(record) = self.lock().records.get_mut(&session) {
            // An error recorded by a conflicting claimant is final.
            if !record.status.is_error() {
                record.status = status;
            }
        }
    }

    fn release(&self, run_id: &RunId, session: SessionId) {
        let mut state = self.lock();
        if let Some(sessions) = state.active.get_mut(run_id) {
            sessions.retain(|active| active.id != session);
            if sessions.is_empty() {
                state.active.remove(run_id);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // Registry state stays consistent even if a holder panicked.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A battle task's ownership claim on a run id.
///
/// Dropping the claim releases it; the recorded status is kept.
#[derive(Debug)]
pub struct SessionClaim {
    registry: SessionRegistry,
    run_id: RunId,
    id: SessionId,
    abort: AbortSignal,
}

impl SessionClaim {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn abort_signal(&self) -> AbortSignal {
        self.abort.clone()
    }

    /// Fails if this session was aborted or if another session claims the
    /// same run. On conflict every claimant, this one included, is aborted.
    pub fn ensure_exclusive(&self) -> Result<()> {
        if self.abort.is_aborted() {
            return Err(RuntimeError::Aborted {
                run_id: self.run_id.clone(),
                session: self.id,
            });
        }

        if self.registry.active_count(&self.run_id) > 1 {
            let aborted = self
                .registry
                .abort_run(&self.run_id, "concurrent battle on the same run");
            warn!(
                target: "runtime::session",
                run_id = %self.run_id,
                session = %self.id,
                aborted,
                "Concurrent battle detected, aborting every claimant"
            );
            return Err(RuntimeError::ConcurrentSession {
                run_id: self.run_id.clone(),
            });
        }
        Ok(())
    }

    pub fn complete(&self) {
        self.registry.set_status(self.id, SessionStatus::Completed);
    }

    pub fn fail(&self, reason: impl Into<String>) {
        self.registry.set_status(self.id, SessionStatus::Error(reason.into()));
    }
}

impl Drop for SessionClaim {
    fn drop(&mut self) {
        self.registry.release(&self.run_id, self.id);
        debug!(target: "runtime::session", run_id = %self.run_id, session = %self.id, "Session released");
    }
}
