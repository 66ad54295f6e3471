//! Recent-event history per actor and timeout artifacts.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use battle_core::CombatantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::ProgressSnapshot;
use crate::session::{RunId, SessionId};

/// Bounded log of what each actor recently did.
#[derive(Debug, Clone)]
pub struct TurnRecorder {
    capacity: usize,
    history: HashMap<CombatantId, VecDeque<String>>,
}

impl TurnRecorder {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            history: HashMap::new(),
        }
    }

    pub fn record(&mut self, actor: CombatantId, line: impl Into<String>) {
        let entries = self.history.entry(actor).or_default();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(line.into());
    }

    /// Recent entries for `actor`, oldest first.
    pub fn history(&self, actor: CombatantId) -> Vec<String> {
        self.history
            .get(&actor)
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Dump written when an actor's turn exceeds the timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticArtifact {
    pub run_id: RunId,
    pub session: SessionId,
    pub actor: CombatantId,
    pub actor_name: String,
    pub turn: u32,
    pub timeout_ms: u64,
    pub created_at: DateTime<Utc>,
    pub recent_events: Vec<String>,
    pub snapshot: ProgressSnapshot,
}

impl DiagnosticArtifact {
    /// `timeout_<run>_<actor>_<turn>.json`, with path-unsafe run id characters replaced.
    pub fn file_name(&self) -> String {
        let run: String = self
            .run_id
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        format!("timeout_{}_{}_{}.json", run, self.actor.0, self.turn)
    }

    /// Writes the artifact as pretty JSON under `dir`, creating it if needed.
    pub async fn write(&self, dir: &Path) -> std::io::Result<PathBuf> {
        let json = serde_json::to_vec_pretty(self).map_err(std::io::Error::other)?;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(self.file_name());
        tokio::fs::write(&path, json).await?;
        Ok(path)
    }
}
