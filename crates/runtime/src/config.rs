//! Runtime configuration structures and loaders.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use battle_core::BattleConfig;

/// Configuration shared by every encounter a runtime drives.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub battle: BattleConfig,
    /// Upper bound for a single actor turn; exceeding it fails the session.
    pub turn_timeout: Duration,
    /// Delay after each resolved action, for presentation layers.
    pub pacing: Duration,
    /// Directory receiving timeout diagnostics.
    pub diagnostics_dir: PathBuf,
    /// Recent events kept per actor for diagnostics.
    pub history_len: usize,
    /// Fixed RNG seed; `None` seeds from entropy per battle.
    pub seed: Option<u64>,
    pub event_buffer_size: usize,
}

impl RuntimeConfig {
    pub const TURN_TIMEOUT: Duration = Duration::from_secs(35);
    pub const HISTORY_LEN: usize = 32;
    pub const EVENT_BUFFER_SIZE: usize = 100;

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `BATTLE_TURN_TIMEOUT_SECS` - Per-turn timeout in seconds (default: 35)
    /// - `BATTLE_PACING_MS` - Delay after each action in milliseconds (default: 0)
    /// - `BATTLE_DIAGNOSTICS_DIR` - Directory for timeout artifacts (default: ./diagnostics)
    /// - `BATTLE_SEED` - Fixed RNG seed (default: random)
    /// - `BATTLE_EVENT_BUFFER` - Event bus capacity per topic (default: 100)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(secs) = read_env::<u64>("BATTLE_TURN_TIMEOUT_SECS") {
            config.turn_timeout = Duration::from_secs(secs.max(1));
        }

        if let Some(ms) = read_env::<u64>("BATTLE_PACING_MS") {
            config.pacing = Duration::from_millis(ms);
        }

        if let Ok(dir) = env::var("BATTLE_DIAGNOSTICS_DIR") {
            config.diagnostics_dir = PathBuf::from(dir);
        }

        config.seed = read_env::<u64>("BATTLE_SEED");

        if let Some(capacity) = read_env::<usize>("BATTLE_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }

        config
    }

    pub fn with_battle(mut self, battle: BattleConfig) -> Self {
        self.battle = battle;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_turn_timeout(mut self, timeout: Duration) -> Self {
        self.turn_timeout = timeout;
        self
    }

    pub fn with_diagnostics_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.diagnostics_dir = dir.into();
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            battle: BattleConfig::default(),
            turn_timeout: Self::TURN_TIMEOUT,
            pacing: Duration::ZERO,
            diagnostics_dir: PathBuf::from("diagnostics"),
            history_len: Self::HISTORY_LEN,
            seed: None,
            event_buffer_size: Self::EVENT_BUFFER_SIZE,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
