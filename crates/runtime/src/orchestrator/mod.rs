//! Turn loop for a single encounter.
//!
//! A [`Battle`] exclusively owns deep copies of every combatant, the action
//! queue, the effect manager and the enrage state. [`Battle::run`] drives it
//! turn by turn until one side is wiped, racing each turn against the
//! configured timeout and the session's abort signal.

mod combatants;
mod phase;
mod timeout;
mod turn;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use battle_core::{
    ActionQueue, BattleConfig, CatalogRegistry, CombatantId, EffectManager, EnrageState,
    QueueError, RewardInput, RewardPool, RewardResolver, Side, StatEntity,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, error, info, warn};

pub use phase::BattlePhase;

use self::combatants::Combatants;
use self::timeout::Guarded;
use crate::api::{ActionProvider, AutoActionProvider, Result, RuntimeError};
use crate::config::RuntimeConfig;
use crate::diagnostics::{DiagnosticArtifact, TurnRecorder};
use crate::encounter::{BattleOutcome, EncounterInput, EncounterMeta, ProgressCallback};
use crate::events::{CombatEvent, Event, EventBus, ProgressSnapshot};
use crate::session::{RunId, SessionClaim, SessionId};

/// Action sources for both sides of a battle.
#[derive(Clone)]
pub struct Providers {
    pub party: Arc<dyn ActionProvider>,
    pub foe: Arc<dyn ActionProvider>,
}

impl Providers {
    pub fn new(party: Arc<dyn ActionProvider>, foe: Arc<dyn ActionProvider>) -> Self {
        Self { party, foe }
    }

    fn for_side(&self, side: Side) -> Arc<dyn ActionProvider> {
        match side {
            Side::Party => Arc::clone(&self.party),
            Side::Foe => Arc::clone(&self.foe),
        }
    }
}

impl Default for Providers {
    fn default() -> Self {
        Self::new(Arc::new(AutoActionProvider), Arc::new(AutoActionProvider))
    }
}

/// One encounter in flight.
pub struct Battle {
    run_id: RunId,
    session: SessionId,
    config: BattleConfig,
    meta: EncounterMeta,

    combatants: Combatants,
    summons: HashSet<CombatantId>,
    queue: ActionQueue,
    effects: EffectManager,
    enrage: EnrageState,
    rng: ChaCha8Rng,

    turn: u32,
    phase: BattlePhase,
    rare_drop_rate: f64,
    credited: HashSet<CombatantId>,
    foe_levels: Vec<u32>,

    reward_pool: RewardPool,
    resolver: RewardResolver,

    recorder: TurnRecorder,
    events: EventBus,
    progress: Option<ProgressCallback>,
    providers: Providers,

    turn_timeout: Duration,
    pacing: Duration,
    diagnostics_dir: PathBuf,
}

impl Battle {
    /// Validates the encounter and sets up every piece of battle state.
    pub fn new(
        input: EncounterInput,
        config: &RuntimeConfig,
        session: SessionId,
        events: EventBus,
        providers: Providers,
    ) -> Result<Self> {
        if input.party.is_empty() {
            return Err(RuntimeError::InvalidEncounter("party is empty".into()));
        }
        if input.foes.is_empty() {
            return Err(RuntimeError::InvalidEncounter("no foes".into()));
        }

        let mut ids = HashSet::new();
        for entity in input.party.iter().chain(&input.foes) {
            if !ids.insert(entity.id) {
                return Err(RuntimeError::InvalidEncounter(format!(
                    "duplicate combatant id {}",
                    entity.id
                )));
            }
        }

        let mut party = input.party;
        let mut foes = input.foes;
        for entity in &mut party {
            entity.side = Side::Party;
        }
        for entity in &mut foes {
            entity.side = Side::Foe;
        }
        let foe_levels = foes.iter().map(|foe| foe.level).collect();

        let combatants = Combatants::new(party, foes);
        let queue = ActionQueue::from_entities(config.battle.gauge_start, combatants.iter());

        let mut enrage = EnrageState::from_config(&config.battle, input.meta.tier.is_boss());
        if let Some(threshold) = input.meta.enrage_threshold {
            enrage = enrage.with_threshold(threshold);
        }

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut battle = Self {
            run_id: input.run_id,
            session,
            config: config.battle.clone(),
            meta: input.meta,
            combatants,
            summons: HashSet::new(),
            queue,
            effects: EffectManager::new(config.battle.diminishing.clone()),
            enrage,
            rng,
            turn: 0,
            phase: BattlePhase::Initializing,
            rare_drop_rate: input.rare_drop_rate,
            credited: HashSet::new(),
            foe_levels,
            reward_pool: input.reward_pool,
            resolver: RewardResolver::default(),
            recorder: TurnRecorder::new(config.history_len),
            events,
            progress: input.progress,
            providers,
            turn_timeout: config.turn_timeout,
            pacing: config.pacing,
            diagnostics_dir: config.diagnostics_dir.clone(),
        };
        battle.sync_action_values();
        Ok(battle)
    }

    /// Applies owned cards or relics to every party member.
    ///
    /// Unknown ids are skipped by the registry. Speed bonuses are reflected in
    /// the action queue immediately.
    pub fn apply_catalog(&mut self, registry: &CatalogRegistry, owned: &[String]) -> Result<()> {
        if owned.is_empty() {
            return Ok(());
        }
        for entity in self.combatants.iter_mut().filter(|e| e.side == Side::Party) {
            let missing = registry.apply_owned(entity, &mut self.effects, owned);
            if !missing.is_empty() {
                debug!(
                    target: "runtime::orchestrator",
                    entity = %entity.id,
                    missing = missing.len(),
                    "Catalog entries skipped"
                );
            }
            self.queue.refresh_speed(entity.id, entity.speed())?;
        }
        self.sync_action_values();
        Ok(())
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn enrage(&self) -> &EnrageState {
        &self.enrage
    }

    pub fn combatants(&self) -> &[StatEntity] {
        self.combatants.as_slice()
    }

    pub fn snapshot(&self, active_actor: Option<CombatantId>) -> ProgressSnapshot {
        ProgressSnapshot::capture(
            &self.run_id,
            self.session,
            self.turn,
            self.phase,
            self.combatants.as_slice(),
            &self.enrage,
            &self.queue,
            active_actor,
        )
    }

    /// Runs the encounter to completion.
    ///
    /// Fails without rewards on a concurrent claim, an abort, a turn timeout
    /// or a provider error.
    pub async fn run(mut self, claim: &SessionClaim) -> Result<BattleOutcome> {
        let abort = claim.abort_signal();
        info!(
            target: "runtime::orchestrator",
            run_id = %self.run_id,
            session = %self.session,
            tier = %self.meta.tier,
            party = self.combatants.living(Side::Party).count(),
            foes = self.combatants.living(Side::Foe).count(),
            enrage_threshold = self.enrage.threshold,
            "Battle started"
        );
        self.emit_progress(None);

        while !self.is_decided() {
            claim.ensure_exclusive()?;

            self.queue.sync_living(self.combatants.iter());
            let actor = match self.queue.next_actor() {
                Ok(actor) => actor,
                Err(QueueError::Empty) => {
                    warn!(target: "runtime::orchestrator", turn = self.turn, "No eligible actor left");
                    break;
                }
                Err(err) => return Err(err.into()),
            };
            let Some(side) = self.combatants.get(actor).map(|entity| entity.side) else {
                self.queue.remove(actor);
                continue;
            };

            self.turn += 1;
            self.enter_phase(BattlePhase::for_side(side));

            let limit = self.turn_timeout;
            match timeout::guard(limit, &abort, self.take_turn(actor)).await {
                Guarded::Completed(result) => result?,
                Guarded::Aborted => {
                    warn!(
                        target: "runtime::orchestrator",
                        run_id = %self.run_id,
                        session = %self.session,
                        turn = self.turn,
                        "Battle aborted mid-turn"
                    );
                    return Err(RuntimeError::Aborted {
                        run_id: self.run_id.clone(),
                        session: self.session,
                    });
                }
                Guarded::TimedOut => return Err(self.turn_timed_out(actor).await),
            }

            self.escalate();
            self.emit_progress(Some(actor));
            tokio::task::yield_now().await;
        }

        Ok(self.conclude())
    }

    fn is_decided(&self) -> bool {
        !self.combatants.any_alive(Side::Party) || !self.combatants.any_alive(Side::Foe)
    }

    fn enter_phase(&mut self, phase: BattlePhase) {
        if self.phase != phase {
            debug!(
                target: "runtime::orchestrator",
                from = %self.phase,
                to = %phase,
                turn = self.turn,
                "Phase transition"
            );
            self.phase = phase;
        }
    }

    fn publish(&self, event: CombatEvent) {
        self.events.publish(Event::Combat(event));
    }

    fn sync_action_values(&mut self) {
        self.queue.write_back(self.combatants.iter_mut());
    }

    fn emit_progress(&mut self, active_actor: Option<CombatantId>) {
        self.sync_action_values();
        let snapshot = self.snapshot(active_actor);
        if let Some(callback) = &self.progress {
            callback(&snapshot);
        }
        self.events.publish(Event::Progress(Box::new(snapshot)));
    }

    /// Writes the diagnostic artifact and builds the session-fatal error.
    async fn turn_timed_out(&mut self, actor: CombatantId) -> RuntimeError {
        let actor_name = self
            .combatants
            .get(actor)
            .map(|entity| entity.name.clone())
            .unwrap_or_default();
        let artifact = DiagnosticArtifact {
            run_id: self.run_id.clone(),
            session: self.session,
            actor,
            actor_name,
            turn: self.turn,
            timeout_ms: u64::try_from(self.turn_timeout.as_millis()).unwrap_or(u64::MAX),
            created_at: chrono::Utc::now(),
            recent_events: self.recorder.history(actor),
            snapshot: self.snapshot(Some(actor)),
        };

        let path = match artifact.write(&self.diagnostics_dir).await {
            Ok(path) => Some(path),
            Err(err) => {
                warn!(
                    target: "runtime::orchestrator",
                    error = %err,
                    dir = %self.diagnostics_dir.display(),
                    "Failed to write timeout diagnostics"
                );
                None
            }
        };

        error!(
            target: "runtime::orchestrator",
            run_id = %self.run_id,
            session = %self.session,
            %actor,
            turn = self.turn,
            timeout = ?self.turn_timeout,
            artifact = ?path,
            "Turn timed out"
        );

        RuntimeError::TurnTimeout {
            actor,
            turn: self.turn,
            timeout: self.turn_timeout,
            artifact: path,
        }
    }

    /// Clears effects, resolves loot and builds the outcome.
    fn conclude(mut self) -> BattleOutcome {
        self.enter_phase(BattlePhase::Concluding);
        let victory = self.combatants.any_alive(Side::Party) && !self.combatants.any_alive(Side::Foe);

        self.effects.cleanup(self.combatants.as_mut_slice());
        for entity in self.combatants.iter_mut() {
            entity.clear_effects();
        }

        let input = RewardInput {
            victory,
            tier: self.meta.tier,
            loop_count: self.meta.loop_count,
            turns: self.turn,
            foe_levels: self.foe_levels.clone(),
            rare_drop_rate: self.rare_drop_rate,
        };
        let rewards = self.resolver.resolve(&input, &self.reward_pool, &mut self.rng);
        self.emit_progress(None);

        let party: Vec<StatEntity> = self
            .combatants
            .iter()
            .filter(|entity| entity.side == Side::Party && !self.summons.contains(&entity.id))
            .cloned()
            .collect();

        info!(
            target: "runtime::orchestrator",
            run_id = %self.run_id,
            session = %self.session,
            victory,
            turns = self.turn,
            gold = rewards.gold,
            experience = rewards.experience,
            cards = rewards.cards.len(),
            relics = rewards.relics.len(),
            items = rewards.items.len(),
            enrage_stacks = self.enrage.stacks(),
            "Battle concluded"
        );

        BattleOutcome {
            victory,
            turns_taken: self.turn,
            gold: rewards.gold,
            experience: rewards.experience,
            cards: rewards.cards,
            relics: rewards.relics,
            items: rewards.items,
            survivors: party.iter().filter(|e| e.is_alive()).map(|e| e.id).collect(),
            final_party_hp: party.iter().map(|e| (e.id, e.hp)).collect(),
            rare_drop_rate: self.rare_drop_rate,
            enrage_stacks: self.enrage.stacks(),
            party,
        }
    }
}
