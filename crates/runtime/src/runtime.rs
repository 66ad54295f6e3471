//! Runtime facade.
//!
//! [`BattleRuntime`] owns the collaborators every encounter needs (roster
//! repository, card/relic catalog, action providers, event bus and session
//! registry) and exposes a builder-based API for starting battles. It is
//! cheap to clone; clones share every collaborator.

use std::sync::Arc;

use battle_core::{CatalogKind, CatalogRegistry, RewardPool, StatEntity};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::api::{ActionProvider, AutoActionProvider, Result, RuntimeError};
use crate::config::RuntimeConfig;
use crate::encounter::{BattleOutcome, EncounterInput, EncounterMeta};
use crate::events::{Event, EventBus, SessionEvent, Topic};
use crate::orchestrator::{Battle, Providers};
use crate::repository::{InMemoryRosterRepository, RosterRepository};
use crate::session::{RunId, SessionClaim, SessionId, SessionRegistry, SessionStatus};

/// Main entry point for running encounters.
#[derive(Clone)]
pub struct BattleRuntime {
    config: Arc<RuntimeConfig>,
    repository: Arc<dyn RosterRepository>,
    catalog: Arc<CatalogRegistry>,
    providers: Providers,
    events: EventBus,
    sessions: SessionRegistry,
}

impl BattleRuntime {
    /// Create a new runtime builder
    pub fn builder() -> BattleRuntimeBuilder {
        BattleRuntimeBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Subscribe to a single event topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.events.subscribe(topic)
    }

    /// Externally visible status of a session.
    pub fn session_status(&self, session: SessionId) -> Option<SessionStatus> {
        self.sessions.status(session)
    }

    /// Runs a fully prepared encounter on the current task.
    ///
    /// No roster is loaded or saved; the caller owns the combatants.
    pub async fn run_encounter(&self, input: EncounterInput) -> Result<BattleOutcome> {
        let claim = self.sessions.claim(input.run_id.clone());
        self.drive(&claim, input, &[]).await
    }

    /// Loads the stored roster for `run_id` and runs a battle against `foes`.
    ///
    /// The party fights as deep copies; the roster is written back with
    /// rewards and surviving HP only after a victory.
    pub async fn run_roster_battle(
        &self,
        run_id: RunId,
        foes: Vec<StatEntity>,
        meta: EncounterMeta,
    ) -> Result<BattleOutcome> {
        let claim = self.sessions.claim(run_id);
        self.roster_battle(&claim, foes, meta).await
    }

    /// Spawns a roster battle on its own task.
    pub fn start_battle(
        &self,
        run_id: impl Into<RunId>,
        foes: Vec<StatEntity>,
        meta: EncounterMeta,
    ) -> BattleHandle {
        let run_id = run_id.into();
        let claim = self.sessions.claim(run_id.clone());
        let session = claim.id();
        let runtime = self.clone();
        let task = tokio::spawn(async move { runtime.roster_battle(&claim, foes, meta).await });
        BattleHandle {
            run_id,
            session,
            task,
        }
    }

    async fn roster_battle(
        &self,
        claim: &SessionClaim,
        foes: Vec<StatEntity>,
        meta: EncounterMeta,
    ) -> Result<BattleOutcome> {
        let run_id = claim.run_id().clone();
        let mut roster = match self.repository.load(&run_id).await {
            Ok(Some(roster)) => roster,
            Ok(None) => return self.fail(claim, RuntimeError::RosterNotFound(run_id)),
            Err(err) => return self.fail(claim, err.into()),
        };

        let owned: Vec<String> = roster.cards.iter().chain(&roster.relics).cloned().collect();
        let pool = RewardPool::new(
            self.catalog.candidates(CatalogKind::Card),
            self.catalog.candidates(CatalogKind::Relic),
        )
        .excluding_cards(roster.cards.iter().cloned());
        let input = EncounterInput::new(run_id.clone(), roster.party.clone(), foes)
            .with_meta(meta)
            .with_rare_drop_rate(roster.rare_drop_rate)
            .with_reward_pool(pool);

        let outcome = self.drive(claim, input, &owned).await?;
        if !outcome.victory {
            info!(target: "runtime::orchestrator", %run_id, "Defeat, roster left untouched");
            return Ok(outcome);
        }

        // Another claimant showing up after the last turn still voids the write.
        if let Err(err) = claim.ensure_exclusive() {
            return self.fail(claim, err);
        }
        roster.apply_rewards(&outcome.rewards());
        roster.write_back(&outcome.party);
        if let Err(err) = self.repository.save(&roster).await {
            return self.fail(claim, err.into());
        }
        info!(target: "runtime::orchestrator", %run_id, gold = roster.gold, "Roster saved");
        Ok(outcome)
    }

    /// Builds, runs and settles one battle under `claim`.
    async fn drive(
        &self,
        claim: &SessionClaim,
        input: EncounterInput,
        owned: &[String],
    ) -> Result<BattleOutcome> {
        let run_id = claim.run_id().clone();
        let session = claim.id();
        self.events.publish(Event::Session(SessionEvent::Started {
            run_id: run_id.clone(),
            session,
        }));

        match self.execute(claim, input, owned).await {
            Ok(outcome) => {
                claim.complete();
                self.events.publish(Event::Session(SessionEvent::Completed {
                    run_id,
                    session,
                    victory: outcome.victory,
                    turns: outcome.turns_taken,
                }));
                Ok(outcome)
            }
            Err(err) => self.fail(claim, err),
        }
    }

    async fn execute(
        &self,
        claim: &SessionClaim,
        input: EncounterInput,
        owned: &[String],
    ) -> Result<BattleOutcome> {
        let mut battle = Battle::new(
            input,
            &self.config,
            claim.id(),
            self.events.clone(),
            self.providers.clone(),
        )?;
        battle.apply_catalog(&self.catalog, owned)?;
        battle.run(claim).await
    }

    fn fail<T>(&self, claim: &SessionClaim, err: RuntimeError) -> Result<T> {
        if err.is_session_fatal() {
            error!(
                target: "runtime::session",
                run_id = %claim.run_id(),
                session = %claim.id(),
                error = %err,
                "Battle session failed"
            );
        } else {
            warn!(
                target: "runtime::session",
                run_id = %claim.run_id(),
                session = %claim.id(),
                error = %err,
                "Battle rejected"
            );
        }
        claim.fail(err.to_string());
        self.events.publish(Event::Session(SessionEvent::Failed {
            run_id: claim.run_id().clone(),
            session: claim.id(),
            reason: err.user_message().to_string(),
        }));
        Err(err)
    }
}

/// A battle running on its own task.
#[derive(Debug)]
pub struct BattleHandle {
    run_id: RunId,
    session: SessionId,
    task: JoinHandle<Result<BattleOutcome>>,
}

impl BattleHandle {
    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the battle to finish.
    pub async fn join(self) -> Result<BattleOutcome> {
        self.task.await.map_err(RuntimeError::WorkerJoin)?
    }
}

/// Builder for [`BattleRuntime`] with flexible configuration.
pub struct BattleRuntimeBuilder {
    config: RuntimeConfig,
    repository: Option<Arc<dyn RosterRepository>>,
    catalog: Option<Arc<CatalogRegistry>>,
    party_provider: Option<Arc<dyn ActionProvider>>,
    foe_provider: Option<Arc<dyn ActionProvider>>,
    sessions: Option<SessionRegistry>,
}

impl BattleRuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            repository: None,
            catalog: None,
            party_provider: None,
            foe_provider: None,
            sessions: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Roster persistence (defaults to an empty in-memory store)
    pub fn repository(mut self, repository: impl RosterRepository + 'static) -> Self {
        self.repository = Some(Arc::new(repository));
        self
    }

    /// Roster persistence shared with the caller
    pub fn shared_repository(mut self, repository: Arc<dyn RosterRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Card and relic registry (defaults to empty)
    pub fn catalog(mut self, catalog: CatalogRegistry) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    /// Set party action provider (defaults to auto-attack)
    pub fn party_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.party_provider = Some(Arc::new(provider));
        self
    }

    /// Set foe action provider (defaults to auto-attack)
    pub fn foe_provider(mut self, provider: impl ActionProvider + 'static) -> Self {
        self.foe_provider = Some(Arc::new(provider));
        self
    }

    /// Share a session registry between runtimes
    pub fn sessions(mut self, sessions: SessionRegistry) -> Self {
        self.sessions = Some(sessions);
        self
    }

    pub fn build(self) -> BattleRuntime {
        let events = EventBus::with_capacity(self.config.event_buffer_size);
        let providers = Providers::new(
            self.party_provider
                .unwrap_or_else(|| Arc::new(AutoActionProvider)),
            self.foe_provider.unwrap_or_else(|| Arc::new(AutoActionProvider)),
        );
        BattleRuntime {
            config: Arc::new(self.config),
            repository: self
                .repository
                .unwrap_or_else(|| Arc::new(InMemoryRosterRepository::new())),
            catalog: self
                .catalog
                .unwrap_or_else(|| Arc::new(CatalogRegistry::new())),
            providers,
            events,
            sessions: self.sessions.unwrap_or_default(),
        }
    }
}
