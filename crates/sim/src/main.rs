//! Headless battle driver.
//!
//! Usage: `battle-sim [DATA_DIR] [ENCOUNTER]`
//!
//! Loads `battle.toml`, `catalog.ron`, `roster.ron` and
//! `encounters/<ENCOUNTER>.ron` from `DATA_DIR` (default `data`, encounter
//! `slime_pit`), runs one battle with auto-attacking providers and prints the
//! outcome as JSON. Runtime knobs come from `BATTLE_*` environment variables.
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use battle_content::{CatalogLoader, ConfigLoader, EncounterLoader, RosterLoader};
use battle_runtime::{
    BattleRuntime, CombatEvent, EncounterMeta, Event, InMemoryRosterRepository, RosterRepository,
    RunId, RuntimeConfig, Topic,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let data_dir = PathBuf::from(args.next().unwrap_or_else(|| "data".into()));
    let encounter_name = args.next().unwrap_or_else(|| "slime_pit".into());

    let battle = ConfigLoader::load(&data_dir.join("battle.toml"))?;
    let catalog = CatalogLoader::load_registry(&data_dir.join("catalog.ron"))?;
    let roster = RosterLoader::load(&data_dir.join("roster.ron"))?;
    let encounter = EncounterLoader::load(
        &data_dir
            .join("encounters")
            .join(format!("{encounter_name}.ron")),
    )?;

    let run_id = RunId::new(roster.run_id.clone());
    let repository = Arc::new(InMemoryRosterRepository::with_rosters([roster]));
    let runtime = BattleRuntime::builder()
        .config(RuntimeConfig::from_env().with_battle(battle))
        .shared_repository(repository.clone())
        .catalog(catalog)
        .build();

    let mut combat = runtime.subscribe(Topic::Combat);
    let logger = tokio::spawn(async move {
        while let Ok(event) = combat.recv().await {
            if let Event::Combat(event) = event {
                log_combat(&event);
            }
        }
    });

    let meta = EncounterMeta::new(encounter.tier).with_loop(encounter.loop_count);
    let outcome = runtime
        .run_roster_battle(run_id.clone(), encounter.foes(), meta)
        .await
        .with_context(|| format!("encounter {encounter_name} failed"))?;
    logger.abort();

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if let Some(saved) = repository.load(&run_id).await? {
        tracing::info!(
            run_id = %run_id,
            gold = saved.gold,
            experience = saved.experience,
            cards = saved.cards.len(),
            relics = saved.relics.len(),
            "Roster after battle"
        );
    }
    Ok(())
}

fn log_combat(event: &CombatEvent) {
    match event {
        CombatEvent::Damage {
            turn,
            attacker,
            target,
            outcome,
        } => {
            if outcome.dodged {
                tracing::info!(turn, %attacker, %target, "dodged");
            } else {
                tracing::info!(turn, %attacker, %target, amount = outcome.amount, crit = outcome.critical, "hit");
            }
        }
        CombatEvent::Defeated { turn, combatant } => tracing::info!(turn, %combatant, "defeated"),
        CombatEvent::Ultimate { turn, actor, kind } => tracing::info!(turn, %actor, kind = %kind, "ultimate"),
        CombatEvent::EnrageActivated { turn } => tracing::warn!(turn, "enrage"),
        other => tracing::debug!(?other, "combat event"),
    }
}
