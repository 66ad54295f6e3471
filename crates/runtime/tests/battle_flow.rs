mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use battle_core::{CombatantId, EncounterTier};
use battle_runtime::{
    BattlePhase, BattleRuntime, CombatEvent, EncounterInput, EncounterMeta, Event,
    InMemoryRosterRepository, ProviderKind, RosterRepository, RunId, RuntimeConfig, RuntimeError,
    SessionEvent, SessionStatus, Topic, WaitActionProvider,
};
use tokio::sync::broadcast;

use common::{FailingProvider, brute, bruiser, config, guardian, hero, roster, slime, weakling};

fn roomy_config() -> RuntimeConfig {
    let mut config = config();
    config.event_buffer_size = 4096;
    config
}

fn drain_combat(rx: &mut broadcast::Receiver<Event>) -> Vec<CombatEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let Event::Combat(event) = event {
            events.push(event);
        }
    }
    events
}

#[tokio::test]
async fn victory_pays_out_and_saves_the_roster() {
    let repo = Arc::new(InMemoryRosterRepository::with_rosters([roster(
        "run-1",
        vec![hero(1)],
    )]));
    let runtime = BattleRuntime::builder()
        .config(config())
        .shared_repository(repo.clone())
        .build();

    let outcome = runtime
        .run_roster_battle(RunId::from("run-1"), vec![slime(101), slime(102)], EncounterMeta::default())
        .await
        .expect("battle should finish");

    assert!(outcome.victory);
    assert!(outcome.gold > 0);
    assert!(outcome.experience > 0);
    assert!(!outcome.items.is_empty() || !outcome.cards.is_empty());
    assert_eq!(outcome.survivors, vec![CombatantId(1)]);
    assert!((outcome.rare_drop_rate - 2.1).abs() < 1e-9);

    let saved = repo
        .load(&RunId::from("run-1"))
        .await
        .unwrap()
        .expect("roster should still exist");
    assert_eq!(saved.gold, outcome.gold);
    assert_eq!(saved.experience, outcome.experience);
    assert_eq!(saved.party[0].hp, outcome.final_party_hp[0].1);
    assert!(saved.party[0].effects().is_empty());
}

#[tokio::test]
async fn defeat_leaves_the_roster_untouched() {
    let original = roster("run-2", vec![weakling(1)]);
    let repo = Arc::new(InMemoryRosterRepository::with_rosters([original.clone()]));
    let runtime = BattleRuntime::builder()
        .config(config())
        .shared_repository(repo.clone())
        .build();

    let outcome = runtime
        .run_roster_battle(RunId::from("run-2"), vec![brute(101)], EncounterMeta::default())
        .await
        .expect("a defeat is still a finished battle");

    assert!(!outcome.victory);
    assert_eq!(outcome.gold, 0);
    assert!(outcome.rewards().is_empty());
    assert!(outcome.survivors.is_empty());

    let saved = repo.load(&RunId::from("run-2")).await.unwrap().unwrap();
    assert_eq!(saved, original);
}

#[tokio::test]
async fn missing_roster_fails_the_session() {
    let runtime = BattleRuntime::builder().config(config()).build();
    let mut sessions = runtime.subscribe(Topic::Session);

    let err = runtime
        .run_roster_battle(RunId::from("ghost"), vec![slime(101)], EncounterMeta::default())
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::RosterNotFound(_)));

    let statuses = runtime.sessions().run_statuses(&RunId::from("ghost"));
    assert_eq!(statuses.len(), 1);
    assert!(statuses[0].1.is_error());

    // Started is not published before the roster loads.
    match sessions.recv().await.unwrap() {
        Event::Session(SessionEvent::Failed { reason, .. }) => assert_eq!(reason, "battle error"),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn encounters_need_both_sides() {
    let runtime = BattleRuntime::builder().config(config()).build();
    let err = runtime
        .run_encounter(EncounterInput::new("run-3", vec![hero(1)], vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidEncounter(_)));

    let err = runtime
        .run_encounter(EncounterInput::new("run-3", vec![hero(1)], vec![slime(1)]))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidEncounter(_)));
}

#[tokio::test]
async fn progress_is_reported_through_callback_and_bus() {
    let runtime = BattleRuntime::builder().config(config()).build();
    let mut progress = runtime.subscribe(Topic::Progress);
    let calls = Arc::new(AtomicUsize::new(0));
    let last_phase = Arc::new(Mutex::new(None));

    let input = {
        let calls = calls.clone();
        let last_phase = last_phase.clone();
        EncounterInput::new("run-4", vec![hero(1)], vec![slime(101)]).with_progress(move |snapshot| {
            calls.fetch_add(1, Ordering::SeqCst);
            *last_phase.lock().unwrap() = Some(snapshot.phase);
        })
    };
    let outcome = runtime.run_encounter(input).await.unwrap();

    assert!(outcome.victory);
    assert!(calls.load(Ordering::SeqCst) >= 3);
    assert_eq!(*last_phase.lock().unwrap(), Some(BattlePhase::Concluding));

    match progress.recv().await.unwrap() {
        Event::Progress(snapshot) => {
            assert_eq!(snapshot.turn, 0);
            assert_eq!(snapshot.phase, BattlePhase::Initializing);
            assert_eq!(snapshot.party.len(), 1);
            assert_eq!(snapshot.foes.len(), 1);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn session_events_bracket_a_battle() {
    let runtime = BattleRuntime::builder().config(config()).build();
    let mut sessions = runtime.subscribe(Topic::Session);

    let outcome = runtime
        .run_encounter(EncounterInput::new("run-5", vec![hero(1)], vec![slime(101)]))
        .await
        .unwrap();

    let started = sessions.recv().await.unwrap();
    let Event::Session(SessionEvent::Started { session, .. }) = started else {
        panic!("expected Started, got {started:?}");
    };
    match sessions.recv().await.unwrap() {
        Event::Session(SessionEvent::Completed { victory, turns, .. }) => {
            assert!(victory);
            assert_eq!(turns, outcome.turns_taken);
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert_eq!(runtime.session_status(session), Some(SessionStatus::Completed));
}

#[tokio::test]
async fn same_seed_replays_the_same_battle() {
    let input = || {
        EncounterInput::new(
            "run-6",
            vec![hero(1), weakling(2)],
            vec![slime(101), slime(102), brute(103)],
        )
        .with_meta(EncounterMeta::new(EncounterTier::Elite))
    };

    let first = BattleRuntime::builder().config(config()).build();
    let second = BattleRuntime::builder().config(config()).build();

    let a = first.run_encounter(input()).await.unwrap();
    let b = second.run_encounter(input()).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn stalemates_are_broken_by_enrage() {
    let runtime = BattleRuntime::builder()
        .config(config())
        .party_provider(WaitActionProvider)
        .foe_provider(WaitActionProvider)
        .build();

    let outcome = runtime
        .run_encounter(
            EncounterInput::new("run-7", vec![hero(1)], vec![slime(101)])
                .with_meta(EncounterMeta::default().with_enrage_threshold(2)),
        )
        .await
        .unwrap();

    assert!(outcome.enrage_stacks >= 10, "bleed only starts at ten stacks");
    assert!(outcome.turns_taken > 12);
}

#[tokio::test]
async fn enrage_bleed_reaches_both_sides() {
    let runtime = BattleRuntime::builder()
        .config(roomy_config())
        .party_provider(WaitActionProvider)
        .foe_provider(WaitActionProvider)
        .build();
    let mut combat = runtime.subscribe(Topic::Combat);

    runtime
        .run_encounter(
            EncounterInput::new("run-8", vec![hero(1)], vec![slime(101)])
                .with_meta(EncounterMeta::default().with_enrage_threshold(2)),
        )
        .await
        .unwrap();

    let events = drain_combat(&mut combat);
    assert!(events.iter().any(|e| matches!(e, CombatEvent::EnrageActivated { turn: 3 })));
    assert!(events.iter().any(|e| matches!(e, CombatEvent::EnrageBleed { stacks: 10, .. })));

    let bled = |id: CombatantId| {
        events
            .iter()
            .any(|e| matches!(e, CombatEvent::EffectDamage { target, amount, .. } if *target == id && *amount > 0))
    };
    assert!(bled(CombatantId(1)), "party member never bled");
    assert!(bled(CombatantId(101)), "foe never bled");
}

#[tokio::test]
async fn enrage_raises_damage_and_cuts_healing() {
    const THRESHOLD: u32 = 4;
    let runtime = BattleRuntime::builder()
        .config(roomy_config())
        .party_provider(WaitActionProvider)
        .build();
    let mut combat = runtime.subscribe(Topic::Combat);

    let outcome = runtime
        .run_encounter(
            EncounterInput::new("run-9", vec![guardian(1)], vec![bruiser(101)])
                .with_meta(EncounterMeta::default().with_enrage_threshold(THRESHOLD)),
        )
        .await
        .unwrap();
    assert!(!outcome.victory);

    let events = drain_combat(&mut combat);
    // Stacks gained at the end of a turn apply from the following turn.
    let calm = |turn: u32| turn <= THRESHOLD + 1;

    let (mut calm_hits, mut enraged_hits) = (Vec::new(), Vec::new());
    let (mut calm_heals, mut enraged_heals) = (Vec::new(), Vec::new());
    for event in &events {
        match event {
            CombatEvent::Damage { turn, attacker, outcome, .. } if *attacker == CombatantId(101) => {
                let hits = if calm(*turn) { &mut calm_hits } else { &mut enraged_hits };
                hits.push(outcome.amount);
            }
            CombatEvent::Healing { turn, healer, outcome, .. } if *healer == CombatantId(1) => {
                let heals = if calm(*turn) { &mut calm_heals } else { &mut enraged_heals };
                heals.push(outcome.healed);
            }
            _ => {}
        }
    }

    assert!(!calm_hits.is_empty() && !enraged_hits.is_empty());
    assert!(calm_hits.iter().all(|&amount| amount == 16));
    assert!(enraged_hits.iter().all(|&amount| amount > 16));

    assert!(!calm_heals.is_empty() && !enraged_heals.is_empty());
    assert!(calm_heals.iter().all(|&healed| healed >= 16));
    assert!(enraged_heals.iter().all(|&healed| healed == 1));
}

#[tokio::test]
async fn provider_failures_end_the_session_with_their_side() {
    let runtime = BattleRuntime::builder()
        .config(config())
        .party_provider(FailingProvider)
        .build();
    let mut sessions = runtime.subscribe(Topic::Session);

    let err = runtime
        .run_encounter(EncounterInput::new("run-10", vec![hero(1)], vec![slime(101)]))
        .await
        .unwrap_err();

    match &err {
        RuntimeError::Provider { kind, reason } => {
            assert_eq!(*kind, ProviderKind::Party);
            assert!(reason.contains("script exhausted"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.is_session_fatal());

    let Event::Session(SessionEvent::Started { session, .. }) = sessions.recv().await.unwrap() else {
        panic!("expected Started");
    };
    assert!(matches!(
        sessions.recv().await.unwrap(),
        Event::Session(SessionEvent::Failed { .. })
    ));
    assert!(runtime.session_status(session).is_some_and(|status| status.is_error()));
}
