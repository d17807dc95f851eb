//! Integration tests: whole-pet scenarios across the engine, timers and
//! save slots.

use std::sync::Arc;
use std::time::Duration;

use petsim_core::config::{PersistenceConfig, TimingConfig};
use petsim_core::{
    Action, Attribute, LifecycleState, Mood, PersistenceGateway, PetEngine, PetEvent, Personality,
    Rejection, SlotId,
};

fn timing() -> TimingConfig {
    TimingConfig {
        item_seed: Some(11),
        ..TimingConfig::default()
    }
}

async fn advance(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

// ---------------------------------------------------------------------------
// A full day in the life: adopt → care → neglect → die → revive → save
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn neglected_pet_dies_and_is_revived() {
    let pet = PetEngine::new(&timing()).expect("engine");
    pet.set_name("Rex");
    pet.select_personality(Personality::Dog).expect("dog");
    pet.allow_execution();

    pet.feed().expect("feed");
    pet.play().expect("play");
    assert_eq!(pet.mood(), Mood::Happy);

    // Starve it: every tick now costs 5 health.
    pet.set_attribute(Attribute::Hunger, 100);
    pet.set_attribute(Attribute::Health, 12);
    advance(3_500).await;
    assert_eq!(pet.health(), 7);
    assert_eq!(pet.preferred_action(), Some(Action::Feed));

    advance(10_000).await;
    assert!(pet.is_dead());
    assert_eq!(pet.health(), 0);
    assert_eq!(
        pet.feed().expect_err("dead").rejection(),
        Some(&Rejection::Dead)
    );

    pet.revive().expect("revive");
    assert_eq!(pet.lifecycle(), LifecycleState::Alive);
    assert_eq!(pet.hunger(), 0);
    assert_eq!(pet.social(), 100);
    assert_eq!(pet.score(), 0);

    let saves = PersistenceGateway::open_in_memory(&PersistenceConfig::default()).expect("open");
    saves.save(&pet, &SlotId::from("1")).expect("save");
    let loaded = saves.load(&SlotId::from("1"), &timing()).expect("load");
    assert_eq!(loaded.attributes(), pet.attributes());
    assert_eq!(loaded.name(), "Rex");
}

#[tokio::test(start_paused = true)]
async fn preference_follows_needs() {
    let pet = PetEngine::new(&timing()).expect("engine");
    let mut events = pet.subscribe();
    pet.select_personality(Personality::Cat).expect("cat");
    pet.allow_execution();

    pet.set_attribute(Attribute::Hunger, 60);
    advance(3_500).await;
    assert_eq!(pet.preferred_action(), Some(Action::Feed));

    pet.perform_preferred_action().expect("feed");
    // 60 - 10 (feed) - 5 (bonus)
    assert_eq!(pet.hunger(), 45);

    advance(5_000).await;
    assert_eq!(pet.preferred_action(), Some(Action::Sleep));

    let mut changes = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let PetEvent::PreferenceChanged(a) = event {
            changes.push(a);
        }
    }
    assert_eq!(changes, vec![Action::Feed, Action::Sleep]);
}

#[tokio::test(start_paused = true)]
async fn loaded_pet_is_immediately_live() {
    let saves = PersistenceGateway::open_in_memory(&PersistenceConfig::default()).expect("open");
    {
        let pet = PetEngine::new(&timing()).expect("engine");
        pet.allow_execution();
        pet.sleep().expect("sleep");
        saves.save(&pet, &SlotId::from("2")).expect("save");
    }

    let pet = saves.load(&SlotId::from("2"), &timing()).expect("load");
    assert!(pet.is_sleeping());
    assert!(pet.is_started());

    advance(10_500).await;
    assert!(!pet.is_sleeping());
    advance(5_000).await;
    assert_eq!(pet.inventory().len(), 1);
    assert!(pet.stats().decay_ticks >= 1);
}

// ---------------------------------------------------------------------------
// Concurrency: timers and user actions interleaved on a worker pool
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_actions_keep_invariants() {
    let fast = TimingConfig {
        decay_tick_ms: 2,
        decay_initial_delay_ms: 0,
        drift_interval_ms: 3,
        interaction_debounce_ms: 0,
        nap_ms: 1,
        item_interval_ms: 1,
        item_seed: Some(5),
    };
    let pet = Arc::new(PetEngine::new(&fast).expect("engine"));
    pet.select_personality(Personality::Bird).expect("bird");
    pet.allow_execution();

    let mut workers = Vec::new();
    for worker in 0..4_usize {
        let pet = Arc::clone(&pet);
        workers.push(tokio::spawn(async move {
            for i in 0..200_usize {
                let _ = match (worker + i) % 6 {
                    0 => pet.feed(),
                    1 => pet.play(),
                    2 => pet.exercise(),
                    3 => pet.sleep(),
                    4 => pet.use_item(0).map(|_| ()),
                    _ => pet.perform_preferred_action().map(|_| ()),
                };
                if i % 25 == 0 {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
            }
        }));
    }
    for w in workers {
        w.await.expect("worker");
    }

    pet.stop_timers();
    // Let any firing already past its await finish.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let attrs = pet.attributes();
    for attr in Attribute::ALL {
        let v = attrs.get(attr);
        assert!((attr.min()..=attr.max()).contains(&v), "{attr} = {v}");
    }
    let stats = pet.stats();
    assert_eq!(
        stats.items_generated,
        stats.items_used + pet.inventory().len() as u64
    );
}
