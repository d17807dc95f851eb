//! petsim benchmark suite.
//!
//! Targets:
//!   action_feed ................ < 2μs  (lock + adjust + event)
//!   snapshot_with_50_items ..... < 20μs
//!   save_slot_in_memory ........ < 200μs
//!   personality_decide ......... < 50ns

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use petsim_core::config::{PersistenceConfig, TimingConfig};
use petsim_core::inventory::apply_effect;
use petsim_core::{
    Attribute, Attributes, ItemKind, PersistenceGateway, PetEngine, Personality, SlotId,
};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
}

fn live_pet(rt: &tokio::runtime::Runtime) -> PetEngine {
    let timing = TimingConfig {
        item_seed: Some(42),
        ..TimingConfig::default()
    };
    let pet = PetEngine::with_runtime(&timing, rt.handle().clone());
    pet.select_personality(Personality::Dog).expect("dog");
    pet.allow_execution();
    pet
}

/// Benchmark: one user action through the engine lock.
fn bench_action(c: &mut Criterion) {
    let rt = runtime();
    let pet = live_pet(&rt);
    c.bench_function("action_feed", |b| {
        b.iter(|| {
            pet.set_attribute(Attribute::Hunger, 50);
            black_box(pet.feed()).ok();
        });
    });
}

/// Benchmark: consistent snapshot of a pet with a full-ish inventory.
fn bench_snapshot(c: &mut Criterion) {
    let rt = runtime();
    let pet = live_pet(&rt);
    let mut snap = pet.snapshot();
    for i in 0..50 {
        let kind = ItemKind::GENERATED[i % ItemKind::GENERATED.len()];
        snap.inventory.push(petsim_core::Item::new(kind));
    }
    let pet =
        PetEngine::from_snapshot_with_runtime(snap, &TimingConfig::default(), rt.handle().clone());

    c.bench_function("snapshot_with_50_items", |b| {
        b.iter(|| black_box(pet.snapshot()));
    });
}

/// Benchmark: JSON encode + checksum + UPSERT into an in-memory database.
fn bench_save(c: &mut Criterion) {
    let rt = runtime();
    let pet = live_pet(&rt);
    let saves = PersistenceGateway::open_in_memory(&PersistenceConfig::default()).expect("open");
    let slot = SlotId::from("1");

    c.bench_function("save_slot_in_memory", |b| {
        b.iter(|| saves.save(black_box(&pet), &slot).expect("save"));
    });
}

/// Benchmark: the personality policy and item effects on bare attributes.
fn bench_policy(c: &mut Criterion) {
    let mut attrs = Attributes::fresh();
    attrs.set(Attribute::Hunger, 64);

    c.bench_function("personality_decide", |b| {
        b.iter(|| {
            for p in Personality::ALL {
                black_box(p.decide(black_box(&attrs)));
            }
        });
    });

    c.bench_function("item_apply_effect", |b| {
        b.iter(|| {
            let mut a = attrs;
            for kind in ItemKind::GENERATED {
                apply_effect(&mut a, kind);
            }
            black_box(a)
        });
    });
}

criterion_group!(
    benches,
    bench_action,
    bench_snapshot,
    bench_save,
    bench_policy,
);
criterion_main!(benches);
