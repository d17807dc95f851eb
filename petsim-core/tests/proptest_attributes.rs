//! Property-based tests for attribute bounds and action sequences.

use proptest::prelude::*;

use petsim_core::config::TimingConfig;
use petsim_core::inventory::apply_effect;
use petsim_core::{Attribute, Attributes, ItemKind, Mood, PetEngine, Personality};

fn arb_attribute() -> impl Strategy<Value = Attribute> {
    prop::sample::select(Attribute::ALL.to_vec())
}

fn arb_item() -> impl Strategy<Value = ItemKind> {
    prop::sample::select(ItemKind::GENERATED.to_vec())
}

fn arb_personality() -> impl Strategy<Value = Personality> {
    prop::sample::select(Personality::ALL.to_vec())
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
}

// ---------------------------------------------------------------------------
// Property: every write lands inside the attribute's range
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn set_always_clamps(attr in arb_attribute(), value in any::<i32>()) {
        let mut attrs = Attributes::fresh();
        attrs.set(attr, value);
        let stored = attrs.get(attr);
        prop_assert!(stored >= attr.min());
        prop_assert!(stored <= attr.max());
        if (attr.min()..=attr.max()).contains(&value) {
            prop_assert_eq!(stored, value);
        }
    }
}

proptest! {
    #[test]
    fn adjust_never_overflows(
        attr in arb_attribute(),
        deltas in prop::collection::vec(any::<i32>(), 1..50),
    ) {
        let mut attrs = Attributes::fresh();
        for d in deltas {
            attrs.adjust(attr, d);
            let v = attrs.get(attr);
            prop_assert!((attr.min()..=attr.max()).contains(&v));
        }
    }
}

// ---------------------------------------------------------------------------
// Property: items keep attributes in range, whatever order they are used in
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn item_effects_stay_in_range(items in prop::collection::vec(arb_item(), 0..100)) {
        let mut attrs = Attributes::fresh();
        for kind in items {
            apply_effect(&mut attrs, kind);
            for attr in Attribute::ALL {
                let v = attrs.get(attr);
                prop_assert!((attr.min()..=attr.max()).contains(&v));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property: mood is a pure function of the attributes
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn mood_matches_thresholds(hunger in 0..=100i32, social in 0..=100i32, sleep in 0..=100i32) {
        let mut attrs = Attributes::fresh();
        attrs.set(Attribute::Hunger, hunger);
        attrs.set(Attribute::Social, social);
        attrs.set(Attribute::Sleep, sleep);
        let sad = hunger > 60 || social < 40 || sleep > 60;
        prop_assert_eq!(attrs.mood() == Mood::Sad, sad);
    }
}

// ---------------------------------------------------------------------------
// Property: random action sequences on a live engine keep every invariant
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_actions_keep_invariants(
        personality in arb_personality(),
        ops in prop::collection::vec(0..6u8, 1..80),
    ) {
        let rt = runtime();
        let _guard = rt.enter();
        let pet = PetEngine::new(&TimingConfig::default()).expect("engine");
        pet.select_personality(personality).expect("personality");

        for op in ops {
            let before = pet.snapshot();
            let result = match op {
                0 => pet.feed(),
                1 => pet.play(),
                2 => pet.exercise(),
                3 => pet.sleep(),
                4 => pet.evaluate_preference().map(|_| ()),
                _ => pet.perform_preferred_action().map(|_| ()),
            };
            if result.is_err() {
                // Rejections never change attributes or lifecycle.
                prop_assert_eq!(pet.attributes(), before.attributes);
                prop_assert_eq!(pet.lifecycle(), before.lifecycle);
            }
            for attr in Attribute::ALL {
                let v = pet.attribute(attr);
                prop_assert!((attr.min()..=attr.max()).contains(&v));
            }
        }
    }
}
