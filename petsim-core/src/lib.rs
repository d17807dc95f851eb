//! # petsim core library
//!
//! Display-agnostic lifecycle engine for a persistent virtual pet.
//!
//! A pet is a [`PetEngine`]: one shared state object that is touched by
//!
//! - **Background timers** — the decay tick, the per-minute drift, the item
//!   generator and the one-shot wake timer
//! - **User actions** — feed, play, sleep, exercise, use an item, perform the
//!   preferred action, revive
//! - **Persistence** — [`PersistenceGateway`] copies a [`PetSnapshot`] out
//!   under the engine lock and writes it to a save slot without holding it
//!
//! Every mutation goes through a single critical section and is followed by a
//! [`PetEvent`] on the engine's broadcast channel. Presentation layers
//! subscribe to those events and pull current state through the getters.
//!
//! ## Timing contract
//!
//! | Timer            | Default period | Starts                          |
//! |------------------|----------------|---------------------------------|
//! | Decay tick       | 5s (after 3s)  | engine creation / revive / load |
//! | Attribute drift  | 60s            | first idle decay tick           |
//! | Item generator   | 15s            | engine creation / revive / load |
//! | Wake             | 10s one-shot   | `sleep()`                       |
//! | Autosave         | configurable   | `start_autosave()`              |

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod attributes;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod inventory;
pub mod personality;
pub mod persistence;
pub mod snapshot;
pub mod types;

pub use attributes::{Attribute, Attributes};
pub use config::PetConfig;
pub use engine::{EngineStats, PetEngine, TimerStatus, WeakPetEngine};
pub use error::{PetError, Rejection};
pub use events::PetEvent;
pub use inventory::{Inventory, Item, ItemKind};
pub use personality::Personality;
pub use persistence::PersistenceGateway;
pub use snapshot::PetSnapshot;
pub use types::*;
