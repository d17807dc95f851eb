//! Change notifications pushed by the engine.
//!
//! The engine sends one [`PetEvent`] after every successful mutation on a
//! `tokio::sync::broadcast` channel. Events say *what* changed; subscribers
//! pull the new state from the engine.

use serde::{Deserialize, Serialize};

use crate::inventory::Item;
use crate::personality::Personality;
use crate::types::Action;

/// A state change that subscribers may want to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PetEvent {
    /// The pet was fed.
    Fed,
    /// The pet was played with.
    Played,
    /// The pet was exercised.
    Exercised,
    /// The pet was taken to the vet.
    VetVisited,
    /// A nap started.
    FellAsleep,
    /// The wake timer fired.
    WokeUp,
    /// An inventory item was consumed.
    ItemUsed(Item),
    /// The background generator added an item.
    ItemGenerated(Item),
    /// The preferred action was performed and its bonus applied.
    BonusApplied(Action),
    /// The personality policy picked a different preferred action.
    PreferenceChanged(Action),
    /// The once-per-minute drift aged the attributes.
    Drifted,
    /// A decay tick cost the pet health.
    HealthPenalty {
        /// Health after the penalty.
        health: i32,
    },
    /// Health reached zero.
    Died,
    /// The pet was brought back.
    Revived,
    /// A personality was chosen.
    PersonalitySelected(Personality),
    /// The pet was (re)named.
    Renamed(String),
    /// An attribute was written directly.
    AttributeSet,
}

impl PetEvent {
    /// The line a presentation layer shows for this event.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Fed => "You fed your pet!".to_string(),
            Self::Played => "You played with your pet!".to_string(),
            Self::Exercised => "You exercised your pet!".to_string(),
            Self::VetVisited => {
                "You took your pet to the vet. Health increased by 30.".to_string()
            }
            Self::FellAsleep => "You put your pet to sleep!".to_string(),
            Self::WokeUp => "Your pet woke up!".to_string(),
            Self::ItemUsed(item) => format!("You gave your pet {item}!"),
            Self::ItemGenerated(item) => format!("{item} was added to your inventory."),
            Self::BonusApplied(Action::Feed) => {
                "You fed your pet! You received a bonus for feeding!".to_string()
            }
            Self::BonusApplied(Action::Play) => {
                "You played with your pet! You received a bonus for playing!".to_string()
            }
            Self::BonusApplied(Action::Sleep) => {
                "You put your pet to sleep! You received a bonus for sleeping!".to_string()
            }
            Self::PreferenceChanged(action) => format!("Your pet now wants to {action}."),
            Self::Drifted => "Time passes...".to_string(),
            Self::HealthPenalty { health } => {
                format!("Your pet is being neglected (health {health}).")
            }
            Self::Died => "Your pet has died.".to_string(),
            Self::Revived => "Your pet has been revived!".to_string(),
            Self::PersonalitySelected(p) => format!("{p} personality set."),
            Self::Renamed(name) => format!("Your pet is now called {name}."),
            Self::AttributeSet => "Attributes updated.".to_string(),
        }
    }
}
