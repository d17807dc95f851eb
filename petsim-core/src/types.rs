//! Core type definitions shared by the engine, the snapshot and the events.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Unique identifier for one pet (one engine lifetime, carried across saves).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PetId(pub Uuid);

impl PetId {
    /// Create a new random pet ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named persistence bucket, e.g. `"1"`, `"2"`, `"3"`.
///
/// The gateway accepts any non-empty name; restricting to the three
/// standard slots is the presentation layer's job (see [`SlotId::is_standard`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotId(String);

impl SlotId {
    /// The slots offered by the stock game menus.
    pub const STANDARD: [&'static str; 3] = ["1", "2", "3"];

    /// Wrap a slot name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The raw slot name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is one of the three standard slots.
    #[must_use]
    pub fn is_standard(&self) -> bool {
        Self::STANDARD.contains(&self.0.as_str())
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SlotId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// Derived & discrete state
// ---------------------------------------------------------------------------

/// How the pet feels. Always derived from hunger, social and sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    /// All needs are reasonably met.
    Happy,
    /// Hungry, lonely or tired.
    Sad,
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Happy => f.write_str("HAPPY"),
            Self::Sad => f.write_str("SAD"),
        }
    }
}

/// The action a personality says the pet currently wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Wants food.
    Feed,
    /// Wants attention.
    Play,
    /// Wants a nap.
    Sleep,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feed => f.write_str("FEED"),
            Self::Play => f.write_str("PLAY"),
            Self::Sleep => f.write_str("SLEEP"),
        }
    }
}

/// Coarse lifecycle of the pet.
///
/// `Alive <-> Sleeping` is time-bounded by the nap timer. `Dead` only leaves
/// through [`crate::PetEngine::revive`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Awake and accepting actions.
    #[default]
    Alive,
    /// Napping; user actions are refused until the wake timer fires.
    Sleeping,
    /// Health reached zero; only revive is accepted.
    Dead,
}

impl LifecycleState {
    /// Whether the pet is dead.
    #[must_use]
    pub fn is_dead(self) -> bool {
        matches!(self, Self::Dead)
    }

    /// Whether the pet is napping.
    #[must_use]
    pub fn is_sleeping(self) -> bool {
        matches!(self, Self::Sleeping)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alive => f.write_str("Alive"),
            Self::Sleeping => f.write_str("Sleeping"),
            Self::Dead => f.write_str("Dead"),
        }
    }
}
