//! Error types for the petsim core library.

use thiserror::Error;

use crate::types::SlotId;

/// Why the engine refused an operation. State is unchanged when one of these
/// is returned (apart from the last-interaction time).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// `sleep()` while a nap is already running.
    #[error("Pet is already sleeping")]
    AlreadySleeping,

    /// A user action while napping.
    #[error("Pet is sleeping. Please wait until it wakes up.")]
    Sleeping,

    /// Anything but revive while dead.
    #[error("Pet is dead")]
    Dead,

    /// `revive()` on a living pet.
    #[error("Pet is not dead")]
    NotDead,

    /// A second personality selection.
    #[error("Personality has already been set and cannot be changed")]
    PersonalityAlreadySet,

    /// Policy evaluation before a personality was chosen.
    #[error("No personality has been chosen yet")]
    NoPersonality,

    /// `perform_preferred_action()` before any preference was computed.
    #[error("Pet has no preferred action yet")]
    NoPreferredAction,

    /// Item use with nothing in the inventory.
    #[error("Inventory is empty")]
    EmptyInventory,

    /// Item index past the end of the inventory.
    #[error("No item at index {index} (inventory holds {len})")]
    NoSuchItem {
        /// Requested index.
        index: usize,
        /// Inventory length at the time.
        len: usize,
    },
}

/// Top-level error type for all petsim operations.
#[derive(Error, Debug)]
pub enum PetError {
    /// The operation is not legal in the pet's current state.
    #[error("Invalid operation: {0}")]
    InvalidOperation(#[from] Rejection),

    /// Nothing has been saved in this slot.
    #[error("Save slot not found: {0}")]
    SlotNotFound(SlotId),

    /// The slot exists but its contents cannot be trusted or decoded.
    #[error("Save slot {slot} is corrupt: {reason}")]
    CorruptSave {
        /// Which slot.
        slot: SlotId,
        /// What was wrong with it.
        reason: String,
    },

    /// Serialization failure while writing a snapshot.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The engine needs a Tokio runtime to schedule its timers.
    #[error("No Tokio runtime available to drive pet timers")]
    NoRuntime,

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PetError {
    /// The rejection behind an [`PetError::InvalidOperation`], if any.
    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::InvalidOperation(r) => Some(r),
            _ => None,
        }
    }

    /// Whether this is a missing-slot error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SlotNotFound(_))
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, PetError>;
