//! Session-level notifications.
//!
//! Pet state changes come from [`petsim_core::PetEngine::subscribe`]; these
//! cover what happens around the pet.

use petsim_core::SlotId;

/// Something the presentation layer should react to outside the pet itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A fresh pet was adopted (new game or restart).
    GameStarted,
    /// A saved pet was loaded.
    GameLoaded(SlotId),
    /// The current pet was written to a slot.
    GameSaved(SlotId),
    /// The password was accepted and the pet revived.
    PetRevived,
    /// Total play time reached the parental limit; the game should end.
    PlayTimeLimitReached {
        /// Finished sessions plus this one, in minutes.
        total_minutes: u64,
    },
    /// The session ended and its minutes were added to the total.
    SessionEnded {
        /// New total play time in minutes.
        total_minutes: u64,
    },
}

impl SessionEvent {
    /// The line a presentation layer shows for this event.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::GameStarted => "A new pet has joined you!".to_string(),
            Self::GameLoaded(slot) => format!("Loaded save slot {slot}."),
            Self::GameSaved(slot) => format!("Saved to slot {slot}."),
            Self::PetRevived => "Your pet has been revived!".to_string(),
            Self::PlayTimeLimitReached { .. } => {
                "Playtime limit reached. The game will now exit.".to_string()
            }
            Self::SessionEnded { total_minutes } => {
                format!("Thanks for playing! Total playtime: {total_minutes} minutes.")
            }
        }
    }
}
