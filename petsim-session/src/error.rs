//! Error types for the session layer.

use thiserror::Error;

use petsim_core::PetError;

/// Everything a session operation can fail with.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The engine or save database refused or failed.
    #[error(transparent)]
    Pet(#[from] PetError),

    /// Save slots are "1", "2" or "3".
    #[error("Invalid save slot {0:?}; expected 1, 2 or 3")]
    InvalidSlot(String),

    /// The parental password did not match.
    #[error("Incorrect parental password")]
    WrongPassword,

    /// No pet has been adopted or loaded yet.
    #[error("No game in progress")]
    NoActiveGame,

    /// The parental settings file could not be parsed or written.
    #[error("Settings error: {0}")]
    Settings(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, SessionError>;
