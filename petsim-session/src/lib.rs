//! # petsim-session — game-session glue for petsim
//!
//! Sits between a presentation layer (terminal, GUI, test harness) and
//! `petsim-core`. It owns the current [`petsim_core::PetEngine`] and does
//! what a game menu needs around it:
//!
//! - `session` — new game, load, save, restart, exit, password-gated revive
//! - `parental` — the parental password and the play-time limit and total,
//!   kept in a TOML settings file
//! - `events` — session notifications such as the play-time limit being hit
//!
//! Nothing here renders anything.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod events;
pub mod parental;
pub mod session;

pub use error::SessionError;
pub use events::SessionEvent;
pub use parental::{ParentalControls, PlaySettings};
pub use session::{GameSession, PLAY_CHECK_INTERVAL, validate_slot};
