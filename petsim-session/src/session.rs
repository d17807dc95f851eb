//! One play session: the current pet, its save slots and the play clock.
//!
//! ```text
//!  new_game / load_game ──▶ playing ──▶ exit(slot)
//!          ▲                  │  │
//!          └──── restart ─────┘  └── revive(password) when dead
//! ```
//!
//! At most one [`PetEngine`] is live per session. Replacing it (restart,
//! load) stops the old engine's timers and autosave first.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{info, warn};

use petsim_core::{PersistenceGateway, PetConfig, PetEngine, PetError, Personality, SlotId};

use crate::error::{Result, SessionError};
use crate::events::SessionEvent;
use crate::parental::ParentalControls;

/// How often the play clock ticks; each tick counts one minute.
pub const PLAY_CHECK_INTERVAL: Duration = Duration::from_secs(60);

const EVENT_CAPACITY: usize = 64;

/// Parse a user-entered slot. Only "1", "2" and "3" are accepted.
///
/// # Errors
///
/// [`SessionError::InvalidSlot`] for anything else.
pub fn validate_slot(input: &str) -> Result<SlotId> {
    let slot = SlotId::new(input.trim());
    if slot.is_standard() {
        Ok(slot)
    } else {
        Err(SessionError::InvalidSlot(input.to_string()))
    }
}

/// Controller glue between a presentation layer and the pet engine.
pub struct GameSession {
    config: PetConfig,
    saves: Arc<PersistenceGateway>,
    parental: Arc<Mutex<ParentalControls>>,
    pet: Option<PetEngine>,
    session_minutes: Arc<AtomicU64>,
    events: broadcast::Sender<SessionEvent>,
    play_clock: JoinHandle<()>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("pet", &self.pet)
            .field("session_minutes", &self.session_minutes())
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Start a session: load parental settings and start the play clock.
    ///
    /// # Errors
    ///
    /// Settings failures, or [`PetError::NoRuntime`] outside Tokio.
    pub fn new(config: PetConfig, saves: Arc<PersistenceGateway>) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| PetError::NoRuntime)?;
        let parental = Arc::new(Mutex::new(ParentalControls::load(&config.parental)?));
        let session_minutes = Arc::new(AtomicU64::new(0));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let play_clock = runtime.spawn(run_play_clock(
            Arc::clone(&parental),
            Arc::clone(&session_minutes),
            events.clone(),
        ));

        {
            let controls = parental.lock();
            info!(
                total_minutes = controls.total_play_time(),
                limit = ?controls.play_time_limit(),
                "Session started"
            );
        }

        Ok(Self {
            config,
            saves,
            parental,
            pet: None,
            session_minutes,
            events,
            play_clock,
        })
    }

    /// Subscribe to session notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// The current pet.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoActiveGame`] before a game is started or loaded.
    pub fn pet(&self) -> Result<&PetEngine> {
        self.pet.as_ref().ok_or(SessionError::NoActiveGame)
    }

    /// The save database.
    #[must_use]
    pub fn saves(&self) -> &Arc<PersistenceGateway> {
        &self.saves
    }

    /// Parental settings, locked for reading or changing.
    pub fn parental(&self) -> MutexGuard<'_, ParentalControls> {
        self.parental.lock()
    }

    /// Whole minutes played in this session so far.
    #[must_use]
    pub fn session_minutes(&self) -> u64 {
        self.session_minutes.load(Ordering::Relaxed)
    }

    // ------------------------------------------------------------------
    // Game lifecycle
    // ------------------------------------------------------------------

    /// Adopt a fresh pet with the chosen personality and name, and let it
    /// start aging. Any current pet is retired first.
    ///
    /// # Errors
    ///
    /// Engine construction failures.
    pub fn new_game(&mut self, personality: Personality, name: &str) -> Result<&PetEngine> {
        self.retire_pet();
        let pet = PetEngine::new(&self.config.timing)?;
        pet.select_personality(personality)?;
        pet.set_name(name);
        pet.allow_execution();
        info!(pet = %pet.id(), %personality, pet_name = name, "New game");
        self.emit(SessionEvent::GameStarted);
        Ok(&*self.pet.insert(pet))
    }

    /// Throw the current pet away and adopt a new one.
    ///
    /// # Errors
    ///
    /// As [`GameSession::new_game`].
    pub fn restart(&mut self, personality: Personality, name: &str) -> Result<&PetEngine> {
        info!("Restarting game");
        self.new_game(personality, name)
    }

    /// Load a pet from a slot and autosave back to it.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidSlot`], or the load failure (not found and
    /// corrupt are distinct [`PetError`] variants).
    pub fn load_game(&mut self, slot: &str) -> Result<&PetEngine> {
        let slot = validate_slot(slot)?;
        let pet = self.saves.load(&slot, &self.config.timing)?;
        self.retire_pet();
        self.saves.start_autosave(
            &pet,
            slot.clone(),
            self.config.persistence.autosave_interval(),
        )?;
        self.emit(SessionEvent::GameLoaded(slot));
        Ok(&*self.pet.insert(pet))
    }

    /// Save the current pet and keep autosaving to the same slot.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidSlot`], [`SessionError::NoActiveGame`] or a
    /// persistence failure.
    pub fn save_game(&self, slot: &str) -> Result<()> {
        let slot = validate_slot(slot)?;
        let pet = self.pet()?;
        self.saves.save(pet, &slot)?;
        if self.saves.autosave_slot().as_ref() != Some(&slot) {
            self.saves.start_autosave(
                pet,
                slot.clone(),
                self.config.persistence.autosave_interval(),
            )?;
        }
        self.emit(SessionEvent::GameSaved(slot));
        Ok(())
    }

    /// Revive a dead pet after checking the parental password.
    ///
    /// # Errors
    ///
    /// [`SessionError::WrongPassword`], [`SessionError::NoActiveGame`], or
    /// the engine's rejection when the pet is not dead.
    pub fn revive(&self, password: &str) -> Result<()> {
        self.parental.lock().authorize(password)?;
        self.pet()?.revive()?;
        self.emit(SessionEvent::PetRevived);
        Ok(())
    }

    /// End the session: optionally save, stop every timer, and add this
    /// session's minutes to the persisted total. Returns the new total.
    ///
    /// Timers are stopped even when the save fails.
    ///
    /// # Errors
    ///
    /// The save failure, or a settings write failure.
    pub fn exit(mut self, slot: Option<&str>) -> Result<u64> {
        let saved = slot.map_or(Ok(()), |s| self.save_game(s));

        self.play_clock.abort();
        self.retire_pet();

        let minutes = self.session_minutes.swap(0, Ordering::Relaxed);
        let total = self.parental.lock().add_play_time(minutes)?;
        info!(minutes, total, "Session ended");
        self.emit(SessionEvent::SessionEnded {
            total_minutes: total,
        });
        saved.map(|()| total)
    }

    fn retire_pet(&mut self) {
        self.saves.stop_autosave();
        if let Some(old) = self.pet.take() {
            old.stop_timers();
            info!(pet = %old.id(), "Pet retired");
        }
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        self.play_clock.abort();
        self.retire_pet();
    }
}

/// Count minutes and announce once when the parental limit is reached.
async fn run_play_clock(
    parental: Arc<Mutex<ParentalControls>>,
    session_minutes: Arc<AtomicU64>,
    events: broadcast::Sender<SessionEvent>,
) {
    let mut ticker = interval_at(Instant::now() + PLAY_CHECK_INTERVAL, PLAY_CHECK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut announced = false;
    loop {
        ticker.tick().await;
        let minutes = session_minutes.fetch_add(1, Ordering::Relaxed) + 1;
        if announced {
            continue;
        }
        let (reached, total) = {
            let controls = parental.lock();
            (
                controls.limit_reached(minutes),
                controls.total_play_time().saturating_add(minutes),
            )
        };
        if reached {
            announced = true;
            warn!(total_minutes = total, "Play-time limit reached");
            let _ = events.send(SessionEvent::PlayTimeLimitReached {
                total_minutes: total,
            });
        }
    }
}
