//! The lifecycle engine: one pet's shared state and everything that touches it.
//!
//! All state lives behind a single [`parking_lot::Mutex`]. User actions,
//! background timers and snapshotting each take that lock for the whole of
//! their work, so mutations never overlap and a read issued after an action
//! returns always sees the action's effect.
//!
//! ## State machine
//!
//! ```text
//!            sleep()                 revive()
//!   Alive ───────────▶ Sleeping      Dead ─────────▶ Alive
//!     ▲                   │            ▲
//!     └──── wake timer ───┘            │ health <= 0 (any tick or action)
//!                                Alive/Sleeping
//! ```
//!
//! Dying halts the decay, drift, item and wake timers; revive restarts them.

mod timers;

pub use timers::TimerStatus;

use std::fmt::Write as _;
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, info, trace};

use crate::attributes::{Attribute, Attributes};
use crate::config::TimingConfig;
use crate::error::{PetError, Rejection, Result};
use crate::events::PetEvent;
use crate::inventory::{self, Inventory, Item, ItemKind};
use crate::personality::Personality;
use crate::snapshot::{PetSnapshot, SNAPSHOT_VERSION};
use crate::types::{Action, LifecycleState, Mood, PetId};
use timers::TimerSet;

/// Capacity of the change-notification channel.
///
/// A subscriber that falls further behind receives
/// [`broadcast::error::RecvError::Lagged`] and skips to the newest event.
pub const EVENT_CAPACITY: usize = 256;

/// Bonus magnitude of the preferred action.
const PREFERRED_BONUS: i32 = 5;

/// Counters of work done by one engine since it was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Decay ticks that ran (not skipped).
    pub decay_ticks: u64,
    /// Drift passes.
    pub drifts: u64,
    /// Items appended by the generator.
    pub items_generated: u64,
    /// Items consumed by `use_item`.
    pub items_used: u64,
}

/// Owning handle to one live pet.
///
/// Dropping it cancels every timer. Not `Clone`: share it behind an `Arc`
/// or hand out [`WeakPetEngine`]s.
pub struct PetEngine {
    shared: Arc<Shared>,
}

/// Non-owning handle used by autosave and other observers.
#[derive(Clone)]
pub struct WeakPetEngine {
    shared: Weak<Shared>,
}

impl WeakPetEngine {
    /// Take a snapshot if the engine still exists.
    #[must_use]
    pub fn snapshot(&self) -> Option<PetSnapshot> {
        self.shared.upgrade().map(|s| s.inner.lock().snapshot())
    }
}

pub(crate) struct Shared {
    inner: Mutex<Inner>,
    events: broadcast::Sender<PetEvent>,
}

struct Inner {
    pet_id: PetId,
    name: String,
    attributes: Attributes,
    lifecycle: LifecycleState,
    personality: Option<Personality>,
    preferred: Option<Action>,
    inventory: Inventory,
    last_interaction: DateTime<Utc>,
    last_interaction_at: Instant,
    started: bool,
    rng: StdRng,
    stats: EngineStats,
    events: broadcast::Sender<PetEvent>,
    timers: TimerSet,
}

impl std::fmt::Debug for PetEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("PetEngine")
            .field("pet_id", &inner.pet_id)
            .field("name", &inner.name)
            .field("lifecycle", &inner.lifecycle)
            .field("attributes", &inner.attributes)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl PetEngine {
    /// Adopt a fresh pet on the current Tokio runtime.
    ///
    /// The decay tick and item generator are scheduled immediately; decay
    /// does nothing until [`PetEngine::allow_execution`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`PetError::NoRuntime`] outside a Tokio runtime.
    pub fn new(timing: &TimingConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| PetError::NoRuntime)?;
        Ok(Self::with_runtime(timing, runtime))
    }

    /// Adopt a fresh pet whose timers run on `runtime`.
    #[must_use]
    pub fn with_runtime(timing: &TimingConfig, runtime: Handle) -> Self {
        let snapshot = PetSnapshot {
            version: SNAPSHOT_VERSION,
            pet_id: PetId::new(),
            name: String::new(),
            attributes: Attributes::fresh(),
            lifecycle: LifecycleState::Alive,
            personality: None,
            preferred_action: None,
            inventory: Inventory::new(),
            last_interaction: Utc::now(),
            started: false,
        };
        let engine = Self::build(snapshot, timing, runtime);
        info!(pet = %engine.id(), "Pet adopted");
        engine
    }

    /// Rebuild a live pet from a snapshot on the current Tokio runtime.
    ///
    /// Timers are started fresh: decay and items unless the pet is dead,
    /// plus a full nap if it was saved asleep.
    ///
    /// # Errors
    ///
    /// Returns [`PetError::NoRuntime`] outside a Tokio runtime.
    pub fn from_snapshot(snapshot: PetSnapshot, timing: &TimingConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| PetError::NoRuntime)?;
        Ok(Self::from_snapshot_with_runtime(snapshot, timing, runtime))
    }

    /// Rebuild a live pet from a snapshot on `runtime`.
    #[must_use]
    pub fn from_snapshot_with_runtime(
        snapshot: PetSnapshot,
        timing: &TimingConfig,
        runtime: Handle,
    ) -> Self {
        let engine = Self::build(snapshot, timing, runtime);
        info!(pet = %engine.id(), lifecycle = %engine.lifecycle(), "Pet restored");
        engine
    }

    fn build(mut snapshot: PetSnapshot, timing: &TimingConfig, runtime: Handle) -> Self {
        snapshot.attributes.clamp_all();
        let rng = match timing.item_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let shared = Arc::new_cyclic(|weak: &Weak<Shared>| Shared {
            inner: Mutex::new(Inner {
                pet_id: snapshot.pet_id,
                name: snapshot.name,
                attributes: snapshot.attributes,
                lifecycle: snapshot.lifecycle,
                personality: snapshot.personality,
                preferred: snapshot.preferred_action,
                inventory: snapshot.inventory,
                last_interaction: snapshot.last_interaction,
                last_interaction_at: Instant::now(),
                started: snapshot.started,
                rng,
                stats: EngineStats::default(),
                events: events.clone(),
                timers: TimerSet::new(weak.clone(), runtime, timing.clone()),
            }),
            events,
        });

        {
            let mut inner = shared.inner.lock();
            inner.settle();
            match inner.lifecycle {
                LifecycleState::Dead => {}
                LifecycleState::Sleeping => {
                    inner.timers.start_decay();
                    inner.timers.start_items();
                    inner.timers.start_wake();
                }
                LifecycleState::Alive => {
                    inner.timers.start_decay();
                    inner.timers.start_items();
                }
            }
        }

        Self { shared }
    }

    /// A non-owning handle to this engine.
    #[must_use]
    pub fn downgrade(&self) -> WeakPetEngine {
        WeakPetEngine {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Subscribe to change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PetEvent> {
        self.shared.events.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

impl PetEngine {
    /// Let the decay tick start aging the pet. Idempotent.
    pub fn allow_execution(&self) {
        let mut inner = self.shared.inner.lock();
        if !inner.started {
            inner.started = true;
            info!(pet = %inner.pet_id, "Background decay enabled");
        }
    }

    /// Whether [`PetEngine::allow_execution`] has been called.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.shared.inner.lock().started
    }

    /// Choose the personality. Only the first call succeeds.
    ///
    /// # Errors
    ///
    /// [`Rejection::PersonalityAlreadySet`] on any later call.
    pub fn select_personality(&self, personality: Personality) -> Result<()> {
        let mut inner = self.shared.inner.lock();
        if inner.personality.is_some() {
            return Err(Rejection::PersonalityAlreadySet.into());
        }
        inner.personality = Some(personality);
        info!(pet = %inner.pet_id, %personality, "Personality selected");
        inner.emit(PetEvent::PersonalitySelected(personality));
        Ok(())
    }

    /// Name (or rename) the pet.
    pub fn set_name(&self, name: impl Into<String>) {
        let mut inner = self.shared.inner.lock();
        inner.name = name.into();
        let event = PetEvent::Renamed(inner.name.clone());
        inner.emit(event);
    }

    /// Write one attribute directly. Out-of-range values are clamped.
    pub fn set_attribute(&self, attr: Attribute, value: i32) {
        let mut inner = self.shared.inner.lock();
        inner.attributes.set(attr, value);
        inner.emit(PetEvent::AttributeSet);
        inner.settle();
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

impl PetEngine {
    /// Feed: hunger −10, health +2.
    ///
    /// # Errors
    ///
    /// [`Rejection::Sleeping`] or [`Rejection::Dead`].
    pub fn feed(&self) -> Result<()> {
        self.shared.inner.lock().feed()
    }

    /// Play: social +10, health +2.
    ///
    /// # Errors
    ///
    /// [`Rejection::Sleeping`] or [`Rejection::Dead`].
    pub fn play(&self) -> Result<()> {
        self.shared.inner.lock().play()
    }

    /// Exercise: hunger +10, sleep −10, health +10.
    ///
    /// # Errors
    ///
    /// [`Rejection::Sleeping`] or [`Rejection::Dead`].
    pub fn exercise(&self) -> Result<()> {
        self.shared.inner.lock().exercise()
    }

    /// Take the pet to the vet: health +30.
    ///
    /// # Errors
    ///
    /// [`Rejection::Sleeping`] or [`Rejection::Dead`].
    pub fn visit_vet(&self) -> Result<()> {
        self.shared.inner.lock().visit_vet()
    }

    /// Start a nap. The pet wakes on its own when the nap timer fires.
    ///
    /// # Errors
    ///
    /// [`Rejection::AlreadySleeping`] or [`Rejection::Dead`].
    pub fn sleep(&self) -> Result<()> {
        self.shared.inner.lock().sleep()
    }

    /// Consume the inventory item at `index` and apply its effect.
    ///
    /// The item is removed only if it was used.
    ///
    /// # Errors
    ///
    /// [`Rejection::Dead`], [`Rejection::Sleeping`],
    /// [`Rejection::EmptyInventory`] or [`Rejection::NoSuchItem`].
    pub fn use_item(&self, index: usize) -> Result<Item> {
        self.shared.inner.lock().use_item(index)
    }

    /// Do whatever the pet currently wants, plus a bonus.
    ///
    /// # Errors
    ///
    /// [`Rejection::NoPreferredAction`], or whatever the underlying action
    /// returns. No bonus is applied on failure.
    pub fn perform_preferred_action(&self) -> Result<Action> {
        self.shared.inner.lock().perform_preferred()
    }

    /// Re-run the personality policy now and return its choice.
    ///
    /// # Errors
    ///
    /// [`Rejection::NoPersonality`] before a personality is chosen.
    pub fn evaluate_preference(&self) -> Result<Action> {
        let mut inner = self.shared.inner.lock();
        inner.reevaluate().ok_or_else(|| Rejection::NoPersonality.into())
    }

    /// Bring a dead pet back: hunger 0, social 100, sleep 0, health 100,
    /// score 0, and restart the background timers.
    ///
    /// Authorisation is the caller's responsibility.
    ///
    /// # Errors
    ///
    /// [`Rejection::NotDead`] if the pet is alive.
    pub fn revive(&self) -> Result<()> {
        self.shared.inner.lock().revive()
    }
}

// ---------------------------------------------------------------------------
// Timer control
// ---------------------------------------------------------------------------

impl PetEngine {
    /// Which timers are scheduled right now.
    #[must_use]
    pub fn timers(&self) -> TimerStatus {
        self.shared.inner.lock().timers.status()
    }

    /// Stop the item generator. Idempotent.
    pub fn stop_item_generator(&self) {
        self.shared.inner.lock().timers.halt_items();
    }

    /// (Re)start the item generator unless the pet is dead. Idempotent.
    pub fn start_item_generator(&self) {
        let mut inner = self.shared.inner.lock();
        if !inner.lifecycle.is_dead() {
            inner.timers.start_items();
        }
    }

    /// Stop every timer this engine owns. Idempotent and non-blocking; a
    /// firing already in flight may still complete.
    pub fn stop_timers(&self) {
        let mut inner = self.shared.inner.lock();
        inner.timers.halt_lifecycle();
        debug!(pet = %inner.pet_id, "All timers stopped");
    }
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

impl PetEngine {
    /// Identity of the pet.
    #[must_use]
    pub fn id(&self) -> PetId {
        self.shared.inner.lock().pet_id
    }

    /// The pet's name.
    #[must_use]
    pub fn name(&self) -> String {
        self.shared.inner.lock().name.clone()
    }

    /// One attribute, clamped.
    #[must_use]
    pub fn attribute(&self, attr: Attribute) -> i32 {
        self.shared.inner.lock().attributes.get(attr)
    }

    /// All attributes at once.
    #[must_use]
    pub fn attributes(&self) -> Attributes {
        self.shared.inner.lock().attributes
    }

    /// Current hunger.
    #[must_use]
    pub fn hunger(&self) -> i32 {
        self.attribute(Attribute::Hunger)
    }

    /// Current social.
    #[must_use]
    pub fn social(&self) -> i32 {
        self.attribute(Attribute::Social)
    }

    /// Current sleepiness.
    #[must_use]
    pub fn sleepiness(&self) -> i32 {
        self.attribute(Attribute::Sleep)
    }

    /// Current health.
    #[must_use]
    pub fn health(&self) -> i32 {
        self.attribute(Attribute::Health)
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> i32 {
        self.attribute(Attribute::Score)
    }

    /// Derived mood.
    #[must_use]
    pub fn mood(&self) -> Mood {
        self.shared.inner.lock().attributes.mood()
    }

    /// Last preference computed by the personality policy.
    #[must_use]
    pub fn preferred_action(&self) -> Option<Action> {
        self.shared.inner.lock().preferred
    }

    /// Chosen personality.
    #[must_use]
    pub fn personality(&self) -> Option<Personality> {
        self.shared.inner.lock().personality
    }

    /// Alive / Sleeping / Dead.
    #[must_use]
    pub fn lifecycle(&self) -> LifecycleState {
        self.shared.inner.lock().lifecycle
    }

    /// Whether the pet is dead.
    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.lifecycle().is_dead()
    }

    /// Whether the pet is napping.
    #[must_use]
    pub fn is_sleeping(&self) -> bool {
        self.lifecycle().is_sleeping()
    }

    /// Copy of the inventory contents.
    #[must_use]
    pub fn inventory(&self) -> Vec<Item> {
        self.shared.inner.lock().inventory.items().to_vec()
    }

    /// Wall-clock time of the last user interaction.
    #[must_use]
    pub fn last_interaction(&self) -> DateTime<Utc> {
        self.shared.inner.lock().last_interaction
    }

    /// Work counters.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.shared.inner.lock().stats
    }

    /// A consistent copy of all persistent state, taken under the lock.
    #[must_use]
    pub fn snapshot(&self) -> PetSnapshot {
        self.shared.inner.lock().snapshot()
    }

    /// Multi-line summary for text front-ends.
    #[must_use]
    pub fn status_line(&self) -> String {
        let inner = self.shared.inner.lock();
        let a = &inner.attributes;
        let mut out = String::new();
        let _ = writeln!(out, "Score: {}", a.score());
        let _ = writeln!(out, "Hunger: {}", a.hunger());
        let _ = writeln!(out, "Social: {}", a.social());
        let _ = writeln!(out, "Sleep: {}", a.sleep());
        let _ = writeln!(out, "Health: {}", a.health());
        let _ = writeln!(out, "Mood: {}", a.mood());
        let _ = writeln!(
            out,
            "Personality: {}",
            inner.personality.map_or("No Personality Set", Personality::name)
        );
        let _ = write!(out, "State: {}", inner.lifecycle);
        out
    }
}

// ---------------------------------------------------------------------------
// Timer entry points
// ---------------------------------------------------------------------------

impl Shared {
    /// Five-second tick: wake the drift if idle, apply neglect, check death.
    fn decay_tick(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.started {
            trace!(pet = %inner.pet_id, "Decay tick before start; skipped");
            return Ok(());
        }
        if inner.lifecycle.is_dead() {
            return Ok(());
        }
        inner.stats.decay_ticks += 1;

        let idle = inner.last_interaction_at.elapsed();
        if idle > inner.timers_debounce() && !inner.timers.drift_running() {
            debug!(pet = %inner.pet_id, idle = ?idle, "Attribute drift resumed");
            inner.timers.start_drift();
        }

        if inner.attributes.needs_neglected() {
            inner.attributes.adjust(Attribute::Health, -5);
            let health = inner.attributes.health();
            debug!(pet = %inner.pet_id, health, "Neglect penalty");
            inner.emit(PetEvent::HealthPenalty { health });
        }

        inner.reevaluate();
        inner.settle();
        Ok(())
    }

    /// Once-per-minute aging.
    fn drift(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.lifecycle.is_dead() {
            return Ok(());
        }
        inner.stats.drifts += 1;
        let bump = inner.rng.gen_range(1..=20);
        inner.attributes.adjust(Attribute::Score, bump);
        inner.attributes.adjust(Attribute::Hunger, 5);
        inner.attributes.adjust(Attribute::Sleep, 15);
        inner.attributes.adjust(Attribute::Social, -2);
        debug!(
            pet = %inner.pet_id,
            hunger = inner.attributes.hunger(),
            sleep = inner.attributes.sleep(),
            social = inner.attributes.social(),
            "Attributes drifted"
        );
        inner.emit(PetEvent::Drifted);
        inner.reevaluate();
        inner.settle();
        Ok(())
    }

    fn generate_item(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.lifecycle.is_dead() {
            return Ok(());
        }
        let item = Item::new(ItemKind::random(&mut inner.rng));
        debug!(pet = %inner.pet_id, item = %item, "Item generated");
        inner.inventory.push(item.clone());
        inner.stats.items_generated += 1;
        inner.emit(PetEvent::ItemGenerated(item));
        Ok(())
    }

    /// Nap over: sleepiness −30, health +5.
    ///
    /// `epoch` identifies the nap the firing belongs to; a stale one is a
    /// no-op.
    fn wake(&self, epoch: u64) -> Result<()> {
        let mut inner = self.inner.lock();
        if !inner.timers.wake_fired(epoch) {
            debug!(pet = %inner.pet_id, "Stale wake firing ignored");
            return Ok(());
        }
        if !inner.lifecycle.is_sleeping() {
            return Ok(());
        }
        inner.lifecycle = LifecycleState::Alive;
        inner.touch();
        inner.attributes.adjust(Attribute::Sleep, -30);
        inner.attributes.adjust(Attribute::Health, 5);
        info!(pet = %inner.pet_id, "Pet woke up");
        inner.emit(PetEvent::WokeUp);
        inner.settle();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Critical-section bodies
// ---------------------------------------------------------------------------

impl Inner {
    fn emit(&self, event: PetEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn touch(&mut self) {
        self.last_interaction = Utc::now();
        self.last_interaction_at = Instant::now();
    }

    fn timers_debounce(&self) -> std::time::Duration {
        self.timers.debounce()
    }

    /// Record the interaction, then refuse if dead or napping.
    fn begin_action(&mut self) -> Result<()> {
        self.touch();
        match self.lifecycle {
            LifecycleState::Dead => Err(Rejection::Dead.into()),
            LifecycleState::Sleeping => Err(Rejection::Sleeping.into()),
            LifecycleState::Alive => Ok(()),
        }
    }

    /// Dead check run at the end of every tick and action.
    fn settle(&mut self) {
        if self.lifecycle.is_dead() || !self.attributes.is_depleted() {
            return;
        }
        self.lifecycle = LifecycleState::Dead;
        self.timers.halt_lifecycle();
        info!(pet = %self.pet_id, score = self.attributes.score(), "Pet died");
        self.emit(PetEvent::Died);
    }

    /// Run the personality policy; `None` without a personality.
    fn reevaluate(&mut self) -> Option<Action> {
        let action = self.personality?.decide(&self.attributes);
        if self.preferred != Some(action) {
            self.preferred = Some(action);
            self.emit(PetEvent::PreferenceChanged(action));
        }
        Some(action)
    }

    fn feed(&mut self) -> Result<()> {
        self.begin_action()?;
        self.attributes.adjust(Attribute::Hunger, -10);
        self.attributes.adjust(Attribute::Health, 2);
        self.emit(PetEvent::Fed);
        self.settle();
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.begin_action()?;
        self.attributes.adjust(Attribute::Social, 10);
        self.attributes.adjust(Attribute::Health, 2);
        self.emit(PetEvent::Played);
        self.settle();
        Ok(())
    }

    fn exercise(&mut self) -> Result<()> {
        self.begin_action()?;
        self.attributes.adjust(Attribute::Hunger, 10);
        self.attributes.adjust(Attribute::Sleep, -10);
        self.attributes.adjust(Attribute::Health, 10);
        self.emit(PetEvent::Exercised);
        self.settle();
        Ok(())
    }

    fn visit_vet(&mut self) -> Result<()> {
        self.begin_action()?;
        self.attributes.adjust(Attribute::Health, 30);
        self.emit(PetEvent::VetVisited);
        self.settle();
        Ok(())
    }

    fn sleep(&mut self) -> Result<()> {
        self.touch();
        match self.lifecycle {
            LifecycleState::Dead => return Err(Rejection::Dead.into()),
            LifecycleState::Sleeping => return Err(Rejection::AlreadySleeping.into()),
            LifecycleState::Alive => {}
        }
        self.lifecycle = LifecycleState::Sleeping;
        self.timers.start_wake();
        info!(pet = %self.pet_id, "Pet fell asleep");
        self.emit(PetEvent::FellAsleep);
        Ok(())
    }

    fn use_item(&mut self, index: usize) -> Result<Item> {
        self.begin_action()?;
        if self.inventory.is_empty() {
            return Err(Rejection::EmptyInventory.into());
        }
        let len = self.inventory.len();
        let item = self
            .inventory
            .take(index)
            .ok_or(Rejection::NoSuchItem { index, len })?;
        inventory::apply_effect(&mut self.attributes, item.kind);
        self.stats.items_used += 1;
        debug!(pet = %self.pet_id, item = %item, "Item used");
        self.emit(PetEvent::ItemUsed(item.clone()));
        self.settle();
        Ok(item)
    }

    fn perform_preferred(&mut self) -> Result<Action> {
        let Some(action) = self.preferred else {
            self.touch();
            return Err(Rejection::NoPreferredAction.into());
        };
        match action {
            Action::Feed => self.feed()?,
            Action::Play => self.play()?,
            Action::Sleep => self.sleep()?,
        }
        let (attr, delta) = match action {
            Action::Feed => (Attribute::Hunger, -PREFERRED_BONUS),
            Action::Play => (Attribute::Social, PREFERRED_BONUS),
            Action::Sleep => (Attribute::Sleep, -PREFERRED_BONUS),
        };
        self.attributes.adjust(attr, delta);
        self.attributes.adjust(Attribute::Health, PREFERRED_BONUS / 3);
        self.emit(PetEvent::BonusApplied(action));
        self.settle();
        Ok(action)
    }

    fn revive(&mut self) -> Result<()> {
        if !self.lifecycle.is_dead() {
            return Err(Rejection::NotDead.into());
        }
        self.attributes = Attributes::revived();
        self.lifecycle = LifecycleState::Alive;
        self.touch();
        self.timers.restart_lifecycle();
        info!(pet = %self.pet_id, "Pet revived");
        self.emit(PetEvent::Revived);
        Ok(())
    }

    fn snapshot(&self) -> PetSnapshot {
        PetSnapshot {
            version: SNAPSHOT_VERSION,
            pet_id: self.pet_id,
            name: self.name.clone(),
            attributes: self.attributes,
            lifecycle: self.lifecycle,
            personality: self.personality,
            preferred_action: self.preferred,
            inventory: self.inventory.clone(),
            last_interaction: self.last_interaction,
            started: self.started,
        }
    }
}
