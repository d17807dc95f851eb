//! Engine-owned background timers.
//!
//! Each timer is a Tokio task holding only a [`Weak`] reference to the
//! engine, so dropping the engine ends every task at its next firing.
//! Halting a timer aborts its task; restarting spawns a fresh one. Neither
//! operation waits for a firing already in flight.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, warn};

use super::Shared;
use crate::config::TimingConfig;
use crate::error::Result;

/// Which background timers are currently scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerStatus {
    /// The decay tick.
    pub decay: bool,
    /// The per-minute attribute drift.
    pub drift: bool,
    /// The item generator.
    pub items: bool,
    /// The one-shot wake timer.
    pub wake: bool,
}

/// Handles of every timer owned by one engine.
pub(super) struct TimerSet {
    owner: Weak<Shared>,
    runtime: Handle,
    timing: TimingConfig,
    decay: Option<JoinHandle<()>>,
    drift: Option<JoinHandle<()>>,
    items: Option<JoinHandle<()>>,
    wake: Option<JoinHandle<()>>,
    /// Bumped whenever a nap is scheduled or its timer halted.
    nap_epoch: u64,
}

impl TimerSet {
    pub(super) fn new(owner: Weak<Shared>, runtime: Handle, timing: TimingConfig) -> Self {
        Self {
            owner,
            runtime,
            timing,
            decay: None,
            drift: None,
            items: None,
            wake: None,
            nap_epoch: 0,
        }
    }

    pub(super) fn status(&self) -> TimerStatus {
        TimerStatus {
            decay: is_live(self.decay.as_ref()),
            drift: is_live(self.drift.as_ref()),
            items: is_live(self.items.as_ref()),
            wake: is_live(self.wake.as_ref()),
        }
    }

    pub(super) fn start_decay(&mut self) {
        if is_live(self.decay.as_ref()) {
            return;
        }
        let first = Instant::now() + self.timing.decay_initial_delay();
        let period = self.timing.decay_tick();
        self.decay = Some(self.spawn_periodic("decay", first, period, Shared::decay_tick));
    }

    pub(super) fn start_drift(&mut self) {
        if is_live(self.drift.as_ref()) {
            return;
        }
        let period = self.timing.drift_interval();
        let first = Instant::now() + period;
        self.drift = Some(self.spawn_periodic("drift", first, period, Shared::drift));
    }

    pub(super) fn start_items(&mut self) {
        if is_live(self.items.as_ref()) {
            return;
        }
        let period = self.timing.item_interval();
        let first = Instant::now() + period;
        self.items = Some(self.spawn_periodic("items", first, period, Shared::generate_item));
    }

    /// Schedule the wake-up. Replaces any earlier wake timer.
    ///
    /// A firing of an earlier timer that is already waiting on the engine
    /// lock cannot be aborted; it carries a stale epoch and is ignored by
    /// [`TimerSet::wake_fired`].
    pub(super) fn start_wake(&mut self) {
        self.halt_wake();
        let epoch = self.nap_epoch;
        let owner = self.owner.clone();
        let nap = self.timing.nap();
        self.wake = Some(self.runtime.spawn(async move {
            tokio::time::sleep(nap).await;
            if let Some(shared) = owner.upgrade() {
                fire("wake", || shared.wake(epoch));
            }
        }));
    }

    /// Claim the firing of the wake timer scheduled at `epoch`.
    ///
    /// Returns `false` for a timer that was halted or replaced; the current
    /// handle is left alone in that case.
    pub(super) fn wake_fired(&mut self, epoch: u64) -> bool {
        if epoch != self.nap_epoch {
            return false;
        }
        self.wake = None;
        true
    }

    pub(super) fn debounce(&self) -> Duration {
        self.timing.interaction_debounce()
    }

    pub(super) fn drift_running(&self) -> bool {
        is_live(self.drift.as_ref())
    }

    pub(super) fn halt_items(&mut self) {
        halt(&mut self.items);
    }

    /// Halt everything driven by the pet being alive. Restartable.
    pub(super) fn halt_lifecycle(&mut self) {
        halt(&mut self.decay);
        halt(&mut self.drift);
        halt(&mut self.items);
        self.halt_wake();
    }

    fn halt_wake(&mut self) {
        halt(&mut self.wake);
        self.nap_epoch = self.nap_epoch.wrapping_add(1);
    }

    /// Restart decay, drift and item generation.
    pub(super) fn restart_lifecycle(&mut self) {
        self.start_decay();
        self.start_drift();
        self.start_items();
    }

    fn spawn_periodic(
        &self,
        name: &'static str,
        first: Instant,
        period: Duration,
        job: fn(&Shared) -> Result<()>,
    ) -> JoinHandle<()> {
        let owner = self.owner.clone();
        self.runtime.spawn(async move {
            let mut ticker = interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(shared) = owner.upgrade() else {
                    debug!(timer = name, "Engine dropped, timer exiting");
                    break;
                };
                fire(name, || job(&shared));
            }
        })
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        self.halt_lifecycle();
    }
}

/// Run one firing. Errors and panics are logged; the timer keeps going.
fn fire(name: &'static str, job: impl FnOnce() -> Result<()>) {
    match catch_unwind(AssertUnwindSafe(job)) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(timer = name, error = %e, "Timer firing skipped"),
        Err(_) => warn!(timer = name, "Timer firing panicked; skipped"),
    }
}

fn halt(slot: &mut Option<JoinHandle<()>>) {
    if let Some(handle) = slot.take() {
        handle.abort();
    }
}

fn is_live(slot: Option<&JoinHandle<()>>) -> bool {
    slot.is_some_and(|h| !h.is_finished())
}
