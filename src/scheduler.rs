//! Trigger engine: fires schedule entries against the wall clock.
//!
//! ```text
//!        ┌───────────────────────── every second ─────────────────────────┐
//!        ▼                                                                │
//!  read wall clock ──▶ rest actuators ──▶ for entry in schedule ──▶ second == 59?
//!                                          │                          │ yes
//!                                          │ slot == now &&           ▼
//!                                          │ slot ∉ fired        clear fired set
//!                                          ▼
//!                              ActuatorController::run_sequence
//!                                          │ Ok
//!                                          ▼
//!                              water_left -= 50, fired += slot
//! ```
//!
//! The fired set is what stops an entry from firing on every tick of its
//! minute.  It is cleared whenever a tick lands on second 59, which makes the
//! slot eligible again at its next daily occurrence without tracking dates.
//! Slots whose sequence faulted are held in a separate set with the same
//! lifetime: they do not count as fired, but they are not retried within
//! the window either.
//!
//! A sequence blocks the loop for its full duration (up to ~20 s).  The
//! engine does not try to catch up on the ticks it missed; it simply reads
//! the clock again.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use core::ops::{Deref, DerefMut};
use core::time::Duration;

use log::info;

use crate::app::controller::ActuatorController;
use crate::app::events::AppEvent;
use crate::app::ports::{ActuatorPort, ClockPort, EventSink, WallClock};
use crate::config::FeederConfig;
use crate::store::{ScheduleStore, StatusStore};

/// What a single tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Entries whose sequence completed.
    pub fired: usize,
    /// Entries whose sequence aborted with an actuator fault.
    pub failed: usize,
    /// Whether the fired set was cleared at the end of this tick.
    pub dedup_cleared: bool,
}

pub struct TriggerEngine {
    schedule: Arc<ScheduleStore>,
    status: Arc<StatusStore>,
    controller: ActuatorController,
    /// `(hour, minute)` slots that already fired in the current window.
    fired: BTreeSet<(u8, u8)>,
    /// Slots whose sequence aborted in the current window.
    faulted: BTreeSet<(u8, u8)>,
    water_per_feed: u32,
    tick_interval: Duration,
    clock_synced: bool,
}

impl TriggerEngine {
    pub fn new(
        config: &FeederConfig,
        schedule: Arc<ScheduleStore>,
        status: Arc<StatusStore>,
    ) -> Self {
        Self {
            schedule,
            status,
            controller: ActuatorController::new(config),
            fired: BTreeSet::new(),
            faulted: BTreeSet::new(),
            water_per_feed: config.water_per_feed,
            tick_interval: config.tick_interval(),
            clock_synced: true,
        }
    }

    /// Run one evaluation at wall-clock time `now`.
    pub fn tick(
        &mut self,
        now: WallClock,
        hw: &mut impl ActuatorPort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) -> TickReport {
        let mut report = TickReport::default();

        if let Err(e) = self.controller.rest(hw) {
            sink.emit(&AppEvent::RestFailed(e));
        }

        // Snapshot under the lock, fire outside it.  Slots handled during
        // this tick are merged afterwards so duplicate entries all run.
        let entries = self.schedule.read();
        let mut fired_now = BTreeSet::new();
        let mut faulted_now = BTreeSet::new();
        for entry in entries.iter().filter(|e| e.slot() == now.slot()) {
            if self.fired.contains(&entry.slot()) || self.faulted.contains(&entry.slot()) {
                continue;
            }

            sink.emit(&AppEvent::TriggerStarted { at: now, entry: *entry });
            match self.controller.run_sequence(entry, hw, clock, sink) {
                Ok(_) => {
                    let water = self.water_per_feed;
                    let status = self.status.update(|s| s.consume_water(water));
                    fired_now.insert(entry.slot());
                    report.fired += 1;
                    sink.emit(&AppEvent::TriggerCompleted {
                        entry: *entry,
                        water_left: status.water_left,
                    });
                }
                Err(error) => {
                    report.failed += 1;
                    faulted_now.insert(entry.slot());
                    sink.emit(&AppEvent::TriggerFailed { entry: *entry, error });
                    // Leave nothing energised after an aborted sequence.
                    if let Err(e) = self.controller.rest(hw) {
                        sink.emit(&AppEvent::RestFailed(e));
                    }
                }
            }
        }
        self.fired.extend(fired_now);
        self.faulted.extend(faulted_now);

        if now.second == 59 {
            let slots = self.fired.len();
            self.fired.clear();
            self.faulted.clear();
            report.dedup_cleared = true;
            if slots > 0 {
                sink.emit(&AppEvent::DedupCleared { slots });
            }
        }

        report
    }

    /// One loop iteration: read the clock, tick if it is synchronised.
    /// Returns `None` while the wall clock is unavailable.
    pub fn poll(
        &mut self,
        hw: &mut impl ActuatorPort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) -> Option<TickReport> {
        let Some(now) = clock.now() else {
            if let Err(e) = self.controller.rest(hw) {
                sink.emit(&AppEvent::RestFailed(e));
            }
            if self.clock_synced {
                self.clock_synced = false;
                sink.emit(&AppEvent::ClockUnsynced);
            }
            return None;
        };

        if !self.clock_synced {
            self.clock_synced = true;
            sink.emit(&AppEvent::ClockSynced(now));
        }
        Some(self.tick(now, hw, clock, sink))
    }

    /// Loop until `stop` is raised, then release the actuators.  A panic
    /// inside the loop releases them too, while unwinding.
    ///
    /// Each iteration sleeps for whatever is left of the tick interval; an
    /// iteration that overran (a sequence fired) starts the next one
    /// immediately rather than replaying skipped seconds.
    pub fn run(
        &mut self,
        hw: &mut impl ActuatorPort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
        stop: &AtomicBool,
    ) {
        info!(
            "TriggerEngine: running ({} entries, tick {:?})",
            self.schedule.len(),
            self.tick_interval
        );
        sink.emit(&AppEvent::EngineStarted {
            tick: self.tick_interval,
        });

        let mut hw = ReleaseOnDrop(hw);
        while !stop.load(Ordering::Acquire) {
            let started = clock.uptime();
            self.poll(&mut *hw, clock, sink);
            let elapsed = clock.uptime().saturating_sub(started);
            if let Some(remaining) = self.tick_interval.checked_sub(elapsed) {
                if !remaining.is_zero() {
                    clock.sleep(remaining);
                }
            }
        }

        drop(hw);
        sink.emit(&AppEvent::EngineStopped);
    }

    /// Number of slots currently held in the fired set.
    pub fn fired_slots(&self) -> usize {
        self.fired.len()
    }
}

/// Calls [`ActuatorPort::cleanup`] on the wrapped port when dropped.
struct ReleaseOnDrop<'a, A: ActuatorPort>(&'a mut A);

impl<A: ActuatorPort> Deref for ReleaseOnDrop<'_, A> {
    type Target = A;

    fn deref(&self) -> &A {
        self.0
    }
}

impl<A: ActuatorPort> DerefMut for ReleaseOnDrop<'_, A> {
    fn deref_mut(&mut self) -> &mut A {
        self.0
    }
}

impl<A: ActuatorPort> Drop for ReleaseOnDrop<'_, A> {
    fn drop(&mut self) {
        self.0.cleanup();
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
