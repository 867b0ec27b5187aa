//! Guarded state shared between the HTTP handlers and the trigger engine.
//!
//! Both stores follow the same discipline: one mutex per store, critical
//! sections limited to a clone in or a clone out.  Nothing that touches an
//! actuator ever runs while a store lock is held.
//!
//! ```text
//!  HTTP handler ──replace()──▶ ┌───────────────┐ ──read()──▶ TriggerEngine
//!                              │ ScheduleStore │
//!                              └───────────────┘
//!  HTTP handler ◀──read()───── ┌───────────────┐ ◀─update()── TriggerEngine
//!                              │  StatusStore  │
//!                              └───────────────┘
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Serialize, Serializer};

use crate::config::FeederConfig;
use crate::schedule::ScheduleEntry;

/// Poisoned locks are recovered.  Every field of both stores is valid on its
/// own, so whatever a panicking writer left behind is still a usable value.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ───────────────────────────────────────────────────────────────
// Schedule
// ───────────────────────────────────────────────────────────────

/// Holder of the installed schedule.  Replaced wholesale, never merged.
#[derive(Debug, Default)]
pub struct ScheduleStore {
    entries: Mutex<Vec<ScheduleEntry>>,
}

impl ScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `entries`, discarding the previous list.  Returns how many
    /// entries the old list held.
    pub fn replace(&self, entries: Vec<ScheduleEntry>) -> usize {
        let old = core::mem::replace(&mut *lock(&self.entries), entries);
        old.len()
    }

    /// Copy of the current list.
    pub fn read(&self) -> Vec<ScheduleEntry> {
        lock(&self.entries).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ───────────────────────────────────────────────────────────────
// Status
// ───────────────────────────────────────────────────────────────

/// Latest telemetry snapshot.
///
/// Serialises with every value string-encoded, which is what the companion
/// app expects:
///
/// ```json
/// {"battery_status":"OK","feed_left":"200","water_left":"400","feed_ack":"Completed"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub battery_status: heapless::String<16>,
    #[serde(serialize_with = "as_string")]
    pub feed_left: u32,
    #[serde(serialize_with = "as_string")]
    pub water_left: u32,
    pub feed_ack: heapless::String<16>,
}

impl StatusSnapshot {
    pub fn from_config(config: &FeederConfig) -> Self {
        Self {
            battery_status: config.initial_battery_status.clone(),
            feed_left: config.initial_feed_left,
            water_left: config.initial_water_left,
            feed_ack: config.initial_feed_ack.clone(),
        }
    }

    /// Deduct one trigger's worth of water.  Saturates at zero.
    pub fn consume_water(&mut self, amount: u32) {
        self.water_left = self.water_left.saturating_sub(amount);
    }
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self::from_config(&FeederConfig::default())
    }
}

fn as_string<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Holder of the status snapshot.  Written only by the trigger engine.
#[derive(Debug, Default)]
pub struct StatusStore {
    snapshot: Mutex<StatusSnapshot>,
}

impl StatusStore {
    pub fn new(initial: StatusSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(initial),
        }
    }

    /// Copy of the current snapshot.
    pub fn read(&self) -> StatusSnapshot {
        lock(&self.snapshot).clone()
    }

    /// Apply `mutator` under the lock and return the resulting snapshot.
    /// Keep the closure short; it blocks readers.
    pub fn update<F>(&self, mutator: F) -> StatusSnapshot
    where
        F: FnOnce(&mut StatusSnapshot),
    {
        let mut guard = lock(&self.snapshot);
        mutator(&mut guard);
        guard.clone()
    }
}
