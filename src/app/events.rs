//! Outbound application events.
//!
//! The trigger engine, the actuator controller and the request handler emit
//! these through the [`EventSink`](super::ports::EventSink) port.  Adapters
//! on the other side decide what to do with them: log to serial, record in
//! a test.

use core::time::Duration;

use crate::app::ports::WallClock;
use crate::error::ActuatorError;
use crate::schedule::ScheduleEntry;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The trigger engine loop started.
    EngineStarted { tick: Duration },

    /// The trigger engine loop stopped and released the actuators.
    EngineStopped,

    /// The wall clock is not synchronised; triggers are suspended.
    ClockUnsynced,

    /// The wall clock came back after an outage.
    ClockSynced(WallClock),

    /// A schedule entry matched and its actuator sequence is starting.
    TriggerStarted { at: WallClock, entry: ScheduleEntry },

    /// The auger ran for `motor` in each direction.
    FeedDispensed { grams: u32, motor: Duration },

    /// The entry's weight was below the dispensing minimum; auger skipped.
    FeedSkipped { grams: u32, min_grams: u32 },

    /// Full sequence finished; status updated.
    TriggerCompleted { entry: ScheduleEntry, water_left: u32 },

    /// The sequence aborted; status and dedup untouched.
    TriggerFailed { entry: ScheduleEntry, error: ActuatorError },

    /// Resting the actuators at the start of a tick failed.
    RestFailed(ActuatorError),

    /// The dedup set was cleared at a minute boundary.
    DedupCleared { slots: usize },

    /// A new schedule was installed.
    ScheduleReplaced { previous: usize, installed: usize },

    /// A schedule update was rejected; the old schedule stays.
    ScheduleRejected { reason: String },

    /// A status snapshot was served to a client.
    StatusServed,
}
