//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ TriggerEngine / AppService (domain)
//! ```
//!
//! Driven adapters (GPIO bank, system clock, event sinks) implement these
//! traits.  The domain consumes them via generics, so the trigger engine and
//! the actuator controller never touch hardware directly.

use core::fmt;
use core::time::Duration;

use crate::error::ActuatorError;

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Logical actuator lines.  The GPIO numbers behind them live in
/// [`pins`](crate::pins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PinId {
    AugerIn1,
    AugerIn2,
    AugerIn3,
    AugerIn4,
    WaterValveA,
    WaterValveB,
    FlushValveA,
    FlushValveB,
}

impl PinId {
    /// Every controlled line, in bank order.
    pub const ALL: [PinId; 8] = [
        PinId::AugerIn1,
        PinId::AugerIn2,
        PinId::AugerIn3,
        PinId::AugerIn4,
        PinId::WaterValveA,
        PinId::WaterValveB,
        PinId::FlushValveA,
        PinId::FlushValveB,
    ];

    /// Position of this line inside [`PinId::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AugerIn1 => "auger.in1",
            Self::AugerIn2 => "auger.in2",
            Self::AugerIn3 => "auger.in3",
            Self::AugerIn4 => "auger.in4",
            Self::WaterValveA => "water.a",
            Self::WaterValveB => "water.b",
            Self::FlushValveA => "flush.a",
            Self::FlushValveB => "flush.b",
        };
        f.write_str(name)
    }
}

/// Digital output level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub const fn is_high(self) -> bool {
        matches!(self, Self::High)
    }
}

/// Write-side port: the domain calls this to drive actuator lines.
pub trait ActuatorPort {
    /// Configure every controlled line as an output, driven LOW.
    /// Calling it again on an initialised bank is a no-op apart from the
    /// LOW write.
    fn initialize(&mut self) -> Result<(), ActuatorError>;

    /// Drive a single line.
    fn set_level(&mut self, pin: PinId, level: Level) -> Result<(), ActuatorError>;

    /// Return every line to a safe, released state.  Runs on shutdown and
    /// must not fail; implementations log and carry on.
    fn cleanup(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: system timer → domain)
// ───────────────────────────────────────────────────────────────

/// Local time-of-day at one-second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WallClock {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl WallClock {
    pub const fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }

    /// The `(hour, minute)` slot this instant falls in.
    pub const fn slot(&self) -> (u8, u8) {
        (self.hour, self.minute)
    }
}

impl fmt::Display for WallClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

/// Time source for the trigger engine and the actuator sequencing.
pub trait ClockPort {
    /// Current local time-of-day, or `None` while the wall clock is not yet
    /// synchronised (e.g. pre-SNTP).
    fn now(&self) -> Option<WallClock>;

    /// Monotonic time since boot.
    fn uptime(&self) -> Duration;

    /// Block the calling context for `duration`.
    fn sleep(&mut self, duration: Duration);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
