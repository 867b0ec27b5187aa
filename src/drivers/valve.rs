//! Solenoid valve driver.
//!
//! Each valve hangs off one H-bridge channel: A HIGH / B LOW opens it,
//! both LOW lets the spring close it.

use crate::app::ports::{ActuatorPort, Level, PinId};
use crate::error::ActuatorError;

pub struct Valve {
    name: &'static str,
    line_a: PinId,
    line_b: PinId,
}

impl Valve {
    pub const fn new(name: &'static str, line_a: PinId, line_b: PinId) -> Self {
        Self {
            name,
            line_a,
            line_b,
        }
    }

    pub const fn water() -> Self {
        Self::new("water", PinId::WaterValveA, PinId::WaterValveB)
    }

    pub const fn flush() -> Self {
        Self::new("flush", PinId::FlushValveA, PinId::FlushValveB)
    }

    pub fn open(&mut self, hw: &mut impl ActuatorPort) -> Result<(), ActuatorError> {
        hw.set_level(self.line_b, Level::Low)?;
        hw.set_level(self.line_a, Level::High)
    }

    /// Both lines LOW.  Tries the second line even when the first write fails.
    pub fn close(&mut self, hw: &mut impl ActuatorPort) -> Result<(), ActuatorError> {
        let a = hw.set_level(self.line_a, Level::Low);
        let b = hw.set_level(self.line_b, Level::Low);
        a.and(b)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
