//! Auger motor driver (L298N H-bridge, four control lines).
//!
//! Direction is selected by which of IN1/IN2 is HIGH; IN3/IN4 belong to the
//! unused second channel and are always driven LOW so a floating input can
//! never spin the motor.
//!
//! ## Safety contract
//!
//! The driver is a dumb actuator: it never times a run itself.  The
//! [`ActuatorController`](crate::app::controller::ActuatorController) owns
//! durations and is responsible for calling [`AugerMotor::stop`] on every
//! exit path.

use crate::app::ports::{ActuatorPort, Level, PinId};
use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Return stroke (IN1 HIGH).
    Forward,
    /// Dispensing stroke (IN2 HIGH).
    Reverse,
}

const LINES: [PinId; 4] = [
    PinId::AugerIn1,
    PinId::AugerIn2,
    PinId::AugerIn3,
    PinId::AugerIn4,
];

#[derive(Debug, Default)]
pub struct AugerMotor;

impl AugerMotor {
    pub fn new() -> Self {
        Self
    }

    /// Energise the bridge in `direction`.
    pub fn run(
        &mut self,
        hw: &mut impl ActuatorPort,
        direction: Direction,
    ) -> Result<(), ActuatorError> {
        let (in1, in2) = match direction {
            Direction::Forward => (Level::High, Level::Low),
            Direction::Reverse => (Level::Low, Level::High),
        };
        // Drop the active line first so both halves are never HIGH together.
        hw.set_level(PinId::AugerIn1, Level::Low)?;
        hw.set_level(PinId::AugerIn2, Level::Low)?;
        hw.set_level(PinId::AugerIn3, Level::Low)?;
        hw.set_level(PinId::AugerIn4, Level::Low)?;
        hw.set_level(PinId::AugerIn1, in1)?;
        hw.set_level(PinId::AugerIn2, in2)
    }

    /// Drive every control line LOW.  Attempts all four lines even if one
    /// write fails and reports the first failure.
    pub fn stop(&mut self, hw: &mut impl ActuatorPort) -> Result<(), ActuatorError> {
        let mut first_err = None;
        for pin in LINES {
            if let Err(e) = hw.set_level(pin, Level::Low) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
