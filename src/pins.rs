//! GPIO pin assignments for the PetFeeder main board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

use crate::app::ports::PinId;

// ---------------------------------------------------------------------------
// Auger motor driver (L298N dual H-bridge)
// ---------------------------------------------------------------------------

/// IN1: HIGH drives the auger forward (return stroke).
pub const AUGER_IN1_GPIO: i32 = 4;
/// IN2: HIGH drives the auger in reverse (dispensing stroke).
pub const AUGER_IN2_GPIO: i32 = 5;
/// IN3/IN4: second bridge channel, held LOW on this board revision.
pub const AUGER_IN3_GPIO: i32 = 6;
pub const AUGER_IN4_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// Solenoid valves (driven through the second L298N)
// ---------------------------------------------------------------------------

/// Water valve: A HIGH / B LOW opens, both LOW closes.
pub const WATER_VALVE_A_GPIO: i32 = 15;
pub const WATER_VALVE_B_GPIO: i32 = 16;

/// Flush valve: A HIGH / B LOW opens, both LOW closes.
pub const FLUSH_VALVE_A_GPIO: i32 = 17;
pub const FLUSH_VALVE_B_GPIO: i32 = 18;

/// GPIO number wired to a logical actuator line.
pub const fn gpio_for(pin: PinId) -> i32 {
    match pin {
        PinId::AugerIn1 => AUGER_IN1_GPIO,
        PinId::AugerIn2 => AUGER_IN2_GPIO,
        PinId::AugerIn3 => AUGER_IN3_GPIO,
        PinId::AugerIn4 => AUGER_IN4_GPIO,
        PinId::WaterValveA => WATER_VALVE_A_GPIO,
        PinId::WaterValveB => WATER_VALVE_B_GPIO,
        PinId::FlushValveA => FLUSH_VALVE_A_GPIO,
        PinId::FlushValveB => FLUSH_VALVE_B_GPIO,
    }
}
