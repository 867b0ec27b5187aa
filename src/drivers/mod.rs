//! Actuator drivers layered over the [`ActuatorPort`](crate::app::ports::ActuatorPort).

pub mod auger;
pub mod valve;
