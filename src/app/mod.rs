//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the PetFeeder system:
//! actuator sequencing and request handling.  All interaction with
//! hardware and time happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod controller;
pub mod events;
pub mod ports;
pub mod service;
