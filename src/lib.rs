//! PetFeeder firmware library.
//!
//! Exposes the pure-logic modules for integration testing.  All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]` within
//! each module, so the whole library builds and tests on the host with
//! `--no-default-features`.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod schedule;
pub mod scheduler;
pub mod store;

pub mod error;
pub mod pins;

pub mod adapters;
pub mod drivers;
