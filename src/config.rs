//! System configuration parameters
//!
//! All tunable parameters for the PetFeeder system.  Defaults are compiled
//! in; an override document can be supplied as JSON and is validated before
//! use.

use core::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeederConfig {
    // --- Feed (auger) ---
    /// Entries below this weight skip the auger entirely (grams)
    pub min_feed_grams: u32,
    /// Weight dispensed by one reference motor run (grams)
    pub reference_feed_grams: u32,
    /// Motor run time for the reference weight (milliseconds)
    pub motor_ms_per_reference: u32,
    /// Pause between dispensing and return stroke (milliseconds)
    pub settle_ms: u32,

    // --- Water / flush ---
    /// Water valve open time (milliseconds)
    pub water_ms: u32,
    /// Pause between closing the water valve and flushing (milliseconds)
    pub flush_delay_ms: u32,
    /// Flush valve open time (milliseconds)
    pub flush_ms: u32,
    /// Units deducted from `water_left` per completed trigger
    pub water_per_feed: u32,

    // --- Initial status ---
    pub initial_battery_status: heapless::String<16>,
    pub initial_feed_left: u32,
    pub initial_water_left: u32,
    pub initial_feed_ack: heapless::String<16>,

    // --- Timing / network ---
    /// Trigger engine tick interval (milliseconds)
    pub tick_interval_ms: u32,
    /// HTTP listen port
    pub http_port: u16,
    /// POSIX TZ string applied before the first wall-clock read
    pub timezone: heapless::String<32>,
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            // Feed: 300 g ≡ 1.75 s of auger travel
            min_feed_grams: 100,
            reference_feed_grams: 300,
            motor_ms_per_reference: 1750,
            settle_ms: 2000,

            // Water / flush
            water_ms: 5000,
            flush_delay_ms: 5000,
            flush_ms: 5000,
            water_per_feed: 50,

            // Initial status
            initial_battery_status: short_str("OK"),
            initial_feed_left: 200,
            initial_water_left: 400,
            initial_feed_ack: short_str("Completed"),

            // Timing / network
            tick_interval_ms: 1000, // 1 Hz
            http_port: 5000,
            timezone: short_str("UTC0"),
        }
    }
}

impl FeederConfig {
    /// Boot-time configuration: the override document when one was supplied,
    /// the compiled-in defaults otherwise.  Either way the result is validated.
    pub fn load(override_doc: Option<&str>) -> crate::error::Result<Self> {
        let config = match override_doc {
            Some(doc) => {
                info!("Config: applying override");
                Self::from_json(doc)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse an override document and validate it.  Missing fields fall back
    /// to their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the feeder misbehave.  Nothing is
    /// clamped; a bad value is an error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reference_feed_grams == 0 {
            return Err(ConfigError::ValidationFailed("reference_feed_grams must be > 0"));
        }
        if self.motor_ms_per_reference == 0 {
            return Err(ConfigError::ValidationFailed("motor_ms_per_reference must be > 0"));
        }
        if self.min_feed_grams > self.reference_feed_grams {
            return Err(ConfigError::ValidationFailed(
                "min_feed_grams must not exceed reference_feed_grams",
            ));
        }
        if self.tick_interval_ms == 0 || self.tick_interval_ms > 60_000 {
            return Err(ConfigError::ValidationFailed("tick_interval_ms must be 1..=60000"));
        }
        if self.http_port == 0 {
            return Err(ConfigError::ValidationFailed("http_port must be > 0"));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.tick_interval_ms))
    }
}

fn short_str<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
