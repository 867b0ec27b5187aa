//! Actuator sequencing: turns a feed weight into motor and valve timing.
//!
//! ```text
//!  feed_dispense(g)            water_dispense()   pause    flush()
//!  ┌────────┐ ┌──────┐ ┌───────┐ ┌──────────────┐ ┌──────┐ ┌──────────────┐
//!  │reverse │ │settle│ │forward│ │ water valve  │ │ 5 s  │ │ flush valve  │
//!  │  d(g)  │ │ 2 s  │ │ d(g)  │ │  open 5 s    │ │      │ │  open 5 s    │
//!  └────────┘ └──────┘ └───────┘ └──────────────┘ └──────┘ └──────────────┘
//!
//!  d(g) = g / 300 × 1.75 s       (skipped entirely when g < 100)
//! ```
//!
//! The controller holds no schedule state.  It is driven exclusively by the
//! [`TriggerEngine`](crate::scheduler::TriggerEngine), one sequence at a
//! time, and a sequence is never cancelled once started.

use core::time::Duration;

use log::warn;

use crate::app::events::AppEvent;
use crate::app::ports::{ActuatorPort, ClockPort, EventSink};
use crate::config::FeederConfig;
use crate::drivers::auger::{AugerMotor, Direction};
use crate::drivers::valve::Valve;
use crate::error::ActuatorError;
use crate::schedule::ScheduleEntry;

/// Result of the feed stage of a sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeedOutcome {
    /// Auger ran for the contained duration in each direction.
    Dispensed(Duration),
    /// Weight under the minimum; no motor motion.
    Skipped,
}

pub struct ActuatorController {
    min_feed_grams: u32,
    reference_feed_grams: u32,
    motor_per_reference: Duration,
    settle: Duration,
    water_hold: Duration,
    flush_delay: Duration,
    flush_hold: Duration,
    auger: AugerMotor,
    water: Valve,
    flush: Valve,
}

fn ms(value: u32) -> Duration {
    Duration::from_millis(u64::from(value))
}

impl ActuatorController {
    pub fn new(config: &FeederConfig) -> Self {
        Self {
            min_feed_grams: config.min_feed_grams,
            reference_feed_grams: config.reference_feed_grams.max(1),
            motor_per_reference: ms(config.motor_ms_per_reference),
            settle: ms(config.settle_ms),
            water_hold: ms(config.water_ms),
            flush_delay: ms(config.flush_delay_ms),
            flush_hold: ms(config.flush_ms),
            auger: AugerMotor::new(),
            water: Valve::water(),
            flush: Valve::flush(),
        }
    }

    /// Motor run time for `grams`, or `None` when the weight is below the
    /// dispensing minimum.  Linear in weight: the reference weight maps to
    /// the reference run time.
    pub fn feed_duration(&self, grams: u32) -> Option<Duration> {
        if grams < self.min_feed_grams {
            return None;
        }
        let ratio = f64::from(grams) / f64::from(self.reference_feed_grams);
        Some(Duration::from_secs_f64(
            ratio * self.motor_per_reference.as_secs_f64(),
        ))
    }

    /// Dispense `grams`: reverse stroke, settle, forward stroke.  The motor
    /// is stopped on success and on every failure path.
    pub fn feed_dispense(
        &mut self,
        grams: u32,
        hw: &mut impl ActuatorPort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) -> Result<FeedOutcome, ActuatorError> {
        let Some(duration) = self.feed_duration(grams) else {
            sink.emit(&AppEvent::FeedSkipped {
                grams,
                min_grams: self.min_feed_grams,
            });
            return Ok(FeedOutcome::Skipped);
        };

        let strokes = self.run_strokes(duration, hw, clock);
        let stopped = self.auger.stop(hw);
        strokes.and(stopped)?;

        sink.emit(&AppEvent::FeedDispensed {
            grams,
            motor: duration,
        });
        Ok(FeedOutcome::Dispensed(duration))
    }

    fn run_strokes(
        &mut self,
        duration: Duration,
        hw: &mut impl ActuatorPort,
        clock: &mut impl ClockPort,
    ) -> Result<(), ActuatorError> {
        self.auger.run(hw, Direction::Reverse)?;
        clock.sleep(duration);
        self.auger.stop(hw)?;

        clock.sleep(self.settle);

        self.auger.run(hw, Direction::Forward)?;
        clock.sleep(duration);
        Ok(())
    }

    /// Open the water valve for the configured hold time.
    pub fn water_dispense(
        &mut self,
        hw: &mut impl ActuatorPort,
        clock: &mut impl ClockPort,
    ) -> Result<(), ActuatorError> {
        hold_open(&mut self.water, self.water_hold, hw, clock)
    }

    /// Open the flush valve for the configured hold time.
    pub fn flush(
        &mut self,
        hw: &mut impl ActuatorPort,
        clock: &mut impl ClockPort,
    ) -> Result<(), ActuatorError> {
        hold_open(&mut self.flush, self.flush_hold, hw, clock)
    }

    /// The full trigger sequence for one fired entry:
    /// feed → water → pause → flush.  Stops at the first failing stage.
    pub fn run_sequence(
        &mut self,
        entry: &ScheduleEntry,
        hw: &mut impl ActuatorPort,
        clock: &mut impl ClockPort,
        sink: &mut impl EventSink,
    ) -> Result<FeedOutcome, ActuatorError> {
        let outcome = self.feed_dispense(entry.feed_grams, hw, clock, sink)?;
        self.water_dispense(hw, clock)?;
        clock.sleep(self.flush_delay);
        self.flush(hw, clock)?;
        Ok(outcome)
    }

    /// Drive every actuator line LOW.  Every line is attempted; the first
    /// failure is returned.
    pub fn rest(&mut self, hw: &mut impl ActuatorPort) -> Result<(), ActuatorError> {
        let auger = self.auger.stop(hw);
        let water = self.water.close(hw);
        let flush = self.flush.close(hw);
        auger.and(water).and(flush)
    }

    /// Worst-case wall time of one sequence for `grams`.
    pub fn sequence_duration(&self, grams: u32) -> Duration {
        let feed = self
            .feed_duration(grams)
            .map_or(Duration::ZERO, |d| d * 2 + self.settle);
        feed + self.water_hold + self.flush_delay + self.flush_hold
    }
}

fn hold_open(
    valve: &mut Valve,
    hold: Duration,
    hw: &mut impl ActuatorPort,
    clock: &mut impl ClockPort,
) -> Result<(), ActuatorError> {
    let opened = valve.open(hw);
    if opened.is_ok() {
        clock.sleep(hold);
    }
    let closed = valve.close(hw);
    if let Err(e) = closed {
        warn!("{} valve failed to close: {}", valve.name(), e);
    }
    opened.and(closed)
}
