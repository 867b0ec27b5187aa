//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::EngineStarted { tick } => {
                info!("ENGINE | started, tick={:?}", tick);
            }
            AppEvent::EngineStopped => {
                info!("ENGINE | stopped, actuators released");
            }
            AppEvent::ClockUnsynced => {
                warn!("ENGINE | wall clock not synced, triggers suspended");
            }
            AppEvent::ClockSynced(now) => {
                info!("ENGINE | wall clock synced at {}", now);
            }
            AppEvent::TriggerStarted { at, entry } => {
                info!("FEED | {} firing {}", at, entry);
            }
            AppEvent::FeedDispensed { grams, motor } => {
                info!("FEED | {}g dispensed, motor={:.3}s x2", grams, motor.as_secs_f64());
            }
            AppEvent::FeedSkipped { grams, min_grams } => {
                info!("FEED | {}g below {}g minimum, auger skipped", grams, min_grams);
            }
            AppEvent::TriggerCompleted { entry, water_left } => {
                info!("FEED | {} done, water_left={}", entry, water_left);
            }
            AppEvent::TriggerFailed { entry, error } => {
                warn!("FEED | {} aborted: {}", entry, error);
            }
            AppEvent::RestFailed(error) => {
                warn!("FEED | rest failed: {}", error);
            }
            AppEvent::DedupCleared { slots } => {
                info!("SCHED | fired set cleared ({} slots)", slots);
            }
            AppEvent::ScheduleReplaced {
                previous,
                installed,
            } => {
                info!("SCHED | replaced {} entries with {}", previous, installed);
            }
            AppEvent::ScheduleRejected { reason } => {
                warn!("SCHED | update rejected: {}", reason);
            }
            AppEvent::StatusServed => {
                debug!("SCHED | status served");
            }
        }
    }
}
