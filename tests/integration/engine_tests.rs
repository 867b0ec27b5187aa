//! Integration tests for the TriggerEngine → ActuatorController → GPIO path.
//!
//! Every test drives the real engine against `MockHardware` and a
//! `FakeClock`, so the full timing of a feeding sequence is observable as
//! the list of sleeps it performed.

use core::time::Duration;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::mock_hw::{ActuatorCall, FakeClock, MockHardware, RecordingSink};

use petfeeder::app::events::AppEvent;
use petfeeder::app::ports::{Level, PinId, WallClock};
use petfeeder::config::FeederConfig;
use petfeeder::error::ActuatorError;
use petfeeder::schedule::{ScheduleEntry, parse_schedule};
use petfeeder::scheduler::{TickReport, TriggerEngine};
use petfeeder::store::{ScheduleStore, StatusSnapshot, StatusStore};

struct Rig {
    engine: TriggerEngine,
    schedule: Arc<ScheduleStore>,
    status: Arc<StatusStore>,
}

fn rig_with(config: &FeederConfig, payload: &str) -> Rig {
    let schedule = Arc::new(ScheduleStore::new());
    schedule.replace(parse_schedule(payload).unwrap());
    let status = Arc::new(StatusStore::new(StatusSnapshot::from_config(config)));
    let engine = TriggerEngine::new(config, schedule.clone(), status.clone());
    Rig {
        engine,
        schedule,
        status,
    }
}

fn rig(payload: &str) -> Rig {
    rig_with(&FeederConfig::default(), payload)
}

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

// ── Happy path ────────────────────────────────────────────────

#[test]
fn morning_entry_runs_full_sequence_once() {
    let mut r = rig("[H:7;M:30;F:150], [H:18;M:0;F:50]");
    let mut hw = MockHardware::new();
    let mut clock = FakeClock::at(7, 30, 0);
    let mut sink = RecordingSink::new();

    let report = r.engine.tick(WallClock::new(7, 30, 0), &mut hw, &mut clock, &mut sink);
    assert_eq!(report.fired, 1);
    assert_eq!(
        clock.sleeps,
        vec![ms(875), ms(2000), ms(875), ms(5000), ms(5000), ms(5000)]
    );
    assert_eq!(r.status.read().water_left, 350);

    let later = r.engine.tick(WallClock::new(7, 30, 30), &mut hw, &mut clock, &mut sink);
    assert_eq!(later.fired, 0);
    assert_eq!(r.status.read().water_left, 350);
}

#[test]
fn sequence_drives_lines_in_order_and_ends_low() {
    let mut r = rig("[H:7;M:30;F:150]");
    let mut hw = MockHardware::new();
    let mut clock = FakeClock::at(7, 30, 0);
    let mut sink = RecordingSink::new();

    r.engine.tick(WallClock::new(7, 30, 0), &mut hw, &mut clock, &mut sink);

    assert_eq!(
        hw.raised(),
        vec![
            PinId::AugerIn2,
            PinId::AugerIn1,
            PinId::WaterValveA,
            PinId::FlushValveA
        ]
    );
    assert!(hw.all_low());
}

#[test]
fn light_portion_skips_auger_but_still_waters() {
    let mut r = rig("[H:18;M:0;F:50]");
    let mut hw = MockHardware::new();
    let mut clock = FakeClock::at(18, 0, 0);
    let mut sink = RecordingSink::new();

    let report = r.engine.tick(WallClock::new(18, 0, 0), &mut hw, &mut clock, &mut sink);

    assert_eq!(report.fired, 1);
    assert_eq!(clock.sleeps, vec![ms(5000); 3]);
    assert_eq!(hw.raised(), vec![PinId::WaterValveA, PinId::FlushValveA]);
    assert!(sink.events.contains(&AppEvent::FeedSkipped {
        grams: 50,
        min_grams: 100
    }));
    assert_eq!(r.status.read().water_left, 350);
}

#[test]
fn duplicate_slots_both_fire_in_one_tick() {
    let mut r = rig("[H:8;M:0;F:300], [H:8;M:0;F:300]");
    let mut hw = MockHardware::new();
    let mut clock = FakeClock::at(8, 0, 0);
    let mut sink = RecordingSink::new();

    let report = r.engine.tick(WallClock::new(8, 0, 0), &mut hw, &mut clock, &mut sink);
    assert_eq!(report.fired, 2);
    assert_eq!(r.status.read().water_left, 300);
    assert_eq!(r.engine.fired_slots(), 1);

    let again = r.engine.tick(WallClock::new(8, 0, 1), &mut hw, &mut clock, &mut sink);
    assert_eq!(again.fired, 0);
}

#[test]
fn water_level_stops_at_zero() {
    let config = FeederConfig {
        initial_water_left: 30,
        ..FeederConfig::default()
    };
    let mut r = rig_with(&config, "[H:6;M:0;F:100]");
    let mut hw = MockHardware::new();
    let mut clock = FakeClock::at(6, 0, 0);
    let mut sink = RecordingSink::new();

    r.engine.tick(WallClock::new(6, 0, 0), &mut hw, &mut clock, &mut sink);
    assert_eq!(r.status.read().water_left, 0);
}

// ── Faults ────────────────────────────────────────────────────

#[test]
fn valve_fault_aborts_without_touching_status() {
    let mut r = rig("[H:7;M:30;F:150]");
    let mut hw = MockHardware::failing_on(PinId::WaterValveA, Level::High);
    let mut clock = FakeClock::at(7, 30, 0);
    let mut sink = RecordingSink::new();

    let report = r.engine.tick(WallClock::new(7, 30, 0), &mut hw, &mut clock, &mut sink);

    assert_eq!(report.fired, 0);
    assert_eq!(report.failed, 1);
    assert_eq!(r.status.read().water_left, 400);
    assert_eq!(r.engine.fired_slots(), 0);
    assert!(sink.events.contains(&AppEvent::TriggerFailed {
        entry: ScheduleEntry::new(7, 30, 150),
        error: ActuatorError::GpioWriteFailed(PinId::WaterValveA),
    }));
    // Flush never ran and nothing stays energised.
    assert!(!hw.raised().contains(&PinId::FlushValveA));
    assert!(hw.all_low());
}

#[test]
fn failed_entry_waits_for_next_occurrence() {
    let mut r = rig("[H:7;M:30;F:150]");
    let mut hw = MockHardware::failing_on(PinId::WaterValveA, Level::High);
    let mut clock = FakeClock::at(7, 30, 0);
    let mut sink = RecordingSink::new();

    r.engine.tick(WallClock::new(7, 30, 0), &mut hw, &mut clock, &mut sink);
    hw.fail_on = None;

    let same_window = r.engine.tick(WallClock::new(7, 30, 1), &mut hw, &mut clock, &mut sink);
    assert_eq!(same_window, TickReport::default());

    r.engine.tick(WallClock::new(7, 30, 59), &mut hw, &mut clock, &mut sink);
    let next_day = r.engine.tick(WallClock::new(7, 30, 0), &mut hw, &mut clock, &mut sink);
    assert_eq!(next_day.fired, 1);
    assert_eq!(r.status.read().water_left, 350);
}

#[test]
fn fault_in_one_entry_does_not_block_the_next() {
    let mut r = rig("[H:9;M:0;F:150], [H:9;M:0;F:50]");
    // The first entry fails on its first auger write; the second has no
    // auger stage at all.
    let mut hw = MockHardware::failing_on(PinId::AugerIn2, Level::High);
    let mut clock = FakeClock::at(9, 0, 0);
    let mut sink = RecordingSink::new();

    let report = r.engine.tick(WallClock::new(9, 0, 0), &mut hw, &mut clock, &mut sink);

    assert_eq!(report.failed, 1);
    assert_eq!(report.fired, 1);
    assert_eq!(r.status.read().water_left, 350);
    assert!(hw.all_low());
}

#[test]
fn forward_stroke_fault_stops_the_motor() {
    let mut r = rig("[H:10;M:15;F:300]");
    let mut hw = MockHardware::failing_on(PinId::AugerIn1, Level::High);
    let mut clock = FakeClock::at(10, 15, 0);
    let mut sink = RecordingSink::new();

    let report = r.engine.tick(WallClock::new(10, 15, 0), &mut hw, &mut clock, &mut sink);

    assert_eq!(report.fired, 0);
    assert_eq!(report.failed, 1);
    // Reverse stroke and settle ran; the forward IN1 write was refused.
    assert_eq!(clock.sleeps, vec![ms(1750), ms(2000)]);
    assert_eq!(hw.raised(), vec![PinId::AugerIn2, PinId::AugerIn1]);
    assert_eq!(hw.level(PinId::AugerIn1), Level::Low);
    assert!(hw.all_low());
    assert_eq!(r.status.read().water_left, 400);
    assert!(sink.events.contains(&AppEvent::TriggerFailed {
        entry: ScheduleEntry::new(10, 15, 300),
        error: ActuatorError::GpioWriteFailed(PinId::AugerIn1),
    }));
}

// ── Schedule replacement ──────────────────────────────────────

#[test]
fn replaced_schedule_takes_effect_on_next_tick() {
    let mut r = rig("[H:7;M:30;F:150]");
    let mut hw = MockHardware::new();
    let mut clock = FakeClock::at(7, 0, 0);
    let mut sink = RecordingSink::new();

    r.schedule.replace(parse_schedule("[H:7;M:0;F:200]").unwrap());
    let report = r.engine.tick(WallClock::new(7, 0, 0), &mut hw, &mut clock, &mut sink);
    assert_eq!(report.fired, 1);

    let old = r.engine.tick(WallClock::new(7, 30, 0), &mut hw, &mut clock, &mut sink);
    assert_eq!(old.fired, 0);
}

#[test]
fn empty_schedule_only_rests_actuators() {
    let mut r = rig("");
    let mut hw = MockHardware::new();
    let mut clock = FakeClock::at(12, 0, 0);
    let mut sink = RecordingSink::new();

    r.engine.tick(WallClock::new(12, 0, 0), &mut hw, &mut clock, &mut sink);

    assert!(hw.raised().is_empty());
    assert_eq!(hw.calls.len(), 8);
    assert!(clock.sleeps.is_empty());
}

// ── Run loop ──────────────────────────────────────────────────

#[test]
fn run_fires_once_then_cleans_up_on_stop() {
    let mut r = rig("[H:7;M:30;F:150]");
    let stop = Arc::new(AtomicBool::new(false));
    let mut hw = MockHardware::new();
    let mut clock = FakeClock::at(7, 29, 58).stop_after(12, stop.clone());
    let mut sink = RecordingSink::new();

    r.engine.run(&mut hw, &mut clock, &mut sink, &stop);

    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::TriggerCompleted { .. })),
        1
    );
    assert_eq!(r.status.read().water_left, 350);
    assert_eq!(hw.calls.last(), Some(&ActuatorCall::Cleanup));
    assert_eq!(
        sink.events.first(),
        Some(&AppEvent::EngineStarted {
            tick: Duration::from_secs(1)
        })
    );
    assert_eq!(sink.events.last(), Some(&AppEvent::EngineStopped));
}

#[test]
fn run_with_stop_already_raised_only_cleans_up() {
    let mut r = rig("[H:7;M:30;F:150]");
    let stop = AtomicBool::new(true);
    let mut hw = MockHardware::new();
    let mut clock = FakeClock::at(7, 30, 0);
    let mut sink = RecordingSink::new();

    r.engine.run(&mut hw, &mut clock, &mut sink, &stop);

    assert_eq!(hw.calls, vec![ActuatorCall::Cleanup]);
    assert!(clock.sleeps.is_empty());
}

#[test]
fn panic_mid_sequence_still_releases_actuators() {
    let mut r = rig("[H:7;M:30;F:150]");
    let stop = AtomicBool::new(false);
    let mut hw = MockHardware::new();
    // First sleep is the reverse stroke, with the auger energised.
    let mut clock = FakeClock::at(7, 30, 0).panic_on_sleep(1);
    let mut sink = RecordingSink::new();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        r.engine.run(&mut hw, &mut clock, &mut sink, &stop);
    }));

    assert!(outcome.is_err());
    assert_eq!(hw.raised(), vec![PinId::AugerIn2]);
    assert_eq!(hw.calls.last(), Some(&ActuatorCall::Cleanup));
    assert!(hw.all_low());
}

#[test]
fn unsynced_clock_suspends_triggers() {
    let mut r = rig("[H:0;M:0;F:150]");
    let stop = Arc::new(AtomicBool::new(false));
    let mut hw = MockHardware::new();
    let mut clock = FakeClock::unsynced().stop_after(3, stop.clone());
    let mut sink = RecordingSink::new();

    r.engine.run(&mut hw, &mut clock, &mut sink, &stop);

    assert!(hw.raised().is_empty());
    assert_eq!(clock.sleeps, vec![Duration::from_secs(1); 3]);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ClockUnsynced)), 1);
    assert_eq!(r.status.read().water_left, 400);
}
