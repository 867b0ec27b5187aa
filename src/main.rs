//! PetFeeder Firmware: Main Entry Point
//!
//! Two threads share two stores; nothing else crosses between them.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  PinBank          SystemClock      LogEventSink   EspHttpServer│
//! │  (ActuatorPort)   (ClockPort+SNTP) (EventSink)    WifiStation  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  "trigger" thread                  httpd task                  │
//! │  ┌───────────────────────┐        ┌──────────────────────┐     │
//! │  │ TriggerEngine         │        │ AppService           │     │
//! │  │  └ ActuatorController │        │  GET / POST /status  │     │
//! │  └──────────┬────────────┘        └──────────┬───────────┘     │
//! │             └──── ScheduleStore · StatusStore ┘                │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info};

use petfeeder::adapters::hardware::EspPinBank;
use petfeeder::adapters::log_sink::LogEventSink;
use petfeeder::adapters::time::{self, SystemClock};
use petfeeder::adapters::wifi::{WifiCredentials, WifiStation};
use petfeeder::adapters::http;
use petfeeder::app::ports::ActuatorPort;
use petfeeder::app::service::AppService;
use petfeeder::config::FeederConfig;
use petfeeder::scheduler::TriggerEngine;
use petfeeder::store::{ScheduleStore, StatusSnapshot, StatusStore};

/// Raising this stops the trigger engine, which then releases every
/// actuator.  Nothing on the device raises it; the engine also releases
/// them if it panics, before the supervisor restarts the chip.
static STOP: AtomicBool = AtomicBool::new(false);

const WIFI_POLL: Duration = Duration::from_secs(5);

/// Claim the actuator GPIOs and drive every line LOW.
fn bring_up_actuators() -> petfeeder::error::Result<EspPinBank> {
    let mut hw = EspPinBank::take()?;
    hw.initialize()?;
    Ok(hw)
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PetFeeder v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = FeederConfig::load(option_env!("PETFEEDER_CONFIG"))?;

    // ── 2. Actuators ──────────────────────────────────────────
    // Every line LOW before anything else runs.
    let mut hw = bring_up_actuators()?;

    // ── 3. Network + time ─────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let creds = WifiCredentials::from_build_env()?;
    let mut wifi = WifiStation::start(peripherals.modem, sysloop, nvs, &creds)?;

    time::set_timezone(&config.timezone);
    let _sntp = time::start_sntp()?;

    // ── 4. Shared state ───────────────────────────────────────
    let schedule = Arc::new(ScheduleStore::new());
    let status = Arc::new(StatusStore::new(StatusSnapshot::from_config(&config)));

    // ── 5. Trigger engine ─────────────────────────────────────
    let mut engine = TriggerEngine::new(&config, schedule.clone(), status.clone());
    let trigger = std::thread::Builder::new()
        .name("trigger".into())
        .stack_size(8 * 1024)
        .spawn(move || {
            let mut clock = SystemClock::new();
            let mut sink = LogEventSink::new();
            engine.run(&mut hw, &mut clock, &mut sink, &STOP);
        })?;

    // ── 6. HTTP surface ───────────────────────────────────────
    let service = Arc::new(AppService::new(schedule, status));
    let _server = http::start(config.http_port, service)?;

    info!("System ready.");

    // ── 7. Supervise ──────────────────────────────────────────
    loop {
        if trigger.is_finished() {
            error!("Trigger engine exited; restarting");
            esp_idf_svc::hal::reset::restart();
        }
        wifi.keep_alive();
        std::thread::sleep(WIFI_POLL);
    }
}
