//! System clock adapter.
//!
//! Implements [`ClockPort`] for the PetFeeder.
//!
//! - **`espidf`**: wall clock from newlib `gettimeofday()` + `localtime_r()`
//!   (driven by SNTP and the `TZ` variable), uptime from the ESP-IDF
//!   high-resolution timer.
//! - **host**: wall clock from `chrono::Local`, uptime from
//!   `std::time::Instant`, for simulation runs.

use core::time::Duration;

use crate::app::ports::{ClockPort, WallClock};

/// Anything before 2020-01-01 means SNTP has not run yet.
#[cfg(target_os = "espidf")]
const EPOCH_2020: i64 = 1_577_836_800;

pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }
}

#[cfg(target_os = "espidf")]
impl ClockPort for SystemClock {
    fn now(&self) -> Option<WallClock> {
        use core::ptr;
        use esp_idf_svc::sys;

        let mut tv = sys::timeval {
            tv_sec: 0,
            tv_usec: 0,
        };
        if unsafe { sys::gettimeofday(&mut tv, ptr::null_mut()) } != 0 {
            return None;
        }
        if i64::from(tv.tv_sec) < EPOCH_2020 {
            return None;
        }
        let secs = tv.tv_sec as sys::time_t;
        let mut tm: sys::tm = unsafe { core::mem::zeroed() };
        if unsafe { sys::localtime_r(&secs, &mut tm) }.is_null() {
            return None;
        }
        let (h, m, s) = (tm.tm_hour, tm.tm_min, tm.tm_sec);
        if !(0..=23).contains(&h) || !(0..=59).contains(&m) || !(0..=60).contains(&s) {
            return None;
        }
        // Leap seconds fold into :59.
        Some(WallClock::new(h as u8, m as u8, s.min(59) as u8))
    }

    fn uptime(&self) -> Duration {
        let us = unsafe { esp_idf_svc::sys::esp_timer_get_time() };
        Duration::from_micros(us.max(0) as u64)
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[cfg(not(target_os = "espidf"))]
impl ClockPort for SystemClock {
    fn now(&self) -> Option<WallClock> {
        use chrono::Timelike;

        let now = chrono::Local::now();
        Some(WallClock::new(
            now.hour() as u8,
            now.minute() as u8,
            now.second().min(59) as u8,
        ))
    }

    fn uptime(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

// ── Time sync ─────────────────────────────────────────────────

/// Apply a POSIX TZ string (e.g. `"CET-1CEST,M3.5.0,M10.5.0/3"`) to
/// `localtime_r`.
#[cfg(target_os = "espidf")]
pub fn set_timezone(tz: &str) {
    // SAFETY: called once from main before any other thread reads the
    // environment.
    unsafe {
        std::env::set_var("TZ", tz);
        esp_idf_svc::sys::tzset();
    }
    log::info!("Clock: TZ={}", tz);
}

/// Start the background SNTP client.  The returned handle must be kept
/// alive for synchronisation to continue.
#[cfg(target_os = "espidf")]
pub fn start_sntp() -> anyhow::Result<esp_idf_svc::sntp::EspSntp<'static>> {
    let sntp = esp_idf_svc::sntp::EspSntp::new_default()?;
    log::info!("Clock: SNTP started");
    Ok(sntp)
}
