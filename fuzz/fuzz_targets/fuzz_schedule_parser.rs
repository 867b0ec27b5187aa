//! Fuzz target: schedule update handling
//!
//! Feeds arbitrary bytes through `AppService` as a POST body and verifies:
//! - No panics under arbitrary byte inputs
//! - A rejected body leaves the installed schedule untouched
//! - An accepted body installs exactly what `parse_schedule` returns, and
//!   every installed entry has a valid time of day
//!
//! cargo fuzz run fuzz_schedule_parser

#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;
use petfeeder::app::commands::AppCommand;
use petfeeder::app::events::AppEvent;
use petfeeder::app::ports::EventSink;
use petfeeder::app::service::AppService;
use petfeeder::schedule::{ScheduleEntry, parse_schedule};
use petfeeder::store::{ScheduleStore, StatusSnapshot, StatusStore};

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let schedule = Arc::new(ScheduleStore::new());
    let sentinel = vec![ScheduleEntry::new(12, 34, 567)];
    schedule.replace(sentinel.clone());
    let service = AppService::new(
        schedule.clone(),
        Arc::new(StatusStore::new(StatusSnapshot::default())),
    );

    let reply = service.handle(AppCommand::UpdateSchedule(data.to_vec()), &mut NullSink);

    let parsed = core::str::from_utf8(data).ok().map(parse_schedule);
    match parsed {
        Some(Ok(entries)) => {
            assert_eq!(reply.status, 200);
            assert!(entries.iter().all(|e| e.hour < 24 && e.minute < 60));
            assert_eq!(schedule.read(), entries);
        }
        _ => {
            assert_eq!(reply.status, 400);
            assert_eq!(schedule.read(), sentinel);
        }
    }
});
