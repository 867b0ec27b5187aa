//! Integration tests for the request side: AppCommand → AppService → stores.
//!
//! Replies are checked byte-for-byte because the mobile client parses them.

use std::sync::Arc;

use crate::mock_hw::{FakeClock, MockHardware, RecordingSink};

use petfeeder::app::commands::AppCommand;
use petfeeder::app::events::AppEvent;
use petfeeder::app::ports::WallClock;
use petfeeder::app::service::{AppService, Reply};
use petfeeder::config::FeederConfig;
use petfeeder::schedule::ScheduleEntry;
use petfeeder::scheduler::TriggerEngine;
use petfeeder::store::{ScheduleStore, StatusSnapshot, StatusStore};

const DEFAULT_STATUS: &str =
    r#"{"battery_status":"OK","feed_left":"200","water_left":"400","feed_ack":"Completed"}"#;

fn make_service() -> (AppService, Arc<ScheduleStore>, Arc<StatusStore>) {
    let schedule = Arc::new(ScheduleStore::new());
    let status = Arc::new(StatusStore::new(StatusSnapshot::from_config(
        &FeederConfig::default(),
    )));
    let service = AppService::new(schedule.clone(), status.clone());
    (service, schedule, status)
}

fn post(service: &AppService, body: &str, sink: &mut RecordingSink) -> Reply {
    service.handle(AppCommand::UpdateSchedule(body.as_bytes().to_vec()), sink)
}

#[test]
fn get_status_before_any_trigger_returns_defaults() {
    let (service, _, _) = make_service();
    let mut sink = RecordingSink::new();

    let reply = service.handle(AppCommand::GetStatus, &mut sink);

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, DEFAULT_STATUS);
    assert_eq!(sink.events, vec![AppEvent::StatusServed]);
}

#[test]
fn valid_post_installs_schedule() {
    let (service, schedule, _) = make_service();
    let mut sink = RecordingSink::new();

    let reply = post(&service, "[H:7;M:30;F:150], [H:18;M:0;F:50]", &mut sink);

    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, r#"{"message":"Data received successfully"}"#);
    assert_eq!(
        schedule.read(),
        vec![ScheduleEntry::new(7, 30, 150), ScheduleEntry::new(18, 0, 50)]
    );
    assert!(sink.events.contains(&AppEvent::ScheduleReplaced {
        previous: 0,
        installed: 2
    }));
}

#[test]
fn second_post_replaces_rather_than_appends() {
    let (service, schedule, _) = make_service();
    let mut sink = RecordingSink::new();

    post(&service, "[H:7;M:30;F:150], [H:18;M:0;F:50]", &mut sink);
    post(&service, "[H:12;M:0;F:200]", &mut sink);

    assert_eq!(schedule.read(), vec![ScheduleEntry::new(12, 0, 200)]);
}

#[test]
fn malformed_post_keeps_previous_schedule() {
    let (service, schedule, _) = make_service();
    let mut sink = RecordingSink::new();
    post(&service, "[H:7;M:30;F:150]", &mut sink);

    let reply = post(&service, "[H:7;M:30;F:150], [H:x;M:0;F:1]", &mut sink);

    assert_eq!(reply.status, 400);
    assert!(reply.body.starts_with(r#"{"error":"#), "got {}", reply.body);
    assert_eq!(schedule.read(), vec![ScheduleEntry::new(7, 30, 150)]);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ScheduleRejected { .. })),
        1
    );
}

#[test]
fn non_utf8_body_is_rejected() {
    let (service, schedule, _) = make_service();
    let mut sink = RecordingSink::new();
    post(&service, "[H:7;M:30;F:150]", &mut sink);

    let reply = service.handle(AppCommand::UpdateSchedule(vec![b'[', 0xFF, b']']), &mut sink);

    assert_eq!(reply.status, 400);
    assert_eq!(schedule.len(), 1);
}

#[test]
fn empty_post_clears_schedule() {
    let (service, schedule, _) = make_service();
    let mut sink = RecordingSink::new();
    post(&service, "[H:7;M:30;F:150]", &mut sink);

    let reply = post(&service, "", &mut sink);

    assert!(reply.is_success());
    assert!(schedule.is_empty());
}

#[test]
fn status_reflects_completed_trigger() {
    let (service, schedule, status) = make_service();
    let mut sink = RecordingSink::new();
    post(&service, "[H:7;M:30;F:150]", &mut sink);

    let mut engine = TriggerEngine::new(&FeederConfig::default(), schedule, status);
    let mut hw = MockHardware::new();
    let mut clock = FakeClock::at(7, 30, 0);
    engine.tick(WallClock::new(7, 30, 0), &mut hw, &mut clock, &mut sink);

    let reply = service.handle(AppCommand::GetStatus, &mut sink);
    assert_eq!(
        reply.body,
        r#"{"battery_status":"OK","feed_left":"200","water_left":"350","feed_ack":"Completed"}"#
    );
}

#[test]
fn concurrent_posts_never_leave_a_mixed_schedule() {
    let (service, schedule, _) = make_service();
    let service = Arc::new(service);
    let a = "[H:1;M:0;F:100], [H:2;M:0;F:100]";
    let b = "[H:3;M:0;F:200]";

    let writers: Vec<_> = [a, b]
        .into_iter()
        .map(|body| {
            let svc = service.clone();
            std::thread::spawn(move || {
                let mut sink = RecordingSink::new();
                for _ in 0..200 {
                    post(&svc, body, &mut sink);
                }
            })
        })
        .collect();

    for _ in 0..200 {
        let entries = schedule.read();
        assert!(entries.is_empty() || entries.len() == 2 || entries == vec![ScheduleEntry::new(3, 0, 200)]);
        if entries.len() == 2 {
            assert_eq!(entries[0].hour, 1);
            assert_eq!(entries[1].hour, 2);
        }
    }
    for w in writers {
        w.join().unwrap();
    }
}
