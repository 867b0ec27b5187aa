//! Application service: the request-handling side of the hexagon.
//!
//! [`AppService`] answers status queries and installs schedule updates.  It
//! shares nothing with the trigger engine except the two stores, and it never
//! touches an actuator.  Every handler thread of the HTTP adapter calls into
//! the same `AppService` concurrently.
//!
//! ```text
//!  HTTP adapter ──AppCommand──▶ ┌────────────┐ ──▶ EventSink
//!               ◀────Reply───── │ AppService │
//!                               └─────┬──────┘
//!                       ScheduleStore │ StatusStore
//! ```

use std::sync::Arc;

use log::warn;
use serde::Serialize;

use crate::schedule::parse_schedule;
use crate::store::{ScheduleStore, StatusStore};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::EventSink;

/// Transport-neutral response: a status code and a JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub const OK: u16 = 200;
    pub const BAD_REQUEST: u16 = 400;
    pub const INTERNAL_ERROR: u16 = 500;

    fn json(status: u16, value: &impl Serialize) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self { status, body },
            Err(e) => {
                warn!("reply serialisation failed: {}", e);
                Self {
                    status: Self::INTERNAL_ERROR,
                    body: String::from(r#"{"error":"serialisation failed"}"#),
                }
            }
        }
    }

    /// `{"message": ...}` acknowledgement.
    pub fn ack(message: &str) -> Self {
        #[derive(Serialize)]
        struct Ack<'a> {
            message: &'a str,
        }
        Self::json(Self::OK, &Ack { message })
    }

    /// `{"error": ...}` client error.
    pub fn client_error(error: &str) -> Self {
        #[derive(Serialize)]
        struct ErrorBody<'a> {
            error: &'a str,
        }
        Self::json(Self::BAD_REQUEST, &ErrorBody { error })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Handles [`AppCommand`]s against the shared stores.
pub struct AppService {
    schedule: Arc<ScheduleStore>,
    status: Arc<StatusStore>,
}

impl AppService {
    pub fn new(schedule: Arc<ScheduleStore>, status: Arc<StatusStore>) -> Self {
        Self { schedule, status }
    }

    /// Process one command and produce the reply to send back.
    pub fn handle(&self, cmd: AppCommand, sink: &mut impl EventSink) -> Reply {
        match cmd {
            AppCommand::GetStatus => {
                let snapshot = self.status.read();
                sink.emit(&AppEvent::StatusServed);
                Reply::json(Reply::OK, &snapshot)
            }
            AppCommand::UpdateSchedule(body) => self.update_schedule(&body, sink),
        }
    }

    /// Parse first, install second: a rejected payload leaves the installed
    /// schedule untouched.
    fn update_schedule(&self, body: &[u8], sink: &mut impl EventSink) -> Reply {
        let result = core::str::from_utf8(body)
            .map_err(|e| format!("request body is not valid UTF-8: {}", e))
            .and_then(|text| parse_schedule(text).map_err(|e| e.to_string()));

        match result {
            Ok(entries) => {
                let installed = entries.len();
                let previous = self.schedule.replace(entries);
                sink.emit(&AppEvent::ScheduleReplaced {
                    previous,
                    installed,
                });
                Reply::ack("Data received successfully")
            }
            Err(reason) => {
                let reply = Reply::client_error(&reason);
                sink.emit(&AppEvent::ScheduleRejected { reason });
                reply
            }
        }
    }
}
