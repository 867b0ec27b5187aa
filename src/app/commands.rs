//! Inbound commands to the application service.
//!
//! These represent requests from the outside world (HTTP today) that the
//! [`AppService`](super::service::AppService) interprets and answers.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Return the current status snapshot.
    GetStatus,

    /// Replace the schedule with the entries encoded in `body`
    /// (raw request bytes, expected to be UTF-8 schedule text).
    UpdateSchedule(Vec<u8>),
}
