//! HTTP adapter: the feeder's only inbound surface.
//!
//! | Route          | Method | Command                        |
//! |----------------|--------|--------------------------------|
//! | `/status`      | GET    | [`AppCommand::GetStatus`]      |
//! | `/status`      | POST   | [`AppCommand::UpdateSchedule`] |
//! | `/get_message` | both   | legacy alias of `/status`      |
//!
//! Handlers run on the ESP-IDF httpd task and translate requests into
//! [`AppCommand`]s; every reply body is JSON.  Request framing (body cap,
//! route table) is platform-independent and host-tested.

use crate::app::commands::AppCommand;
use crate::app::service::Reply;

/// Largest accepted schedule body.
pub const MAX_BODY_BYTES: usize = 2048;

/// Routes answering status and schedule requests.
pub const ROUTES: [&str; 2] = ["/status", "/get_message"];

pub const CONTENT_TYPE_JSON: (&str, &str) = ("Content-Type", "application/json");

/// Accumulates a request body up to [`MAX_BODY_BYTES`].
#[derive(Debug, Default)]
pub struct BodyBuffer {
    bytes: Vec<u8>,
    overflowed: bool,
}

impl BodyBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk.  Returns `false` once the cap is exceeded; further
    /// chunks are dropped.
    pub fn push(&mut self, chunk: &[u8]) -> bool {
        if self.overflowed || self.bytes.len() + chunk.len() > MAX_BODY_BYTES {
            self.overflowed = true;
            return false;
        }
        self.bytes.extend_from_slice(chunk);
        true
    }

    /// The schedule update command, or the rejection to send back when the
    /// body was too large.
    pub fn into_command(self) -> Result<AppCommand, Reply> {
        if self.overflowed {
            return Err(Reply::client_error("request body too large"));
        }
        Ok(AppCommand::UpdateSchedule(self.bytes))
    }
}

#[cfg(target_os = "espidf")]
pub use server::start;

#[cfg(target_os = "espidf")]
mod server {
    use std::sync::Arc;

    use esp_idf_svc::http::Method;
    use esp_idf_svc::http::server::{Configuration, EspHttpServer};
    use esp_idf_svc::io::{Read, Write};
    use log::info;

    use super::{BodyBuffer, CONTENT_TYPE_JSON, ROUTES};
    use crate::adapters::log_sink::LogEventSink;
    use crate::app::commands::AppCommand;
    use crate::app::service::AppService;

    /// Start the server and register every route.  Dropping the returned
    /// server stops it.
    pub fn start(port: u16, service: Arc<AppService>) -> anyhow::Result<EspHttpServer<'static>> {
        let cfg = Configuration {
            http_port: port,
            stack_size: 10 * 1024,
            ..Default::default()
        };
        let mut server = EspHttpServer::new(&cfg)?;

        for route in ROUTES {
            let svc = service.clone();
            server.fn_handler(route, Method::Get, move |req| -> anyhow::Result<()> {
                let reply = svc.handle(AppCommand::GetStatus, &mut LogEventSink::new());
                let mut resp = req.into_response(reply.status, None, &[CONTENT_TYPE_JSON])?;
                resp.write_all(reply.body.as_bytes())?;
                Ok(())
            })?;

            let svc = service.clone();
            server.fn_handler(route, Method::Post, move |mut req| -> anyhow::Result<()> {
                let mut body = BodyBuffer::new();
                let mut chunk = [0u8; 256];
                loop {
                    let n = req.read(&mut chunk)?;
                    if n == 0 || !body.push(&chunk[..n]) {
                        break;
                    }
                }
                let reply = match body.into_command() {
                    Ok(cmd) => svc.handle(cmd, &mut LogEventSink::new()),
                    Err(rejected) => rejected,
                };
                let mut resp = req.into_response(reply.status, None, &[CONTENT_TYPE_JSON])?;
                resp.write_all(reply.body.as_bytes())?;
                Ok(())
            })?;
        }

        info!("HTTP: listening on :{} ({})", port, ROUTES.join(", "));
        Ok(server)
    }
}
