//! HTTP command surface.
//!
//! `GET /` serves a small control page; every other path is parsed into a
//! [`PortalCommand`](crate::app::commands::PortalCommand), queued for the
//! control loop and answered with the JSON the loop produces.  The server
//! task never touches portal state.
//!
//! Only the server wiring is ESP-IDF specific; [`respond`] is plain logic
//! and runs on the host too.

use std::time::Duration;

use log::warn;
use serde::Serialize;

use crate::app::commands::CommandResponse;
use crate::error::CommsError;
use crate::gateway::channels::CommandQueue;
use crate::gateway::codec::parse_route;

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><meta name="viewport" content="width=device-width, initial-scale=1"><title>RGB Portal</title></head>
<body>
<h1>RGB Portal</h1>
<p>
<button onclick="fetch('/toggle')">Toggle</button>
<button onclick="fetch('/red')">Red</button>
<button onclick="fetch('/green')">Green</button>
<button onclick="fetch('/reset')">Reset</button>
</p>
<ul>
<li>GET /toggle</li>
<li>GET /red</li>
<li>GET /green</li>
<li>GET /reset</li>
<li>GET /state (1 = idle, 2 = red, 3 = green)</li>
<li>GET /distance</li>
</ul>
</body>
</html>
"#;

pub const JSON: &str = "application/json";

#[derive(Serialize)]
struct Unavailable {
    status: &'static str,
    error: &'static str,
}

/// Status code and JSON body for a request to `path`.
pub fn respond(path: &str, queue: &CommandQueue, timeout: Duration) -> (u16, String) {
    let command = match parse_route(path) {
        Ok(cmd) => cmd,
        Err(e) => {
            let response = CommandResponse::Rejected(e);
            return (response.http_status(), response.to_json());
        }
    };

    match queue.request(command, timeout) {
        Ok(response) => (response.http_status(), response.to_json()),
        Err(e) => {
            warn!("http: {} not answered: {e}", command.name());
            let error = match e {
                CommsError::QueueFull => "busy",
                _ => "timeout",
            };
            let body = serde_json::to_string(&Unavailable {
                status: "error",
                error,
            })
            .unwrap_or_default();
            (503, body)
        }
    }
}

#[cfg(target_os = "espidf")]
pub use server::start;

#[cfg(target_os = "espidf")]
mod server {
    use esp_idf_svc::http::server::{Configuration, EspHttpServer};
    use esp_idf_svc::http::Method;
    use esp_idf_svc::io::Write;
    use log::info;

    use super::{respond, INDEX_HTML, JSON};
    use crate::gateway::channels::{COMMAND_QUEUE, RESPONSE_TIMEOUT};

    /// Start the server.  The returned handle must be kept alive.
    pub fn start() -> anyhow::Result<EspHttpServer<'static>> {
        let mut server = EspHttpServer::new(&Configuration {
            uri_match_wildcard: true,
            ..Default::default()
        })?;

        server.fn_handler("/", Method::Get, |req| -> anyhow::Result<()> {
            req.into_response(200, None, &[("Content-Type", "text/html")])?
                .write_all(INDEX_HTML.as_bytes())?;
            Ok(())
        })?;

        server.fn_handler("/*", Method::Get, |req| -> anyhow::Result<()> {
            let (status, body) = respond(req.uri(), &COMMAND_QUEUE, RESPONSE_TIMEOUT);
            req.into_response(status, None, &[("Content-Type", JSON)])?
                .write_all(body.as_bytes())?;
            Ok(())
        })?;

        info!("http: listening on port 80");
        Ok(server)
    }
}
