//! Request/response codec for the command gateway.
//!
//! Requests are plain HTTP paths; responses are small JSON objects:
//!
//! ```text
//!  /toggle  /red  /green  /reset   →  {"status":"ok","state":N}
//!  /state                          →  {"state":N}
//!  /distance                       →  {"distance":D,"unit":"cm","inRange":B,"personDetected":B}
//!  anything else                   →  {"status":"error","error":"unknown command"}
//! ```
//!
//! `N` is the mode code: 1 = idle, 2 = red, 3 = green.

use serde::Serialize;

use crate::app::commands::{CommandResponse, PortalCommand};
use crate::error::CommandError;

/// Path → command table for the HTTP surface.
const ROUTES: [(&str, PortalCommand); 6] = [
    ("/toggle", PortalCommand::Toggle),
    ("/red", PortalCommand::TriggerRed),
    ("/green", PortalCommand::TriggerGreen),
    ("/reset", PortalCommand::Reset),
    ("/state", PortalCommand::GetState),
    ("/distance", PortalCommand::GetDistance),
];

/// Map a request path to a command.  The query string and a trailing
/// slash are ignored; `/<command-name>` is accepted as well.
pub fn parse_route(path: &str) -> Result<PortalCommand, CommandError> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };

    if let Some((_, cmd)) = ROUTES.iter().find(|(route, _)| *route == path) {
        return Ok(*cmd);
    }
    path.strip_prefix('/')
        .ok_or(CommandError::UnknownCommand)
        .and_then(PortalCommand::from_name)
}

/// Route for a command on the HTTP surface.
pub fn route_for(cmd: PortalCommand) -> &'static str {
    ROUTES
        .iter()
        .find(|(_, c)| *c == cmd)
        .map_or("/", |(route, _)| *route)
}

// ── Wire shapes ───────────────────────────────────────────────

#[derive(Serialize)]
struct StatusBody {
    status: &'static str,
    state: u8,
}

#[derive(Serialize)]
struct StateBody {
    state: u8,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DistanceBody {
    distance: f32,
    unit: &'static str,
    in_range: bool,
    person_detected: bool,
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    error: &'static str,
}

fn error_text(e: CommandError) -> &'static str {
    match e {
        CommandError::UnknownCommand => "unknown command",
    }
}

impl CommandResponse {
    /// JSON body for this response.
    pub fn to_json(&self) -> String {
        let encoded = match *self {
            Self::Applied(mode) => serde_json::to_string(&StatusBody {
                status: "ok",
                state: mode.code(),
            }),
            Self::State(mode) => serde_json::to_string(&StateBody { state: mode.code() }),
            Self::Distance(report) => serde_json::to_string(&DistanceBody {
                distance: report.distance_cm,
                unit: "cm",
                in_range: report.in_range,
                person_detected: report.person_detected,
            }),
            Self::Rejected(e) => serde_json::to_string(&ErrorBody {
                status: "error",
                error: error_text(e),
            }),
        };
        encoded.unwrap_or_else(|_| String::from(r#"{"status":"error"}"#))
    }

    /// HTTP status code for this response.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Rejected(_) => 400,
            _ => 200,
        }
    }
}
