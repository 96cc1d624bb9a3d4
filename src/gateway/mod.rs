//! Command gateway: the portal's remote surface.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Gateway Stack                          │
//! │                                                              │
//! │  HTTP path ──▶ codec::parse_route ──▶ channels::COMMAND_QUEUE │
//! │                                              │               │
//! │                                              ▼               │
//! │                               control loop drains, answers  │
//! │                                              │               │
//! │  JSON body ◀── CommandResponse::to_json ◀────┘               │
//! │                                                              │
//! │  ModeChanged ──▶ telemetry::StatePublisher ──▶ topic "1|2|3"  │
//! │  every 5 s   ──▶ link::LinkSupervisor (WiFi + telemetry)      │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod channels;
pub mod codec;
pub mod link;
pub mod telemetry;
