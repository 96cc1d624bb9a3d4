//! Inbound commands to the application service and their answers.
//!
//! These represent actions requested by the outside world (HTTP gateway,
//! tests) that the [`PortalService`](super::service::PortalService)
//! interprets and acts upon.

use crate::error::CommandError;
use crate::fsm::PortalMode;
use crate::sensors::DistanceReport;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortalCommand {
    /// Idle → red, anything else → idle.
    Toggle,
    /// Idle → red; no-op otherwise.
    TriggerRed,
    /// Idle or red → green.
    TriggerGreen,
    /// Anything → idle.
    Reset,
    /// Report the current mode.
    GetState,
    /// Take one distance reading and report it.
    GetDistance,
}

impl PortalCommand {
    pub const ALL: [Self; 6] = [
        Self::Toggle,
        Self::TriggerRed,
        Self::TriggerGreen,
        Self::Reset,
        Self::GetState,
        Self::GetDistance,
    ];

    /// Command name on the wire.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Toggle => "toggle",
            Self::TriggerRed => "trigger-red",
            Self::TriggerGreen => "trigger-green",
            Self::Reset => "reset",
            Self::GetState => "get-state",
            Self::GetDistance => "get-distance",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CommandError> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == name)
            .ok_or(CommandError::UnknownCommand)
    }
}

/// What the service answers to a [`PortalCommand`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandResponse {
    /// A mutating command was processed; carries the mode afterwards.
    Applied(PortalMode),
    /// Answer to `get-state`.
    State(PortalMode),
    /// Answer to `get-distance`.
    Distance(DistanceReport),
    /// The request could not be interpreted.
    Rejected(CommandError),
}
