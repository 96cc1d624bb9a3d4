//! Outbound application events.
//!
//! The [`PortalService`](super::service::PortalService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial, publish the mode on
//! the telemetry channel, record them in tests.

use crate::fsm::PortalMode;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PortalEvent {
    /// The service has started (carries initial mode).
    Started(PortalMode),

    /// The portal changed mode.
    ModeChanged {
        from: PortalMode,
        to: PortalMode,
        /// Started by the passage detector rather than a command.
        auto: bool,
    },

    /// The distance sensor finished settling.
    WarmupComplete,

    /// Someone entered the portal.
    PassageStarted { distance_cm: f32 },

    /// The portal is clear again.
    PassageEnded { duration_ms: u32 },
}
