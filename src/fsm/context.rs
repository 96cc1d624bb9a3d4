//! Shared mutable context threaded through every FSM handler.
//!
//! `PortalContext` is the blackboard the state handlers read and write:
//! the session record, the tick's timestamp and the configuration.

use crate::config::{PortalConfig, SequenceConfig};
use crate::time::Millis;

use super::PortalMode;

// ---------------------------------------------------------------------------
// Session record (owned by the control loop, mutated only by the FSM)
// ---------------------------------------------------------------------------

/// Everything the portal remembers about the mode it is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalSession {
    pub mode: PortalMode,
    /// Timestamp of the last transition into `mode`.
    pub mode_entered_at: Millis,
    /// Set once the current sequence's blink phase has completed.
    pub sequence_blink_done: bool,
    /// The current sequence was started by the passage detector.
    pub was_auto_triggered: bool,
}

impl PortalSession {
    pub const fn new(now: Millis) -> Self {
        Self {
            mode: PortalMode::Idle,
            mode_entered_at: now,
            sequence_blink_done: false,
            was_auto_triggered: false,
        }
    }
}

// ---------------------------------------------------------------------------
// PortalContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct PortalContext {
    pub session: PortalSession,
    /// Timestamp of the tick being processed.  Updated before every FSM call.
    pub now: Millis,
    pub config: PortalConfig,
}

impl PortalContext {
    pub fn new(config: PortalConfig, now: Millis) -> Self {
        Self {
            session: PortalSession::new(now),
            now,
            config,
        }
    }

    /// Milliseconds spent in the current mode.
    pub fn elapsed_in_mode(&self) -> u32 {
        self.now.since(self.session.mode_entered_at)
    }

    /// The sequence shown by the current mode, if it is a sequence mode.
    pub fn active_sequence(&self) -> Option<&SequenceConfig> {
        self.config.sequence_for(self.session.mode)
    }
}
