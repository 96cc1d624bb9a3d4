//! Wrapping millisecond timestamps.
//!
//! The control loop reads a 32-bit millisecond uptime counter which wraps
//! roughly every 49.7 days.  Every timing decision in the core is made on
//! *elapsed* time computed with wrapping subtraction, never by comparing
//! two absolute timestamps, so the wrap is invisible to the FSM, the
//! passage detector and the renderer.

use core::fmt;

/// A point on the wrapping millisecond uptime counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Millis(pub u32);

impl Millis {
    pub const fn new(ms: u32) -> Self {
        Self(ms)
    }

    /// Milliseconds from `earlier` to `self`, tolerant of counter wrap.
    pub const fn since(self, earlier: Millis) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Timestamp `ms` milliseconds after `self` (wrapping).
    pub const fn after(self, ms: u32) -> Millis {
        Millis(self.0.wrapping_add(ms))
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
