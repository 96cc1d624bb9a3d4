//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the distance ranger and the LED strip, exposing them through
//! [`RangingPort`] and [`PixelSink`].  On non-espidf targets the ranger is
//! usually the simulated one from [`crate::sensors::ultrasonic`].

use smart_leds::RGB8;

use crate::app::ports::{PixelSink, RangingPort};
use crate::error::{Result, SensorError};

/// Concrete adapter that combines the portal hardware behind port traits.
pub struct PortalHardware<R, S> {
    ranger: R,
    strip: S,
}

impl<R, S> PortalHardware<R, S> {
    pub fn new(ranger: R, strip: S) -> Self {
        Self { ranger, strip }
    }

    pub fn strip(&self) -> &S {
        &self.strip
    }

    pub fn strip_mut(&mut self) -> &mut S {
        &mut self.strip
    }

    pub fn ranger_mut(&mut self) -> &mut R {
        &mut self.ranger
    }
}

// ── RangingPort implementation ────────────────────────────────

impl<R: RangingPort, S> RangingPort for PortalHardware<R, S> {
    fn ping(&mut self) -> core::result::Result<f32, SensorError> {
        self.ranger.ping()
    }
}

// ── PixelSink implementation ──────────────────────────────────

impl<R, S: PixelSink> PixelSink for PortalHardware<R, S> {
    fn show(&mut self, frame: &[RGB8]) -> Result<()> {
        self.strip.show(frame)
    }
}
