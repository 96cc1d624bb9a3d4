//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ PortalService (domain)
//! ```
//!
//! Driven adapters (ranger, LED strip, event sinks, network links) implement
//! these traits.  The [`PortalService`](super::service::PortalService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use smart_leds::RGB8;

use crate::error::{CommsError, Result, SensorError};
use crate::scheduler::Activity;
use crate::time::Millis;

// ───────────────────────────────────────────────────────────────
// Ranging port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One single-shot distance measurement.
pub trait RangingPort {
    /// Raw distance in centimetres.  Bounded by the hardware timeout; never
    /// retried.
    fn ping(&mut self) -> core::result::Result<f32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Pixel sink (driven adapter: domain → LED strip)
// ───────────────────────────────────────────────────────────────

/// Consumes a freshly rendered frame.
pub trait PixelSink {
    fn show(&mut self, frame: &[RGB8]) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`PortalEvent`](super::events::PortalEvent)s
/// through this port.  Adapters decide where they go (serial log,
/// telemetry channel, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::PortalEvent);
}

/// Fan out to two sinks, left first.
impl<A: EventSink, B: EventSink> EventSink for (A, B) {
    fn emit(&mut self, event: &super::events::PortalEvent) {
        self.0.emit(event);
        self.1.emit(event);
    }
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn emit(&mut self, event: &super::events::PortalEvent) {
        (**self).emit(event);
    }
}

// ───────────────────────────────────────────────────────────────
// Randomness (driven adapter: RNG → passage detector)
// ───────────────────────────────────────────────────────────────

/// Uniform draw used by the passage trigger policy.
pub trait TriggerRoll {
    /// A value in `[0, 100)`.
    fn roll_percent(&mut self) -> u8;
}

// ───────────────────────────────────────────────────────────────
// Network ports (external collaborators)
// ───────────────────────────────────────────────────────────────

/// The network uplink (WiFi station).
pub trait LinkPort {
    fn is_connected(&self) -> bool;

    /// Start a non-blocking connection attempt.
    fn connect(&mut self) -> core::result::Result<(), CommsError>;
}

/// The publish channel mode changes are reported on.
pub trait TelemetryPort {
    fn is_connected(&self) -> bool;

    /// Start a non-blocking connection attempt.
    fn connect(&mut self) -> core::result::Result<(), CommsError>;

    /// Fire-and-forget publish.
    fn publish(&mut self, topic: &str, payload: &str) -> core::result::Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the service)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when an activity is due.
///
/// The [`Runtime`](super::runtime::Runtime) implements this by dispatching
/// to the matching service tick; the scheduler itself knows nothing about
/// the portal.
pub trait SchedulerDelegate {
    fn on_activity_due(&mut self, activity: Activity, now: Millis);
}
