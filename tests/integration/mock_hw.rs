//! Mock adapters for integration tests.
//!
//! Every port the portal talks through has a recording stand-in here, so
//! tests can script the sensor and assert on frames, events and publishes
//! without touching real GPIO, SPI or sockets.

use rgb_portal::adapters::hardware::PortalHardware;
use rgb_portal::app::events::PortalEvent;
use rgb_portal::app::ports::{EventSink, LinkPort, PixelSink, RangingPort, TelemetryPort, TriggerRoll};
use rgb_portal::error::{CommsError, Result, SensorError};
use smart_leds::RGB8;

// ── Ranger ────────────────────────────────────────────────────

/// Reports whatever distance the test last set.  `None` is an echo
/// timeout.
#[derive(Debug)]
pub struct ScriptedRanger {
    pub distance: Option<f32>,
    pub pings: u32,
}

#[allow(dead_code)]
impl ScriptedRanger {
    pub fn at(cm: f32) -> Self {
        Self {
            distance: Some(cm),
            pings: 0,
        }
    }

    pub fn silent() -> Self {
        Self {
            distance: None,
            pings: 0,
        }
    }
}

impl RangingPort for ScriptedRanger {
    fn ping(&mut self) -> core::result::Result<f32, SensorError> {
        self.pings += 1;
        self.distance.ok_or(SensorError::EchoTimeout)
    }
}

// ── Strip ─────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockStrip {
    pub last: Vec<RGB8>,
    pub frames: u32,
}

impl PixelSink for MockStrip {
    fn show(&mut self, frame: &[RGB8]) -> Result<()> {
        self.last = frame.to_vec();
        self.frames += 1;
        Ok(())
    }
}

pub type MockHardware = PortalHardware<ScriptedRanger, MockStrip>;

pub fn hardware_at(cm: f32) -> MockHardware {
    PortalHardware::new(ScriptedRanger::at(cm), MockStrip::default())
}

// ── Roll ──────────────────────────────────────────────────────

/// Always rolls the same value.  Below 60 picks green under the default
/// configuration.
pub struct FixedRoll(pub u8);

#[allow(dead_code)]
pub const GREEN_ROLL: u8 = 10;
#[allow(dead_code)]
pub const RED_ROLL: u8 = 90;

impl TriggerRoll for FixedRoll {
    fn roll_percent(&mut self) -> u8 {
        self.0
    }
}

// ── Event recorder ────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<PortalEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode_changes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, PortalEvent::ModeChanged { .. }))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &PortalEvent) {
        self.events.push(*event);
    }
}

// ── Network ───────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockNetwork {
    pub up: bool,
    /// Whether the next `connect` succeeds.
    pub reachable: bool,
    pub attempts: u32,
}

impl LinkPort for MockNetwork {
    fn is_connected(&self) -> bool {
        self.up
    }

    fn connect(&mut self) -> core::result::Result<(), CommsError> {
        self.attempts += 1;
        if self.reachable {
            self.up = true;
            Ok(())
        } else {
            Err(CommsError::WifiConnectFailed)
        }
    }
}

#[derive(Debug, Default)]
pub struct MockBroker {
    pub up: bool,
    pub reachable: bool,
    pub published: Vec<(String, String)>,
}

#[allow(dead_code)]
impl MockBroker {
    pub fn payloads(&self) -> Vec<&str> {
        self.published.iter().map(|(_, p)| p.as_str()).collect()
    }
}

impl TelemetryPort for MockBroker {
    fn is_connected(&self) -> bool {
        self.up
    }

    fn connect(&mut self) -> core::result::Result<(), CommsError> {
        if self.reachable {
            self.up = true;
            Ok(())
        } else {
            Err(CommsError::TelemetryConnectFailed)
        }
    }

    fn publish(&mut self, topic: &str, payload: &str) -> core::result::Result<(), CommsError> {
        self.published.push((topic.into(), payload.into()));
        Ok(())
    }
}
