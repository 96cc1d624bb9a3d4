//! System configuration parameters
//!
//! All tunable parameters for the portal.  There is no persistent storage:
//! the device always boots with [`PortalConfig::default`], which carries the
//! reference deployment values.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

/// Upper bound on the strip length; sizes the stack-allocated frame buffer.
pub const MAX_STRIP_LEN: usize = 300;

/// Blink/solid override sequence shown in the red and green modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceConfig {
    pub color: Rgb,
    /// Number of on/off blink pairs.  0 = solid from the start.
    pub blink_count: u32,
    /// Length of one on (or one off) phase.  With `blink_count == 0`,
    /// 0 means "solid indefinitely".
    pub blink_phase_ms: u32,
    /// Stay solid after the sequence finishes instead of returning to idle.
    pub hold_after_blink: bool,
}

/// How long a sequence runs before it counts as finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceDuration {
    Finite(u32),
    /// Never finishes on its own.
    Indefinite,
}

impl SequenceConfig {
    /// Reference red: five 200 ms blinks, then solid red until reset.
    pub const RED: Self = Self {
        color: (255, 0, 0),
        blink_count: 5,
        blink_phase_ms: 200,
        hold_after_blink: true,
    };

    /// Reference green: solid green with no timeout.  Leaves only when the
    /// passage ends or on a manual command.
    pub const GREEN: Self = Self {
        color: (0, 128, 0),
        blink_count: 0,
        blink_phase_ms: 0,
        hold_after_blink: true,
    };

    pub fn total_duration(&self) -> SequenceDuration {
        match (self.blink_count, self.blink_phase_ms) {
            (0, 0) => SequenceDuration::Indefinite,
            (0, phase) => SequenceDuration::Finite(phase),
            (count, phase) => {
                SequenceDuration::Finite(count.saturating_mul(phase).saturating_mul(2))
            }
        }
    }

    /// Whether a sequence entered `elapsed_ms` ago has run its course.
    pub fn is_finished(&self, elapsed_ms: u32) -> bool {
        match self.total_duration() {
            SequenceDuration::Finite(total) => elapsed_ms >= total,
            SequenceDuration::Indefinite => false,
        }
    }
}

/// Core portal configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalConfig {
    // --- Strip ---
    /// Number of addressable pixels on the strip
    pub strip_len: u16,
    /// Global output brightness (0-255) applied at the pixel sink
    pub brightness: u8,

    // --- Timing ---
    /// Animation render interval (milliseconds)
    pub animation_interval_ms: u32,
    /// Distance sample interval (milliseconds)
    pub sensor_interval_ms: u32,
    /// Sensor settling time after boot; no passage events before it elapses
    pub sensor_warmup_ms: u32,
    /// WiFi / telemetry reconnect attempt interval (milliseconds)
    pub link_retry_interval_ms: u32,

    // --- Ranging ---
    /// Shortest distance accepted as a real echo (cm)
    pub min_valid_cm: f32,
    /// Longest distance accepted as a real echo (cm)
    pub max_valid_cm: f32,
    /// Someone is inside the portal when closer than this (cm)
    pub detection_range_cm: f32,

    // --- Passage policy ---
    /// A passage lasts at least this long before it may end (milliseconds)
    pub min_passage_ms: u32,
    /// Portal must read clear (or invalid) continuously this long to end a passage
    pub passage_clear_hold_ms: u32,
    /// Dead time after a passage ends before a new one may start
    pub passage_cooldown_ms: u32,
    /// Probability (percent) that a passage picks green over red
    pub green_chance_percent: u8,

    // --- Sequences ---
    pub red: SequenceConfig,
    pub green: SequenceConfig,

    // --- Telemetry ---
    /// Channel the current mode is published to on every transition
    pub telemetry_topic: heapless::String<32>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        let mut telemetry_topic = heapless::String::new();
        // "portal/state" is well under the 32-byte capacity.
        let _ = telemetry_topic.push_str("portal/state");

        Self {
            // Strip
            strip_len: 140,
            brightness: 50,

            // Timing
            animation_interval_ms: 75,
            sensor_interval_ms: 50,
            sensor_warmup_ms: 3000,
            link_retry_interval_ms: 5000,

            // Ranging
            min_valid_cm: 1.0,
            max_valid_cm: 70.0,
            detection_range_cm: 56.0,

            // Passage policy
            min_passage_ms: 1500,
            passage_clear_hold_ms: 0,
            passage_cooldown_ms: 1000,
            green_chance_percent: 60,

            // Sequences
            red: SequenceConfig::RED,
            green: SequenceConfig::GREEN,

            telemetry_topic,
        }
    }
}

impl PortalConfig {
    /// Reject parameter combinations the core cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.strip_len == 0 {
            return Err(Error::Config("strip_len must be non-zero"));
        }
        if self.strip_len as usize > MAX_STRIP_LEN {
            return Err(Error::Config("strip_len exceeds frame capacity"));
        }
        if self.animation_interval_ms == 0 || self.sensor_interval_ms == 0 {
            return Err(Error::Config("tick intervals must be non-zero"));
        }
        if self.min_valid_cm > self.max_valid_cm {
            return Err(Error::Config("valid distance band is empty"));
        }
        if self.detection_range_cm <= self.min_valid_cm
            || self.detection_range_cm > self.max_valid_cm
        {
            return Err(Error::Config("detection range must lie inside the valid band"));
        }
        if self.green_chance_percent > 100 {
            return Err(Error::Config("green_chance_percent must be 0-100"));
        }
        if self.telemetry_topic.is_empty() {
            return Err(Error::Config("telemetry topic must not be empty"));
        }
        Ok(())
    }

    /// The override sequence shown for `mode` (idle has none).
    pub fn sequence_for(&self, mode: crate::fsm::PortalMode) -> Option<&SequenceConfig> {
        match mode {
            crate::fsm::PortalMode::Idle => None,
            crate::fsm::PortalMode::RedSequence => Some(&self.red),
            crate::fsm::PortalMode::GreenSequence => Some(&self.green),
        }
    }
}
