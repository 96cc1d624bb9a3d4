//! Distance sensing: the ranging driver and the validity filter on top.
//!
//! [`DistanceSampler`] turns one raw time-of-flight measurement into a
//! [`Reading`]: `Valid(cm)` inside the configured band, `Invalid` for
//! anything else (echo timeout, NaN, out-of-band).  It never retries; a
//! single call is a single pulse/echo cycle.

pub mod ultrasonic;

use log::debug;

use crate::app::ports::RangingPort;
use crate::config::PortalConfig;
use crate::error::SensorError;

/// One filtered distance sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Valid(f32),
    Invalid,
}

impl Reading {
    pub fn distance(self) -> Option<f32> {
        match self {
            Self::Valid(d) => Some(d),
            Self::Invalid => None,
        }
    }
}

/// Raw measurement plus derived flags, answered by `get-distance`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceReport {
    /// Raw distance rounded to two decimals; 0.0 when no echo came back.
    pub distance_cm: f32,
    /// Inside the valid band.
    pub in_range: bool,
    /// Inside the valid band and closer than the detection range.
    pub person_detected: bool,
}

/// Band-pass filter over a [`RangingPort`].
#[derive(Debug, Clone, Copy)]
pub struct DistanceSampler {
    min_cm: f32,
    max_cm: f32,
    detection_cm: f32,
}

impl DistanceSampler {
    pub fn new(config: &PortalConfig) -> Self {
        Self {
            min_cm: config.min_valid_cm,
            max_cm: config.max_valid_cm,
            detection_cm: config.detection_range_cm,
        }
    }

    /// Take one measurement and classify it.
    pub fn measure(&self, ranger: &mut impl RangingPort) -> Reading {
        self.classify(ranger.ping())
    }

    /// Classify a raw ranging result.  NaN fails both bounds and lands in
    /// `Invalid`.
    pub fn classify(&self, raw: Result<f32, SensorError>) -> Reading {
        match raw {
            Ok(d) if self.in_band(d) => Reading::Valid(d),
            Ok(d) => {
                debug!("sensor: {d:.1} cm outside valid band, discarded");
                Reading::Invalid
            }
            Err(e) => {
                debug!("sensor: {e}, discarded");
                Reading::Invalid
            }
        }
    }

    /// Take one measurement for the distance report.  Does not feed the
    /// passage detector.
    pub fn report(&self, ranger: &mut impl RangingPort) -> DistanceReport {
        let raw = ranger.ping().unwrap_or(0.0);
        let raw = if raw.is_finite() { raw } else { 0.0 };
        let in_range = self.in_band(raw);
        DistanceReport {
            distance_cm: round_2dp(raw),
            in_range,
            person_detected: in_range && raw < self.detection_cm,
        }
    }

    fn in_band(&self, d: f32) -> bool {
        self.min_cm <= d && d <= self.max_cm
    }
}

fn round_2dp(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}
