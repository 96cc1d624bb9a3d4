//! Passage detector: turns the distance sample stream into passage events.
//!
//! ```text
//!        warmup (readings tracked, no events)
//!             │
//!             ▼
//!   ┌──── CLEAR ◀────────────[clear for hold, lasted ≥ min]────┐
//!   │        │                                                │
//!   │  [in range, cooldown over]                              │
//!   │        ▼                                                │
//!   │   IN PASSAGE ──[in range]──▶ IN PASSAGE ────────────────┘
//!   │        │
//!   └────────┘  [gap shorter than min duration: ignored]
//! ```
//!
//! The detector never touches the portal mode.  It returns a
//! [`PassageIntent`] and the service turns that into an FSM trigger.

use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::app::ports::TriggerRoll;
use crate::config::PortalConfig;
use crate::fsm::PortalMode;
use crate::sensors::Reading;
use crate::time::Millis;

/// What the detector asks of the state machine after a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassageIntent {
    /// Passage started, random pick landed on green.
    StartGreen,
    /// Passage started, random pick landed on red.
    StartRed,
    /// Passage over; return to idle if green is showing.
    EndPassage,
}

/// Detector bookkeeping.  Owned exclusively by [`PassageDetector`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassageTracker {
    pub in_passage: bool,
    pub passage_started_at: Millis,
    pub last_passage_ended_at: Option<Millis>,
    pub last_valid_distance: Option<f32>,
    pub sensor_warmed_up: bool,
    pub warmup_started_at: Millis,
    /// Start of the current clear (or invalid) streak inside a passage.
    pub clear_since: Option<Millis>,
}

impl PassageTracker {
    pub const fn new(now: Millis) -> Self {
        Self {
            in_passage: false,
            passage_started_at: now,
            last_passage_ended_at: None,
            last_valid_distance: None,
            sensor_warmed_up: false,
            warmup_started_at: now,
            clear_since: None,
        }
    }
}

/// Warmup, hysteresis and cooldown policy over distance samples.
pub struct PassageDetector {
    tracker: PassageTracker,
    warmup_ms: u32,
    detection_range_cm: f32,
    min_passage_ms: u32,
    clear_hold_ms: u32,
    cooldown_ms: u32,
    green_chance_percent: u8,
}

impl PassageDetector {
    /// Create a detector whose warmup starts at `now`.
    pub fn new(config: &PortalConfig, now: Millis) -> Self {
        Self {
            tracker: PassageTracker::new(now),
            warmup_ms: config.sensor_warmup_ms,
            detection_range_cm: config.detection_range_cm,
            min_passage_ms: config.min_passage_ms,
            clear_hold_ms: config.passage_clear_hold_ms,
            cooldown_ms: config.passage_cooldown_ms,
            green_chance_percent: config.green_chance_percent,
        }
    }

    pub fn tracker(&self) -> &PassageTracker {
        &self.tracker
    }

    /// Restart warmup at `now`, forgetting any passage in progress.
    pub fn restart(&mut self, now: Millis) {
        self.tracker = PassageTracker::new(now);
    }

    /// Feed one sample.  `mode` is the portal's mode at sample time and
    /// only gates the random pick.
    pub fn on_sample(
        &mut self,
        now: Millis,
        reading: Reading,
        mode: PortalMode,
        roll: &mut impl TriggerRoll,
    ) -> Option<PassageIntent> {
        if let Reading::Valid(d) = reading {
            self.tracker.last_valid_distance = Some(d);
        }

        if !self.tracker.sensor_warmed_up {
            if now.since(self.tracker.warmup_started_at) <= self.warmup_ms {
                return None;
            }
            self.tracker.sensor_warmed_up = true;
            info!("detector: sensor warmup complete");
        }

        let in_range = matches!(reading, Reading::Valid(d) if d < self.detection_range_cm);

        if self.tracker.in_passage {
            self.passage_sample(now, in_range)
        } else if in_range && !self.in_cooldown(now) {
            self.start_passage(now, mode, roll)
        } else {
            None
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn passage_sample(&mut self, now: Millis, in_range: bool) -> Option<PassageIntent> {
        if in_range {
            self.tracker.clear_since = None;
            return None;
        }

        let clear_since = *self.tracker.clear_since.get_or_insert(now);
        let lasted = now.since(self.tracker.passage_started_at);
        if lasted < self.min_passage_ms {
            debug!("detector: gap after {lasted} ms ignored");
            return None;
        }
        if now.since(clear_since) < self.clear_hold_ms {
            return None;
        }

        self.tracker.in_passage = false;
        self.tracker.last_passage_ended_at = Some(now);
        self.tracker.clear_since = None;
        info!("detector: passage ended after {lasted} ms");
        Some(PassageIntent::EndPassage)
    }

    fn start_passage(
        &mut self,
        now: Millis,
        mode: PortalMode,
        roll: &mut impl TriggerRoll,
    ) -> Option<PassageIntent> {
        self.tracker.in_passage = true;
        self.tracker.passage_started_at = now;
        self.tracker.clear_since = None;

        if mode != PortalMode::Idle {
            info!("detector: passage started while {mode:?}, no pick");
            return None;
        }

        let value = roll.roll_percent();
        let intent = if value < self.green_chance_percent {
            PassageIntent::StartGreen
        } else {
            PassageIntent::StartRed
        };
        info!("detector: passage started, roll={value} -> {intent:?}");
        Some(intent)
    }

    fn in_cooldown(&self, now: Millis) -> bool {
        self.tracker
            .last_passage_ended_at
            .is_some_and(|ended| now.since(ended) < self.cooldown_ms)
    }
}

// ── Randomness source ─────────────────────────────────────────

/// Seedable uniform roll over `[0, 100)`.
pub struct SeededRoll {
    rng: SmallRng,
}

impl SeededRoll {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl TriggerRoll for SeededRoll {
    fn roll_percent(&mut self) -> u8 {
        self.rng.gen_range(0..100)
    }
}
