//! Strip animation renderer.
//!
//! Computes the whole frame from scratch every render tick; nothing is
//! diffed against the previous frame.  Given the same mode, time in mode
//! and animator state, [`Renderer::render`] always produces the same
//! buffer.
//!
//! ## Idle
//!
//! A dim wash of the base colour with four bright highlights spaced a
//! quarter strip apart.  Each highlight is 21 pixels wide and falls off in
//! five steps either side of the centre:
//!
//! | distance | scale |
//! |----------|-------|
//! | 0        | 255   |
//! | ≤ 2      | 240   |
//! | ≤ 4      | 210   |
//! | ≤ 6      | 180   |
//! | ≤ 8      | 140   |
//! | ≤ 10     | 90    |
//!
//! Highlights are painted in order 1→4; where two overlap the later one
//! wins.  The base colour ping-pongs blue → purple → pink → purple → blue.
//!
//! ## Sequences
//!
//! Lit/dark alternation every `blink_phase_ms`, starting lit, then solid
//! (or back to idle) once the sequence is finished.

use smart_leds::RGB8;

use crate::config::{MAX_STRIP_LEN, PortalConfig, Rgb, SequenceConfig};
use crate::fsm::PortalMode;

/// One full strip frame.
pub type Frame = heapless::Vec<RGB8, MAX_STRIP_LEN>;

const BLUE: RGB8 = RGB8::new(0, 0, 255);
const PURPLE: RGB8 = RGB8::new(128, 0, 255);
const PINK: RGB8 = RGB8::new(255, 0, 128);
const BLACK: RGB8 = RGB8::new(0, 0, 0);

/// Dimming applied to the idle base wash.
const BASE_WASH_SCALE: u8 = 50;

/// Number of colour steps per blend segment (0.025 per tick).
const STEPS_PER_SEGMENT: u8 = 40;
/// Colour cycle end to end: blue → purple → pink.
const MAX_PHASE_STEP: u8 = STEPS_PER_SEGMENT * 2;

const HIGHLIGHT_COUNT: usize = 4;
const HIGHLIGHT_RADIUS: usize = 10;

// ---------------------------------------------------------------------------
// Colour maths
// ---------------------------------------------------------------------------

/// Scale a channel by `scale/256`, keeping full scale lossless.
fn scale8(value: u8, scale: u8) -> u8 {
    ((u16::from(value) * (u16::from(scale) + 1)) >> 8) as u8
}

pub fn nscale8(c: RGB8, scale: u8) -> RGB8 {
    RGB8::new(scale8(c.r, scale), scale8(c.g, scale), scale8(c.b, scale))
}

/// Linear blend from `a` (amount 0) to `b` (amount 255).
pub fn blend(a: RGB8, b: RGB8, amount: u8) -> RGB8 {
    let mix = |x: u8, y: u8| -> u8 {
        let inv = 255 - u16::from(amount);
        ((u16::from(x) * inv + u16::from(y) * u16::from(amount)) / 255) as u8
    };
    RGB8::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b))
}

fn rgb8(c: Rgb) -> RGB8 {
    RGB8::new(c.0, c.1, c.2)
}

/// Falloff scale for a pixel `dist` away from a highlight centre.
fn falloff(dist: usize) -> Option<u8> {
    match dist {
        0 => Some(255),
        1..=2 => Some(240),
        3..=4 => Some(210),
        5..=6 => Some(180),
        7..=8 => Some(140),
        9..=HIGHLIGHT_RADIUS => Some(90),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Idle animator (cosmetic continuity only)
// ---------------------------------------------------------------------------

/// Rotation offset and colour phase of the idle pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdleAnimator {
    offset: u16,
    /// 0 = blue, 40 = purple, 80 = pink.
    phase_step: u8,
    reversing: bool,
}

impl IdleAnimator {
    pub const fn new() -> Self {
        Self {
            offset: 0,
            phase_step: 0,
            reversing: false,
        }
    }

    pub fn offset(&self) -> u16 {
        self.offset
    }

    pub fn phase_step(&self) -> u8 {
        self.phase_step
    }

    /// Advance one animation tick.  The rotation always moves; the colour
    /// phase only while idle.
    pub fn advance(&mut self, strip_len: u16, idle: bool) {
        if strip_len > 0 {
            self.offset = (self.offset + 1) % strip_len;
        }
        if !idle {
            return;
        }
        if self.reversing {
            self.phase_step = self.phase_step.saturating_sub(1);
            if self.phase_step == 0 {
                self.reversing = false;
            }
        } else {
            self.phase_step = (self.phase_step + 1).min(MAX_PHASE_STEP);
            if self.phase_step == MAX_PHASE_STEP {
                self.reversing = true;
            }
        }
    }

    /// Current base colour on the blue → purple → pink cycle.
    pub fn base_colour(&self) -> RGB8 {
        let amount = |step: u8| (u16::from(step) * 255 / u16::from(STEPS_PER_SEGMENT)) as u8;
        if self.phase_step < STEPS_PER_SEGMENT {
            blend(BLUE, PURPLE, amount(self.phase_step))
        } else {
            blend(PURPLE, PINK, amount(self.phase_step - STEPS_PER_SEGMENT))
        }
    }
}

// ---------------------------------------------------------------------------
// Sequence timing
// ---------------------------------------------------------------------------

/// Where a sequence is at a given time in mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencePhase {
    Lit,
    Dark,
    Finished,
}

pub fn sequence_phase(seq: &SequenceConfig, elapsed_ms: u32) -> SequencePhase {
    if seq.is_finished(elapsed_ms) {
        return SequencePhase::Finished;
    }
    if seq.blink_count == 0 || seq.blink_phase_ms == 0 {
        return SequencePhase::Lit;
    }
    if (elapsed_ms / seq.blink_phase_ms) % 2 == 0 {
        SequencePhase::Lit
    } else {
        SequencePhase::Dark
    }
}

fn phase_or_done(seq: &SequenceConfig, elapsed_ms: u32, blink_done: bool) -> SequencePhase {
    if blink_done {
        SequencePhase::Finished
    } else {
        sequence_phase(seq, elapsed_ms)
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Owns the idle animator and fills frames for the strip.
pub struct Renderer {
    strip_len: usize,
    animator: IdleAnimator,
}

impl Renderer {
    pub fn new(strip_len: u16) -> Self {
        Self {
            strip_len: usize::from(strip_len).min(MAX_STRIP_LEN),
            animator: IdleAnimator::new(),
        }
    }

    pub fn animator(&self) -> &IdleAnimator {
        &self.animator
    }

    /// Advance idle continuity by one animation tick.
    pub fn advance(&mut self, mode: PortalMode) {
        self.animator.advance(self.strip_len as u16, mode == PortalMode::Idle);
    }

    /// Fill `frame` for `mode` at `elapsed_ms` into the mode.  Once
    /// `blink_done` is set the phase is latched at `Finished`, so a long
    /// hold survives the millisecond counter wrapping.
    pub fn render(
        &self,
        mode: PortalMode,
        elapsed_ms: u32,
        blink_done: bool,
        config: &PortalConfig,
        frame: &mut Frame,
    ) {
        match config.sequence_for(mode) {
            None => self.render_idle(frame),
            Some(seq) => match phase_or_done(seq, elapsed_ms, blink_done) {
                SequencePhase::Lit => self.fill(frame, rgb8(seq.color)),
                SequencePhase::Dark => self.fill(frame, BLACK),
                SequencePhase::Finished if seq.hold_after_blink => {
                    self.fill(frame, rgb8(seq.color));
                }
                // Normally unreachable: the FSM leaves the mode first.
                SequencePhase::Finished => self.render_idle(frame),
            },
        }
    }

    fn fill(&self, frame: &mut Frame, colour: RGB8) {
        frame.clear();
        for _ in 0..self.strip_len {
            // Cannot overflow: strip_len is capped at the frame capacity.
            let _ = frame.push(colour);
        }
    }

    fn render_idle(&self, frame: &mut Frame) {
        let len = self.strip_len;
        let base = self.animator.base_colour();
        self.fill(frame, nscale8(base, BASE_WASH_SCALE));
        if len == 0 {
            return;
        }

        let spacing = len / HIGHLIGHT_COUNT;
        let origin = usize::from(self.animator.offset) % len;
        for n in 0..HIGHLIGHT_COUNT {
            let centre = (origin + n * spacing) % len;
            for (i, px) in frame.iter_mut().enumerate() {
                let mut dist = i.abs_diff(centre);
                if dist > len / 2 {
                    dist = len - dist;
                }
                if let Some(scale) = falloff(dist) {
                    *px = if scale == 255 { base } else { nscale8(base, scale) };
                }
            }
        }
    }
}
