//! Application service: the hexagonal core.
//!
//! [`PortalService`] owns the FSM, the passage detector, the renderer and
//! the shared context.  It exposes a clean, hardware-agnostic API.  All
//! I/O flows through port traits injected at call sites, making the entire
//! service testable with mock adapters.
//!
//! ```text
//!  RangingPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                  │      PortalService        │
//!  TriggerRoll ──▶ │ Detector · FSM · Renderer │ ──▶ PixelSink
//!                  └──────────────────────────┘
//! ```
//!
//! Every method runs to completion on the control loop; the session is
//! never observed half-updated.

use log::{debug, info, warn};

use crate::config::PortalConfig;
use crate::detector::{PassageDetector, PassageIntent, PassageTracker};
use crate::drivers::led_patterns::{Frame, Renderer};
use crate::error::Result;
use crate::fsm::context::{PortalContext, PortalSession};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, PortalMode, Transition, Trigger};
use crate::sensors::DistanceSampler;
use crate::time::Millis;

use super::commands::{CommandResponse, PortalCommand};
use super::events::PortalEvent;
use super::ports::{EventSink, PixelSink, RangingPort, TriggerRoll};

// ───────────────────────────────────────────────────────────────
// PortalService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct PortalService {
    fsm: Fsm,
    ctx: PortalContext,
    sampler: DistanceSampler,
    detector: PassageDetector,
    renderer: Renderer,
    frame: Frame,
}

impl PortalService {
    /// Construct the service from configuration.  Warmup is measured from
    /// `now`.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: PortalConfig, now: Millis) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            fsm: Fsm::new(build_state_table()),
            sampler: DistanceSampler::new(&config),
            detector: PassageDetector::new(&config, now),
            renderer: Renderer::new(config.strip_len),
            frame: Frame::new(),
            ctx: PortalContext::new(config, now),
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Enter the boot mode (Idle) and restart sensor warmup at `now`.
    pub fn start(&mut self, now: Millis, sink: &mut impl EventSink) {
        self.ctx.now = now;
        self.ctx.session.mode_entered_at = now;
        self.detector.restart(now);
        self.fsm.start(&mut self.ctx);
        sink.emit(&PortalEvent::Started(self.ctx.session.mode));
        info!("PortalService started in {:?}", self.ctx.session.mode);
    }

    // ── Periodic activities ───────────────────────────────────

    /// Sensor activity: one distance sample through the detector, then any
    /// transition it asks for.
    pub fn sensor_tick(
        &mut self,
        now: Millis,
        ranger: &mut impl RangingPort,
        roll: &mut impl TriggerRoll,
        sink: &mut impl EventSink,
    ) {
        self.ctx.now = now;
        let reading = self.sampler.measure(ranger);

        let before = *self.detector.tracker();
        let intent = self
            .detector
            .on_sample(now, reading, self.ctx.session.mode, roll);
        let after = *self.detector.tracker();

        if !before.sensor_warmed_up && after.sensor_warmed_up {
            sink.emit(&PortalEvent::WarmupComplete);
        }
        if !before.in_passage && after.in_passage {
            let distance_cm = reading.distance().unwrap_or(0.0);
            sink.emit(&PortalEvent::PassageStarted { distance_cm });
        }

        match intent {
            Some(PassageIntent::StartGreen) => {
                self.apply(Trigger::DetectorGreen, sink);
            }
            Some(PassageIntent::StartRed) => {
                self.apply(Trigger::DetectorRed, sink);
            }
            Some(PassageIntent::EndPassage) => {
                let duration_ms = now.since(before.passage_started_at);
                sink.emit(&PortalEvent::PassageEnded { duration_ms });
                self.apply(Trigger::PassageEnded, sink);
            }
            None => {}
        }
    }

    /// Animation activity: sequence completion, then a fresh frame pushed
    /// to `pixels`.
    pub fn render_tick(
        &mut self,
        now: Millis,
        pixels: &mut impl PixelSink,
        sink: &mut impl EventSink,
    ) {
        self.ctx.now = now;
        if let Some(t) = self.fsm.tick(&mut self.ctx) {
            self.notify(t, sink);
        }

        let mode = self.ctx.session.mode;
        self.renderer.advance(mode);
        self.renderer.render(
            mode,
            self.ctx.elapsed_in_mode(),
            self.ctx.session.sequence_blink_done,
            &self.ctx.config,
            &mut self.frame,
        );

        if let Err(e) = pixels.show(&self.frame) {
            warn!("render: frame output failed: {e}");
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process a remote command and answer it.
    pub fn handle_command(
        &mut self,
        cmd: PortalCommand,
        now: Millis,
        ranger: &mut impl RangingPort,
        sink: &mut impl EventSink,
    ) -> CommandResponse {
        self.ctx.now = now;
        let trigger = match cmd {
            PortalCommand::Toggle => Trigger::Toggle,
            PortalCommand::TriggerRed => Trigger::ManualRed,
            PortalCommand::TriggerGreen => Trigger::ManualGreen,
            PortalCommand::Reset => Trigger::Reset,
            PortalCommand::GetState => return CommandResponse::State(self.mode()),
            PortalCommand::GetDistance => {
                return CommandResponse::Distance(self.sampler.report(ranger));
            }
        };

        if self.apply(trigger, sink).is_none() {
            debug!("command {}: mode unchanged ({:?})", cmd.name(), self.mode());
        }
        CommandResponse::Applied(self.mode())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> PortalMode {
        self.ctx.session.mode
    }

    pub fn session(&self) -> &PortalSession {
        &self.ctx.session
    }

    pub fn tracker(&self) -> &PassageTracker {
        self.detector.tracker()
    }

    pub fn config(&self) -> &PortalConfig {
        &self.ctx.config
    }

    /// The most recently rendered frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    // ── Internal ──────────────────────────────────────────────

    fn apply(&mut self, trigger: Trigger, sink: &mut impl EventSink) -> Option<Transition> {
        let t = self.fsm.apply(trigger, &mut self.ctx)?;
        self.notify(t, sink);
        Some(t)
    }

    fn notify(&self, t: Transition, sink: &mut impl EventSink) {
        sink.emit(&PortalEvent::ModeChanged {
            from: t.from,
            to: t.to,
            auto: self.ctx.session.was_auto_triggered,
        });
    }
}
