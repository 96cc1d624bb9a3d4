//! End-to-end scenarios for the PortalService → detector → FSM → renderer
//! pipeline, driven with a scripted ranger on a simulated clock.

use rgb_portal::app::commands::{CommandResponse, PortalCommand};
use rgb_portal::app::events::PortalEvent;
use rgb_portal::app::service::PortalService;
use rgb_portal::config::PortalConfig;
use rgb_portal::fsm::PortalMode;
use rgb_portal::time::Millis;
use smart_leds::RGB8;

use crate::mock_hw::{hardware_at, FixedRoll, MockHardware, RecordingSink, GREEN_ROLL, RED_ROLL};

const SENSOR_MS: u32 = 50;
const RED: RGB8 = RGB8 { r: 255, g: 0, b: 0 };
const GREEN: RGB8 = RGB8 { r: 0, g: 128, b: 0 };
const OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

struct Bench {
    svc: PortalService,
    hw: MockHardware,
    roll: FixedRoll,
    sink: RecordingSink,
    now: u32,
}

impl Bench {
    fn new(roll: u8) -> Self {
        Self::with_config(PortalConfig::default(), roll)
    }

    fn with_config(config: PortalConfig, roll: u8) -> Self {
        let mut svc = PortalService::new(config, Millis(0)).unwrap();
        let mut sink = RecordingSink::new();
        svc.start(Millis(0), &mut sink);
        Self {
            svc,
            hw: hardware_at(200.0),
            roll: FixedRoll(roll),
            sink,
            now: 0,
        }
    }

    /// Sample every 50 ms for `duration_ms` with the ranger at `cm`.
    fn hold(&mut self, cm: Option<f32>, duration_ms: u32) {
        self.hw.ranger_mut().distance = cm;
        let end = self.now + duration_ms;
        while self.now < end {
            self.now += SENSOR_MS;
            self.svc
                .sensor_tick(Millis(self.now), &mut self.hw, &mut self.roll, &mut self.sink);
        }
    }

    fn command(&mut self, cmd: PortalCommand) -> CommandResponse {
        self.svc
            .handle_command(cmd, Millis(self.now), &mut self.hw, &mut self.sink)
    }

    fn render_at(&mut self, at: u32) -> Vec<RGB8> {
        self.now = at;
        self.svc.render_tick(Millis(at), &mut self.hw, &mut self.sink);
        self.hw.strip().last.clone()
    }
}

// ── Warmup ────────────────────────────────────────────────────

#[test]
fn person_during_warmup_is_ignored() {
    let mut b = Bench::new(GREEN_ROLL);
    b.hold(Some(30.0), 2000);
    assert_eq!(b.svc.mode(), PortalMode::Idle);
    assert!(!b.svc.tracker().in_passage);
    assert!(!b.svc.tracker().sensor_warmed_up);
    assert_eq!(b.sink.mode_changes(), 0);
}

#[test]
fn person_still_present_after_warmup_starts_a_passage() {
    let mut b = Bench::new(GREEN_ROLL);
    b.hold(Some(30.0), 3000);
    assert_eq!(b.svc.mode(), PortalMode::Idle);
    b.hold(Some(30.0), SENSOR_MS);
    assert_eq!(b.svc.mode(), PortalMode::GreenSequence);
    assert!(b.sink.events.contains(&PortalEvent::WarmupComplete));
}

// ── Passages ──────────────────────────────────────────────────

#[test]
fn green_passage_returns_to_idle_when_clear() {
    let mut b = Bench::new(GREEN_ROLL);
    b.hold(Some(200.0), 3050);
    assert!(b.svc.tracker().sensor_warmed_up);

    b.hold(Some(30.0), 1600);
    assert_eq!(b.svc.mode(), PortalMode::GreenSequence);
    assert!(b.svc.session().was_auto_triggered);

    b.hold(Some(65.0), 1600);
    assert_eq!(b.svc.mode(), PortalMode::Idle);
    assert!(!b.svc.tracker().in_passage);

    let auto_changes: Vec<_> = b
        .sink
        .events
        .iter()
        .filter_map(|e| match e {
            PortalEvent::ModeChanged { from, to, auto } => Some((*from, *to, *auto)),
            _ => None,
        })
        .collect();
    assert_eq!(
        auto_changes,
        vec![
            (PortalMode::Idle, PortalMode::GreenSequence, true),
            (PortalMode::GreenSequence, PortalMode::Idle, false),
        ]
    );
}

#[test]
fn red_passage_holds_red_after_person_leaves() {
    let mut b = Bench::new(RED_ROLL);
    b.hold(Some(200.0), 3050);
    b.hold(Some(30.0), 1600);
    assert_eq!(b.svc.mode(), PortalMode::RedSequence);
    b.hold(Some(65.0), 1600);
    assert_eq!(b.svc.mode(), PortalMode::RedSequence);
    assert!(!b.svc.tracker().in_passage);

    // Only a command leaves red.
    assert_eq!(
        b.command(PortalCommand::Reset),
        CommandResponse::Applied(PortalMode::Idle)
    );
}

#[test]
fn short_gap_does_not_end_passage() {
    let mut b = Bench::new(GREEN_ROLL);
    b.hold(Some(200.0), 3050);
    b.hold(Some(30.0), 500);
    b.hold(Some(120.0), 200);
    assert!(b.svc.tracker().in_passage);
    assert_eq!(b.svc.mode(), PortalMode::GreenSequence);
}

#[test]
fn echo_timeouts_do_not_start_passages() {
    let mut b = Bench::new(GREEN_ROLL);
    b.hold(None, 5000);
    assert!(!b.svc.tracker().in_passage);
    assert_eq!(b.svc.tracker().last_valid_distance, None);
    assert_eq!(b.svc.mode(), PortalMode::Idle);
}

#[test]
fn out_of_band_readings_are_discarded() {
    let mut b = Bench::new(GREEN_ROLL);
    b.hold(Some(200.0), 3050);
    // Below the 1 cm floor: invalid, so never "in range" despite being
    // closer than the detection threshold.
    b.hold(Some(0.5), 500);
    assert!(!b.svc.tracker().in_passage);
    assert_eq!(b.svc.tracker().last_valid_distance, None);
}

#[test]
fn cooldown_blocks_immediate_second_passage() {
    let mut b = Bench::new(GREEN_ROLL);
    b.hold(Some(200.0), 3050);
    b.hold(Some(30.0), 1500);
    b.hold(Some(65.0), 50);
    assert_eq!(b.svc.mode(), PortalMode::Idle);

    b.hold(Some(30.0), 500);
    assert!(!b.svc.tracker().in_passage);
    assert_eq!(b.svc.mode(), PortalMode::Idle);

    b.hold(Some(30.0), 600);
    assert!(b.svc.tracker().in_passage);
    assert_eq!(b.svc.mode(), PortalMode::GreenSequence);
}

#[test]
fn passage_during_manual_red_makes_no_pick() {
    let mut b = Bench::new(GREEN_ROLL);
    b.hold(Some(200.0), 3050);
    b.command(PortalCommand::TriggerRed);
    b.hold(Some(30.0), 500);
    assert!(b.svc.tracker().in_passage);
    assert_eq!(b.svc.mode(), PortalMode::RedSequence);
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn green_overrides_red_but_red_does_not_override_green() {
    let mut b = Bench::new(GREEN_ROLL);
    assert_eq!(
        b.command(PortalCommand::TriggerRed),
        CommandResponse::Applied(PortalMode::RedSequence)
    );
    assert_eq!(
        b.command(PortalCommand::TriggerGreen),
        CommandResponse::Applied(PortalMode::GreenSequence)
    );
    assert_eq!(
        b.command(PortalCommand::TriggerRed),
        CommandResponse::Applied(PortalMode::GreenSequence)
    );
    assert!(!b.svc.session().was_auto_triggered);
}

#[test]
fn toggle_cycles_idle_red_idle() {
    let mut b = Bench::new(GREEN_ROLL);
    assert_eq!(
        b.command(PortalCommand::Toggle),
        CommandResponse::Applied(PortalMode::RedSequence)
    );
    assert_eq!(
        b.command(PortalCommand::Toggle),
        CommandResponse::Applied(PortalMode::Idle)
    );
    assert_eq!(b.sink.mode_changes(), 2);
}

#[test]
fn reset_in_idle_is_a_silent_no_op() {
    let mut b = Bench::new(GREEN_ROLL);
    let before = b.sink.events.len();
    assert_eq!(
        b.command(PortalCommand::Reset),
        CommandResponse::Applied(PortalMode::Idle)
    );
    assert_eq!(b.sink.events.len(), before);
}

#[test]
fn get_distance_reports_raw_reading() {
    let mut b = Bench::new(GREEN_ROLL);
    b.hw.ranger_mut().distance = Some(42.123);
    match b.command(PortalCommand::GetDistance) {
        CommandResponse::Distance(r) => {
            assert!((r.distance_cm - 42.12).abs() < 1e-4);
            assert!(r.in_range);
            assert!(r.person_detected);
        }
        other => panic!("unexpected {other:?}"),
    }

    b.hw.ranger_mut().distance = None;
    match b.command(PortalCommand::GetDistance) {
        CommandResponse::Distance(r) => {
            assert_eq!(r.distance_cm, 0.0);
            assert!(!r.in_range);
            assert!(!r.person_detected);
        }
        other => panic!("unexpected {other:?}"),
    }
}

// ── Rendering ─────────────────────────────────────────────────

#[test]
fn red_blinks_five_times_then_holds() {
    let mut b = Bench::new(GREEN_ROLL);
    b.command(PortalCommand::TriggerRed);

    for blink in 0..5 {
        let lit_at = blink * 400 + 100;
        assert!(b.render_at(lit_at).iter().all(|p| *p == RED), "lit at {lit_at}");
        assert!(b.render_at(lit_at + 200).iter().all(|p| *p == OFF), "dark at {}", lit_at + 200);
    }
    let frame = b.render_at(2050);
    assert_eq!(frame.len(), 140);
    assert!(frame.iter().all(|p| *p == RED));
    assert!(b.svc.session().sequence_blink_done);
    assert_eq!(b.svc.mode(), PortalMode::RedSequence);
}

#[test]
fn held_red_stays_solid_across_clock_wrap() {
    let mut b = Bench::new(GREEN_ROLL);
    b.command(PortalCommand::TriggerRed);
    assert!(b.render_at(2_100).iter().all(|p| *p == RED));
    assert!(b.svc.session().sequence_blink_done);

    // One full wrap of the millisecond counter later, 250 ms into mode
    // again as far as wrapping arithmetic can tell.
    for at in [250, 450, 650] {
        assert!(b.render_at(at).iter().all(|p| *p == RED), "solid at {at}");
    }
    assert_eq!(b.svc.mode(), PortalMode::RedSequence);
}

#[test]
fn green_is_solid_until_left() {
    let mut b = Bench::new(GREEN_ROLL);
    b.command(PortalCommand::TriggerGreen);
    for at in [75, 1_000, 60_000] {
        assert!(b.render_at(at).iter().all(|p| *p == GREEN));
    }
}

#[test]
fn non_holding_sequence_returns_to_idle_when_done() {
    let mut config = PortalConfig::default();
    config.red.hold_after_blink = false;
    let mut b = Bench::with_config(config, GREEN_ROLL);
    b.command(PortalCommand::TriggerRed);

    b.render_at(1_000);
    assert_eq!(b.svc.mode(), PortalMode::RedSequence);
    b.render_at(2_000);
    assert_eq!(b.svc.mode(), PortalMode::Idle);
    assert!(b.sink.events.contains(&PortalEvent::ModeChanged {
        from: PortalMode::RedSequence,
        to: PortalMode::Idle,
        auto: false,
    }));
}

#[test]
fn idle_animation_moves_between_ticks() {
    let mut b = Bench::new(GREEN_ROLL);
    let first = b.render_at(75);
    let second = b.render_at(150);
    assert_eq!(first.len(), 140);
    assert_ne!(first, second);
}
