//! Concrete state handler functions, transition rules and table builder.
//!
//! ```text
//!            [toggle / red]              [green]
//!  IDLE ─────────────────────▶ RED ─────────────────▶ GREEN
//!   ▲ ▲                         │                       │
//!   │ └────[toggle / reset]─────┘                       │
//!   │                                                   │
//!   └──────[passage ended / toggle / reset]─────────────┘
//!
//!  IDLE ──[green]──▶ GREEN        GREEN ──[red]──▶ (ignored)
//! ```

use super::context::PortalContext;
use super::{PortalMode, StateDescriptor, Trigger};
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; PortalMode::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            id: PortalMode::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: RedSequence
        StateDescriptor {
            id: PortalMode::RedSequence,
            name: "RedSequence",
            on_enter: Some(sequence_enter),
            on_exit: None,
            on_update: sequence_update,
        },
        // Index 2: GreenSequence
        StateDescriptor {
            id: PortalMode::GreenSequence,
            name: "GreenSequence",
            on_enter: Some(sequence_enter),
            on_exit: None,
            on_update: sequence_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Transition rules
// ═══════════════════════════════════════════════════════════════════════════

/// Target mode for `trigger` while in `current`, or `None` when the request
/// does not apply.  Red never overrides green; green always overrides red.
pub fn resolve(current: PortalMode, trigger: Trigger) -> Option<PortalMode> {
    use PortalMode::{GreenSequence, Idle, RedSequence};

    let next = match (trigger, current) {
        (Trigger::Toggle, Idle) => RedSequence,
        (Trigger::Toggle, _) => Idle,

        (Trigger::ManualRed | Trigger::DetectorRed, Idle) => RedSequence,
        (Trigger::ManualRed | Trigger::DetectorRed, _) => return None,

        (Trigger::ManualGreen | Trigger::DetectorGreen, Idle | RedSequence) => GreenSequence,
        (Trigger::ManualGreen | Trigger::DetectorGreen, GreenSequence) => return None,

        (Trigger::Reset, _) => Idle,

        (Trigger::PassageEnded, GreenSequence) => Idle,
        (Trigger::PassageEnded, _) => return None,
    };

    (next != current).then_some(next)
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut PortalContext) {
    ctx.session.sequence_blink_done = false;
    ctx.session.was_auto_triggered = false;
    info!("IDLE: idle animation running");
}

fn idle_update(_ctx: &mut PortalContext) -> Option<PortalMode> {
    // Idle only leaves on a trigger.
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  RED / GREEN sequences
// ═══════════════════════════════════════════════════════════════════════════

fn sequence_enter(ctx: &mut PortalContext) {
    ctx.session.mode_entered_at = ctx.now;
    ctx.session.sequence_blink_done = false;
    if let Some(seq) = ctx.active_sequence() {
        info!(
            "SEQUENCE: {:?} started ({} blinks x {} ms, hold={})",
            ctx.session.mode, seq.blink_count, seq.blink_phase_ms, seq.hold_after_blink
        );
    }
}

fn sequence_update(ctx: &mut PortalContext) -> Option<PortalMode> {
    if ctx.session.sequence_blink_done {
        return None;
    }
    let elapsed = ctx.elapsed_in_mode();
    let seq = *ctx.active_sequence()?;
    if !seq.is_finished(elapsed) {
        return None;
    }

    ctx.session.sequence_blink_done = true;
    if seq.hold_after_blink {
        debug!("SEQUENCE: {:?} blink done, holding solid", ctx.session.mode);
        None
    } else {
        Some(PortalMode::Idle)
    }
}
