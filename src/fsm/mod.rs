//! Function-pointer finite state machine engine for the portal modes.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                    │
//! │  ┌───────────────┬───────────┬──────────┬───────────────────┐  │
//! │  │ PortalMode    │ on_enter  │ on_exit  │ on_update         │  │
//! │  ├───────────────┼───────────┼──────────┼───────────────────┤  │
//! │  │ Idle          │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ RedSequence   │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  │ GreenSequence │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │  │
//! │  └───────────────┴───────────┴──────────┴───────────────────┘  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The current mode lives in [`PortalSession`](context::PortalSession), not
//! in the engine, so there is exactly one source of truth.  Two things move
//! the machine:
//!
//! - [`Fsm::apply`] with a [`Trigger`] (remote command or passage detector),
//!   resolved against the transition rules in [`states::resolve`];
//! - [`Fsm::tick`], which runs the current state's `on_update` once per
//!   render tick (sequence completion).
//!
//! Either way a transition runs `on_exit(current)` then `on_enter(next)`
//! and is reported back to the caller as a [`Transition`] so it can be
//! published.

pub mod context;
pub mod states;

use context::PortalContext;
use log::info;

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// The portal's visible mode.  Exactly one is active at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PortalMode {
    /// Rotating highlight animation.
    Idle = 0,
    /// Red blink sequence, then solid red until a manual reset.
    RedSequence = 1,
    /// Solid green while someone passes through.
    GreenSequence = 2,
}

impl PortalMode {
    /// Every mode, in table order.
    pub const ALL: [Self; 3] = [Self::Idle, Self::RedSequence, Self::GreenSequence];

    /// Total number of modes, used to size the table array.
    pub const COUNT: usize = Self::ALL.len();

    /// Wire code used by the command gateway and telemetry: 1 = idle,
    /// 2 = red, 3 = green.
    pub const fn code(self) -> u8 {
        self as u8 + 1
    }

    /// Telemetry payload for this mode.
    pub const fn payload(self) -> &'static str {
        match self {
            Self::Idle => "1",
            Self::RedSequence => "2",
            Self::GreenSequence => "3",
        }
    }

    pub const fn is_sequence(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

// ---------------------------------------------------------------------------
// Transition requests
// ---------------------------------------------------------------------------

/// Why a transition is being requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Remote `toggle`: idle enters red, anything else returns to idle.
    Toggle,
    /// Remote `trigger-red`.
    ManualRed,
    /// Remote `trigger-green`.
    ManualGreen,
    /// Remote `reset`.
    Reset,
    /// Passage start, random pick landed on red.
    DetectorRed,
    /// Passage start, random pick landed on green.
    DetectorGreen,
    /// The passage detector saw the portal clear again.
    PassageEnded,
}

impl Trigger {
    /// Whether the request came from sensing rather than a person.
    pub const fn is_automatic(self) -> bool {
        matches!(
            self,
            Self::DetectorRed | Self::DetectorGreen | Self::PassageEnded
        )
    }
}

/// A completed mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: PortalMode,
    pub to: PortalMode,
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each transition.
pub type StateActionFn = fn(&mut PortalContext);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut PortalContext) -> Option<PortalMode>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single mode.
/// Stored in a fixed-size array, no heap and no `dyn`.
pub struct StateDescriptor {
    pub id: PortalMode,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `PortalMode as usize`.
    table: [StateDescriptor; PortalMode::COUNT],
}

impl Fsm {
    pub fn new(table: [StateDescriptor; PortalMode::COUNT]) -> Self {
        Self { table }
    }

    /// Run the initial `on_enter` for the boot mode.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&self, ctx: &mut PortalContext) {
        let current = ctx.session.mode;
        info!("FSM starting in mode: {}", self.name(current));
        if let Some(enter) = self.table[current as usize].on_enter {
            enter(ctx);
        }
    }

    /// Run `on_update` for the current mode and take any transition it asks
    /// for.  `ctx.now` must already hold the tick's timestamp.
    pub fn tick(&self, ctx: &mut PortalContext) -> Option<Transition> {
        let current = ctx.session.mode;
        let next = (self.table[current as usize].on_update)(ctx)?;
        self.transition(next, ctx)
    }

    /// Resolve `trigger` against the transition rules and perform the
    /// resulting transition, if any.
    pub fn apply(&self, trigger: Trigger, ctx: &mut PortalContext) -> Option<Transition> {
        let next = states::resolve(ctx.session.mode, trigger)?;
        let transition = self.transition(next, ctx)?;
        ctx.session.was_auto_triggered = trigger.is_automatic() && next.is_sequence();
        Some(transition)
    }

    pub fn name(&self, mode: PortalMode) -> &'static str {
        self.table[mode as usize].name
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&self, next: PortalMode, ctx: &mut PortalContext) -> Option<Transition> {
        let from = ctx.session.mode;
        if from == next {
            return None;
        }

        info!("portal: {} -> {}", self.name(from), self.name(next));

        if let Some(exit) = self.table[from as usize].on_exit {
            exit(ctx);
        }

        ctx.session.mode = next;
        ctx.session.mode_entered_at = ctx.now;

        if let Some(enter) = self.table[next as usize].on_enter {
            enter(ctx);
        }

        Some(Transition { from, to: next })
    }
}
