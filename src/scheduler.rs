//! Cooperative activity scheduler.
//!
//! The control loop polls the scheduler as often as it can; the scheduler
//! notifies a [`SchedulerDelegate`] for every periodic activity whose
//! interval has elapsed.  Activities run one at a time, to completion, in
//! a fixed order.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Periodic activities                      │
//! │                                                              │
//! │  ┌───────────┐      ┌───────────┐      ┌──────────────────┐  │
//! │  │ Animation │      │ Sensor    │      │ Link maintenance │  │
//! │  │  75 ms    │      │  50 ms    │      │  5000 ms         │  │
//! │  └─────┬─────┘      └─────┬─────┘      └────────┬─────────┘  │
//! │        │                  │                     │            │
//! │        ▼                  ▼                     ▼            │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              SchedulerDelegate                         │  │
//! │  │       (Runtime dispatches to PortalService)            │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! All timing is elapsed-time arithmetic on [`Millis`], so the 32-bit
//! counter wrap never stalls or bursts an activity.

use crate::app::ports::SchedulerDelegate;
use crate::config::PortalConfig;
use crate::time::Millis;
use log::info;

// ═══════════════════════════════════════════════════════════════
//  Activity types
// ═══════════════════════════════════════════════════════════════

/// The periodic activities sharing the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activity {
    /// Sequence completion and frame render.
    Animation,
    /// Distance sample through the passage detector.
    Sensor,
    /// WiFi and telemetry reconnect attempts.
    LinkMaintenance,
}

impl Activity {
    pub const ALL: [Self; 3] = [Self::Animation, Self::Sensor, Self::LinkMaintenance];
}

/// Internal bookkeeping for one activity.
#[derive(Debug, Clone, Copy)]
struct Slot {
    activity: Activity,
    interval_ms: u32,
    last_run: Millis,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// The scheduler engine.
///
/// Decoupled from the service: when an activity is due it invokes the
/// [`SchedulerDelegate`] callback and knows nothing else about it.
pub struct Scheduler {
    slots: [Slot; 3],
}

impl Scheduler {
    /// Build the schedule from the configured intervals.  The first run of
    /// every activity is one interval after `now`.
    pub fn new(config: &PortalConfig, now: Millis) -> Self {
        let slot = |activity, interval_ms| Slot {
            activity,
            interval_ms,
            last_run: now,
        };
        info!(
            "Scheduler: animation {}ms, sensor {}ms, links {}ms",
            config.animation_interval_ms, config.sensor_interval_ms, config.link_retry_interval_ms
        );
        Self {
            slots: [
                slot(Activity::Animation, config.animation_interval_ms),
                slot(Activity::Sensor, config.sensor_interval_ms),
                slot(Activity::LinkMaintenance, config.link_retry_interval_ms),
            ],
        }
    }

    /// Run every due activity once, in declaration order.  Returns how many
    /// ran.
    ///
    /// An activity is due once `interval_ms` has elapsed since its last
    /// run.  A late poll runs it once, not once per missed interval.
    pub fn poll(&mut self, now: Millis, delegate: &mut dyn SchedulerDelegate) -> usize {
        let mut ran = 0;
        for slot in self.slots.iter_mut() {
            if now.since(slot.last_run) < slot.interval_ms {
                continue;
            }
            slot.last_run = now;
            delegate.on_activity_due(slot.activity, now);
            ran += 1;
        }
        ran
    }

    /// Milliseconds until the next activity is due (0 if one is
    /// due already).
    pub fn next_due_in(&self, now: Millis) -> u32 {
        self.slots
            .iter()
            .map(|s| s.interval_ms.saturating_sub(now.since(s.last_run)))
            .min()
            .unwrap_or(0)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    /// Test delegate that records fire events.
    struct RecordingDelegate {
        fires: Vec<(Activity, Millis)>,
    }

    impl RecordingDelegate {
        fn new() -> Self {
            Self { fires: Vec::new() }
        }

        fn count(&self, activity: Activity) -> usize {
            self.fires.iter().filter(|(a, _)| *a == activity).count()
        }
    }

    impl SchedulerDelegate for RecordingDelegate {
        fn on_activity_due(&mut self, activity: Activity, now: Millis) {
            self.fires.push((activity, now));
        }
    }

    #[test]
    fn nothing_due_before_first_interval() {
        let mut sched = Scheduler::new(&PortalConfig::default(), Millis(0));
        let mut delegate = RecordingDelegate::new();
        assert_eq!(sched.poll(Millis(49), &mut delegate), 0);
        assert!(delegate.fires.is_empty());
    }

    #[test]
    fn activities_fire_at_their_own_cadence() {
        let mut sched = Scheduler::new(&PortalConfig::default(), Millis(0));
        let mut delegate = RecordingDelegate::new();

        for t in 1..=1500 {
            sched.poll(Millis(t), &mut delegate);
        }
        assert_eq!(delegate.count(Activity::Animation), 20);
        assert_eq!(delegate.count(Activity::Sensor), 30);
        assert_eq!(delegate.count(Activity::LinkMaintenance), 0);
    }

    #[test]
    fn fixed_order_when_several_are_due() {
        let mut sched = Scheduler::new(&PortalConfig::default(), Millis(0));
        let mut delegate = RecordingDelegate::new();
        assert_eq!(sched.poll(Millis(5000), &mut delegate), 3);
        let order: Vec<Activity> = delegate.fires.iter().map(|(a, _)| *a).collect();
        assert_eq!(order, Activity::ALL.to_vec());
    }

    #[test]
    fn late_poll_runs_once() {
        let mut sched = Scheduler::new(&PortalConfig::default(), Millis(0));
        let mut delegate = RecordingDelegate::new();
        sched.poll(Millis(1000), &mut delegate);
        assert_eq!(delegate.count(Activity::Sensor), 1);
        assert_eq!(sched.poll(Millis(1010), &mut delegate), 0);
    }

    #[test]
    fn counter_wrap_keeps_cadence() {
        let start = Millis(u32::MAX - 20);
        let mut sched = Scheduler::new(&PortalConfig::default(), start);
        let mut delegate = RecordingDelegate::new();
        sched.poll(start.after(49), &mut delegate);
        assert_eq!(delegate.count(Activity::Sensor), 0);
        sched.poll(start.after(50), &mut delegate);
        assert_eq!(delegate.count(Activity::Sensor), 1);
    }

    #[test]
    fn next_due_tracks_shortest_wait() {
        let sched = Scheduler::new(&PortalConfig::default(), Millis(0));
        assert_eq!(sched.next_due_in(Millis(10)), 40);
        assert_eq!(sched.next_due_in(Millis(80)), 0);
    }
}
