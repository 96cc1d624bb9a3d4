//! The single-threaded control loop.
//!
//! [`Runtime::run_once`] is one iteration of the dispatch loop: drain the
//! gateway's command queue, then run every periodic activity that is due.
//! Everything that mutates portal state runs here, to completion, one
//! thing at a time.

use log::info;

use crate::adapters::log_sink::LogEventSink;
use crate::config::PortalConfig;
use crate::error::Result;
use crate::gateway::channels::CommandQueue;
use crate::gateway::link::{LinkStatus, LinkSupervisor};
use crate::gateway::telemetry::StatePublisher;
use crate::scheduler::{Activity, Scheduler};
use crate::time::Millis;

use super::ports::{LinkPort, PixelSink, RangingPort, SchedulerDelegate, TelemetryPort, TriggerRoll};
use super::service::PortalService;

/// Everything the scheduled activities operate on.
pub struct ControlLoop<H, G, W, T> {
    pub service: PortalService,
    /// Ranger and strip.
    pub hw: H,
    pub roll: G,
    pub network: W,
    pub events: (LogEventSink, StatePublisher<T>),
    pub links: LinkSupervisor,
}

impl<H, G, W, T> SchedulerDelegate for ControlLoop<H, G, W, T>
where
    H: RangingPort + PixelSink,
    G: TriggerRoll,
    W: LinkPort,
    T: TelemetryPort,
{
    fn on_activity_due(&mut self, activity: Activity, now: Millis) {
        match activity {
            Activity::Animation => self.service.render_tick(now, &mut self.hw, &mut self.events),
            Activity::Sensor => {
                self.service
                    .sensor_tick(now, &mut self.hw, &mut self.roll, &mut self.events);
            }
            Activity::LinkMaintenance => {
                self.links.maintain(&mut self.network, &mut self.events.1);
            }
        }
    }
}

/// Scheduler plus control loop plus the inbound queue.
pub struct Runtime<'q, H, G, W, T> {
    scheduler: Scheduler,
    queue: &'q CommandQueue,
    core: ControlLoop<H, G, W, T>,
}

impl<'q, H, G, W, T> Runtime<'q, H, G, W, T>
where
    H: RangingPort + PixelSink,
    G: TriggerRoll,
    W: LinkPort,
    T: TelemetryPort,
{
    /// Build the service and start it at `now`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: PortalConfig,
        now: Millis,
        queue: &'q CommandQueue,
        hw: H,
        roll: G,
        network: W,
        telemetry: T,
    ) -> Result<Self> {
        let scheduler = Scheduler::new(&config, now);
        let publisher = StatePublisher::new(telemetry, config.telemetry_topic.clone());
        let mut core = ControlLoop {
            service: PortalService::new(config, now)?,
            hw,
            roll,
            network,
            events: (LogEventSink::new(), publisher),
            links: LinkSupervisor::new(),
        };
        core.service.start(now, &mut core.events);
        info!("runtime: control loop ready");
        Ok(Self {
            scheduler,
            queue,
            core,
        })
    }

    /// One loop iteration.  Returns the number of commands and activities
    /// processed.
    pub fn run_once(&mut self, now: Millis) -> usize {
        let core = &mut self.core;
        let commands = self.queue.drain(|cmd| {
            core.service
                .handle_command(cmd, now, &mut core.hw, &mut core.events)
        });
        commands + self.scheduler.poll(now, &mut self.core)
    }

    /// Milliseconds the caller may sleep before the next activity is due.
    pub fn idle_budget(&self, now: Millis) -> u32 {
        self.scheduler.next_due_in(now)
    }

    pub fn service(&self) -> &PortalService {
        &self.core.service
    }

    pub fn hw(&self) -> &H {
        &self.core.hw
    }

    pub fn hw_mut(&mut self) -> &mut H {
        &mut self.core.hw
    }

    pub fn network_mut(&mut self) -> &mut W {
        &mut self.core.network
    }

    pub fn telemetry(&self) -> &T {
        self.core.events.1.port()
    }

    pub fn telemetry_mut(&mut self) -> &mut T {
        self.core.events.1.port_mut()
    }

    pub fn links(&self) -> LinkStatus {
        self.core.links.status()
    }
}
