//! Link maintenance: WiFi and telemetry reconnects.
//!
//! Runs as the `LinkMaintenance` scheduler activity (every 5 s by
//! default).  Each pass makes at most one non-blocking attempt per link
//! and returns.  The portal keeps animating and detecting regardless.

use log::{info, warn};

use crate::app::ports::{LinkPort, TelemetryPort};

use super::telemetry::StatePublisher;

/// Link state after a maintenance pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LinkStatus {
    pub network_up: bool,
    pub telemetry_up: bool,
}

#[derive(Debug, Default)]
pub struct LinkSupervisor {
    last: LinkStatus,
}

impl LinkSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> LinkStatus {
        self.last
    }

    /// One maintenance pass.  Telemetry is only attempted once the network
    /// is up.
    pub fn maintain<T: TelemetryPort>(
        &mut self,
        network: &mut impl LinkPort,
        telemetry: &mut StatePublisher<T>,
    ) -> LinkStatus {
        if !network.is_connected() {
            if let Err(e) = network.connect() {
                warn!("link: network reconnect failed: {e}");
            }
        }

        let network_up = network.is_connected();
        if network_up {
            if let Err(e) = telemetry.maintain() {
                warn!("link: telemetry reconnect failed: {e}");
            }
        }

        let status = LinkStatus {
            network_up,
            telemetry_up: network_up && telemetry.is_connected(),
        };
        if status != self.last {
            info!(
                "link: network={} telemetry={}",
                if status.network_up { "up" } else { "down" },
                if status.telemetry_up { "up" } else { "down" },
            );
        }
        self.last = status;
        status
    }
}
