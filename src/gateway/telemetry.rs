//! Outbound mode notifications.
//!
//! [`StatePublisher`] is an [`EventSink`]: every mode change is published
//! as `"1"`, `"2"` or `"3"` on the configured topic.  Publishing is
//! fire-and-forget.  When the channel is down the notification is skipped,
//! never queued or retried; link maintenance reconnects later and the
//! current mode is published once on (re)connect.

use log::{debug, info, warn};

use crate::app::events::PortalEvent;
use crate::app::ports::{EventSink, TelemetryPort};
use crate::error::CommsError;
use crate::fsm::PortalMode;

pub struct StatePublisher<T> {
    port: T,
    topic: heapless::String<32>,
    current: PortalMode,
    /// Connection state seen at the last publish or maintenance pass.
    was_connected: bool,
}

impl<T: TelemetryPort> StatePublisher<T> {
    pub fn new(port: T, topic: heapless::String<32>) -> Self {
        Self {
            port,
            topic,
            current: PortalMode::Idle,
            was_connected: false,
        }
    }

    pub fn port(&self) -> &T {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut T {
        &mut self.port
    }

    pub fn is_connected(&self) -> bool {
        self.port.is_connected()
    }

    /// One link-maintenance pass: publish the current mode if the channel
    /// came up since the last pass, or start a reconnect if it is down.
    pub fn maintain(&mut self) -> Result<(), CommsError> {
        let connected = self.port.is_connected();
        if connected {
            if !self.was_connected {
                info!("telemetry: connected, publishing current mode");
                self.publish_current();
            }
            self.was_connected = true;
            return Ok(());
        }

        if self.was_connected {
            warn!("telemetry: connection lost");
        }
        self.was_connected = false;
        self.port.connect()?;

        // Synchronous ports may already be up.
        if self.port.is_connected() {
            info!("telemetry: reconnected, publishing current mode");
            self.publish_current();
            self.was_connected = true;
        }
        Ok(())
    }

    fn publish_current(&mut self) {
        if !self.port.is_connected() {
            debug!("telemetry: channel down, {:?} not published", self.current);
            return;
        }
        match self.port.publish(&self.topic, self.current.payload()) {
            Ok(()) => {
                debug!("telemetry: {} <- {}", self.topic, self.current.payload());
                self.was_connected = true;
            }
            Err(e) => warn!("telemetry: publish failed: {e}"),
        }
    }
}

impl<T: TelemetryPort> EventSink for StatePublisher<T> {
    fn emit(&mut self, event: &PortalEvent) {
        match *event {
            PortalEvent::Started(mode) | PortalEvent::ModeChanged { to: mode, .. } => {
                self.current = mode;
                self.publish_current();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockChannel {
        connected: bool,
        accept_connect: bool,
        connects: u32,
        sent: Vec<(String, String)>,
    }

    impl TelemetryPort for MockChannel {
        fn is_connected(&self) -> bool {
            self.connected
        }

        fn connect(&mut self) -> Result<(), CommsError> {
            self.connects += 1;
            if self.accept_connect {
                self.connected = true;
                Ok(())
            } else {
                Err(CommsError::TelemetryConnectFailed)
            }
        }

        fn publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError> {
            self.sent.push((topic.into(), payload.into()));
            Ok(())
        }
    }

    fn topic() -> heapless::String<32> {
        let mut t = heapless::String::new();
        t.push_str("portal/state").unwrap();
        t
    }

    fn changed(from: PortalMode, to: PortalMode) -> PortalEvent {
        PortalEvent::ModeChanged {
            from,
            to,
            auto: false,
        }
    }

    #[test]
    fn publishes_each_mode_change() {
        let port = MockChannel {
            connected: true,
            ..Default::default()
        };
        let mut p = StatePublisher::new(port, topic());
        p.emit(&changed(PortalMode::Idle, PortalMode::RedSequence));
        p.emit(&changed(PortalMode::RedSequence, PortalMode::GreenSequence));
        p.emit(&PortalEvent::WarmupComplete);
        let payloads: Vec<&str> = p.port().sent.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(payloads, vec!["2", "3"]);
        assert_eq!(p.port().sent[0].0, "portal/state");
    }

    #[test]
    fn skips_silently_while_disconnected() {
        let mut p = StatePublisher::new(MockChannel::default(), topic());
        p.emit(&changed(PortalMode::Idle, PortalMode::RedSequence));
        assert!(p.port().sent.is_empty());
        assert_eq!(p.port().connects, 0);
    }

    #[test]
    fn reconnect_publishes_current_mode_once() {
        let mut p = StatePublisher::new(MockChannel::default(), topic());
        p.emit(&changed(PortalMode::Idle, PortalMode::GreenSequence));

        p.port_mut().accept_connect = true;
        assert!(p.maintain().is_ok());
        assert!(p.maintain().is_ok());
        let payloads: Vec<&str> = p.port().sent.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(payloads, vec!["3"]);
    }

    #[test]
    fn live_publish_is_not_repeated_by_maintenance() {
        let port = MockChannel {
            connected: true,
            ..Default::default()
        };
        let mut p = StatePublisher::new(port, topic());
        p.emit(&PortalEvent::Started(PortalMode::Idle));
        assert!(p.maintain().is_ok());
        let payloads: Vec<&str> = p.port().sent.iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(payloads, vec!["1"]);
    }

    #[test]
    fn failed_reconnect_is_reported() {
        let mut p = StatePublisher::new(MockChannel::default(), topic());
        assert_eq!(p.maintain(), Err(CommsError::TelemetryConnectFailed));
        assert_eq!(p.port().connects, 1);
    }
}
