//! MQTT telemetry adapter.
//!
//! Implements [`TelemetryPort`] on top of the ESP-IDF MQTT client.  The
//! client is created on the first `connect` and reconnects to the broker by
//! itself afterwards; its event callback keeps a shared connected flag that
//! `is_connected` reads.  Publishing is QoS 0: enqueue and forget.
//!
//! Broker settings come from the build environment (`PORTAL_MQTT_URL`,
//! `PORTAL_MQTT_USER`, `PORTAL_MQTT_PASS`).  On host targets the adapter
//! records publishes instead of sending them.

use core::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

use crate::app::ports::TelemetryPort;
use crate::error::CommsError;

pub const MQTT_URL: Option<&str> = option_env!("PORTAL_MQTT_URL");
pub const MQTT_USER: Option<&str> = option_env!("PORTAL_MQTT_USER");
pub const MQTT_PASS: Option<&str> = option_env!("PORTAL_MQTT_PASS");

/// Client id presented to the broker.
pub const CLIENT_ID: &str = "rgb-portal";

/// Set from the client's event callback.
static BROKER_CONNECTED: AtomicBool = AtomicBool::new(false);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerSettings {
    pub url: &'static str,
    pub username: Option<&'static str>,
    pub password: Option<&'static str>,
}

impl BrokerSettings {
    pub fn from_build_env() -> Option<Self> {
        Some(Self {
            url: MQTT_URL?,
            username: MQTT_USER,
            password: MQTT_PASS,
        })
    }
}

pub struct MqttAdapter {
    settings: Option<BrokerSettings>,
    #[cfg(target_os = "espidf")]
    client: Option<esp_idf_svc::mqtt::client::EspMqttClient<'static>>,
    #[cfg(not(target_os = "espidf"))]
    published: Vec<(String, String)>,
}

impl MqttAdapter {
    pub fn new(settings: Option<BrokerSettings>) -> Self {
        if settings.is_none() {
            warn!("MQTT: no broker configured, mode changes will not be published");
        }
        Self {
            settings,
            #[cfg(target_os = "espidf")]
            client: None,
            #[cfg(not(target_os = "espidf"))]
            published: Vec::new(),
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self, settings: BrokerSettings) -> Result<(), CommsError> {
        use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration};

        if self.client.is_some() {
            // The client retries on its own once created.
            return Ok(());
        }
        let conf = MqttClientConfiguration {
            client_id: Some(CLIENT_ID),
            username: settings.username,
            password: settings.password,
            ..Default::default()
        };
        let client = EspMqttClient::new_cb(settings.url, &conf, |event| match event.payload() {
            EventPayload::Connected(_) => BROKER_CONNECTED.store(true, Ordering::Relaxed),
            EventPayload::Disconnected => BROKER_CONNECTED.store(false, Ordering::Relaxed),
            _ => {}
        })
        .map_err(|e| {
            warn!("MQTT: client init failed: {e}");
            CommsError::TelemetryConnectFailed
        })?;
        self.client = Some(client);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError> {
        use esp_idf_svc::mqtt::client::QoS;

        let client = self.client.as_mut().ok_or(CommsError::TelemetryUnavailable)?;
        client
            .enqueue(topic, QoS::AtMostOnce, false, payload.as_bytes())
            .map(|_| ())
            .map_err(|_| CommsError::PublishFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self, settings: BrokerSettings) -> Result<(), CommsError> {
        log::debug!("MQTT(sim): session with {}", settings.url);
        BROKER_CONNECTED.store(true, Ordering::Relaxed);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError> {
        self.published.push((topic.into(), payload.into()));
        Ok(())
    }

    /// Everything the simulated client has sent.
    #[cfg(not(target_os = "espidf"))]
    pub fn published(&self) -> &[(String, String)] {
        &self.published
    }
}

/// Drop the simulated broker session, as a network outage would.
#[cfg(not(target_os = "espidf"))]
pub fn sim_drop_session() {
    BROKER_CONNECTED.store(false, Ordering::Relaxed);
}

impl TelemetryPort for MqttAdapter {
    fn is_connected(&self) -> bool {
        self.settings.is_some() && BROKER_CONNECTED.load(Ordering::Relaxed)
    }

    fn connect(&mut self) -> Result<(), CommsError> {
        let settings = self.settings.ok_or(CommsError::TelemetryUnavailable)?;
        info!("MQTT: connecting to {} as {}", settings.url, CLIENT_ID);
        self.platform_connect(settings)
    }

    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), CommsError> {
        if !self.is_connected() {
            return Err(CommsError::TelemetryUnavailable);
        }
        self.platform_publish(topic, payload)
    }
}
