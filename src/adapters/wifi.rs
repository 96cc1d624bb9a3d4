//! WiFi station-mode adapter.
//!
//! Implements [`LinkPort`], the boundary the link supervisor uses to keep
//! the network up.  `connect` only starts an attempt; the driver finishes
//! association in the background and `is_connected` reports the outcome on
//! a later maintenance pass.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stub driven by [`sim_set_available`].
//!
//! Credentials are baked in at build time from `PORTAL_WIFI_SSID` and
//! `PORTAL_WIFI_PASS`.

use log::{info, warn};

use crate::app::ports::LinkPort;
use crate::error::CommsError;

// ───────────────────────────────────────────────────────────────
// Credentials
// ───────────────────────────────────────────────────────────────

pub const WIFI_SSID: Option<&str> = option_env!("PORTAL_WIFI_SSID");
pub const WIFI_PASS: Option<&str> = option_env!("PORTAL_WIFI_PASS");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub ssid: heapless::String<32>,
    pub password: heapless::String<64>,
}

impl Credentials {
    /// Validate and copy a credential pair.  `None` if either part is
    /// unusable.
    pub fn new(ssid: &str, password: &str) -> Option<Self> {
        if !valid_ssid(ssid) || !valid_password(password) {
            return None;
        }
        let mut creds = Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
        };
        creds.ssid.push_str(ssid).ok()?;
        creds.password.push_str(password).ok()?;
        Some(creds)
    }

    /// The pair compiled into the firmware, if any.
    pub fn from_build_env() -> Option<Self> {
        Self::new(WIFI_SSID?, WIFI_PASS.unwrap_or(""))
    }
}

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn valid_ssid(ssid: &str) -> bool {
    !ssid.is_empty() && ssid.len() <= 32 && is_printable_ascii(ssid)
}

/// Empty means an open network; WPA2 needs 8–64 bytes.
fn valid_password(password: &str) -> bool {
    password.is_empty() || (8..=64).contains(&password.len())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    credentials: Option<Credentials>,
    attempts: u32,
    #[cfg(target_os = "espidf")]
    wifi: esp_idf_svc::wifi::EspWifi<'static>,
    #[cfg(target_os = "espidf")]
    started: bool,
}

#[cfg(target_os = "espidf")]
impl WifiAdapter {
    pub fn new(
        wifi: esp_idf_svc::wifi::EspWifi<'static>,
        credentials: Option<Credentials>,
    ) -> Self {
        if credentials.is_none() {
            warn!("WiFi: no usable credentials, network stays down");
        }
        Self {
            credentials,
            attempts: 0,
            wifi,
            started: false,
        }
    }

    fn platform_connect(&mut self) -> Result<(), CommsError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let creds = self.credentials.as_ref().ok_or(CommsError::WifiConnectFailed)?;
        if !self.started {
            let client = ClientConfiguration {
                ssid: creds
                    .ssid
                    .as_str()
                    .try_into()
                    .map_err(|_| CommsError::WifiConnectFailed)?,
                password: creds
                    .password
                    .as_str()
                    .try_into()
                    .map_err(|_| CommsError::WifiConnectFailed)?,
                auth_method: if creds.password.is_empty() {
                    AuthMethod::None
                } else {
                    AuthMethod::WPA2Personal
                },
                ..Default::default()
            };
            self.wifi
                .set_configuration(&Configuration::Client(client))
                .map_err(|_| CommsError::WifiConnectFailed)?;
            self.wifi.start().map_err(|_| CommsError::WifiConnectFailed)?;
            self.started = true;
        }
        self.wifi.connect().map_err(|_| CommsError::WifiConnectFailed)
    }

    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }
}

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    pub fn new(credentials: Option<Credentials>) -> Self {
        if credentials.is_none() {
            warn!("WiFi(sim): no usable credentials, network stays down");
        }
        Self {
            credentials,
            attempts: 0,
        }
    }

    fn platform_connect(&mut self) -> Result<(), CommsError> {
        if self.credentials.is_none() || !sim::available() {
            return Err(CommsError::WifiConnectFailed);
        }
        sim::set_associated(true);
        Ok(())
    }

    fn platform_is_connected(&self) -> bool {
        sim::available() && sim::associated()
    }
}

impl WifiAdapter {
    /// Connection attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

// ───────────────────────────────────────────────────────────────
// LinkPort
// ───────────────────────────────────────────────────────────────

impl LinkPort for WifiAdapter {
    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }

    fn connect(&mut self) -> Result<(), CommsError> {
        self.attempts = self.attempts.wrapping_add(1);
        match &self.credentials {
            Some(c) => info!("WiFi: connecting to '{}' (attempt {})", c.ssid, self.attempts),
            None => return Err(CommsError::WifiConnectFailed),
        }
        self.platform_connect()
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicBool, Ordering};

    static AVAILABLE: AtomicBool = AtomicBool::new(true);
    static ASSOCIATED: AtomicBool = AtomicBool::new(false);

    /// Whether the simulated access point is reachable.  Taking it away
    /// drops any association.
    pub fn sim_set_available(up: bool) {
        AVAILABLE.store(up, Ordering::Relaxed);
        if !up {
            ASSOCIATED.store(false, Ordering::Relaxed);
        }
    }

    pub(super) fn available() -> bool {
        AVAILABLE.load(Ordering::Relaxed)
    }

    pub(super) fn associated() -> bool {
        ASSOCIATED.load(Ordering::Relaxed)
    }

    pub(super) fn set_associated(up: bool) {
        ASSOCIATED.store(up, Ordering::Relaxed);
    }
}

#[cfg(not(target_os = "espidf"))]
pub use sim::sim_set_available;

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
