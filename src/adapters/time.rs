//! ESP32 time adapter.
//!
//! Provides the monotonic clock the control loop and the ranger run on.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic).
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` anchored
//!   at first use, for host-side testing and simulation.

use crate::time::Millis;

/// Microseconds since boot (monotonic).
#[cfg(target_os = "espidf")]
pub fn uptime_us() -> u64 {
    (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
}

/// Microseconds since the first call (monotonic).
#[cfg(not(target_os = "espidf"))]
pub fn uptime_us() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_micros() as u64
}

/// Time adapter for the ESP32 platform.
#[derive(Debug, Default, Clone, Copy)]
pub struct Esp32TimeAdapter;

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Loop timestamp.  Wraps after ~49.7 days, which `Millis` arithmetic
    /// tolerates.
    pub fn now(&self) -> Millis {
        Millis::new((uptime_us() / 1_000) as u32)
    }

    pub fn uptime_us(&self) -> u64 {
        uptime_us()
    }
}
