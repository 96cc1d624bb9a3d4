//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements              | Connects to               |
//! |-------------|-------------------------|---------------------------|
//! | `hardware`  | RangingPort, PixelSink  | HC-SR04 ranger, LED strip |
//! | `http`      | (inbound)               | ESP-IDF HTTP server       |
//! | `log_sink`  | EventSink               | Serial log output         |
//! | `mqtt`      | TelemetryPort           | ESP-IDF MQTT client       |
//! | `time`      | (clock)                 | ESP32 system timer        |
//! | `wifi`      | LinkPort                | ESP-IDF WiFi STA          |

pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod mqtt;
pub mod time;
pub mod wifi;
