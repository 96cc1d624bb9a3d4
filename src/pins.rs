//! GPIO / peripheral pin assignments for the portal controller board.
//!
//! Single source of truth. Every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Addressable LED strip (WS2815, WS2812B protocol)
// ---------------------------------------------------------------------------

/// Strip data line.  Driven as SPI MOSI so `ws2812-spi` can encode the
/// bit stream.
pub const LED_DATA_GPIO: i32 = 5;

/// SPI clock for the WS2812 encoder.  Must sit in the 2–3.8 MHz window.
pub const LED_SPI_HZ: u32 = 3_000_000;

// ---------------------------------------------------------------------------
// HC-SR04 ultrasonic ranger
// ---------------------------------------------------------------------------

/// Digital output: 10 µs HIGH pulse starts a measurement.
pub const ULTRASONIC_TRIG_GPIO: i32 = 18;
/// Digital input: HIGH for the duration of the echo round trip.
pub const ULTRASONIC_ECHO_GPIO: i32 = 19;
