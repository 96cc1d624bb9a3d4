//! LED output: frame rendering and the strip driver.

pub mod led_patterns;
pub mod led_strip;
