//! RGB portal firmware library.
//!
//! Exposes the portal logic for integration testing and host simulation.
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod detector;
pub mod error;
pub mod fsm;
pub mod gateway;
pub mod pins;
pub mod scheduler;
pub mod time;

pub mod adapters;
pub mod drivers;
pub mod sensors;
