//! Application core: portal logic behind port traits.
//!
//! The service owns the mode machine, the passage detector and the
//! renderer.  All interaction with hardware and the network happens
//! through the traits in [`ports`], so this layer runs unchanged under
//! host tests.

pub mod commands;
pub mod events;
pub mod ports;
pub mod runtime;
pub mod service;
