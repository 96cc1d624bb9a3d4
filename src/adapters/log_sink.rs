//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing portal events to the serial logger
//! (UART / USB-CDC in production, stderr under host tests).

use log::info;

use crate::app::events::PortalEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`PortalEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &PortalEvent) {
        match *event {
            PortalEvent::Started(mode) => {
                info!("START | mode={:?} code={}", mode, mode.code());
            }
            PortalEvent::ModeChanged { from, to, auto } => {
                info!(
                    "MODE | {:?} -> {:?}{}",
                    from,
                    to,
                    if auto { " (auto)" } else { "" }
                );
            }
            PortalEvent::WarmupComplete => {
                info!("SENSOR | warmup complete, passage detection armed");
            }
            PortalEvent::PassageStarted { distance_cm } => {
                info!("PASSAGE | started at {:.1} cm", distance_cm);
            }
            PortalEvent::PassageEnded { duration_ms } => {
                info!("PASSAGE | ended after {} ms", duration_ms);
            }
        }
    }
}
