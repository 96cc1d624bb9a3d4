//! Gateway ↔ control loop command queue.
//!
//! Uses `embassy-sync` bounded channels to bridge the HTTP server task
//! with the synchronous control loop.  The server never touches portal
//! state; it enqueues a command and waits (bounded) for the loop to answer.
//!
//! ```text
//! ┌──────────────┐  CommandMsg  ┌──────────────┐
//! │ HTTP handler │────────────▶│ Control Loop │
//! │ (own task)   │◀────────────│ (sync drain) │
//! └──────────────┘  ResponseMsg └──────────────┘
//! ```
//!
//! The ESP-IDF HTTP server runs its handlers one at a time, so at most one
//! caller waits at once.  Responses carry the request id; a response left
//! behind by a caller that already timed out is discarded.
//!
//! Every command carries a deadline.  The loop drops a command whose
//! deadline has passed without applying it, and a waiting handler keeps
//! listening for [`LATE_GRACE`] past the deadline, so a 503 answer means
//! the portal state was not touched.

use core::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::commands::{CommandResponse, PortalCommand};
use crate::error::CommsError;

/// Inbound command, delivered to the control loop.
#[derive(Debug, Clone, Copy)]
pub struct CommandMsg {
    pub request_id: u32,
    pub command: PortalCommand,
    /// Past this instant the command is dropped instead of applied.
    pub deadline: Instant,
}

/// Outbound answer, delivered to the waiting handler.
#[derive(Debug, Clone, Copy)]
pub struct ResponseMsg {
    pub request_id: u32,
    pub response: CommandResponse,
}

/// Channel depth for command (inbound) messages.
const CMD_DEPTH: usize = 8;

/// Channel depth for response (outbound) messages.
const RESP_DEPTH: usize = 8;

/// How often a waiting handler re-checks the response channel.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Default bound on how long a handler waits for the control loop.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Extra wait past a command's deadline for an answer already in flight.
pub const LATE_GRACE: Duration = Duration::from_millis(100);

/// Command/response channel pair.
pub struct CommandQueue {
    commands: Channel<CriticalSectionRawMutex, CommandMsg, CMD_DEPTH>,
    responses: Channel<CriticalSectionRawMutex, ResponseMsg, RESP_DEPTH>,
    next_id: AtomicU32,
}

/// The queue shared by the HTTP server and the control loop.
pub static COMMAND_QUEUE: CommandQueue = CommandQueue::new();

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandQueue {
    pub const fn new() -> Self {
        Self {
            commands: Channel::new(),
            responses: Channel::new(),
            next_id: AtomicU32::new(1),
        }
    }

    // ── Gateway side ──────────────────────────────────────────

    /// Enqueue `command` without blocking.  The loop applies it only
    /// within `ttl` from now.  Returns its request id.
    pub fn submit(&self, command: PortalCommand, ttl: Duration) -> Result<u32, CommsError> {
        let request_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.commands
            .try_send(CommandMsg {
                request_id,
                command,
                deadline: Instant::now() + ttl,
            })
            .map_err(|_| CommsError::QueueFull)?;
        Ok(request_id)
    }

    /// Wait up to `timeout` for the answer to `request_id`.
    pub fn await_response(
        &self,
        request_id: u32,
        timeout: Duration,
    ) -> Result<CommandResponse, CommsError> {
        let deadline = Instant::now() + timeout;
        loop {
            while let Ok(msg) = self.responses.try_receive() {
                if msg.request_id == request_id {
                    return Ok(msg.response);
                }
                warn!("gateway: dropping stale response #{}", msg.request_id);
            }
            if Instant::now() >= deadline {
                return Err(CommsError::CommandTimeout);
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    /// Submit and wait: the whole round trip for one request.  A command
    /// not picked up within `timeout` is never applied.
    pub fn request(
        &self,
        command: PortalCommand,
        timeout: Duration,
    ) -> Result<CommandResponse, CommsError> {
        let id = self.submit(command, timeout)?;
        self.await_response(id, timeout + LATE_GRACE)
    }

    // ── Control loop side ─────────────────────────────────────

    /// Answer every queued command with `handler`, in arrival order.
    /// Expired commands are dropped unanswered.  Returns how many were
    /// processed.
    pub fn drain(&self, mut handler: impl FnMut(PortalCommand) -> CommandResponse) -> usize {
        let mut processed = 0;
        while let Ok(msg) = self.commands.try_receive() {
            if Instant::now() >= msg.deadline {
                warn!(
                    "gateway: {} #{} expired before the loop ran, dropped",
                    msg.command.name(),
                    msg.request_id
                );
                continue;
            }
            let response = handler(msg.command);
            let reply = ResponseMsg {
                request_id: msg.request_id,
                response,
            };
            if self.responses.try_send(reply).is_err() {
                warn!("gateway: response #{} dropped, queue full", msg.request_id);
            }
            processed += 1;
        }
        processed
    }
}
