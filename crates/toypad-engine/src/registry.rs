//! Pending-request registry keyed by the rolling message tag.
//!
//! Commands carry a one-byte tag; the device echoes it in responses, which
//! arrive in device order rather than request order. The registry owns every
//! in-flight waiter from registration through resolution, timeout, or drain.
//!
//! The counter wraps freely. With only a handful of reads ever outstanding a
//! collision means the older entry is long dead, so it is pre-empted with a
//! timeout rather than masked around.

use crate::{PadError, PadResult};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Default deadline for an awaited response.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(800);

/// What the pending request was for; carried for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Generic,
    ReadPages,
}

struct PendingRequest {
    kind: RequestKind,
    waiter: oneshot::Sender<PadResult<Vec<u8>>>,
    deadline: Instant,
    timeout: Duration,
}

/// Correlation table between outgoing message tags and waiting callers.
pub struct MessageRegistry {
    next_msg: u8,
    pending: HashMap<u8, PendingRequest>,
}

impl MessageRegistry {
    pub fn new() -> Self {
        Self {
            next_msg: 0x01,
            pending: HashMap::new(),
        }
    }

    /// Roll the counter and return the tag to stamp into the next command.
    ///
    /// Used alone for fire-and-forget commands (lighting, INIT), which never
    /// register a waiter.
    pub fn next_tag(&mut self) -> u8 {
        let msg = self.next_msg;
        self.next_msg = self.next_msg.wrapping_add(1);
        msg
    }

    /// Register a waiter for `msg`. A colliding older entry is pre-empted
    /// with a timeout failure, keeping memory bounded.
    pub fn register(
        &mut self,
        msg: u8,
        kind: RequestKind,
        timeout: Duration,
        now: Instant,
        waiter: oneshot::Sender<PadResult<Vec<u8>>>,
    ) {
        let entry = PendingRequest {
            kind,
            waiter,
            deadline: now + timeout,
            timeout,
        };
        if let Some(stale) = self.pending.insert(msg, entry) {
            debug!(msg, kind = ?stale.kind, "message tag reused; pre-empting stale waiter");
            let _ = stale.waiter.send(Err(timeout_error(stale.timeout)));
        }
    }

    /// Roll the counter and register in one step.
    pub fn allocate(
        &mut self,
        kind: RequestKind,
        timeout: Duration,
        now: Instant,
    ) -> (u8, oneshot::Receiver<PadResult<Vec<u8>>>) {
        let msg = self.next_tag();
        let (tx, rx) = oneshot::channel();
        self.register(msg, kind, timeout, now, tx);
        (msg, rx)
    }

    /// Deliver a response payload to the waiter for `msg`, if any.
    ///
    /// Returns `false` when no waiter was registered: lighting acks and
    /// post-timeout stragglers land here and are dropped.
    pub fn resolve(&mut self, msg: u8, payload: Vec<u8>) -> bool {
        match self.pending.remove(&msg) {
            Some(entry) => {
                trace!(msg, kind = ?entry.kind, len = payload.len(), "response matched");
                let _ = entry.waiter.send(Ok(payload));
                true
            }
            None => false,
        }
    }

    /// Fail every entry whose deadline has passed, and discard entries whose
    /// caller has gone away (a cancelled waiter frees its tag here, so a late
    /// response resolves nothing).
    pub fn sweep(&mut self, now: Instant) {
        let expired: Vec<u8> = self
            .pending
            .iter()
            .filter(|(_, entry)| entry.waiter.is_closed() || entry.deadline <= now)
            .map(|(msg, _)| *msg)
            .collect();
        for msg in expired {
            if let Some(entry) = self.pending.remove(&msg) {
                if entry.waiter.is_closed() {
                    trace!(msg, "waiter cancelled; slot freed");
                } else {
                    debug!(msg, kind = ?entry.kind, "request timed out");
                    let _ = entry.waiter.send(Err(timeout_error(entry.timeout)));
                }
            }
        }
    }

    /// Fail everything with `NotConnected`. Used on detach.
    pub fn drain(&mut self) {
        for (_, entry) in self.pending.drain() {
            let _ = entry.waiter.send(Err(PadError::NotConnected));
        }
    }

    /// Drain and rewind the counter. Used on (re)attach.
    pub fn reset(&mut self) {
        self.drain();
        self.next_msg = 0x01;
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl Default for MessageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn timeout_error(timeout: Duration) -> PadError {
    PadError::Timeout {
        timeout_ms: timeout.as_millis() as u64,
    }
}
