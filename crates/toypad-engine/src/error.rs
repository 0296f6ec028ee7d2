//! Engine error taxonomy.
//!
//! Frame-level problems are logged and dropped on the inbound path; only
//! request-level failures surface to callers of suspending operations.
//! Nothing is retried here; retry policy belongs to callers.

use hid_toypad_protocol::ProtocolError;
use thiserror::Error;

/// Errors surfaced by engine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PadError {
    /// No toy pad session is attached.
    #[error("No toy pad attached")]
    NotConnected,

    /// No matching response arrived within the deadline.
    #[error("No response within {timeout_ms} ms")]
    Timeout {
        /// The deadline that elapsed, in milliseconds.
        timeout_ms: u64,
    },

    /// Frame structure violated: wrong length, bad preamble, or an
    /// impossibly short payload.
    #[error("Malformed frame: {0}")]
    Malformed(String),

    /// The device reported a non-zero status byte in a response payload.
    #[error("Device reported status {status:#04x}")]
    Device { status: u8 },

    /// Neither response length convention produced a valid checksum.
    /// Logged on the inbound path; the best-effort payload is still routed.
    #[error("Frame failed both checksum conventions")]
    ChecksumMismatch,

    /// Failure in the injected HID transport (open or write).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Wire-level encoding rejection bubbled up from the protocol crate.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl PadError {
    /// Check if retrying the operation might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PadError::Timeout { .. })
    }

    /// Check if this error means the session is gone.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, PadError::NotConnected)
    }
}

pub type PadResult<T> = Result<T, PadError>;
