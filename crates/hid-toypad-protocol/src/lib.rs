//! Wire protocol for the 0x0E6F:0x0241 NFC toy pad.
//!
//! The pad is end-of-life consumer hardware speaking a small opaque binary
//! protocol over 32-byte HID reports. This crate is intentionally I/O-free:
//! pure functions and types that can be tested and fuzzed without hardware
//! or OS-level HID plumbing. Session management, request correlation, and
//! timeouts live in `toypad-engine`.
//!
//! ## Protocol notes
//!
//! Host commands and device responses share a `0x55` preamble; tag
//! insert/remove notifications use `0x56`. Commands carry a one-byte rolling
//! message tag for correlation and a mod-256 byte-sum checksum.
//!
//! Observed firmwares disagree on what the response length byte covers, so
//! [`parse_frame`] tries both conventions and validates by checksum (see
//! [`frame`]). Some firmwares additionally emit wrong checksums; those frames
//! decode best-effort with `checksum_ok = false` rather than being dropped
//! here. Policy belongs to the caller.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]

pub mod frame;
pub mod ids;
pub mod keys;
pub mod lighting;
pub mod tag;

pub use frame::{Frame, Response, build_command, checksum, parse_frame};
pub use ids::{
    INIT_PAYLOAD, INIT_REPORT, REPORT_LEN, TOYPAD_PRODUCT_ID, TOYPAD_VENDOR_ID, is_toypad_device,
    opcodes,
};
pub use keys::{KEY_PRE, KEY_POST, derive_key_a};
pub use lighting::{
    ColorRgb, FadeParams, FlashParams, build_color, build_fade, build_fade_all, build_flash,
    build_flash_all,
};
pub use tag::{TagAction, TagEvent, Uid, Zone};

use thiserror::Error;

/// Errors returned by toy pad protocol operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Command payload too long: {actual} bytes (max {max})")]
    PayloadTooLong { actual: usize, max: usize },

    #[error("Zone {0:?} is not valid for this operation")]
    InvalidZone(Zone),

    #[error("UID must be 14 lowercase hex chars starting with 04, got {0:?}")]
    InvalidUid(String),

    #[error("Sector out of range: {0} (valid 0..=4)")]
    InvalidSector(u8),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
