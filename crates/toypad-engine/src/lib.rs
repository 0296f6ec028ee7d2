//! Async session engine for the NFC toy pad.
//!
//! Drives one 0x0E6F:0x0241 pad over an injected HID transport: wakes it
//! with INIT, correlates command responses by rolling message tag, latches
//! per-zone tag presence, and exposes lighting and page reads to concurrent
//! callers without a global lock.
//!
//! ## Architecture
//!
//! A single dispatcher task owns every piece of mutable state (pending
//! registry, tag tracker, session). Public [`ToyPadEngine`] handles send
//! commands over a channel; input reports from the transport's reader thread
//! arrive over another. Observers get a `watch` of the connection flag and
//! zone snapshots plus a `broadcast` of deduplicated tag events. Snapshots
//! arrive in causal order, and a zone publication never backtracks.
//!
//! The wire format itself lives in `hid-toypad-protocol`; this crate adds
//! the state machines around it.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(static_mut_refs)]

pub mod auth;
pub mod engine;
pub mod error;
pub mod lighting;
pub mod ports;
pub mod reader;
pub mod registry;
mod session;
pub mod tracker;

pub use auth::{AuthContext, AuthState, AuthStrategy};
pub use engine::{EngineConfig, ToyPadEngine};
pub use error::{PadError, PadResult};
pub use lighting::LightRequest;
pub use ports::{HidDeviceHandle, HidDeviceInfo, HidTransport};
pub use reader::PAGE_DATA_LEN;
pub use registry::{DEFAULT_TIMEOUT, MessageRegistry, RequestKind};
pub use tracker::{PadZones, TagNotice, TagTracker, ZoneState};

// Wire-level types re-exported so callers don't need a direct
// `hid-toypad-protocol` dependency for everyday use.
pub use hid_toypad_protocol::{ColorRgb, FadeParams, FlashParams, TagAction, Uid, Zone};
