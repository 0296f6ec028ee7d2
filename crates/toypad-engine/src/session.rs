//! Session state: one attached pad, its registry, tracker, and auth status.
//!
//! Owned exclusively by the engine's dispatcher task, so nothing here locks.
//! Attach is always a full reset (message counter back to `0x01`, registry
//! and zones cleared, auth back to `Unknown`), which makes reattach after a
//! cable yank indistinguishable from a first attach.

use crate::auth::AuthState;
use crate::lighting::LightRequest;
use crate::ports::{HidDeviceHandle, HidTransport};
use crate::reader;
use crate::registry::{MessageRegistry, RequestKind};
use crate::tracker::TagTracker;
use crate::{PadError, PadResult};
use hid_toypad_protocol::{Frame, INIT_PAYLOAD, REPORT_LEN, Zone, build_command, opcodes, parse_frame};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// A read that arrived while authentication was still unresolved.
pub(crate) struct QueuedRead {
    pub zone: Zone,
    pub start_page: u8,
    pub timeout: Duration,
    pub waiter: oneshot::Sender<PadResult<Vec<u8>>>,
}

pub(crate) struct SessionController {
    transport: Arc<dyn HidTransport>,
    device: Option<Box<dyn HidDeviceHandle>>,
    registry: MessageRegistry,
    tracker: TagTracker,
    auth_state: AuthState,
    auth_in_flight: bool,
    /// Bumped on every attach so stale auth completions can be recognized.
    session_id: u64,
    queued_reads: Vec<QueuedRead>,
    connected_tx: watch::Sender<bool>,
}

impl SessionController {
    pub fn new(
        transport: Arc<dyn HidTransport>,
        tracker: TagTracker,
        connected_tx: watch::Sender<bool>,
    ) -> Self {
        Self {
            transport,
            device: None,
            registry: MessageRegistry::new(),
            tracker,
            auth_state: AuthState::Unknown,
            auth_in_flight: false,
            session_id: 0,
            queued_reads: Vec::new(),
            connected_tx,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.device.is_some()
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Enumerate, open, reset session state, and wake the pad with INIT.
    ///
    /// Returns the input-report stream for the dispatcher to select on. INIT
    /// consumes the first message tag of the fresh counter; no response is
    /// awaited for it.
    pub async fn attach(&mut self) -> PadResult<mpsc::Receiver<[u8; REPORT_LEN]>> {
        let devices = self.transport.list_devices().await?;
        let Some(info) = devices.into_iter().find(|device| device.is_toypad()) else {
            debug!("no toy pad found during enumeration");
            return Err(PadError::NotConnected);
        };

        let mut device = self.transport.open(&info).await?;
        let reports = device.take_input_reports()?;

        self.registry.reset();
        self.tracker.clear();
        self.auth_state = AuthState::Unknown;
        self.auth_in_flight = false;
        self.session_id += 1;

        let msg = self.registry.next_tag();
        let init = build_command(opcodes::INIT, msg, INIT_PAYLOAD)?;
        device.write_report(&init)?;

        info!(path = %info.path, session = self.session_id, "toy pad attached");
        self.device = Some(device);
        self.publish_connected(true);
        Ok(reports)
    }

    /// Tear the session down: fail every in-flight and queued request with
    /// `NotConnected`, clear zone state, drop the handle.
    pub fn detach(&mut self, reason: &str) {
        if let Some(mut device) = self.device.take() {
            device.close();
            info!(reason, "toy pad detached");
        }
        self.registry.drain();
        for read in self.queued_reads.drain(..) {
            let _ = read.waiter.send(Err(PadError::NotConnected));
        }
        self.tracker.clear();
        self.auth_state = AuthState::Unknown;
        self.auth_in_flight = false;
        self.publish_connected(false);
    }

    /// Dispatch one inbound report. Every inbound frame also drives a sweep
    /// so timeouts fire even under heavy traffic.
    pub fn handle_report(&mut self, report: [u8; REPORT_LEN]) {
        self.registry.sweep(Instant::now());
        match parse_frame(&report) {
            Frame::TagEvent(event) => {
                self.tracker.apply(&event);
            }
            Frame::Response(response) => {
                if !response.checksum_ok {
                    warn!(
                        msg = response.msg,
                        error = %PadError::ChecksumMismatch,
                        "accepting response best-effort",
                    );
                }
                if !self.registry.resolve(response.msg, response.payload) {
                    debug!(msg = response.msg, "unmatched response dropped");
                }
            }
            Frame::Unknown => {
                debug!(preamble = report[0], "unrecognized frame dropped");
            }
        }
    }

    pub fn sweep_now(&mut self) {
        self.registry.sweep(Instant::now());
    }

    /// Fire-and-forget lighting. Consumes a message tag, registers nothing.
    pub fn send_light(&mut self, request: &LightRequest) -> PadResult<()> {
        if self.device.is_none() {
            return Err(PadError::NotConnected);
        }
        let msg = self.registry.next_tag();
        let frame = request.encode(msg)?;
        self.write_report(&frame)
    }

    /// Accept a read request, honoring the auth gate.
    ///
    /// Returns `true` when the caller should start the authentication flow:
    /// the read was queued and no attempt is in flight yet.
    pub fn request_read(&mut self, read: QueuedRead) -> bool {
        if self.device.is_none() {
            let _ = read.waiter.send(Err(PadError::NotConnected));
            return false;
        }
        match self.auth_state {
            AuthState::Authenticated | AuthState::NotAuthenticated => {
                self.issue_read(read);
                false
            }
            AuthState::Unknown => {
                self.queued_reads.push(read);
                !self.auth_in_flight
            }
        }
    }

    pub fn begin_auth(&mut self) {
        self.auth_in_flight = true;
    }

    /// Record the auth outcome and release every queued read.
    pub fn finish_auth(&mut self, authenticated: bool) {
        self.auth_in_flight = false;
        self.auth_state = if authenticated {
            AuthState::Authenticated
        } else {
            AuthState::NotAuthenticated
        };
        debug!(state = ?self.auth_state, "session auth settled");
        for read in std::mem::take(&mut self.queued_reads) {
            self.issue_read(read);
        }
    }

    fn issue_read(&mut self, read: QueuedRead) {
        let msg = self.registry.next_tag();
        let frame = match reader::build_read_command(msg, read.zone, read.start_page) {
            Ok(frame) => frame,
            Err(error) => {
                let _ = read.waiter.send(Err(error));
                return;
            }
        };
        if let Err(error) = self.write_report(&frame) {
            let _ = read.waiter.send(Err(error));
            return;
        }
        self.registry
            .register(msg, RequestKind::ReadPages, read.timeout, Instant::now(), read.waiter);
    }

    /// Generic correlated request, used by auth strategies.
    pub fn issue_request(
        &mut self,
        opcode: u8,
        args: &[u8],
        kind: RequestKind,
        timeout: Duration,
        waiter: oneshot::Sender<PadResult<Vec<u8>>>,
    ) {
        if self.device.is_none() {
            let _ = waiter.send(Err(PadError::NotConnected));
            return;
        }
        let msg = self.registry.next_tag();
        let frame = match build_command(opcode, msg, args) {
            Ok(frame) => frame,
            Err(error) => {
                let _ = waiter.send(Err(error.into()));
                return;
            }
        };
        if let Err(error) = self.write_report(&frame) {
            let _ = waiter.send(Err(error));
            return;
        }
        self.registry.register(msg, kind, timeout, Instant::now(), waiter);
    }

    fn write_report(&mut self, report: &[u8; REPORT_LEN]) -> PadResult<()> {
        let Some(device) = self.device.as_mut() else {
            return Err(PadError::NotConnected);
        };
        if let Err(error) = device.write_report(report) {
            warn!(%error, "output report write failed");
            return Err(error);
        }
        Ok(())
    }

    fn publish_connected(&self, connected: bool) {
        self.connected_tx.send_if_modified(|current| {
            if *current == connected {
                false
            } else {
                *current = connected;
                true
            }
        });
    }
}
