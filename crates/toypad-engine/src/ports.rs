//! Port traits for the injected HID transport.
//!
//! The engine never talks to the OS HID stack directly; it consumes these
//! traits. Platform backends (hidraw, IOKit, hidapi wrappers) live
//! out-of-tree, and the [`mock`] module provides a scriptable in-memory pad
//! for tests.
//!
//! Input reports may originate on a platform-owned reader thread. The
//! contract hands them to the engine through an `mpsc` channel so all state
//! mutation stays on the engine's dispatcher task; device removal surfaces
//! as that channel closing.

use crate::{PadError, PadResult};
use async_trait::async_trait;
use hid_toypad_protocol::{REPORT_LEN, is_toypad_device};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Identity of an enumerated HID device.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HidDeviceInfo {
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial_number: Option<String>,
    pub path: String,
}

impl HidDeviceInfo {
    pub fn new(vendor_id: u16, product_id: u16, path: impl Into<String>) -> Self {
        Self {
            vendor_id,
            product_id,
            serial_number: None,
            path: path.into(),
        }
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }

    /// `true` when this device is a toy pad.
    pub fn is_toypad(&self) -> bool {
        is_toypad_device(self.vendor_id, self.product_id)
    }
}

/// An open HID device.
pub trait HidDeviceHandle: Send {
    /// Send one 32-byte output report. Writes are atomic at the HID layer;
    /// the engine serializes callers above this boundary.
    fn write_report(&mut self, report: &[u8; REPORT_LEN]) -> PadResult<()>;

    /// Take the input-report stream. Yields each 32-byte report the device
    /// emits; the channel closing signals device removal. May only be taken
    /// once per open handle.
    fn take_input_reports(&mut self) -> PadResult<mpsc::Receiver<[u8; REPORT_LEN]>>;

    fn is_connected(&self) -> bool;

    fn close(&mut self);
}

/// Device enumeration and opening.
#[async_trait]
pub trait HidTransport: Send + Sync {
    /// List candidate devices. Implementations may pre-filter by VID/PID;
    /// the engine filters again with [`HidDeviceInfo::is_toypad`].
    async fn list_devices(&self) -> PadResult<Vec<HidDeviceInfo>>;

    /// Open a device for exclusive use by the engine.
    async fn open(&self, info: &HidDeviceInfo) -> PadResult<Box<dyn HidDeviceHandle>>;
}

pub mod mock {
    //! Scriptable in-memory toy pad for tests.

    use super::*;
    use hid_toypad_protocol::{TOYPAD_PRODUCT_ID, TOYPAD_VENDOR_ID};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;

    const INPUT_CHANNEL_CAPACITY: usize = 64;

    struct MockPadShared {
        write_history: Mutex<Vec<[u8; REPORT_LEN]>>,
        write_notify: Notify,
        /// Reports injected before the engine subscribed; flushed on take.
        backlog: Mutex<VecDeque<[u8; REPORT_LEN]>>,
        input_tx: Mutex<Option<mpsc::Sender<[u8; REPORT_LEN]>>>,
        connected: Mutex<bool>,
    }

    /// Test-side controller for one simulated pad. Clones share state, so a
    /// test can keep one while the transport hands another to the engine.
    #[derive(Clone)]
    pub struct MockToyPad {
        info: HidDeviceInfo,
        shared: Arc<MockPadShared>,
    }

    impl MockToyPad {
        pub fn new() -> Self {
            Self::with_info(HidDeviceInfo::new(
                TOYPAD_VENDOR_ID,
                TOYPAD_PRODUCT_ID,
                "mock://toypad0",
            ))
        }

        pub fn with_info(info: HidDeviceInfo) -> Self {
            Self {
                info,
                shared: Arc::new(MockPadShared {
                    write_history: Mutex::new(Vec::new()),
                    write_notify: Notify::new(),
                    backlog: Mutex::new(VecDeque::new()),
                    input_tx: Mutex::new(None),
                    connected: Mutex::new(true),
                }),
            }
        }

        pub fn info(&self) -> &HidDeviceInfo {
            &self.info
        }

        /// Deliver one input report to the engine, as the device would.
        pub fn inject_report(&self, report: [u8; REPORT_LEN]) {
            let tx = self.shared.input_tx.lock().unwrap_or_else(|e| e.into_inner());
            match tx.as_ref() {
                Some(tx) => {
                    // A full channel means the engine stopped draining; tests
                    // treat that as a lost report, like real hardware would.
                    let _ = tx.try_send(report);
                }
                None => {
                    let mut backlog = self.shared.backlog.lock().unwrap_or_else(|e| e.into_inner());
                    backlog.push_back(report);
                }
            }
        }

        /// Every report the engine has written, oldest first.
        pub fn write_history(&self) -> Vec<[u8; REPORT_LEN]> {
            self.shared
                .write_history
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }

        /// Wait until at least `count` reports have been written.
        pub async fn wait_for_write_count(&self, count: usize) {
            loop {
                let notified = self.shared.write_notify.notified();
                if self.write_history().len() >= count {
                    return;
                }
                notified.await;
            }
        }

        /// Simulate yanking the USB cable: further writes fail and the
        /// input-report channel closes.
        pub fn unplug(&self) {
            {
                let mut connected = self.shared.connected.lock().unwrap_or_else(|e| e.into_inner());
                *connected = false;
            }
            let mut tx = self.shared.input_tx.lock().unwrap_or_else(|e| e.into_inner());
            tx.take();
        }

        /// Undo [`unplug`](Self::unplug) so a later attach finds the pad
        /// again.
        pub fn replug(&self) {
            let mut connected = self.shared.connected.lock().unwrap_or_else(|e| e.into_inner());
            *connected = true;
        }

        pub fn is_plugged(&self) -> bool {
            *self.shared.connected.lock().unwrap_or_else(|e| e.into_inner())
        }
    }

    impl Default for MockToyPad {
        fn default() -> Self {
            Self::new()
        }
    }

    impl HidDeviceHandle for MockToyPad {
        fn write_report(&mut self, report: &[u8; REPORT_LEN]) -> PadResult<()> {
            if !self.is_plugged() {
                return Err(PadError::NotConnected);
            }
            self.shared
                .write_history
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(*report);
            self.shared.write_notify.notify_waiters();
            Ok(())
        }

        fn take_input_reports(&mut self) -> PadResult<mpsc::Receiver<[u8; REPORT_LEN]>> {
            if !self.is_plugged() {
                return Err(PadError::NotConnected);
            }
            let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
            // Flush pre-subscription injections first, without holding both
            // locks at once.
            let pending: Vec<[u8; REPORT_LEN]> = {
                let mut backlog = self.shared.backlog.lock().unwrap_or_else(|e| e.into_inner());
                backlog.drain(..).collect()
            };
            for report in pending {
                let _ = tx.try_send(report);
            }
            let mut slot = self.shared.input_tx.lock().unwrap_or_else(|e| e.into_inner());
            *slot = Some(tx);
            Ok(rx)
        }

        fn is_connected(&self) -> bool {
            self.is_plugged()
        }

        fn close(&mut self) {
            let mut tx = self.shared.input_tx.lock().unwrap_or_else(|e| e.into_inner());
            tx.take();
        }
    }

    /// Transport serving a fixed set of mock pads.
    #[derive(Default)]
    pub struct MockTransport {
        pads: Vec<MockToyPad>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_pad(pad: MockToyPad) -> Self {
            Self { pads: vec![pad] }
        }

        pub fn add_pad(&mut self, pad: MockToyPad) {
            self.pads.push(pad);
        }
    }

    #[async_trait]
    impl HidTransport for MockTransport {
        async fn list_devices(&self) -> PadResult<Vec<HidDeviceInfo>> {
            Ok(self
                .pads
                .iter()
                .filter(|pad| pad.is_plugged())
                .map(|pad| pad.info().clone())
                .collect())
        }

        async fn open(&self, info: &HidDeviceInfo) -> PadResult<Box<dyn HidDeviceHandle>> {
            for pad in &self.pads {
                if pad.info().path == info.path {
                    return Ok(Box::new(pad.clone()));
                }
            }
            Err(PadError::Transport(format!(
                "no such mock device: {}",
                info.path
            )))
        }
    }
}
