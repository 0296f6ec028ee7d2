//! Pluggable session authentication.
//!
//! Some firmware revisions gate page reads behind a credentialed exchange.
//! The engine never fabricates credentials; it runs an installed
//! [`AuthStrategy`] at most once per session, the first time a read is
//! requested, and otherwise lets the device's status byte decide. Lighting
//! is never gated.

use crate::engine::EngineCommand;
use crate::registry::RequestKind;
use crate::{PadError, PadResult};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Where the current session stands with the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    /// No attempt yet this session; the first read triggers the hook.
    #[default]
    Unknown,
    /// Hook absent, declined, or failed. Reads still proceed; the device
    /// reports its own verdict per request.
    NotAuthenticated,
    Authenticated,
}

/// Command access handed to an [`AuthStrategy`] while it runs.
///
/// Deliberately narrow: raw request/response only, no lighting and no state
/// access, so a hook can speak whatever exchange its credentials require and
/// nothing else.
pub struct AuthContext {
    cmd_tx: mpsc::Sender<EngineCommand>,
    timeout: Duration,
}

impl AuthContext {
    pub(crate) fn new(cmd_tx: mpsc::Sender<EngineCommand>, timeout: Duration) -> Self {
        Self { cmd_tx, timeout }
    }

    /// Send a command and await its correlated response payload.
    pub async fn request(&self, opcode: u8, args: Vec<u8>) -> PadResult<Vec<u8>> {
        let (waiter, rx) = oneshot::channel();
        self.cmd_tx
            .send(EngineCommand::RawRequest {
                opcode,
                args,
                kind: RequestKind::Generic,
                timeout: self.timeout,
                waiter,
            })
            .await
            .map_err(|_| PadError::NotConnected)?;
        rx.await.map_err(|_| PadError::NotConnected)?
    }
}

/// A credentialed handshake implementation.
///
/// Returns `Ok(true)` when the session is authenticated, `Ok(false)` when
/// the device declined. Errors are logged and treated as not authenticated.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    async fn authenticate(&self, pad: &AuthContext) -> PadResult<bool>;
}
