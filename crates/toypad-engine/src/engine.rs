//! Engine dispatcher and public handle.
//!
//! All session state lives on one dispatcher task; the public [`ToyPadEngine`]
//! handle is a thin command channel into it, so concurrent callers never
//! contend on a lock and HID writes go out in call order. Input reports,
//! caller commands, and the timeout sweep are multiplexed in a single
//! `select` loop.

use crate::auth::{AuthContext, AuthStrategy};
use crate::lighting::LightRequest;
use crate::ports::HidTransport;
use crate::reader::{self, PAGE_DATA_LEN};
use crate::registry::{DEFAULT_TIMEOUT, RequestKind};
use crate::session::{QueuedRead, SessionController};
use crate::tracker::{PadZones, TagNotice, TagTracker};
use crate::{PadError, PadResult};
use hid_toypad_protocol::{ColorRgb, FadeParams, FlashParams, REPORT_LEN, Zone};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Default deadline for awaited responses.
    pub read_timeout: Duration,
    /// Cadence of the background timeout sweep. Sweeps also run on every
    /// inbound frame, so this only bounds latency on a silent wire.
    pub sweep_interval: Duration,
    /// Capacity of the tag-event broadcast channel.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_TIMEOUT,
            sweep_interval: Duration::from_millis(100),
            event_capacity: 64,
        }
    }
}

/// Commands sent from public handles (and spawned auth tasks) to the
/// dispatcher.
pub(crate) enum EngineCommand {
    Start {
        response: oneshot::Sender<PadResult<()>>,
    },
    Stop {
        response: oneshot::Sender<()>,
    },
    Light {
        request: LightRequest,
        response: oneshot::Sender<PadResult<()>>,
    },
    ReadPages {
        zone: Zone,
        start_page: u8,
        /// `None` means the configured default deadline.
        timeout: Option<Duration>,
        waiter: oneshot::Sender<PadResult<Vec<u8>>>,
    },
    RawRequest {
        opcode: u8,
        args: Vec<u8>,
        kind: RequestKind,
        timeout: Duration,
        waiter: oneshot::Sender<PadResult<Vec<u8>>>,
    },
    SetAuthStrategy {
        strategy: Arc<dyn AuthStrategy>,
        response: oneshot::Sender<()>,
    },
    AuthFinished {
        session_id: u64,
        authenticated: bool,
    },
}

/// Handle to a running toy pad engine.
///
/// Cheap to clone; every clone talks to the same dispatcher task. The
/// dispatcher shuts down (detaching any attached pad) when the last handle
/// is dropped. Construction spawns onto the current tokio runtime.
#[derive(Clone)]
pub struct ToyPadEngine {
    cmd_tx: mpsc::Sender<EngineCommand>,
    connected_rx: watch::Receiver<bool>,
    zones_rx: watch::Receiver<PadZones>,
    events_tx: broadcast::Sender<TagNotice>,
}

impl ToyPadEngine {
    pub fn new(transport: Arc<dyn HidTransport>) -> Self {
        Self::with_config(transport, EngineConfig::default())
    }

    pub fn with_config(transport: Arc<dyn HidTransport>, config: EngineConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (connected_tx, connected_rx) = watch::channel(false);

        let tracker = TagTracker::new(config.event_capacity);
        let events_tx = tracker.events_sender();
        let zones_rx = tracker.watch_zones();

        let dispatcher = Dispatcher {
            session: SessionController::new(transport, tracker, connected_tx),
            cmd_rx,
            cmd_tx: cmd_tx.downgrade(),
            input_rx: None,
            auth_strategy: None,
            config,
        };
        tokio::spawn(dispatcher.run());

        Self {
            cmd_tx,
            connected_rx,
            zones_rx,
            events_tx,
        }
    }

    /// Attach to a pad and bring the session up. Idempotent: a second call
    /// while connected is a no-op. Fails with `NotConnected` when no pad is
    /// present; the engine does not retry on its own.
    pub async fn start(&self) -> PadResult<()> {
        let (response, rx) = oneshot::channel();
        self.send(EngineCommand::Start { response }).await?;
        rx.await.map_err(|_| PadError::NotConnected)?
    }

    /// Detach and reset. Idempotent.
    pub async fn stop(&self) {
        let (response, rx) = oneshot::channel();
        if self.send(EngineCommand::Stop { response }).await.is_ok() {
            let _ = rx.await;
        }
    }

    /// Latest connection flag; `changed()` on the receiver observes
    /// transitions.
    pub fn connected(&self) -> watch::Receiver<bool> {
        self.connected_rx.clone()
    }

    pub fn is_connected(&self) -> bool {
        *self.connected_rx.borrow()
    }

    /// Zone snapshots, republished on every change and on attach/detach.
    pub fn zones(&self) -> watch::Receiver<PadZones> {
        self.zones_rx.clone()
    }

    /// Deduplicated tag insert/remove stream, in device order.
    pub fn tag_events(&self) -> broadcast::Receiver<TagNotice> {
        self.events_tx.subscribe()
    }

    pub async fn set_color(&self, zone: Zone, color: ColorRgb) -> PadResult<()> {
        self.light(LightRequest::Color { zone, color }).await
    }

    /// Turn every zone off.
    pub async fn lights_off(&self) -> PadResult<()> {
        self.light(LightRequest::lights_off()).await
    }

    pub async fn fade(&self, zone: Zone, params: FadeParams) -> PadResult<()> {
        self.light(LightRequest::Fade { zone, params }).await
    }

    /// Fade center, left, and right with independent parameters.
    pub async fn fade_all(&self, blocks: [FadeParams; 3]) -> PadResult<()> {
        self.light(LightRequest::FadeAll { blocks }).await
    }

    pub async fn flash(&self, zone: Zone, params: FlashParams) -> PadResult<()> {
        self.light(LightRequest::Flash { zone, params }).await
    }

    /// Flash center, left, and right with independent parameters.
    pub async fn flash_all(&self, blocks: [FlashParams; 3]) -> PadResult<()> {
        self.light(LightRequest::FlashAll { blocks }).await
    }

    /// Read 16 bytes of tag pages from `zone` with the configured timeout.
    pub async fn read_pages(&self, zone: Zone, start_page: u8) -> PadResult<[u8; PAGE_DATA_LEN]> {
        self.read_pages_inner(zone, start_page, None).await
    }

    /// Read with an explicit per-call deadline.
    pub async fn read_pages_with_timeout(
        &self,
        zone: Zone,
        start_page: u8,
        timeout: Duration,
    ) -> PadResult<[u8; PAGE_DATA_LEN]> {
        self.read_pages_inner(zone, start_page, Some(timeout)).await
    }

    /// Install the authentication hook used for this and future sessions.
    pub async fn set_auth_strategy(&self, strategy: Arc<dyn AuthStrategy>) -> PadResult<()> {
        let (response, rx) = oneshot::channel();
        self.send(EngineCommand::SetAuthStrategy { strategy, response })
            .await?;
        rx.await.map_err(|_| PadError::NotConnected)
    }

    async fn read_pages_inner(
        &self,
        zone: Zone,
        start_page: u8,
        timeout: Option<Duration>,
    ) -> PadResult<[u8; PAGE_DATA_LEN]> {
        let (waiter, rx) = oneshot::channel();
        self.send(EngineCommand::ReadPages {
            zone,
            start_page,
            timeout,
            waiter,
        })
        .await?;
        let payload = rx.await.map_err(|_| PadError::NotConnected)??;
        reader::decode_read_payload(&payload)
    }

    async fn light(&self, request: LightRequest) -> PadResult<()> {
        let (response, rx) = oneshot::channel();
        self.send(EngineCommand::Light { request, response }).await?;
        rx.await.map_err(|_| PadError::NotConnected)?
    }

    async fn send(&self, command: EngineCommand) -> PadResult<()> {
        self.cmd_tx
            .send(command)
            .await
            .map_err(|_| PadError::NotConnected)
    }
}

struct Dispatcher {
    session: SessionController,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    /// Weak so the dispatcher's own channel never keeps itself alive; only
    /// spawned auth tasks hold upgraded clones.
    cmd_tx: mpsc::WeakSender<EngineCommand>,
    input_rx: Option<mpsc::Receiver<[u8; REPORT_LEN]>>,
    auth_strategy: Option<Arc<dyn AuthStrategy>>,
    config: EngineConfig,
}

impl Dispatcher {
    async fn run(mut self) {
        let mut sweep = tokio::time::interval(self.config.sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = self.cmd_rx.recv() => {
                    match command {
                        Some(command) => self.handle_command(command).await,
                        // Last handle dropped; shut down.
                        None => break,
                    }
                }
                report = Self::next_report(&mut self.input_rx) => {
                    match report {
                        Some(report) => self.session.handle_report(report),
                        None => {
                            self.input_rx = None;
                            self.session.detach("device removed");
                        }
                    }
                }
                _ = sweep.tick() => self.session.sweep_now(),
            }
        }

        self.input_rx = None;
        self.session.detach("engine dropped");
        debug!("dispatcher exited");
    }

    /// Resolves to the next input report, or never while detached.
    async fn next_report(
        input_rx: &mut Option<mpsc::Receiver<[u8; REPORT_LEN]>>,
    ) -> Option<[u8; REPORT_LEN]> {
        match input_rx {
            Some(rx) => rx.recv().await,
            None => std::future::pending().await,
        }
    }

    async fn handle_command(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Start { response } => {
                let result = if self.session.is_connected() {
                    Ok(())
                } else {
                    match self.session.attach().await {
                        Ok(reports) => {
                            self.input_rx = Some(reports);
                            Ok(())
                        }
                        Err(error) => Err(error),
                    }
                };
                let _ = response.send(result);
            }
            EngineCommand::Stop { response } => {
                self.input_rx = None;
                self.session.detach("stop requested");
                let _ = response.send(());
            }
            EngineCommand::Light { request, response } => {
                let _ = response.send(self.session.send_light(&request));
            }
            EngineCommand::ReadPages {
                zone,
                start_page,
                timeout,
                waiter,
            } => {
                let start_auth = self.session.request_read(QueuedRead {
                    zone,
                    start_page,
                    timeout: timeout.unwrap_or(self.config.read_timeout),
                    waiter,
                });
                if start_auth {
                    self.start_auth();
                }
            }
            EngineCommand::RawRequest {
                opcode,
                args,
                kind,
                timeout,
                waiter,
            } => {
                self.session
                    .issue_request(opcode, &args, kind, timeout, waiter);
            }
            EngineCommand::SetAuthStrategy { strategy, response } => {
                self.auth_strategy = Some(strategy);
                let _ = response.send(());
            }
            EngineCommand::AuthFinished {
                session_id,
                authenticated,
            } => {
                // A hook racing a reattach reports for a dead session; the
                // fresh session starts over at `Unknown`.
                if session_id == self.session.session_id() {
                    self.session.finish_auth(authenticated);
                } else {
                    debug!(session_id, "stale auth completion ignored");
                }
            }
        }
    }

    /// Run the installed hook once for this session, or settle immediately
    /// when none is installed.
    fn start_auth(&mut self) {
        let (Some(strategy), Some(cmd_tx)) = (&self.auth_strategy, self.cmd_tx.upgrade()) else {
            debug!("no auth strategy installed; reads proceed unauthenticated");
            self.session.finish_auth(false);
            return;
        };

        self.session.begin_auth();
        let strategy = Arc::clone(strategy);
        let session_id = self.session.session_id();
        let context = AuthContext::new(cmd_tx.clone(), self.config.read_timeout);
        tokio::spawn(async move {
            let authenticated = match strategy.authenticate(&context).await {
                Ok(authenticated) => authenticated,
                Err(error) => {
                    warn!(%error, "auth strategy failed");
                    false
                }
            };
            let _ = cmd_tx
                .send(EngineCommand::AuthFinished {
                    session_id,
                    authenticated,
                })
                .await;
        });
    }
}
