//! Per-zone tag presence with insertion/removal deduplication.
//!
//! The pad re-announces seated tags, sometimes several times in a burst.
//! The tracker latches one UID per physical zone and only emits when the
//! latched state actually changes, so consumers see exactly one `Added` per
//! seating and one `Removed` per lift, in device order.

use hid_toypad_protocol::{TagAction, TagEvent, Uid, Zone};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

/// Presence of one physical zone. `present` and `uid` move together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneState {
    pub present: bool,
    pub uid: Option<Uid>,
}

impl ZoneState {
    fn occupied(uid: Uid) -> Self {
        Self {
            present: true,
            uid: Some(uid),
        }
    }

    fn vacant() -> Self {
        Self::default()
    }
}

/// Snapshot of all three physical zones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PadZones {
    pub center: ZoneState,
    pub left: ZoneState,
    pub right: ZoneState,
}

impl PadZones {
    /// State of one physical zone; `None` for the broadcast pseudo-zone.
    pub fn zone(&self, zone: Zone) -> Option<&ZoneState> {
        match zone {
            Zone::Center => Some(&self.center),
            Zone::Left => Some(&self.left),
            Zone::Right => Some(&self.right),
            Zone::All => None,
        }
    }

    fn zone_mut(&mut self, zone: Zone) -> Option<&mut ZoneState> {
        match zone {
            Zone::Center => Some(&mut self.center),
            Zone::Left => Some(&mut self.left),
            Zone::Right => Some(&mut self.right),
            Zone::All => None,
        }
    }
}

/// One deduplicated tag transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagNotice {
    pub action: TagAction,
    pub zone: Zone,
    pub uid: Uid,
}

/// Latched per-zone state plus its two outbound channels.
pub struct TagTracker {
    zones: PadZones,
    events_tx: broadcast::Sender<TagNotice>,
    zones_tx: watch::Sender<PadZones>,
}

impl TagTracker {
    pub fn new(event_capacity: usize) -> Self {
        let (events_tx, _) = broadcast::channel(event_capacity);
        let (zones_tx, _) = watch::channel(PadZones::default());
        Self {
            zones: PadZones::default(),
            events_tx,
            zones_tx,
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<TagNotice> {
        self.events_tx.subscribe()
    }

    pub fn events_sender(&self) -> broadcast::Sender<TagNotice> {
        self.events_tx.clone()
    }

    pub fn watch_zones(&self) -> watch::Receiver<PadZones> {
        self.zones_tx.subscribe()
    }

    pub fn snapshot(&self) -> &PadZones {
        &self.zones
    }

    /// Apply one device notification. Returns `true` when it changed the
    /// latched state (and was therefore emitted).
    pub fn apply(&mut self, event: &TagEvent) -> bool {
        let Some(state) = self.zones.zone_mut(event.zone) else {
            return false;
        };

        let notice = match event.action {
            TagAction::Added => {
                if state.uid == Some(event.uid) {
                    debug!(zone = ?event.zone, uid = %event.uid, "duplicate insert dropped");
                    return false;
                }
                *state = ZoneState::occupied(event.uid);
                TagNotice {
                    action: TagAction::Added,
                    zone: event.zone,
                    uid: event.uid,
                }
            }
            TagAction::Removed => {
                // Emit the UID we had latched; the pad's removal frame
                // repeats it but an empty zone has nothing to remove.
                let Some(uid) = state.uid else {
                    debug!(zone = ?event.zone, "removal for empty zone dropped");
                    return false;
                };
                *state = ZoneState::vacant();
                TagNotice {
                    action: TagAction::Removed,
                    zone: event.zone,
                    uid,
                }
            }
        };

        info!(action = ?notice.action, zone = ?notice.zone, uid = %notice.uid, "tag event");
        let _ = self.events_tx.send(notice);
        let _ = self.zones_tx.send(self.zones.clone());
        true
    }

    /// Forget everything and publish the empty snapshot. Used on attach and
    /// detach.
    pub fn clear(&mut self) {
        self.zones = PadZones::default();
        let _ = self.zones_tx.send(self.zones.clone());
    }
}
