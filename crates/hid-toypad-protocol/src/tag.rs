//! Zones, tag UIDs, and the 0x56 insert/remove notification.

use crate::ids::REPORT_LEN;
use std::fmt;

/// One of the pad's illuminated areas, or the broadcast pseudo-zone.
///
/// `All` exists only on the lighting path; tag events and reads always name
/// a physical zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    All,
    Center,
    Left,
    Right,
}

impl Zone {
    /// The three physical zones, in the order broadcast lighting commands
    /// expect their per-zone blocks.
    pub const PHYSICAL: [Zone; 3] = [Zone::Center, Zone::Left, Zone::Right];

    /// Wire encoding used in commands and tag events.
    pub fn wire_byte(self) -> u8 {
        match self {
            Zone::All => 0,
            Zone::Center => 1,
            Zone::Left => 2,
            Zone::Right => 3,
        }
    }

    pub fn from_wire(byte: u8) -> Option<Zone> {
        match byte {
            0 => Some(Zone::All),
            1 => Some(Zone::Center),
            2 => Some(Zone::Left),
            3 => Some(Zone::Right),
            _ => None,
        }
    }

    /// `true` for the three zones that can hold a tag.
    pub fn is_physical(self) -> bool {
        self != Zone::All
    }
}

/// 7-byte tag identifier as reported by the pad.
///
/// Treated as opaque and stable per tag; the pad may derive it rather than
/// forward the chip's factory UID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Uid(pub [u8; 7]);

impl Uid {
    pub fn from_slice(bytes: &[u8]) -> Option<Uid> {
        let array: [u8; 7] = bytes.try_into().ok()?;
        Some(Uid(array))
    }

    pub fn as_bytes(&self) -> &[u8; 7] {
        &self.0
    }

    /// Lowercase hex form used on the key-derivation boundary.
    pub fn hex_lower(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Uid {
    /// Uppercase hex, the form used in logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// Direction of a tag notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAction {
    Added,
    Removed,
}

impl TagAction {
    pub fn from_wire(byte: u8) -> Option<TagAction> {
        match byte {
            0 => Some(TagAction::Added),
            1 => Some(TagAction::Removed),
            _ => None,
        }
    }
}

/// Decoded 0x56 notification.
///
/// Layout: `[2] = zone (1..=3)`, `[4] = index (0..=2)`, `[5] = action`,
/// `[7..14] = UID`. The index is a per-tag slot the pad assigns; reads
/// address tags by zone, so the index is carried but unused downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagEvent {
    pub zone: Zone,
    pub index: u8,
    pub action: TagAction,
    pub uid: Uid,
}

impl TagEvent {
    /// Decode from a full report. The caller has already matched the
    /// `0x56 0x0B` preamble.
    pub fn from_report(report: &[u8; REPORT_LEN]) -> Option<TagEvent> {
        let zone = Zone::from_wire(report[2]).filter(|z| z.is_physical())?;
        let action = TagAction::from_wire(report[5])?;
        let uid = Uid::from_slice(&report[7..14])?;
        Some(TagEvent {
            zone,
            index: report[4],
            action,
            uid,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_report(zone: u8, index: u8, action: u8, uid: [u8; 7]) -> [u8; REPORT_LEN] {
        let mut report = [0u8; REPORT_LEN];
        report[0] = 0x56;
        report[1] = 0x0B;
        report[2] = zone;
        report[4] = index;
        report[5] = action;
        report[7..14].copy_from_slice(&uid);
        report
    }

    const UID: [u8; 7] = [0x04, 0x56, 0x26, 0x3A, 0x87, 0x3A, 0x80];

    #[test]
    fn test_zone_wire_round_trip() {
        for zone in [Zone::All, Zone::Center, Zone::Left, Zone::Right] {
            assert_eq!(Zone::from_wire(zone.wire_byte()), Some(zone));
        }
        assert_eq!(Zone::from_wire(4), None);
    }

    #[test]
    fn test_tag_event_decode() {
        let event = TagEvent::from_report(&event_report(2, 0, 0, UID)).expect("valid event");
        assert_eq!(event.zone, Zone::Left);
        assert_eq!(event.index, 0);
        assert_eq!(event.action, TagAction::Added);
        assert_eq!(event.uid, Uid(UID));
    }

    #[test]
    fn test_tag_event_rejects_broadcast_zone() {
        assert!(TagEvent::from_report(&event_report(0, 0, 0, UID)).is_none());
    }

    #[test]
    fn test_tag_event_rejects_unknown_action() {
        assert!(TagEvent::from_report(&event_report(1, 0, 2, UID)).is_none());
    }

    #[test]
    fn test_uid_rendering() {
        let uid = Uid(UID);
        assert_eq!(uid.to_string(), "0456263A873A80");
        assert_eq!(uid.hex_lower(), "0456263a873a80");
    }
}
