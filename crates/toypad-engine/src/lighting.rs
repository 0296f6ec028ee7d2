//! Lighting command layer.
//!
//! Lighting is fire-and-forget: each request consumes a message tag but
//! never registers a waiter, so the occasional 0x55 ack the pad emits for a
//! lighting command finds no pending entry and is dropped by the registry.

use hid_toypad_protocol::{
    ColorRgb, FadeParams, FlashParams, ProtocolResult, REPORT_LEN, Zone, build_color, build_fade,
    build_fade_all, build_flash, build_flash_all,
};

/// One lighting operation, ready to encode once a message tag is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightRequest {
    /// Replace a zone's color. `Zone::All` addresses all three at once.
    Color { zone: Zone, color: ColorRgb },
    /// Interpolate one zone toward a color.
    Fade { zone: Zone, params: FadeParams },
    /// Fade all three zones with independent parameters.
    FadeAll { blocks: [FadeParams; 3] },
    /// Pulse one zone on and off.
    Flash { zone: Zone, params: FlashParams },
    /// Flash all three zones with independent parameters.
    FlashAll { blocks: [FlashParams; 3] },
}

impl LightRequest {
    /// The canonical lights-out request.
    pub fn lights_off() -> Self {
        LightRequest::Color {
            zone: Zone::All,
            color: ColorRgb::OFF,
        }
    }

    pub fn encode(&self, msg: u8) -> ProtocolResult<[u8; REPORT_LEN]> {
        match *self {
            LightRequest::Color { zone, color } => build_color(msg, zone, color),
            LightRequest::Fade { zone, params } => build_fade(msg, zone, params),
            LightRequest::FadeAll { blocks } => build_fade_all(msg, blocks),
            LightRequest::Flash { zone, params } => build_flash(msg, zone, params),
            LightRequest::FlashAll { blocks } => build_flash_all(msg, blocks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hid_toypad_protocol::ProtocolError;

    #[test]
    fn test_lights_off_encoding() {
        let report = LightRequest::lights_off().encode(0x02).expect("encodes");
        assert_eq!(
            &report[..9],
            &[0x55, 0x06, 0xC0, 0x02, 0x00, 0x00, 0x00, 0x00, 0x1D]
        );
    }

    #[test]
    fn test_broadcast_zone_rejected_for_fade() {
        let request = LightRequest::Fade {
            zone: Zone::All,
            params: FadeParams {
                tick_time: 1,
                tick_count: 1,
                color: ColorRgb::OFF,
            },
        };
        assert_eq!(
            request.encode(0x01),
            Err(ProtocolError::InvalidZone(Zone::All))
        );
    }

    #[test]
    fn test_requests_carry_assigned_tag() {
        let request = LightRequest::Color {
            zone: Zone::Left,
            color: ColorRgb::new(1, 2, 3),
        };
        assert_eq!(request.encode(0x7F).expect("encodes")[3], 0x7F);
    }
}
