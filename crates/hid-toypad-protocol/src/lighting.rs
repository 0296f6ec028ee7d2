//! Lighting frame builders: solid color, fade, flash, per-zone broadcast.
//!
//! Lighting is fire-and-forget at the protocol level. The pad may ack with a
//! generic 0x55 frame but nothing here depends on it.

use crate::frame::build_command;
use crate::ids::{REPORT_LEN, opcodes};
use crate::tag::Zone;
use crate::{ProtocolError, ProtocolResult};

/// Tick count meaning "repeat until replaced".
pub const TICKS_INDEFINITE: u8 = 0xFF;

/// RGB triple for one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorRgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorRgb {
    /// All channels off. `build_color(msg, Zone::All, ColorRgb::OFF)` is the
    /// canonical lights-out request.
    pub const OFF: ColorRgb = ColorRgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Parameters for one zone of a fade.
///
/// The pad interpolates toward `color` over `tick_count` steps of
/// `tick_time` device ticks each; ticks are a device-internal unit with no
/// published millisecond mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FadeParams {
    pub tick_time: u8,
    pub tick_count: u8,
    pub color: ColorRgb,
}

/// Parameters for one zone of a flash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashParams {
    pub tick_on: u8,
    pub tick_off: u8,
    pub tick_count: u8,
    pub color: ColorRgb,
}

/// Solid color. The only lighting form where `Zone::All` is a wire value;
/// fade and flash broadcast through their explicit per-zone opcodes.
pub fn build_color(msg: u8, zone: Zone, color: ColorRgb) -> ProtocolResult<[u8; REPORT_LEN]> {
    build_command(
        opcodes::COLOR,
        msg,
        &[zone.wire_byte(), color.r, color.g, color.b],
    )
}

pub fn build_fade(msg: u8, zone: Zone, params: FadeParams) -> ProtocolResult<[u8; REPORT_LEN]> {
    require_physical(zone)?;
    build_command(
        opcodes::FADE,
        msg,
        &[
            zone.wire_byte(),
            params.tick_time,
            params.tick_count,
            params.color.r,
            params.color.g,
            params.color.b,
        ],
    )
}

pub fn build_flash(msg: u8, zone: Zone, params: FlashParams) -> ProtocolResult<[u8; REPORT_LEN]> {
    require_physical(zone)?;
    build_command(
        opcodes::FLASH,
        msg,
        &[
            zone.wire_byte(),
            params.tick_on,
            params.tick_off,
            params.tick_count,
            params.color.r,
            params.color.g,
            params.color.b,
        ],
    )
}

/// Fade all three zones with independent parameters. Blocks are taken in
/// center, left, right order, matching [`Zone::PHYSICAL`].
pub fn build_fade_all(msg: u8, blocks: [FadeParams; 3]) -> ProtocolResult<[u8; REPORT_LEN]> {
    let mut args = Vec::with_capacity(18);
    for (zone, params) in Zone::PHYSICAL.iter().zip(blocks) {
        args.extend_from_slice(&[
            zone.wire_byte(),
            params.tick_time,
            params.tick_count,
            params.color.r,
            params.color.g,
            params.color.b,
        ]);
    }
    build_command(opcodes::FADE_ALL, msg, &args)
}

/// Flash all three zones with independent parameters.
pub fn build_flash_all(msg: u8, blocks: [FlashParams; 3]) -> ProtocolResult<[u8; REPORT_LEN]> {
    let mut args = Vec::with_capacity(21);
    for (zone, params) in Zone::PHYSICAL.iter().zip(blocks) {
        args.extend_from_slice(&[
            zone.wire_byte(),
            params.tick_on,
            params.tick_off,
            params.tick_count,
            params.color.r,
            params.color.g,
            params.color.b,
        ]);
    }
    build_command(opcodes::FLASH_ALL, msg, &args)
}

fn require_physical(zone: Zone) -> ProtocolResult<()> {
    if zone.is_physical() {
        Ok(())
    } else {
        Err(ProtocolError::InvalidZone(zone))
    }
}
