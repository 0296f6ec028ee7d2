//! Device IDs and fixed wire constants for the toy pad.
//!
//! The pad enumerates as a generic HID device under a games-accessory vendor
//! ID; there is only one known product. Opcodes below were recovered from
//! traffic captures; the vendor never published the protocol.

/// Vendor ID of the toy pad.
pub const TOYPAD_VENDOR_ID: u16 = 0x0E6F;
/// Product ID of the toy pad.
pub const TOYPAD_PRODUCT_ID: u16 = 0x0241;

/// Every HID report in either direction is exactly this long.
pub const REPORT_LEN: usize = 32;

/// Command opcodes understood by the pad.
pub mod opcodes {
    /// Wake-up handshake. Sent once per session, no response awaited.
    pub const INIT: u8 = 0xB0;
    /// Solid color, single zone or broadcast.
    pub const COLOR: u8 = 0xC0;
    /// Interpolated fade, single zone.
    pub const FADE: u8 = 0xC2;
    /// On/off pulse, single zone.
    pub const FLASH: u8 = 0xC3;
    /// Fade with independent per-zone parameters.
    pub const FADE_ALL: u8 = 0xC6;
    /// Flash with independent per-zone parameters.
    pub const FLASH_ALL: u8 = 0xC7;
    /// Read 16 bytes of tag pages from a seated tag.
    pub const READ_PAGES: u8 = 0xD2;
}

/// Payload of the INIT command: the vendor's wake-up magic.
pub const INIT_PAYLOAD: &[u8; 13] = b"(c) LEGO 2014";

/// The full 32-byte INIT report as it appears on the wire.
///
/// Equals `build_command(opcodes::INIT, 0x01, INIT_PAYLOAD)`; kept as a
/// constant so capture comparisons don't need the builder.
pub const INIT_REPORT: [u8; REPORT_LEN] = [
    0x55, 0x0F, 0xB0, 0x01, 0x28, 0x63, 0x29, 0x20, 0x4C, 0x45, 0x47, 0x4F, 0x20, 0x32, 0x30,
    0x31, 0x34, 0xF7, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00,
];

/// Returns `true` when the VID/PID pair identifies a toy pad.
pub fn is_toypad_device(vendor_id: u16, product_id: u16) -> bool {
    vendor_id == TOYPAD_VENDOR_ID && product_id == TOYPAD_PRODUCT_ID
}
