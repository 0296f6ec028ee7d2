//! Page reads from a seated tag.
//!
//! A read addresses one physical zone and returns 16 bytes starting at
//! `start_page`. The response payload leads with a device status byte that
//! is authoritative regardless of the session's auth state.

use crate::{PadError, PadResult};
use hid_toypad_protocol::{REPORT_LEN, Zone, build_command, opcodes};

/// Bytes of page data in a successful read.
pub const PAGE_DATA_LEN: usize = 16;
/// Status byte plus page data.
const READ_PAYLOAD_LEN: usize = PAGE_DATA_LEN + 1;

/// Build the read command for one zone.
pub fn build_read_command(
    msg: u8,
    zone: Zone,
    start_page: u8,
) -> PadResult<[u8; REPORT_LEN]> {
    if !zone.is_physical() {
        return Err(PadError::Malformed(
            "page reads address a single physical zone".to_string(),
        ));
    }
    Ok(build_command(
        opcodes::READ_PAGES,
        msg,
        &[zone.wire_byte(), start_page],
    )?)
}

/// Interpret a read-response payload: `[status, data_0 .. data_15]`.
///
/// The status byte is inspected first: firmware signalling an error may not
/// bother padding out the 16 data bytes, and the status code must still
/// reach the caller. Only a zero status requires the full payload.
pub fn decode_read_payload(payload: &[u8]) -> PadResult<[u8; PAGE_DATA_LEN]> {
    let Some(&status) = payload.first() else {
        return Err(PadError::Malformed("empty read payload".to_string()));
    };
    if status != 0 {
        return Err(PadError::Device { status });
    }
    if payload.len() < READ_PAYLOAD_LEN {
        return Err(PadError::Malformed(format!(
            "read payload too short: {} bytes (need {READ_PAYLOAD_LEN})",
            payload.len()
        )));
    }
    let mut data = [0u8; PAGE_DATA_LEN];
    data.copy_from_slice(&payload[1..READ_PAYLOAD_LEN]);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_command_bytes() {
        let report = build_read_command(0x01, Zone::Center, 0x24).expect("builds");
        assert_eq!(&report[..7], &[0x55, 0x04, 0xD2, 0x01, 0x01, 0x24, 0x51]);
    }

    #[test]
    fn test_read_command_rejects_broadcast_zone() {
        assert!(matches!(
            build_read_command(0x01, Zone::All, 0x00),
            Err(PadError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_happy_path() {
        let mut payload = vec![0x00];
        payload.extend(0x10..0x20);
        assert_eq!(
            decode_read_payload(&payload).expect("decodes"),
            [
                0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1A, 0x1B, 0x1C,
                0x1D, 0x1E, 0x1F
            ]
        );
    }

    #[test]
    fn test_decode_nonzero_status() {
        let payload = [0xF0u8; READ_PAYLOAD_LEN];
        assert_eq!(
            decode_read_payload(&payload),
            Err(PadError::Device { status: 0xF0 })
        );
    }

    #[test]
    fn test_decode_short_error_payload_keeps_status() {
        // An error reply without the 16 dummy data bytes still surfaces its
        // status instead of degenerating into a framing complaint.
        assert_eq!(
            decode_read_payload(&[0xF0]),
            Err(PadError::Device { status: 0xF0 })
        );
        assert_eq!(
            decode_read_payload(&[0x02, 0x00, 0x00]),
            Err(PadError::Device { status: 0x02 })
        );
    }

    #[test]
    fn test_decode_short_payload() {
        assert!(matches!(
            decode_read_payload(&[0x00; 5]),
            Err(PadError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_empty_payload() {
        assert!(matches!(
            decode_read_payload(&[]),
            Err(PadError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        // Convention B parses leave one fewer trailing byte; longer payloads
        // are fine either way.
        let mut payload = vec![0x00];
        payload.extend([0xAB; 20]);
        assert!(decode_read_payload(&payload).is_ok());
    }
}
