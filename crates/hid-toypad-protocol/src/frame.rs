//! Frame codec: outgoing command construction and incoming report parsing.
//!
//! ## Command layout
//!
//! ```text
//! [0]    0x55 preamble
//! [1]    len = 2 + args.len()   (opcode + msg + args; checksum excluded)
//! [2]    opcode
//! [3]    msg (rolling correlation tag)
//! [4..]  args
//! [4+n]  checksum = sum of all preceding bytes mod 256
//! ...    zero padding to 32 bytes
//! ```
//!
//! ## Response layout
//!
//! Responses also start `0x55` with `[1] = len` and `[2] = msg`, payload from
//! `[3]`. Firmwares in the wild disagree on whether `len` counts the msg byte:
//!
//! * Convention A: `len` covers payload + checksum.
//! * Convention B: `len` covers msg + payload + checksum.
//!
//! [`parse_frame`] tries A, then B, accepting whichever validates by
//! checksum. When neither does, the frame decodes best-effort under A with
//! `checksum_ok = false`: some firmwares emit wrong checksums and the
//! payload is still usable.

use crate::ids::REPORT_LEN;
use crate::tag::TagEvent;
use crate::{ProtocolError, ProtocolResult};

/// Longest argument block that still fits a 32-byte frame with checksum.
pub const MAX_ARGS: usize = REPORT_LEN - 5;

/// Preamble byte on every tag insert/remove notification.
const TAG_EVENT_PREAMBLE: u8 = 0x56;
/// Fixed second byte of tag notifications.
const TAG_EVENT_LEN: u8 = 0x0B;
/// Preamble byte shared by commands and responses.
const COMMAND_PREAMBLE: u8 = 0x55;

/// Mod-256 byte sum, the pad's only integrity check.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Build a 32-byte command report.
///
/// Rejects argument blocks that cannot fit the frame alongside the four
/// header bytes and the trailing checksum.
pub fn build_command(opcode: u8, msg: u8, args: &[u8]) -> ProtocolResult<[u8; REPORT_LEN]> {
    if args.len() > MAX_ARGS {
        return Err(ProtocolError::PayloadTooLong {
            actual: args.len(),
            max: MAX_ARGS,
        });
    }

    let mut report = [0u8; REPORT_LEN];
    report[0] = COMMAND_PREAMBLE;
    report[1] = (args.len() + 2) as u8;
    report[2] = opcode;
    report[3] = msg;
    report[4..4 + args.len()].copy_from_slice(args);
    report[4 + args.len()] = checksum(&report[..4 + args.len()]);
    Ok(report)
}

/// A decoded `0x55` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Correlation tag echoed from the originating command.
    pub msg: u8,
    /// Response payload (length depends on which convention validated).
    pub payload: Vec<u8>,
    /// `false` when neither length convention produced a valid checksum and
    /// the frame was decoded best-effort.
    pub checksum_ok: bool,
}

/// One incoming 32-byte report, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Tag inserted into or removed from a zone.
    TagEvent(TagEvent),
    /// Response to a host command, matched by message tag.
    Response(Response),
    /// Neither a tag event nor a recognizable response.
    Unknown,
}

/// Classify and decode one incoming report.
pub fn parse_frame(report: &[u8; REPORT_LEN]) -> Frame {
    if report[0] == TAG_EVENT_PREAMBLE && report[1] == TAG_EVENT_LEN {
        return match TagEvent::from_report(report) {
            Some(event) => Frame::TagEvent(event),
            None => Frame::Unknown,
        };
    }
    if report[0] != COMMAND_PREAMBLE {
        return Frame::Unknown;
    }

    let len = report[1] as usize;
    let msg = report[2];

    // Convention A: len counts payload + checksum.
    if len >= 1 && 2 + len < REPORT_LEN {
        let cs_idx = 2 + len;
        if checksum(&report[..cs_idx]) == report[cs_idx] {
            return Frame::Response(Response {
                msg,
                payload: report[3..cs_idx].to_vec(),
                checksum_ok: true,
            });
        }
    }

    // Convention B: len additionally counts the msg byte.
    if len >= 2 && 1 + len < REPORT_LEN {
        let cs_idx = 1 + len;
        if checksum(&report[..cs_idx]) == report[cs_idx] {
            return Frame::Response(Response {
                msg,
                payload: report[3..cs_idx].to_vec(),
                checksum_ok: true,
            });
        }
    }

    // Best effort: Convention A shape, payload clamped to the frame.
    let payload_len = len.saturating_sub(1).min(REPORT_LEN - 3);
    Frame::Response(Response {
        msg,
        payload: report[3..3 + payload_len].to_vec(),
        checksum_ok: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded(bytes: &[u8]) -> [u8; REPORT_LEN] {
        let mut report = [0u8; REPORT_LEN];
        report[..bytes.len()].copy_from_slice(bytes);
        report
    }

    #[test]
    fn test_checksum_wraps() {
        assert_eq!(checksum(&[]), 0);
        assert_eq!(checksum(&[0xFF, 0x02]), 0x01);
    }

    #[test]
    fn test_build_command_layout() {
        let report = build_command(0xD2, 0x01, &[0x01, 0x24]).expect("two args fit");
        assert_eq!(&report[..7], &[0x55, 0x04, 0xD2, 0x01, 0x01, 0x24, 0x51]);
        assert_eq!(&report[7..], &[0u8; 25]);
    }

    #[test]
    fn test_build_command_rejects_oversize_args() {
        let args = [0u8; MAX_ARGS + 1];
        assert_eq!(
            build_command(0xC0, 0x01, &args),
            Err(ProtocolError::PayloadTooLong {
                actual: MAX_ARGS + 1,
                max: MAX_ARGS,
            })
        );
    }

    #[test]
    fn test_build_command_max_args_fills_frame() {
        let args = [0xAB; MAX_ARGS];
        let report = build_command(0xC0, 0x01, &args).expect("max args fit");
        // Checksum lands in the final byte; no padding remains.
        assert_eq!(report[REPORT_LEN - 1], checksum(&report[..REPORT_LEN - 1]));
    }

    #[test]
    fn test_parse_convention_a_empty_payload() {
        // Plain ack: len covers just the checksum slot past an empty payload.
        let frame = parse_frame(&padded(&[0x55, 0x01, 0x02, 0x58]));
        assert_eq!(
            frame,
            Frame::Response(Response {
                msg: 0x02,
                payload: vec![],
                checksum_ok: true,
            })
        );
    }

    #[test]
    fn test_parse_convention_b() {
        // len = 3 covers msg + 1 payload byte + checksum; A's checksum slot
        // holds padding so only B validates.
        let frame = parse_frame(&padded(&[0x55, 0x03, 0x03, 0xAA, 0x05]));
        assert_eq!(
            frame,
            Frame::Response(Response {
                msg: 0x03,
                payload: vec![0xAA],
                checksum_ok: true,
            })
        );
    }

    #[test]
    fn test_parse_fallback_keeps_payload() {
        let frame = parse_frame(&padded(&[0x55, 0x02, 0x07, 0xDE, 0xAD]));
        assert_eq!(
            frame,
            Frame::Response(Response {
                msg: 0x07,
                payload: vec![0xDE],
                checksum_ok: false,
            })
        );
    }

    #[test]
    fn test_parse_unknown_preamble() {
        assert_eq!(parse_frame(&padded(&[0x99, 0x01, 0x02])), Frame::Unknown);
    }

    #[test]
    fn test_parse_tag_event_preamble_with_bad_zone() {
        // 0x56/0x0B preamble but a zone byte outside 1..=3.
        let mut report = [0u8; REPORT_LEN];
        report[0] = 0x56;
        report[1] = 0x0B;
        report[2] = 0x09;
        assert_eq!(parse_frame(&report), Frame::Unknown);
    }
}
