//! Snapshot tests for toy pad wire-format encoding.
//!
//! Byte-exact captures of every outgoing frame shape plus the key-derivation
//! vectors. Inline snapshots keep the expected wire bytes next to the
//! construction that produces them, so any codec regression shows up as a
//! diff against known-good captures.

use hid_toypad_protocol as tp;
use hid_toypad_protocol::{ColorRgb, FadeParams, FlashParams, Zone};
use insta::assert_snapshot;

fn hex_frame(report: &[u8; tp::REPORT_LEN]) -> String {
    report
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Device identity ──────────────────────────────────────────────────────────

#[test]
fn snapshot_vendor_product_ids() {
    assert_snapshot!(
        format!("{:#06X}:{:#06X}", tp::TOYPAD_VENDOR_ID, tp::TOYPAD_PRODUCT_ID),
        @"0x0E6F:0x0241"
    );
}

// ── INIT ─────────────────────────────────────────────────────────────────────

#[test]
fn snapshot_init_report() {
    assert_snapshot!(
        hex_frame(&tp::INIT_REPORT),
        @"55 0f b0 01 28 63 29 20 4c 45 47 4f 20 32 30 31 34 f7 00 00 00 00 00 00 00 00 00 00 00 00 00 00"
    );
}

// ── Solid color ──────────────────────────────────────────────────────────────

#[test]
fn snapshot_color_all_off() {
    let report = tp::build_color(0x02, Zone::All, ColorRgb::OFF).expect("color frame");
    assert_snapshot!(
        hex_frame(&report),
        @"55 06 c0 02 00 00 00 00 1d 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00"
    );
}

#[test]
fn snapshot_color_center_orange() {
    let report =
        tp::build_color(0x01, Zone::Center, ColorRgb::new(0xFF, 0x40, 0x00)).expect("color frame");
    assert_snapshot!(
        hex_frame(&report),
        @"55 06 c0 01 01 ff 40 00 5c 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00"
    );
}

// ── Fade / flash, single zone ────────────────────────────────────────────────

#[test]
fn snapshot_fade_left_to_blue() {
    let params = FadeParams {
        tick_time: 0x0A,
        tick_count: 0x05,
        color: ColorRgb::new(0x00, 0x00, 0xFF),
    };
    let report = tp::build_fade(0x03, Zone::Left, params).expect("fade frame");
    assert_snapshot!(
        hex_frame(&report),
        @"55 08 c2 03 02 0a 05 00 00 ff 32 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00"
    );
}

#[test]
fn snapshot_flash_right_green() {
    let params = FlashParams {
        tick_on: 0x02,
        tick_off: 0x02,
        tick_count: 0x0A,
        color: ColorRgb::new(0x00, 0xFF, 0x00),
    };
    let report = tp::build_flash(0x04, Zone::Right, params).expect("flash frame");
    assert_snapshot!(
        hex_frame(&report),
        @"55 09 c3 04 03 02 02 0a 00 ff 00 35 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00"
    );
}

// ── Broadcast fade / flash ───────────────────────────────────────────────────

#[test]
fn snapshot_fade_all_rgb_sweep() {
    let block = |r, g, b| FadeParams {
        tick_time: 0x02,
        tick_count: tp::lighting::TICKS_INDEFINITE,
        color: ColorRgb::new(r, g, b),
    };
    let report = tp::build_fade_all(
        0x05,
        [block(0xFF, 0, 0), block(0, 0xFF, 0), block(0, 0, 0xFF)],
    )
    .expect("fade-all frame");
    assert_snapshot!(
        hex_frame(&report),
        @"55 14 c6 05 01 02 ff ff 00 00 02 02 ff 00 ff 00 03 02 ff 00 00 ff 3a 00 00 00 00 00 00 00 00 00"
    );
}

#[test]
fn snapshot_flash_all_white_center() {
    let block = |r, g, b| FlashParams {
        tick_on: 0x01,
        tick_off: 0x01,
        tick_count: 0x05,
        color: ColorRgb::new(r, g, b),
    };
    let report = tp::build_flash_all(
        0x06,
        [
            block(0xFF, 0xFF, 0xFF),
            block(0x00, 0x00, 0xFF),
            block(0xFF, 0x00, 0x00),
        ],
    )
    .expect("flash-all frame");
    assert_snapshot!(
        hex_frame(&report),
        @"55 17 c7 06 01 01 01 05 ff ff ff 02 01 01 05 00 00 ff 03 01 01 05 ff 00 00 4f 00 00 00 00 00 00"
    );
}

// ── Page read command ────────────────────────────────────────────────────────

#[test]
fn snapshot_read_pages_center() {
    let report =
        tp::build_command(tp::opcodes::READ_PAGES, 0x01, &[Zone::Center.wire_byte(), 0x24])
            .expect("read frame");
    assert_snapshot!(
        hex_frame(&report),
        @"55 04 d2 01 01 24 51 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00"
    );
}

// ── Key A derivation vectors ─────────────────────────────────────────────────

#[test]
fn snapshot_key_a_vectors() {
    let vectors = [
        "0456263a873a80",
        "049c0bb2a03784",
        "04a0f02a3d2d80",
        "04b40c12a13780",
        "04d9fb8a763b80",
    ];
    let summary: Vec<String> = vectors
        .iter()
        .map(|uid| {
            let key = tp::derive_key_a(uid, 0).expect("vector uid is well-formed");
            format!("{uid} -> {key}")
        })
        .collect();
    assert_snapshot!(summary.join("\n"), @r"
    0456263a873a80 -> 29564af75805
    049c0bb2a03784 -> c0b423c8e4c2
    04a0f02a3d2d80 -> 1e0615823120
    04b40c12a13780 -> 2737629f2ebe
    04d9fb8a763b80 -> edb56de8a9fe
    ");
}
