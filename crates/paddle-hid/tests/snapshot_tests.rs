//! Snapshot tests for the paddle wire formats.
//!
//! These lock in the report bytes and descriptor so a host-visible change
//! shows up as a diff.

use insta::assert_snapshot;
use paddle_hid::{AxisScale, PaddleReport, RawSample, report_descriptor};

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn test_snapshot_descriptor_wide() {
    assert_snapshot!(
        hex(&report_descriptor(AxisScale::Wide)),
        @"05 01 09 05 A1 01 85 01 09 30 09 31 15 00 27 FF FF 00 00 75 10 95 02 81 02 C0"
    );
}

#[test]
fn test_snapshot_descriptor_native() {
    assert_snapshot!(
        hex(&report_descriptor(AxisScale::Native)),
        @"05 01 09 05 A1 01 85 01 09 30 09 31 15 00 26 FF 0F 75 10 95 02 81 02 C0"
    );
}

#[test]
fn test_snapshot_report_released() {
    let report = PaddleReport::new(0, 0);
    assert_snapshot!(hex(&report.encode(AxisScale::Wide)), @"01 00 00 00 00");
}

#[test]
fn test_snapshot_report_half_and_full() {
    let report = PaddleReport::new(2048, 4095);
    assert_snapshot!(hex(&report.encode(AxisScale::Wide)), @"01 07 80 FF FF");
    assert_snapshot!(hex(&report.encode(AxisScale::Native)), @"01 00 08 FF 0F");
}

#[test]
fn test_snapshot_decode_clamped() -> Result<(), String> {
    let sample = RawSample::decode(&[0xFF, 0xFF, 0x34, 0x02]).map_err(|e| e.to_string())?;
    assert_snapshot!(
        format!("left={}, right={}", sample.left_raw, sample.right_raw),
        @"left=4095, right=564"
    );
    Ok(())
}
