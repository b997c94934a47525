//! Gamepad input report sent to the host

use serde::{Deserialize, Serialize};

use crate::report_parser::ReportBuilder;
use crate::sample::{ADC_MAX, clamp_adc};
use crate::{REPORT_ID, REPORT_SIZE};

/// Axis resolution advertised to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AxisScale {
    /// Report the 12-bit value unchanged (logical 0–4095).
    Native,
    /// Stretch to the full 16-bit axis (logical 0–65535).
    #[default]
    Wide,
}

impl AxisScale {
    pub fn logical_max(self) -> u16 {
        match self {
            AxisScale::Native => ADC_MAX,
            AxisScale::Wide => u16::MAX,
        }
    }

    /// Maps a normalized 12-bit value onto this axis resolution.
    pub fn scale(self, value: u16) -> u16 {
        let value = clamp_adc(value);
        match self {
            AxisScale::Native => value,
            AxisScale::Wide => {
                let wide = u32::from(value) * u32::from(u16::MAX) / u32::from(ADC_MAX);
                u16::try_from(wide).unwrap_or(u16::MAX)
            }
        }
    }
}

/// Normalized paddle positions, each in `0..=4095`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaddleReport {
    pub left: u16,
    pub right: u16,
}

impl PaddleReport {
    pub fn new(left: u16, right: u16) -> Self {
        Self {
            left: clamp_adc(left),
            right: clamp_adc(right),
        }
    }

    /// Encodes `[report id, left lo, left hi, right lo, right hi]`.
    pub fn encode(&self, scale: AxisScale) -> [u8; REPORT_SIZE] {
        let mut builder = ReportBuilder::default();
        builder
            .write_u8(REPORT_ID)
            .write_u16_le(scale.scale(self.left))
            .write_u16_le(scale.scale(self.right));

        let mut out = [0u8; REPORT_SIZE];
        out.copy_from_slice(builder.as_slice());
        out
    }
}

/// HID report descriptor for a two-axis gamepad (X = left, Y = right).
pub fn report_descriptor(scale: AxisScale) -> Vec<u8> {
    let mut desc = vec![
        0x05, 0x01, // Usage Page (Generic Desktop)
        0x09, 0x05, // Usage (Game Pad)
        0xA1, 0x01, // Collection (Application)
        0x85, REPORT_ID, // Report ID
        0x09, 0x30, // Usage (X)
        0x09, 0x31, // Usage (Y)
        0x15, 0x00, // Logical Minimum (0)
    ];

    // Logical Maximum is signed; 65535 needs the 4-byte form.
    match scale {
        AxisScale::Native => {
            let [lo, hi] = ADC_MAX.to_le_bytes();
            desc.extend_from_slice(&[0x26, lo, hi]);
        }
        AxisScale::Wide => desc.extend_from_slice(&[0x27, 0xFF, 0xFF, 0x00, 0x00]),
    }

    desc.extend_from_slice(&[
        0x75, 0x10, // Report Size (16)
        0x95, 0x02, // Report Count (2)
        0x81, 0x02, // Input (Data, Var, Abs)
        0xC0, // End Collection
    ]);
    desc
}
