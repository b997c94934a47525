//! Wire formats for the clutch paddle bridge
//!
//! This crate covers both ends of the bridge:
//! - decoding the 4-byte wireless payload into a clamped [`RawSample`]
//! - encoding the dual-axis [`PaddleReport`] and handing it to a [`ReportSink`]
//!
//! ## Payload layout
//! | Offset | Field | Encoding |
//! |---|---|---|
//! | 0–1 | left paddle | `u16` LE, 0–4095 |
//! | 2–3 | right paddle | `u16` LE, 0–4095 |
//!
//! Trailing bytes are ignored.

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod report;
pub mod report_parser;
pub mod sample;
pub mod sink;

pub use report::*;
pub use report_parser::*;
pub use sample::*;
pub use sink::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HidError {
    #[error("Invalid payload size: expected at least {expected}, got {actual}")]
    InvalidSize { expected: usize, actual: usize },

    #[error("Unexpected end of data at offset {offset}")]
    UnexpectedEnd { offset: usize },

    #[error("Host not connected")]
    Disconnected,

    #[error("HID endpoint busy")]
    NotReady,
}

pub type HidResult<T> = Result<T, HidError>;

/// Minimum payload length carrying both paddle channels.
pub const PAYLOAD_MIN_LEN: usize = 4;

/// Report ID of the gamepad input report.
pub const REPORT_ID: u8 = 0x01;

/// Encoded report length including the report ID.
pub const REPORT_SIZE: usize = 5;

pub const VENDOR_ID_GENERIC: u16 = 0x1209;
pub const PRODUCT_ID_CLUTCH_PADDLES: u16 = 0xC1D2;
