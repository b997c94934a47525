//! Error types for the paddle bridge

use paddle_calibration::CalibrationError;
use paddle_hid::HidError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Bridge not initialized")]
    NotInitialized,

    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("Packet too small: {actual} bytes (expected {expected})")]
    InvalidSize { expected: usize, actual: usize },

    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error("HID error: {0}")]
    Hid(HidError),

    #[error("Receive queue {0}")]
    Queue(&'static str),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Capture line {line}: {reason}")]
    Capture { line: usize, reason: String },
}

impl From<HidError> for BridgeError {
    fn from(e: HidError) -> Self {
        match e {
            HidError::InvalidSize { expected, actual } => {
                BridgeError::InvalidSize { expected, actual }
            }
            other => BridgeError::Hid(other),
        }
    }
}

impl BridgeError {
    /// True for errors that mean a received packet was discarded.
    pub fn is_packet_drop(&self) -> bool {
        matches!(
            self,
            BridgeError::InvalidArgument(_)
                | BridgeError::InvalidSize { .. }
                | BridgeError::Queue(_)
                | BridgeError::NotInitialized
        )
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;
