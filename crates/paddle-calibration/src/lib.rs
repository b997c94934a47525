//! Clutch paddle calibration
//!
//! This crate owns the calibration state of a dual-channel analog paddle set:
//! the committed [`CalibrationRange`], the timed or manually stopped
//! [`CaptureSession`], and the raw → normalized 12-bit mapping.
//!
//! ```
//! use paddle_calibration::CalibrationEngine;
//!
//! let mut engine = CalibrationEngine::new();
//! engine.start(1_000, 0)?;
//! engine.observe(100, 50, 10);
//! engine.observe(200, 4000, 20);
//! let range = engine.stop()?;
//!
//! assert_eq!((range.left_min, range.left_max), (100, 200));
//! assert_eq!(engine.normalize_left(200), 4095);
//! # Ok::<(), paddle_calibration::CalibrationError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod engine;
pub mod session;
pub mod types;

pub use engine::*;
pub use session::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    #[error("Calibration already in progress")]
    AlreadyCalibrating,

    #[error("No calibration in progress")]
    NotCalibrating,
}

pub type CalibrationResult<T> = Result<T, CalibrationError>;

/// Largest value a 12-bit ADC sample can take.
pub const ADC_MAX: u16 = 4095;
