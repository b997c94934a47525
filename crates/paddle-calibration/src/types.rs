//! Calibration type definitions

use serde::{Deserialize, Serialize};

use crate::ADC_MAX;

/// Committed calibration for both paddles.
///
/// The default value is the identity mapping: full 12-bit range on both
/// channels with `calibrated` cleared, so raw samples pass through untouched.
/// Nothing enforces `min < max`; [`normalize`] copes with degenerate and
/// inverted ranges.
///
/// # Examples
///
/// ```
/// use paddle_calibration::CalibrationRange;
///
/// let range = CalibrationRange::new(500, 3500, 200, 3800);
/// assert!(range.calibrated);
/// assert_eq!(range.apply(500, 3800), (0, 4095));
///
/// let identity = CalibrationRange::default();
/// assert_eq!(identity.apply(1234, 42), (1234, 42));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationRange {
    /// Raw value treated as a fully released left paddle.
    pub left_min: u16,
    /// Raw value treated as a fully pressed left paddle.
    pub left_max: u16,
    /// Raw value treated as a fully released right paddle.
    pub right_min: u16,
    /// Raw value treated as a fully pressed right paddle.
    pub right_max: u16,
    /// When false the range is ignored and samples pass through unchanged.
    pub calibrated: bool,
}

impl Default for CalibrationRange {
    fn default() -> Self {
        Self::identity()
    }
}

impl CalibrationRange {
    /// The reset state: full range, not calibrated.
    pub const fn identity() -> Self {
        Self {
            left_min: 0,
            left_max: ADC_MAX,
            right_min: 0,
            right_max: ADC_MAX,
            calibrated: false,
        }
    }

    /// Creates a calibrated range from explicit per-channel bounds.
    pub const fn new(left_min: u16, left_max: u16, right_min: u16, right_max: u16) -> Self {
        Self {
            left_min,
            left_max,
            right_min,
            right_max,
            calibrated: true,
        }
    }

    pub fn normalize_left(&self, raw: u16) -> u16 {
        if self.calibrated {
            normalize(raw, self.left_min, self.left_max)
        } else {
            raw
        }
    }

    pub fn normalize_right(&self, raw: u16) -> u16 {
        if self.calibrated {
            normalize(raw, self.right_min, self.right_max)
        } else {
            raw
        }
    }

    /// Maps a raw `(left, right)` pair through this range.
    pub fn apply(&self, left_raw: u16, right_raw: u16) -> (u16, u16) {
        (self.normalize_left(left_raw), self.normalize_right(right_raw))
    }

    /// True when either channel has `max <= min`.
    pub fn is_degenerate(&self) -> bool {
        self.left_max <= self.left_min || self.right_max <= self.right_min
    }
}

/// Linearly rescales `raw` from `[min, max]` onto `[0, ADC_MAX]`.
///
/// Values at or below `min` map to 0 and values at or above `max` map to
/// [`ADC_MAX`]. The interpolation rounds down. When `max <= min` the range
/// has no width and every input maps to 0.
pub fn normalize(raw: u16, min: u16, max: u16) -> u16 {
    if raw <= min {
        return 0;
    }
    if max <= min {
        return 0;
    }
    if raw >= max {
        return ADC_MAX;
    }

    let offset = u32::from(raw - min);
    let span = u32::from(max - min);
    let scaled = offset * u32::from(ADC_MAX) / span;

    // offset < span, so scaled < ADC_MAX
    u16::try_from(scaled).unwrap_or(ADC_MAX)
}
