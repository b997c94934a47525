//! Capture window for a running calibration

use crate::{ADC_MAX, CalibrationRange};

/// Running min/max for one paddle channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelCapture {
    pub min: u16,
    pub max: u16,
}

impl ChannelCapture {
    /// Inverted extremes, so the first sample always widens both bounds.
    pub const fn empty() -> Self {
        Self { min: ADC_MAX, max: 0 }
    }

    pub fn sample(&mut self, value: u16) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }
}

impl Default for ChannelCapture {
    fn default() -> Self {
        Self::empty()
    }
}

/// An active capture window.
///
/// Timestamps are milliseconds on whatever monotonic clock the caller uses;
/// the session only ever compares them against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSession {
    pub start_ms: u64,
    pub duration_ms: u64,
    pub left: ChannelCapture,
    pub right: ChannelCapture,
}

impl CaptureSession {
    pub fn new(duration_ms: u64, start_ms: u64) -> Self {
        Self {
            start_ms,
            duration_ms,
            left: ChannelCapture::empty(),
            right: ChannelCapture::empty(),
        }
    }

    pub fn widen(&mut self, left_raw: u16, right_raw: u16) {
        self.left.sample(left_raw);
        self.right.sample(right_raw);
    }

    /// Time since the session started. A clock that went backwards reads as zero.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.start_ms)
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.elapsed_ms(now_ms) >= self.duration_ms
    }

    /// Folds the captured extremes into a calibrated range.
    ///
    /// A session that saw no samples still carries its inverted extremes,
    /// producing a range with `max < min` on both channels.
    pub fn into_range(self) -> CalibrationRange {
        CalibrationRange::new(self.left.min, self.left.max, self.right.min, self.right.max)
    }
}
