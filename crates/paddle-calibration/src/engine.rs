//! Calibration state machine
//!
//! [`CalibrationEngine`] holds the committed [`CalibrationRange`] and at most
//! one [`CaptureSession`]. A session ends in one of three ways:
//!
//! - the first [`observe`](CalibrationEngine::observe) call at or past its
//!   deadline commits it (there is no timer, so completion lags by up to one
//!   packet interval)
//! - [`stop`](CalibrationEngine::stop) commits it early
//! - [`reset`](CalibrationEngine::reset) discards it along with the committed range

use crate::{CalibrationError, CalibrationRange, CalibrationResult, CaptureSession};

#[derive(Debug, Clone, Default)]
pub struct CalibrationEngine {
    range: CalibrationRange,
    session: Option<CaptureSession>,
}

impl CalibrationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(range: CalibrationRange) -> Self {
        Self {
            range,
            session: None,
        }
    }

    /// Opens a capture window of `duration_ms` starting at `now_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::AlreadyCalibrating`] if a window is already
    /// open. The running session and the committed range are left untouched.
    pub fn start(&mut self, duration_ms: u64, now_ms: u64) -> CalibrationResult<()> {
        if self.session.is_some() {
            return Err(CalibrationError::AlreadyCalibrating);
        }
        self.session = Some(CaptureSession::new(duration_ms, now_ms));
        Ok(())
    }

    /// Feeds one sample into the running session, if any.
    ///
    /// Returns the newly committed range when this sample closed the window.
    pub fn observe(&mut self, left_raw: u16, right_raw: u16, now_ms: u64) -> Option<CalibrationRange> {
        let session = self.session.as_mut()?;
        session.widen(left_raw, right_raw);

        if session.is_expired(now_ms) {
            return self.commit();
        }
        None
    }

    /// Commits the running session immediately.
    ///
    /// # Errors
    ///
    /// Returns [`CalibrationError::NotCalibrating`] if no window is open.
    pub fn stop(&mut self) -> CalibrationResult<CalibrationRange> {
        self.commit().ok_or(CalibrationError::NotCalibrating)
    }

    /// Restores the identity range and drops any running session uncommitted.
    pub fn reset(&mut self) {
        self.range = CalibrationRange::identity();
        self.session = None;
    }

    pub fn get(&self) -> CalibrationRange {
        self.range
    }

    /// Replaces the committed range as-is. No validation is performed.
    pub fn set(&mut self, range: CalibrationRange) {
        self.range = range;
    }

    pub fn is_calibrating(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref()
    }

    /// Maps `raw` through `[min, max]`, or passes it through while uncalibrated.
    pub fn normalize(&self, raw: u16, min: u16, max: u16) -> u16 {
        if self.range.calibrated {
            crate::normalize(raw, min, max)
        } else {
            raw
        }
    }

    pub fn normalize_left(&self, raw: u16) -> u16 {
        self.normalize(raw, self.range.left_min, self.range.left_max)
    }

    pub fn normalize_right(&self, raw: u16) -> u16 {
        self.normalize(raw, self.range.right_min, self.range.right_max)
    }

    fn commit(&mut self) -> Option<CalibrationRange> {
        let session = self.session.take()?;
        self.range = session.into_range();
        Some(self.range)
    }
}
