//! Packet processor: validation, decode, calibration and report forwarding.
//!
//! [`PaddleBridge`] is the owned context for the whole data path. It is not
//! shared: one task owns it (see [`crate::worker::BridgeWorker`]) and every
//! other context talks to it through messages or reads the shared
//! [`PacketCounters`].

use std::sync::Arc;

use paddle_calibration::{CalibrationEngine, CalibrationRange};
use paddle_hid::{PAYLOAD_MIN_LEN, PaddleReport, RawSample, ReportSink};
use tracing::{debug, info, trace, warn};

use crate::clock::{Clock, MonotonicClock};
use crate::counters::{PacketCounters, StatsSnapshot};
use crate::error::{BridgeError, BridgeResult};
use crate::transport::SenderId;

/// Metadata of the most recent packet that passed argument validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PacketInfo {
    pub sender: SenderId,
    pub timestamp_ms: u64,
    pub len: usize,
}

pub struct PaddleBridge<S: ReportSink> {
    sink: S,
    calibration: CalibrationEngine,
    counters: Arc<PacketCounters>,
    clock: Arc<dyn Clock>,
    initialized: bool,
    last_packet: Option<PacketInfo>,
}

impl<S: ReportSink> PaddleBridge<S> {
    /// Creates an uninitialized bridge on the monotonic clock.
    pub fn new(sink: S) -> Self {
        Self::with_clock(sink, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(sink: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            sink,
            calibration: CalibrationEngine::new(),
            counters: Arc::new(PacketCounters::new()),
            clock,
            initialized: false,
            last_packet: None,
        }
    }

    /// Starts accepting packets.
    ///
    /// Calling `init` on a running bridge is a no-op. Re-initializing after
    /// [`deinit`](Self::deinit) clears statistics but keeps calibration.
    pub fn init(&mut self) {
        if self.initialized {
            warn!("paddle bridge already initialized");
            return;
        }
        self.counters.reset();
        self.last_packet = None;
        self.initialized = true;
        info!(
            calibrated = self.calibration.get().calibrated,
            "paddle bridge initialized"
        );
    }

    /// # Errors
    ///
    /// Returns [`BridgeError::NotInitialized`] if the bridge is not running.
    pub fn deinit(&mut self) -> BridgeResult<()> {
        if !self.initialized {
            return Err(BridgeError::NotInitialized);
        }
        self.initialized = false;
        info!("paddle bridge stopped");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Processes one wireless packet and forwards the normalized pair.
    ///
    /// Packets are counted before size validation, so undersized packets
    /// show up in [`get_stats`](Self::get_stats). A failing sink is logged
    /// and counted but does not fail the call.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::NotInitialized`] before [`init`](Self::init)
    /// - [`BridgeError::InvalidArgument`] for a missing sender or empty payload
    /// - [`BridgeError::InvalidSize`] for payloads shorter than 4 bytes
    pub fn process(
        &mut self,
        sender: Option<&SenderId>,
        payload: &[u8],
    ) -> BridgeResult<PaddleReport> {
        if !self.initialized {
            return Err(BridgeError::NotInitialized);
        }
        let sender = sender.ok_or(BridgeError::InvalidArgument("missing sender id"))?;
        if payload.is_empty() {
            return Err(BridgeError::InvalidArgument("empty payload"));
        }

        let now_ms = self.clock.now_ms();
        self.counters.record_packet(payload.len());
        self.last_packet = Some(PacketInfo {
            sender: *sender,
            timestamp_ms: now_ms,
            len: payload.len(),
        });

        if payload.len() < PAYLOAD_MIN_LEN {
            self.counters.inc_undersized();
            warn!(%sender, len = payload.len(), "undersized paddle packet");
            return Err(BridgeError::InvalidSize {
                expected: PAYLOAD_MIN_LEN,
                actual: payload.len(),
            });
        }

        let sample = RawSample::decode(payload)?;

        if let Some(range) = self
            .calibration
            .observe(sample.left_raw, sample.right_raw, now_ms)
        {
            info!(?range, "calibration window elapsed, range committed");
        } else if self.calibration.is_calibrating() {
            trace!(
                left = sample.left_raw,
                right = sample.right_raw,
                "calibration sample"
            );
        }

        let left = self.calibration.normalize_left(sample.left_raw);
        let right = self.calibration.normalize_right(sample.right_raw);
        debug!(
            %sender,
            left_raw = sample.left_raw,
            right_raw = sample.right_raw,
            left,
            right,
            "paddle sample"
        );

        match self.sink.send(left, right) {
            Ok(()) => self.counters.record_report(true),
            Err(e) => {
                self.counters.record_report(false);
                debug!(error = %e, "HID report not sent");
            }
        }

        Ok(PaddleReport::new(left, right))
    }

    /// `(total_packets, total_bytes)`.
    pub fn get_stats(&self) -> (u32, u32) {
        self.counters.totals()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.counters.snapshot()
    }

    /// Shared counters, for readers in other tasks.
    pub fn counters(&self) -> Arc<PacketCounters> {
        Arc::clone(&self.counters)
    }

    pub fn last_packet(&self) -> Option<PacketInfo> {
        self.last_packet
    }

    /// Opens a capture window of `duration_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Calibration`] if a capture is already running.
    pub fn start_calibration(&mut self, duration_ms: u64) -> BridgeResult<()> {
        self.calibration.start(duration_ms, self.clock.now_ms())?;
        info!(duration_ms, "calibration started");
        Ok(())
    }

    /// Ends the capture window early and commits what was captured.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Calibration`] if no capture is running.
    pub fn stop_calibration(&mut self) -> BridgeResult<CalibrationRange> {
        let range = self.calibration.stop()?;
        info!(?range, "calibration stopped");
        Ok(range)
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibration.is_calibrating()
    }

    pub fn get_calibration(&self) -> CalibrationRange {
        self.calibration.get()
    }

    /// Replaces the committed range as-is. A running capture is unaffected.
    pub fn set_calibration(&mut self, range: CalibrationRange) {
        if range.calibrated && range.is_degenerate() {
            warn!(?range, "degenerate calibration range, affected axis will read 0");
        }
        self.calibration.set(range);
        info!(?range, "calibration set");
    }

    pub fn reset_calibration(&mut self) {
        self.calibration.reset();
        info!("calibration reset");
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
