//! Offline replay of captured paddle traffic.
//!
//! A capture is a JSON-lines file. Each line is either a packet
//!
//! ```json
//! {"t_ms": 120, "sender": "24:6F:28:10:20:30", "payload": "0100ff0f"}
//! ```
//!
//! or a calibration command
//!
//! ```json
//! {"t_ms": 100, "command": "calibrate", "duration_ms": 2000}
//! {"t_ms": 900, "command": "stop"}
//! {"t_ms": 950, "command": "reset"}
//! {"t_ms": 990, "command": "set", "range": {"left_min": 0, "left_max": 4095, "right_min": 0, "right_max": 4095, "calibrated": true}}
//! ```
//!
//! Records are applied in file order on a manual clock set from `t_ms`, so a
//! replay is deterministic. Blank lines and lines starting with `#` are
//! skipped.

use std::io::BufRead;
use std::sync::Arc;

use paddle_calibration::CalibrationRange;
use paddle_hid::{PaddleReport, ReportSink};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::{Clock, ManualClock};
use crate::counters::StatsSnapshot;
use crate::error::{BridgeError, BridgeResult};
use crate::processor::PaddleBridge;
use crate::transport::SenderId;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CaptureRecord {
    Packet {
        t_ms: u64,
        sender: SenderId,
        /// Hex-encoded wireless payload
        payload: String,
    },
    Command {
        t_ms: u64,
        #[serde(flatten)]
        command: ReplayCommand,
    },
}

impl CaptureRecord {
    pub fn t_ms(&self) -> u64 {
        match self {
            CaptureRecord::Packet { t_ms, .. } | CaptureRecord::Command { t_ms, .. } => *t_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ReplayCommand {
    Calibrate { duration_ms: u64 },
    Stop,
    Reset,
    Set { range: CalibrationRange },
}

/// Outcome of a replay, printed as JSON by `paddled replay`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub records: usize,
    pub packets_rejected: usize,
    pub command_errors: usize,
    pub stats: StatsSnapshot,
    pub calibration: CalibrationRange,
    pub calibrating: bool,
    pub last_report: Option<PaddleReport>,
}

/// Replays `reader` through a fresh bridge writing to `sink`.
///
/// # Errors
///
/// Returns [`BridgeError::Capture`] for an unreadable or malformed line.
/// Packets the bridge rejects and failing calibration commands are counted
/// in the summary instead.
pub fn replay<R: BufRead, S: ReportSink>(
    reader: R,
    sink: S,
    initial: Option<CalibrationRange>,
) -> BridgeResult<ReplaySummary> {
    let clock = ManualClock::new(0);
    let mut bridge = PaddleBridge::with_clock(sink, Arc::new(clock.clone()));
    bridge.init();
    if let Some(range) = initial {
        bridge.set_calibration(range);
    }

    let mut records = 0usize;
    let mut packets_rejected = 0usize;
    let mut command_errors = 0usize;
    let mut last_report = None;

    for (index, line) in reader.lines().enumerate() {
        let line_no = index.saturating_add(1);
        let capture_err = |reason: String| BridgeError::Capture {
            line: line_no,
            reason,
        };

        let line = line.map_err(|e| capture_err(e.to_string()))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let record: CaptureRecord =
            serde_json::from_str(line).map_err(|e| capture_err(e.to_string()))?;
        records = records.saturating_add(1);

        // the bridge clock never runs backwards, even for unsorted captures
        if record.t_ms() > clock.now_ms() {
            clock.set(record.t_ms());
        }

        match record {
            CaptureRecord::Packet {
                sender, payload, ..
            } => {
                let bytes = hex::decode(payload.trim())
                    .map_err(|e| capture_err(format!("invalid payload hex: {e}")))?;
                match bridge.process(Some(&sender), &bytes) {
                    Ok(report) => last_report = Some(report),
                    Err(e) => {
                        packets_rejected = packets_rejected.saturating_add(1);
                        debug!(line = line_no, error = %e, "packet rejected");
                    }
                }
            }
            CaptureRecord::Command { command, .. } => {
                if let Err(e) = apply_command(&mut bridge, command) {
                    command_errors = command_errors.saturating_add(1);
                    warn!(line = line_no, error = %e, "replay command failed");
                }
            }
        }
    }

    Ok(ReplaySummary {
        records,
        packets_rejected,
        command_errors,
        stats: bridge.stats(),
        calibration: bridge.get_calibration(),
        calibrating: bridge.is_calibrating(),
        last_report,
    })
}

fn apply_command<S: ReportSink>(
    bridge: &mut PaddleBridge<S>,
    command: ReplayCommand,
) -> BridgeResult<()> {
    match command {
        ReplayCommand::Calibrate { duration_ms } => bridge.start_calibration(duration_ms),
        ReplayCommand::Stop => bridge.stop_calibration().map(|_| ()),
        ReplayCommand::Reset => {
            bridge.reset_calibration();
            Ok(())
        }
        ReplayCommand::Set { range } => {
            bridge.set_calibration(range);
            Ok(())
        }
    }
}
