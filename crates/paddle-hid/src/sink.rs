//! Report sinks: where normalized paddle values go

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::report::{AxisScale, PaddleReport};
use crate::{HidError, HidResult};

/// Consumer of normalized `(left, right)` pairs.
///
/// Values arrive already bounded to `0..=4095`; any widening to the host's
/// axis range happens inside the sink.
pub trait ReportSink: Send {
    fn send(&mut self, left: u16, right: u16) -> HidResult<()>;

    fn is_connected(&self) -> bool;
}

/// Shared host-connection flag.
///
/// The USB stack flips it from its mount/unmount callbacks; the status task
/// reads it from another context.
#[derive(Debug, Clone, Default)]
pub struct HostLink(Arc<AtomicBool>);

impl HostLink {
    pub fn new(connected: bool) -> Self {
        Self(Arc::new(AtomicBool::new(connected)))
    }

    pub fn set_connected(&self, connected: bool) {
        self.0.store(connected, Ordering::Release);
    }

    pub fn is_connected(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Low-level HID interrupt endpoint.
pub trait ReportWriter: Send {
    /// Whether the endpoint can accept another report right now.
    fn is_ready(&self) -> bool;

    fn write_report(&mut self, data: &[u8]) -> HidResult<usize>;
}

/// Sink that scales, encodes and writes gamepad reports to a HID endpoint.
pub struct HidReportSink<W: ReportWriter> {
    writer: W,
    link: HostLink,
    scale: AxisScale,
    current: PaddleReport,
}

impl<W: ReportWriter> HidReportSink<W> {
    pub fn new(writer: W, link: HostLink, scale: AxisScale) -> Self {
        Self {
            writer,
            link,
            scale,
            current: PaddleReport::default(),
        }
    }

    /// Last report accepted while mounted, for GET_REPORT requests.
    pub fn current_report(&self) -> PaddleReport {
        self.current
    }

    pub fn link(&self) -> &HostLink {
        &self.link
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }
}

impl<W: ReportWriter> ReportSink for HidReportSink<W> {
    fn send(&mut self, left: u16, right: u16) -> HidResult<()> {
        if !self.link.is_connected() {
            return Err(HidError::Disconnected);
        }

        self.current = PaddleReport::new(left, right);
        if !self.writer.is_ready() {
            return Err(HidError::NotReady);
        }

        let bytes = self.current.encode(self.scale);
        self.writer.write_report(&bytes)?;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.link.is_connected()
    }
}

/// Sink that only logs reports. Used when running without a USB device.
pub struct LogReportSink {
    link: HostLink,
    scale: AxisScale,
    sent: u64,
}

impl LogReportSink {
    pub fn new(scale: AxisScale) -> Self {
        Self {
            link: HostLink::new(true),
            scale,
            sent: 0,
        }
    }

    pub fn link(&self) -> &HostLink {
        &self.link
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl ReportSink for LogReportSink {
    fn send(&mut self, left: u16, right: u16) -> HidResult<()> {
        let report = PaddleReport::new(left, right);
        let bytes = report.encode(self.scale);
        self.sent = self.sent.wrapping_add(1);
        debug!(left, right, report = ?bytes, "HID report");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.link.is_connected()
    }
}

pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// In-memory sink recording every report it accepts.
    ///
    /// Clones share history and connection state.
    #[derive(Clone)]
    pub struct MockReportSink {
        link: HostLink,
        history: Arc<Mutex<Vec<PaddleReport>>>,
        attempts: Arc<Mutex<usize>>,
    }

    impl MockReportSink {
        pub fn new() -> Self {
            Self {
                link: HostLink::new(true),
                history: Arc::new(Mutex::new(Vec::new())),
                attempts: Arc::new(Mutex::new(0)),
            }
        }

        pub fn disconnected() -> Self {
            let sink = Self::new();
            sink.disconnect();
            sink
        }

        pub fn disconnect(&self) {
            self.link.set_connected(false);
        }

        pub fn reconnect(&self) {
            self.link.set_connected(true);
        }

        pub fn link(&self) -> HostLink {
            self.link.clone()
        }

        pub fn reports(&self) -> Vec<PaddleReport> {
            self.history
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone()
        }

        pub fn last_report(&self) -> Option<PaddleReport> {
            self.history
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .last()
                .copied()
        }

        /// Number of `send` calls, accepted or not.
        pub fn attempts(&self) -> usize {
            *self.attempts.lock().unwrap_or_else(|e| e.into_inner())
        }
    }

    impl Default for MockReportSink {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ReportSink for MockReportSink {
        fn send(&mut self, left: u16, right: u16) -> HidResult<()> {
            *self.attempts.lock().unwrap_or_else(|e| e.into_inner()) += 1;
            if !self.link.is_connected() {
                return Err(HidError::Disconnected);
            }
            self.history
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(PaddleReport::new(left, right));
            Ok(())
        }

        fn is_connected(&self) -> bool {
            self.link.is_connected()
        }
    }
}
