//! Periodic status reporting

use std::sync::Arc;
use std::time::Duration;

use paddle_hid::HostLink;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::counters::{PacketCounters, StatsSnapshot};
use crate::transport::TransportStatus;

/// One status line's worth of state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct StatusReport {
    pub transport_running: bool,
    pub host_connected: bool,
    pub stats: StatsSnapshot,
}

/// Reads shared state only; never touches the bridge itself.
#[derive(Debug, Clone)]
pub struct StatusReporter {
    counters: Arc<PacketCounters>,
    link: HostLink,
    transport: TransportStatus,
    period: Duration,
}

impl StatusReporter {
    pub fn new(
        counters: Arc<PacketCounters>,
        link: HostLink,
        transport: TransportStatus,
        period: Duration,
    ) -> Self {
        Self {
            counters,
            link,
            transport,
            period,
        }
    }

    pub fn snapshot(&self) -> StatusReport {
        StatusReport {
            transport_running: self.transport.is_running(),
            host_connected: self.link.is_connected(),
            stats: self.counters.snapshot(),
        }
    }

    pub fn log(&self) -> StatusReport {
        let report = self.snapshot();
        info!(
            transport = if report.transport_running { "running" } else { "stopped" },
            host = if report.host_connected { "connected" } else { "disconnected" },
            packets = report.stats.total_packets,
            bytes = report.stats.total_bytes,
            undersized = report.stats.undersized_packets,
            reports_sent = report.stats.reports_sent,
            reports_dropped = report.stats.reports_dropped,
            queue_overflows = report.stats.queue_overflows,
            "bridge status"
        );
        report
    }

    /// Logs a status line every period until `shutdown` flips to true or its
    /// sender is dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.log();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        debug!("status reporter stopped");
    }
}
