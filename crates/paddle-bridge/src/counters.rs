//! Atomic packet statistics.
//!
//! [`PacketCounters`] is written only by the packet-processing path and read
//! by the status task. Every counter is an independent atomic using
//! `Ordering::Relaxed`: a snapshot may mix values from adjacent packets, which
//! is fine for monitoring.
//!
//! `total_packets` and `total_bytes` are `u32` and wrap on overflow, matching
//! the width the wireless firmware reports.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Point-in-time copy of [`PacketCounters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct StatsSnapshot {
    /// Packets that passed argument validation, including undersized ones
    pub total_packets: u32,
    /// Payload bytes of those packets
    pub total_bytes: u32,
    /// Packets rejected for being shorter than a sample
    pub undersized_packets: u64,
    /// Reports accepted by the sink
    pub reports_sent: u64,
    /// Reports the sink refused (host gone, endpoint busy)
    pub reports_dropped: u64,
    /// Packets dropped because the receive queue was full
    pub queue_overflows: u64,
}

#[derive(Debug, Default)]
pub struct PacketCounters {
    total_packets: AtomicU32,
    total_bytes: AtomicU32,
    undersized_packets: AtomicU64,
    reports_sent: AtomicU64,
    reports_dropped: AtomicU64,
    queue_overflows: AtomicU64,
}

impl PacketCounters {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total_packets: AtomicU32::new(0),
            total_bytes: AtomicU32::new(0),
            undersized_packets: AtomicU64::new(0),
            reports_sent: AtomicU64::new(0),
            reports_dropped: AtomicU64::new(0),
            queue_overflows: AtomicU64::new(0),
        }
    }

    /// Counts one received packet of `len` bytes.
    #[inline]
    pub fn record_packet(&self, len: usize) {
        let len = u32::try_from(len).unwrap_or(u32::MAX);
        self.total_packets.fetch_add(1, Ordering::Relaxed);
        self.total_bytes.fetch_add(len, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_undersized(&self) {
        self.undersized_packets.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_report(&self, delivered: bool) {
        if delivered {
            self.reports_sent.fetch_add(1, Ordering::Relaxed);
        } else {
            self.reports_dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn inc_queue_overflow(&self) {
        self.queue_overflows.fetch_add(1, Ordering::Relaxed);
    }

    /// `(total_packets, total_bytes)`.
    pub fn totals(&self) -> (u32, u32) {
        (
            self.total_packets.load(Ordering::Relaxed),
            self.total_bytes.load(Ordering::Relaxed),
        )
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_packets: self.total_packets.load(Ordering::Relaxed),
            total_bytes: self.total_bytes.load(Ordering::Relaxed),
            undersized_packets: self.undersized_packets.load(Ordering::Relaxed),
            reports_sent: self.reports_sent.load(Ordering::Relaxed),
            reports_dropped: self.reports_dropped.load(Ordering::Relaxed),
            queue_overflows: self.queue_overflows.load(Ordering::Relaxed),
        }
    }

    /// Zeroes every counter. Only called when the bridge is re-initialized.
    pub fn reset(&self) {
        self.total_packets.store(0, Ordering::Relaxed);
        self.total_bytes.store(0, Ordering::Relaxed);
        self.undersized_packets.store(0, Ordering::Relaxed);
        self.reports_sent.store(0, Ordering::Relaxed);
        self.reports_dropped.store(0, Ordering::Relaxed);
        self.queue_overflows.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_record_packet() {
        let counters = PacketCounters::new();
        counters.record_packet(4);
        counters.record_packet(3);
        assert_eq!(counters.totals(), (2, 7));
    }

    #[test]
    fn test_report_outcomes() {
        let counters = PacketCounters::new();
        counters.record_report(true);
        counters.record_report(true);
        counters.record_report(false);

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.reports_sent, 2);
        assert_eq!(snapshot.reports_dropped, 1);
    }

    #[test]
    fn test_totals_wrap() {
        let counters = PacketCounters::new();
        counters.record_packet(usize::MAX);
        counters.record_packet(1);
        // u32::MAX + 1 wraps to zero
        assert_eq!(counters.totals(), (2, 0));
    }

    #[test]
    fn test_reset() {
        let counters = PacketCounters::new();
        counters.record_packet(10);
        counters.inc_undersized();
        counters.inc_queue_overflow();
        counters.reset();
        assert_eq!(counters.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_concurrent_reader_sees_monotonic_totals() {
        let counters = Arc::new(PacketCounters::new());
        let writer = Arc::clone(&counters);

        let handle = std::thread::spawn(move || {
            for _ in 0..10_000 {
                writer.record_packet(4);
            }
        });

        let mut last = 0;
        for _ in 0..1_000 {
            let (packets, _) = counters.totals();
            assert!(packets >= last);
            last = packets;
        }

        assert!(handle.join().is_ok());
        assert_eq!(counters.totals(), (10_000, 40_000));
    }
}
