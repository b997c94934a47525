//! Receive side of the wireless link.
//!
//! The radio driver hands packets to [`TransportReceiver::deliver`] from its
//! own context. Packets cross into the processing worker through a bounded
//! queue; when the worker falls behind, new packets are dropped rather than
//! queued, since a stale paddle position is worth less than a fresh one.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::counters::PacketCounters;
use crate::error::{BridgeError, BridgeResult};

/// Length of a link-layer sender address.
pub const SENDER_ID_LEN: usize = 6;

/// 6-byte link-layer address of a paddle transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SenderId(pub [u8; SENDER_ID_LEN]);

impl SenderId {
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; SENDER_ID_LEN] = bytes.get(..SENDER_ID_LEN)?.try_into().ok()?;
        Some(Self(bytes))
    }
}

impl fmt::Display for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl FromStr for SenderId {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = [0u8; SENDER_ID_LEN];
        let mut parts = s.split([':', '-']);
        for byte in &mut out {
            let part = parts
                .next()
                .ok_or(BridgeError::InvalidArgument("sender id has too few octets"))?;
            *byte = u8::from_str_radix(part, 16)
                .map_err(|_| BridgeError::InvalidArgument("sender id octet is not hex"))?;
        }
        if parts.next().is_some() {
            return Err(BridgeError::InvalidArgument("sender id has too many octets"));
        }
        Ok(Self(out))
    }
}

impl Serialize for SenderId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SenderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A packet waiting in the receive queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundPacket {
    pub sender: SenderId,
    pub payload: Vec<u8>,
}

/// Splits a framed datagram into sender address and payload.
///
/// Frame layout: 6-byte sender id followed by the raw wireless payload.
pub fn parse_datagram(frame: &[u8]) -> Option<(SenderId, &[u8])> {
    let sender = SenderId::from_slice(frame)?;
    let payload = frame.get(SENDER_ID_LEN..)?;
    Some((sender, payload))
}

/// Shared running/stopped flag of the receiver, polled by the status task.
#[derive(Debug, Clone)]
pub struct TransportStatus(Arc<AtomicBool>);

impl TransportStatus {
    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Producer half of the receive queue.
#[derive(Debug, Clone)]
pub struct TransportReceiver {
    tx: mpsc::Sender<InboundPacket>,
    counters: Arc<PacketCounters>,
    running: Arc<AtomicBool>,
}

/// Consumer half of the receive queue, owned by the worker.
pub type PacketQueue = mpsc::Receiver<InboundPacket>;

/// Creates a receive queue holding at most `capacity` packets.
pub fn channel(capacity: usize, counters: Arc<PacketCounters>) -> (TransportReceiver, PacketQueue) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let receiver = TransportReceiver {
        tx,
        counters,
        running: Arc::new(AtomicBool::new(true)),
    };
    (receiver, rx)
}

impl TransportReceiver {
    /// Queues a packet for processing without blocking.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::InvalidArgument`] for a missing sender or empty payload
    /// - [`BridgeError::Queue`] when the queue is full or the worker has gone
    pub fn deliver(&self, sender: Option<SenderId>, payload: &[u8]) -> BridgeResult<()> {
        let sender = sender.ok_or(BridgeError::InvalidArgument("missing sender id"))?;
        if payload.is_empty() {
            return Err(BridgeError::InvalidArgument("empty payload"));
        }
        if !self.is_running() {
            return Err(BridgeError::Queue("stopped"));
        }

        debug!(%sender, len = payload.len(), "packet received");

        let packet = InboundPacket {
            sender,
            payload: payload.to_vec(),
        };
        match self.tx.try_send(packet) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.counters.inc_queue_overflow();
                warn!(%sender, "receive queue full, dropping packet");
                Err(BridgeError::Queue("full"))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(BridgeError::Queue("closed")),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire) && !self.tx.is_closed()
    }

    /// Stops accepting packets. Already queued packets are still processed.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn status(&self) -> TransportStatus {
        TransportStatus(Arc::clone(&self.running))
    }
}
