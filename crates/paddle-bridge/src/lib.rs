//! Wireless clutch-paddle bridge.
//!
//! Raw paddle samples arrive over a point-to-point wireless link, pass
//! through a runtime-adjustable min/max calibration and leave as a dual-axis
//! HID gamepad report.
//!
//! ```text
//! TransportReceiver ──queue──▶ BridgeWorker ─▶ PaddleBridge::process
//!                                   ▲              │ decode, calibrate
//!                  BridgeHandle ────┘              ▼
//!                  (commands)                 ReportSink
//! ```
//!
//! [`PaddleBridge`] can also be driven directly, which is what the tests and
//! the capture replay do:
//!
//! ```
//! use paddle_bridge::{PaddleBridge, SenderId};
//! use paddle_hid::mock::MockReportSink;
//!
//! let mut bridge = PaddleBridge::new(MockReportSink::new());
//! bridge.init();
//!
//! let sender = SenderId([0x24, 0x6F, 0x28, 0x10, 0x20, 0x30]);
//! let report = bridge.process(Some(&sender), &[0x01, 0x00, 0xFF, 0x0F])?;
//! assert_eq!((report.left, report.right), (1, 4095));
//! assert_eq!(bridge.get_stats(), (1, 4));
//! # Ok::<(), paddle_bridge::BridgeError>(())
//! ```

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

pub mod clock;
pub mod config;
pub mod console;
pub mod counters;
pub mod error;
pub mod processor;
pub mod replay;
pub mod status;
pub mod transport;
pub mod worker;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::BridgeConfig;
pub use counters::{PacketCounters, StatsSnapshot};
pub use error::{BridgeError, BridgeResult};
pub use processor::{PacketInfo, PaddleBridge};
pub use status::{StatusReport, StatusReporter};
pub use transport::{InboundPacket, SenderId, TransportReceiver, TransportStatus};
pub use worker::{BridgeCommand, BridgeHandle, BridgeWorker};
