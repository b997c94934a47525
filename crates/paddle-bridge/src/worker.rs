//! Worker task owning the bridge.
//!
//! Packets and calibration commands arrive on separate channels. Commands
//! are drained first so a calibration request takes effect before the next
//! packet, never in the middle of one.

use paddle_calibration::CalibrationRange;
use paddle_hid::ReportSink;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::counters::StatsSnapshot;
use crate::error::{BridgeError, BridgeResult};
use crate::processor::{PacketInfo, PaddleBridge};
use crate::transport::PacketQueue;

const COMMAND_QUEUE_CAPACITY: usize = 16;

/// Commands sent to the bridge worker
#[derive(Debug)]
pub enum BridgeCommand {
    StartCalibration {
        duration_ms: u64,
        response: oneshot::Sender<BridgeResult<()>>,
    },
    StopCalibration {
        response: oneshot::Sender<BridgeResult<CalibrationRange>>,
    },
    ResetCalibration {
        response: oneshot::Sender<()>,
    },
    SetCalibration {
        range: CalibrationRange,
        response: oneshot::Sender<()>,
    },
    GetCalibration {
        response: oneshot::Sender<CalibrationRange>,
    },
    IsCalibrating {
        response: oneshot::Sender<bool>,
    },
    GetStats {
        response: oneshot::Sender<StatsSnapshot>,
    },
    LastPacket {
        response: oneshot::Sender<Option<PacketInfo>>,
    },
    /// Stop the worker. Packets still queued are discarded.
    Shutdown,
}

/// Cloneable front end for a running [`BridgeWorker`].
#[derive(Debug, Clone)]
pub struct BridgeHandle {
    command_tx: mpsc::Sender<BridgeCommand>,
}

impl BridgeHandle {
    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> BridgeCommand,
    ) -> BridgeResult<T> {
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(make(response_tx))
            .await
            .map_err(|_closed| BridgeError::Queue("closed"))?;
        response_rx
            .await
            .map_err(|_dropped| BridgeError::Queue("closed"))
    }

    pub async fn start_calibration(&self, duration_ms: u64) -> BridgeResult<()> {
        self.request(|response| BridgeCommand::StartCalibration {
            duration_ms,
            response,
        })
        .await?
    }

    pub async fn stop_calibration(&self) -> BridgeResult<CalibrationRange> {
        self.request(|response| BridgeCommand::StopCalibration { response })
            .await?
    }

    pub async fn reset_calibration(&self) -> BridgeResult<()> {
        self.request(|response| BridgeCommand::ResetCalibration { response })
            .await
    }

    pub async fn set_calibration(&self, range: CalibrationRange) -> BridgeResult<()> {
        self.request(|response| BridgeCommand::SetCalibration { range, response })
            .await
    }

    pub async fn get_calibration(&self) -> BridgeResult<CalibrationRange> {
        self.request(|response| BridgeCommand::GetCalibration { response })
            .await
    }

    pub async fn is_calibrating(&self) -> BridgeResult<bool> {
        self.request(|response| BridgeCommand::IsCalibrating { response })
            .await
    }

    pub async fn stats(&self) -> BridgeResult<StatsSnapshot> {
        self.request(|response| BridgeCommand::GetStats { response })
            .await
    }

    pub async fn last_packet(&self) -> BridgeResult<Option<PacketInfo>> {
        self.request(|response| BridgeCommand::LastPacket { response })
            .await
    }

    pub async fn shutdown(&self) -> BridgeResult<()> {
        self.command_tx
            .send(BridgeCommand::Shutdown)
            .await
            .map_err(|_closed| BridgeError::Queue("closed"))
    }
}

pub struct BridgeWorker<S: ReportSink> {
    bridge: PaddleBridge<S>,
    packets: PacketQueue,
    commands: mpsc::Receiver<BridgeCommand>,
}

impl<S: ReportSink> BridgeWorker<S> {
    pub fn new(bridge: PaddleBridge<S>, packets: PacketQueue) -> (Self, BridgeHandle) {
        let (command_tx, commands) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let worker = Self {
            bridge,
            packets,
            commands,
        };
        (worker, BridgeHandle { command_tx })
    }

    /// Runs until shutdown or until both channels are closed, then hands the
    /// bridge back.
    ///
    /// The bridge must already be initialized; an uninitialized bridge is
    /// returned untouched, with its counters as they were.
    pub async fn run(mut self) -> PaddleBridge<S> {
        if !self.bridge.is_initialized() {
            warn!("bridge worker started with an uninitialized bridge");
            return self.bridge;
        }
        info!("bridge worker started");

        loop {
            tokio::select! {
                biased;

                Some(command) = self.commands.recv() => {
                    if !self.handle_command(command) {
                        break;
                    }
                }
                Some(packet) = self.packets.recv() => {
                    if let Err(e) = self.bridge.process(Some(&packet.sender), &packet.payload) {
                        debug!(sender = %packet.sender, error = %e, "packet dropped");
                    }
                }
                else => break,
            }
        }

        if self.bridge.deinit().is_err() {
            debug!("bridge already stopped");
        }
        let (packets, bytes) = self.bridge.get_stats();
        info!(packets, bytes, "bridge worker stopped");
        self.bridge
    }

    /// Returns false when the worker should stop.
    fn handle_command(&mut self, command: BridgeCommand) -> bool {
        let delivered = match command {
            BridgeCommand::StartCalibration {
                duration_ms,
                response,
            } => response
                .send(self.bridge.start_calibration(duration_ms))
                .is_ok(),
            BridgeCommand::StopCalibration { response } => {
                response.send(self.bridge.stop_calibration()).is_ok()
            }
            BridgeCommand::ResetCalibration { response } => {
                self.bridge.reset_calibration();
                response.send(()).is_ok()
            }
            BridgeCommand::SetCalibration { range, response } => {
                self.bridge.set_calibration(range);
                response.send(()).is_ok()
            }
            BridgeCommand::GetCalibration { response } => {
                response.send(self.bridge.get_calibration()).is_ok()
            }
            BridgeCommand::IsCalibrating { response } => {
                response.send(self.bridge.is_calibrating()).is_ok()
            }
            BridgeCommand::GetStats { response } => response.send(self.bridge.stats()).is_ok(),
            BridgeCommand::LastPacket { response } => {
                response.send(self.bridge.last_packet()).is_ok()
            }
            BridgeCommand::Shutdown => {
                info!("received shutdown command");
                return false;
            }
        };

        if !delivered {
            debug!("command caller went away before the response");
        }
        true
    }
}
