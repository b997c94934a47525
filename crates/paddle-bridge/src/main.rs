//! paddled - wireless clutch-paddle bridge host
//!
//! `run` receives framed paddle packets over UDP (6-byte sender id followed
//! by the payload) and logs the HID reports it would send. `replay` feeds a
//! JSON-lines capture through the same pipeline offline.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

use std::io::BufReader;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use paddle_bridge::console::{self, ConsoleCommand};
use paddle_bridge::{
    BridgeConfig, BridgeHandle, BridgeWorker, PaddleBridge, StatusReporter, TransportReceiver,
    replay, transport,
};
use paddle_hid::{
    AxisScale, LogReportSink, PRODUCT_ID_CLUTCH_PADDLES, VENDOR_ID_GENERIC, report_descriptor,
};
use tokio::io::{AsyncBufReadExt, BufReader as AsyncBufReader};
use tokio::net::UdpSocket;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Largest datagram accepted: sender id plus a 250-byte wireless frame.
const MAX_DATAGRAM: usize = 256;

/// Pause after a failed receive before polling the socket again.
const RECV_RETRY_DELAY: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "paddled")]
#[command(about = "Wireless clutch-paddle bridge: calibrate raw paddle samples into HID reports")]
#[command(version)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true, env = "PADDLED_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bridge on a UDP transport with a command console on stdin
    Run {
        /// Address to receive framed paddle packets on
        #[arg(long)]
        listen: Option<SocketAddr>,
    },

    /// Replay a JSON-lines capture and print the resulting state
    Replay {
        /// Capture file
        file: PathBuf,
    },

    /// Print the HID report descriptor
    Descriptor {
        /// Axis resolution (defaults to the configured one)
        #[arg(long, value_enum)]
        scale: Option<ScaleArg>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ScaleArg {
    Native,
    Wide,
}

impl From<ScaleArg> for AxisScale {
    fn from(scale: ScaleArg) -> Self {
        match scale {
            ScaleArg::Native => AxisScale::Native,
            ScaleArg::Wide => AxisScale::Wide,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let default_filter =
        format!("paddled={log_level},paddle_bridge={log_level},paddle_hid={log_level}");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = BridgeConfig::load_or_default(cli.config.as_deref());

    match cli.command {
        Commands::Run { listen } => run(config, listen).await,
        Commands::Replay { file } => replay_file(&config, &file),
        Commands::Descriptor { scale } => {
            let scale = scale.map_or(config.axis_scale, AxisScale::from);
            print_descriptor(scale);
            Ok(())
        }
    }
}

async fn run(config: BridgeConfig, listen: Option<SocketAddr>) -> Result<()> {
    let listen = listen.unwrap_or(config.listen);

    let sink = LogReportSink::new(config.axis_scale);
    let link = sink.link().clone();
    let mut bridge = PaddleBridge::new(sink);
    if let Some(range) = config.initial_calibration {
        bridge.set_calibration(range);
    }
    bridge.init();

    let counters = bridge.counters();
    let (receiver, queue) = transport::channel(config.queue_capacity, Arc::clone(&counters));
    let (worker, handle) = BridgeWorker::new(bridge, queue);
    let worker_task = tokio::spawn(worker.run());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let reporter = StatusReporter::new(
        counters,
        link,
        receiver.status(),
        config.status_interval(),
    );
    let status_task = tokio::spawn(reporter.clone().run(shutdown_rx));

    let socket = UdpSocket::bind(listen)
        .await
        .with_context(|| format!("Failed to bind {listen}"))?;
    info!(%listen, "listening for paddle packets");
    let udp_task = tokio::spawn(receive_datagrams(socket, receiver.clone()));

    println!("{}", console::HELP);
    console_loop(&handle, &reporter, &config).await?;

    info!("shutting down");
    receiver.shutdown();
    udp_task.abort();
    if handle.shutdown().await.is_err() {
        debug!("worker already stopped");
    }
    if shutdown_tx.send(true).is_err() {
        debug!("status reporter already stopped");
    }

    let bridge = worker_task.await.context("bridge worker panicked")?;
    status_task.await.context("status reporter panicked")?;
    let (packets, bytes) = bridge.get_stats();
    info!(packets, bytes, "bridge stopped");
    Ok(())
}

async fn receive_datagrams(socket: UdpSocket, receiver: TransportReceiver) {
    let mut buf = [0u8; MAX_DATAGRAM];
    loop {
        let (len, peer) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(e) => {
                warn!(error = %e, "UDP receive failed");
                tokio::time::sleep(RECV_RETRY_DELAY).await;
                continue;
            }
        };

        let Some((sender, payload)) = buf.get(..len).and_then(transport::parse_datagram) else {
            warn!(%peer, len, "datagram shorter than a sender id");
            continue;
        };

        if let Err(e) = receiver.deliver(Some(sender), payload) {
            debug!(%peer, error = %e, "packet not queued");
        }
    }
}

async fn console_loop(
    handle: &BridgeHandle,
    reporter: &StatusReporter,
    config: &BridgeConfig,
) -> Result<()> {
    let mut lines = AsyncBufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            signal = &mut ctrl_c => {
                signal.context("Failed to listen for Ctrl+C")?;
                info!("received Ctrl+C");
                return Ok(());
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    debug!("stdin closed, console disabled");
                    stdin_open = false;
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<ConsoleCommand>() {
                    Ok(ConsoleCommand::Quit) => return Ok(()),
                    Ok(command) => {
                        if let Err(e) = execute(command, handle, reporter, config).await {
                            println!("error: {e}");
                        }
                    }
                    Err(e) => println!("error: {e} (try `help`)"),
                }
            }
        }
    }
}

async fn execute(
    command: ConsoleCommand,
    handle: &BridgeHandle,
    reporter: &StatusReporter,
    config: &BridgeConfig,
) -> Result<()> {
    match command {
        ConsoleCommand::Calibrate(duration) => {
            let duration_ms = duration.unwrap_or(config.default_calibration_ms);
            handle.start_calibration(duration_ms).await?;
            println!("calibrating for {duration_ms} ms; move both paddles through their full travel");
        }
        ConsoleCommand::Stop => {
            let range = handle.stop_calibration().await?;
            println!("{}", serde_json::to_string_pretty(&range)?);
        }
        ConsoleCommand::Reset => {
            handle.reset_calibration().await?;
            println!("calibration reset");
        }
        ConsoleCommand::Set(range) => {
            handle.set_calibration(range).await?;
            println!("calibration set");
        }
        ConsoleCommand::Show => {
            let range = handle.get_calibration().await?;
            let calibrating = handle.is_calibrating().await?;
            println!("{}", serde_json::to_string_pretty(&range)?);
            if calibrating {
                println!("capture in progress");
            }
        }
        ConsoleCommand::Stats => {
            let status = reporter.snapshot();
            let last_packet = handle.last_packet().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
            if let Some(packet) = last_packet {
                println!("{}", serde_json::to_string_pretty(&packet)?);
            }
        }
        ConsoleCommand::Help => println!("{}", console::HELP),
        ConsoleCommand::Quit => {}
    }
    Ok(())
}

fn replay_file(config: &BridgeConfig, path: &Path) -> Result<()> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open capture {}", path.display()))?;
    let sink = LogReportSink::new(config.axis_scale);
    let summary = replay::replay(BufReader::new(file), sink, config.initial_calibration)
        .with_context(|| format!("Failed to replay {}", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn print_descriptor(scale: AxisScale) {
    let descriptor = report_descriptor(scale);
    let bytes: Vec<String> = descriptor.iter().map(|b| format!("{b:02X}")).collect();
    println!("vid:pid {VENDOR_ID_GENERIC:04x}:{PRODUCT_ID_CLUTCH_PADDLES:04x}");
    println!("{}", bytes.join(" "));
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddle_bridge::{PacketCounters, SenderId};

    #[test]
    fn test_receive_retry_is_paced() {
        assert!(RECV_RETRY_DELAY >= Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_datagrams_are_queued_by_sender() -> Result<(), Box<dyn std::error::Error>> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = socket.local_addr()?;
        let (receiver, mut queue) = transport::channel(4, Arc::new(PacketCounters::new()));
        let task = tokio::spawn(receive_datagrams(socket, receiver));

        let peer = UdpSocket::bind("127.0.0.1:0").await?;
        peer.send_to(&[1, 2, 3], addr).await?;
        peer.send_to(&[1, 2, 3, 4, 5, 6, 0x01, 0x00, 0xFF, 0x0F], addr).await?;

        let packet = queue.recv().await.ok_or("queue closed")?;
        assert_eq!(packet.sender, SenderId([1, 2, 3, 4, 5, 6]));
        assert_eq!(packet.payload, vec![0x01, 0x00, 0xFF, 0x0F]);
        assert!(queue.try_recv().is_err());

        task.abort();
        Ok(())
    }
}
