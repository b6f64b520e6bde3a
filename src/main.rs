mod channel;
mod decode;
mod error;
mod format;
mod frame;
mod nmea;
mod router;
mod segment;
mod sink;
mod source;
mod state;
mod types;

use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn, LevelFilter};
use structopt::StructOpt;

use crate::error::ConfigError;
use crate::frame::FrameBuffer;
use crate::sink::UdpSink;
use crate::source::{ByteSource, FileReplaySource, SerialSource, SourceRead};
use crate::state::LiveStore;

#[derive(Debug, StructOpt)]
#[structopt(name = "fastnet2ip", about = "Translates a Fastnet instrument bus to NMEA-0183 over UDP.")]
struct Opt {
    /// Serial device to read the bus from, e.g. /dev/ttyUSB0
    #[structopt(long, name = "SERIAL", parse(from_os_str), conflicts_with = "FILE")]
    serial: Option<PathBuf>,

    /// Replay a captured hex file instead of reading a live serial device
    #[structopt(long, name = "FILE", parse(from_os_str), conflicts_with = "SERIAL")]
    file: Option<PathBuf>,

    /// UDP port to broadcast NMEA sentences on
    #[structopt(long, default_value = "2002")]
    udp_port: u16,

    /// Logging verbosity: DEBUG, INFO, WARNING, ERROR, CRITICAL, or OFF
    #[structopt(long, default_value = "INFO")]
    log_level: String,

    /// Print a human-readable live-data table to stdout while running
    #[structopt(long)]
    live_data: bool,

    /// Interval at which the live-data table is printed, in milliseconds
    #[structopt(long, default_value = "250")]
    interval: u64,
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_ascii_uppercase().as_str() {
        "DEBUG" => LevelFilter::Debug,
        "INFO" => LevelFilter::Info,
        "WARNING" => LevelFilter::Warn,
        "ERROR" => LevelFilter::Error,
        "CRITICAL" => LevelFilter::Error,
        "OFF" => LevelFilter::Off,
        other => {
            eprintln!("unrecognized log level {:?}, defaulting to INFO", other);
            LevelFilter::Info
        }
    }
}

fn open_source(opt: &Opt) -> Result<Box<dyn ByteSource>> {
    match (&opt.serial, &opt.file) {
        (Some(_), Some(_)) => Err(ConfigError::ConflictingInputSources.into()),
        (Some(device), None) => {
            let source = SerialSource::open(device.to_string_lossy().as_ref())?;
            Ok(Box::new(source))
        }
        (None, Some(path)) => {
            let source = FileReplaySource::open(path)?;
            Ok(Box::new(source))
        }
        (None, None) => Err(ConfigError::NoInputSource.into()),
    }
}

/// Reads raw bytes, extracts frames, decodes channels, and forwards resulting NMEA sentences to
/// `tx`. Runs until the byte source reports a terminal error or reaches end of file.
fn reader_thread(
    mut source: Box<dyn ByteSource>,
    store: Arc<LiveStore>,
    tx: mpsc::Sender<String>,
) -> Result<()> {
    let mut buffer = FrameBuffer::new();
    let mut chunk = [0u8; 256];

    loop {
        match source.read_chunk(&mut chunk).context("error reading from byte source")? {
            SourceRead::Eof => {
                info!("byte source reached end of stream");
                return Ok(());
            }
            // No bytes arrived this tick (a serial read timeout on a quiet bus); loop and read
            // again rather than treating this as the end of the stream.
            SourceRead::Idle => continue,
            SourceRead::Data(n) => {
                buffer.append(&chunk[..n]);

                for frame in buffer.drain() {
                    for sentence in decode::process_frame(&frame, &store) {
                        if tx.send(sentence).is_err() {
                            // Sink thread is gone; nothing more to do.
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

/// Drains produced sentences and sends each as a UDP datagram.
fn sink_thread(sink: UdpSink, rx: mpsc::Receiver<String>) {
    for sentence in rx {
        if let Err(e) = sink.send(&sentence) {
            warn!("failed to send sentence: {:#}", e);
        }
    }
}

/// Periodically prints every channel's latest value, sorted by name.
fn live_data_thread(store: Arc<LiveStore>, interval: Duration) {
    loop {
        thread::sleep(interval);
        for (name, record) in store.snapshot() {
            println!(
                "{:>28} [{:#04x}] = {:?} @ {}",
                name, record.channel_id, record.value, record.timestamp
            );
        }
        println!("---");
    }
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    env_logger::Builder::new().filter_level(parse_log_level(&opt.log_level)).init();

    let source = open_source(&opt)?;
    let sink = UdpSink::open(opt.udp_port)
        .with_context(|| format!("unable to open UDP sink on port {}", opt.udp_port))?;

    let store = Arc::new(LiveStore::new());
    let (tx, rx) = mpsc::channel::<String>();

    let reader_store = Arc::clone(&store);
    let reader_handle = thread::spawn(move || reader_thread(source, reader_store, tx));

    let sink_handle = thread::spawn(move || sink_thread(sink, rx));

    if opt.live_data {
        let live_store = Arc::clone(&store);
        let interval = Duration::from_millis(opt.interval);
        thread::spawn(move || live_data_thread(live_store, interval));
    }

    reader_handle.join().expect("reader thread panicked")?;
    sink_handle.join().expect("sink thread panicked");

    Ok(())
}
