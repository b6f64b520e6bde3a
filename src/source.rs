//! Byte sources: a live serial device, or a paced replay of a captured hex file.
use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use serialport::{DataBits, Parity, SerialPort, StopBits};

/// The outcome of one read attempt from a `ByteSource`.
#[derive(Debug, PartialEq, Eq)]
pub enum SourceRead {
    /// `n` fresh bytes are in the caller's buffer.
    Data(usize),
    /// Nothing arrived this tick — a serial read timeout on a quiet bus, not an error. The
    /// caller should simply read again; this is the expected, steady-state outcome of the
    /// 1-second poll and must never be treated as end of stream.
    Idle,
    /// The source is exhausted and will never produce more bytes (file replay reaching EOF).
    Eof,
}

/// Something that produces the raw Fastnet byte stream: a live serial device, or a paced file
/// replay. Mirrors the teacher's `UdpStream` in spirit (a small struct standing in for the
/// concrete I/O device) but distinguishes "no data yet" from "stream is over", which a bare
/// `std::io::Read` cannot: a `Read::read` returning `0` is defined to mean EOF, but a serial
/// port's read timeout also surfaces as zero bytes despite the bus being very much alive.
pub trait ByteSource: Send {
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<SourceRead>;
}

const SERIAL_BAUD: u32 = 28800;
const CHUNK_SIZE: usize = 256;
const REPLAY_CHUNK_DELAY: Duration = Duration::from_millis(100);

/// A live serial connection at 28800-8-O-2, matching the bus's electrical configuration.
pub struct SerialSource {
    port: Box<dyn SerialPort>,
}

impl SerialSource {
    pub fn open(device: &str) -> Result<Self> {
        let port = serialport::new(device, SERIAL_BAUD)
            .data_bits(DataBits::Eight)
            .parity(Parity::Odd)
            .stop_bits(StopBits::Two)
            .timeout(Duration::from_secs(1))
            .open()
            .with_context(|| format!("unable to open serial device {}", device))?;
        Ok(SerialSource { port })
    }
}

impl ByteSource for SerialSource {
    /// A serial device never reaches genuine EOF; it only ever reports data or a quiet tick.
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<SourceRead> {
        match self.port.read(buf) {
            Ok(0) => Ok(SourceRead::Idle),
            Ok(n) => Ok(SourceRead::Data(n)),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(SourceRead::Idle),
            Err(e) => Err(e),
        }
    }
}

/// Replays a capture file of hex-encoded bytes (whitespace-separated or contiguous digits,
/// as produced by the companion recording tool), paced in 256-byte chunks to approximate the
/// rate a live bus would deliver them at.
pub struct FileReplaySource {
    remaining: Vec<u8>,
    position: usize,
}

impl FileReplaySource {
    pub fn open(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("unable to read replay file {}", path.display()))?;
        let hex: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = decode_hex(&hex).context("replay file did not contain valid hex data")?;
        Ok(FileReplaySource { remaining: bytes, position: 0 })
    }
}

fn decode_hex(hex: &str) -> Result<Vec<u8>> {
    if hex.len() % 2 != 0 {
        anyhow::bail!("hex data has an odd number of digits");
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    let digits = hex.as_bytes();
    for pair in digits.chunks(2) {
        let s = std::str::from_utf8(pair).unwrap();
        let byte = u8::from_str_radix(s, 16).context("invalid hex digit in replay file")?;
        bytes.push(byte);
    }
    Ok(bytes)
}

impl ByteSource for FileReplaySource {
    /// Reaching the end of the captured bytes is a genuine, terminal `Eof` — unlike the serial
    /// source, a file replay really is finished once its content is exhausted.
    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<SourceRead> {
        if self.position >= self.remaining.len() {
            return Ok(SourceRead::Eof);
        }
        thread::sleep(REPLAY_CHUNK_DELAY);
        let end = (self.position + CHUNK_SIZE.min(buf.len())).min(self.remaining.len());
        let n = end - self.position;
        buf[..n].copy_from_slice(&self.remaining[self.position..end]);
        self.position = end;
        Ok(SourceRead::Data(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_hex_ignoring_case() {
        assert_eq!(decode_hex("01ABff").unwrap(), vec![0x01, 0xAB, 0xFF]);
    }

    #[test]
    fn rejects_odd_length_hex() {
        assert!(decode_hex("ABC").is_err());
    }

    #[test]
    fn file_replay_reads_whole_content_in_chunks() {
        let mut source = FileReplaySource { remaining: vec![0xAA; 10], position: 0 };
        let mut buf = [0u8; 4];
        let read = source.read_chunk(&mut buf).unwrap();
        assert_eq!(read, SourceRead::Data(4));
        assert_eq!(&buf[..4], &[0xAA; 4]);
    }

    #[test]
    fn file_replay_reports_eof_once_exhausted() {
        let mut source = FileReplaySource { remaining: vec![0xAA; 2], position: 0 };
        let mut buf = [0u8; 4];
        let read = source.read_chunk(&mut buf).unwrap();
        assert_eq!(read, SourceRead::Data(2));
        let read2 = source.read_chunk(&mut buf).unwrap();
        assert_eq!(read2, SourceRead::Eof);
    }
}
