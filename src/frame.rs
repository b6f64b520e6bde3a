//! Byte-stream framing and resynchronization for the Fastnet bus.
use thiserror::Error;

use crate::types::{AddressId, CommandByte};

/// Soft memory bound on the internal scan buffer. When exceeded, the oldest bytes are dropped;
/// the resync discipline then finds the next valid header on its own.
const MAX_BUFFER_BYTES: usize = 64 * 1024;

/// A single validated Fastnet frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub to: AddressId,
    pub from: AddressId,
    pub command: CommandByte,
    pub body: Vec<u8>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("header checksum mismatch")]
    HeaderChecksum,
    #[error("body checksum mismatch")]
    BodyChecksum,
}

/// Two's-complement checksum used for both the header and the body: the low byte of
/// `0x100 - (sum of bytes mod 0x100)`.
pub fn checksum(bytes: &[u8]) -> u8 {
    let sum: u32 = bytes.iter().map(|&b| b as u32).sum();
    (0x100u32.wrapping_sub(sum % 0x100) & 0xFF) as u8
}

/// Accumulates raw bytes from a `ByteSource` and yields validated `Frame`s.
///
/// Resync discipline: on any checksum failure, exactly one byte is discarded from the front of
/// the buffer before retrying. Never more, since the next valid header may begin at the very
/// next byte.
pub struct FrameBuffer {
    buf: Vec<u8>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer { buf: Vec::new() }
    }

    /// Append newly-read bytes, dropping the oldest bytes first if the soft limit is exceeded.
    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        if self.buf.len() > MAX_BUFFER_BYTES {
            let overflow = self.buf.len() - MAX_BUFFER_BYTES;
            self.buf.drain(0..overflow);
        }
    }

    /// Drain every complete, validated frame currently available in the buffer.
    ///
    /// Frames with a failing header or body checksum are silently resynced past (one byte at a
    /// time) rather than surfaced as errors; callers that want visibility into resync events
    /// should use `next_frame` directly and observe the `Err` results.
    pub fn drain(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Some(result) = self.next_frame() {
            if let Ok(frame) = result {
                frames.push(frame);
            }
        }
        frames
    }

    /// Attempt to extract one frame from the front of the buffer.
    ///
    /// Returns `None` when there are not yet enough bytes buffered to make progress (caller
    /// should wait for more input). Returns `Some(Err(_))` when a checksum failed and exactly one
    /// byte was discarded to resync; the caller may retry immediately. Returns `Some(Ok(frame))`
    /// when a full, valid frame was extracted and removed from the buffer.
    pub fn next_frame(&mut self) -> Option<Result<Frame, FrameError>> {
        if self.buf.len() < 6 {
            return None;
        }

        let to = self.buf[0];
        let from = self.buf[1];
        let size = self.buf[2] as usize;
        let command = self.buf[3];
        let header_cs = self.buf[4];

        if checksum(&self.buf[0..4]) != header_cs {
            self.buf.remove(0);
            return Some(Err(FrameError::HeaderChecksum));
        }

        let frame_len = 6 + size;
        if self.buf.len() < frame_len {
            return None;
        }

        let body = self.buf[5..5 + size].to_vec();
        let body_cs = self.buf[5 + size];

        if checksum(&body) != body_cs {
            self.buf.remove(0);
            return Some(Err(FrameError::BodyChecksum));
        }

        self.buf.drain(0..frame_len);
        Some(Ok(Frame { to, from, command, body }))
    }
}
