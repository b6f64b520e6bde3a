//! Broadcast UDP output for NMEA sentences.
use std::net::UdpSocket;

use anyhow::{Context, Result};

/// Owns a broadcast-enabled UDP socket and sends one datagram per NMEA sentence, mirroring the
/// teacher's `UdpStream` (a small struct wrapping one `UdpSocket`), but for sending instead of
/// receiving.
pub struct UdpSink {
    socket: UdpSocket,
    target: String,
}

impl UdpSink {
    pub fn open(port: u16) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").context("unable to bind UDP sending socket")?;
        socket.set_broadcast(true).context("unable to enable SO_BROADCAST")?;
        Ok(UdpSink { socket, target: format!("255.255.255.255:{}", port) })
    }

    pub fn send(&self, sentence: &str) -> Result<()> {
        self.socket
            .send_to(sentence.as_bytes(), &self.target)
            .with_context(|| format!("unable to send datagram to {}", self.target))?;
        Ok(())
    }
}
