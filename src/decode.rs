//! Turns one validated `Frame` into channel updates, applies them to the `LiveStore`, and
//! returns whatever NMEA sentences the resulting triggers produced.
use log::{debug, error, warn};

use crate::channel::{channel_name, command_kind};
use crate::format::{self, ChannelValue, FormatError};
use crate::frame::Frame;
use crate::router;
use crate::state::LiveStore;
use crate::types::CommandKind;

/// Process one frame's body against `store`, returning every NMEA sentence triggered by the
/// channel updates it contains, in the order the channels appeared in the body.
pub fn process_frame(frame: &Frame, store: &LiveStore) -> Vec<String> {
    match command_kind(frame.command) {
        CommandKind::Broadcast => process_broadcast_body(&frame.body, store),
        CommandKind::LatLon => process_ascii_body(&frame.body, store),
        CommandKind::KeepAlive => {
            debug!("keep-alive frame from {:#04x} to {:#04x}", frame.from, frame.to);
            Vec::new()
        }
        CommandKind::LightIntensity => {
            debug!("light-intensity frame ignored");
            Vec::new()
        }
        CommandKind::Unknown(cmd) => {
            warn!("unhandled command byte {:#04x}", cmd);
            Vec::new()
        }
    }
}

/// Iterate `(channel_id, format_byte, payload)` triples in a broadcast body. A truncated final
/// triple stops decoding but keeps everything already committed; an unrecognized format nibble
/// skips just that channel and resumes at the next triple.
fn process_broadcast_body(body: &[u8], store: &LiveStore) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut offset = 0usize;

    while offset + 2 <= body.len() {
        let channel_id = body[offset];
        let format_byte = body[offset + 1];
        offset += 2;

        let nibble = format_byte & 0b1111;
        let Some(len) = format::payload_len(nibble) else {
            warn!("channel {:#04x}: unrecognized format nibble {:#04x}, skipping", channel_id, nibble);
            continue;
        };

        if offset + len > body.len() {
            debug!("channel {:#04x}: truncated payload at end of frame body, stopping", channel_id);
            break;
        }

        let payload = &body[offset..offset + len];
        offset += len;

        match format::decode(format_byte, payload) {
            Ok(value) => {
                if let Some(name) = channel_name(channel_id) {
                    sentences.extend(apply_update(name, channel_id, &value, store));
                } else {
                    debug!("unrecognized channel id {:#04x}", channel_id);
                }
            }
            Err(FormatError::LengthMismatch { .. }) => {
                unreachable!("payload slice was sized from payload_len")
            }
            Err(e) => warn!("channel {:#04x}: {}", channel_id, e),
        }
    }

    sentences
}

/// An ASCII frame (command 0x03) carries a printable value, currently only observed for LatLon.
/// A payload that isn't plain ASCII is rejected outright rather than lossily coerced: no
/// LiveStore update happens for this frame.
fn process_ascii_body(body: &[u8], store: &LiveStore) -> Vec<String> {
    if body.len() < 2 {
        return Vec::new();
    }
    let channel_id = body[0];
    let payload = &body[2..];

    if !payload.is_ascii() {
        error!("channel {:#04x}: ASCII frame payload is not valid ASCII", channel_id);
        return Vec::new();
    }
    let text = std::str::from_utf8(payload).unwrap().trim_end().to_string();

    let Some(name) = channel_name(channel_id) else {
        debug!("ASCII frame for unrecognized channel id {:#04x}", channel_id);
        return Vec::new();
    };

    apply_update(name, channel_id, &ChannelValue::Ascii(text), store)
}

fn apply_update(
    name: &'static str,
    channel_id: u8,
    value: &ChannelValue,
    store: &LiveStore,
) -> Vec<String> {
    store.put(name, channel_id, value);
    router::route(name, store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boatspeed_broadcast_triggers_vhw() {
        let store = LiveStore::new();
        // channel 0x41 (Boatspeed kn), format 0x41 (divisor x10, nibble 0x01), raw 0x005B = 9.1
        let body = [0x41u8, 0x41, 0x00, 0x5B];
        let sentences = process_broadcast_body(&body, &store);
        assert_eq!(sentences.len(), 1);
        assert!(sentences[0].starts_with("$IIVHW,,,,,9.1,N,,*"));
    }

    #[test]
    fn multi_channel_body_triggers_both_in_order() {
        let store = LiveStore::new();
        // Heading (0x49) then Boatspeed (0x41), both format 0x41 (divisor x10, nibble 0x01)
        let mut body = vec![0x49u8, 0x41, 0x03, 0xE8]; // raw 1000 / 10 = 100.0
        body.extend_from_slice(&[0x41, 0x41, 0x00, 0x32]); // raw 50 / 10 = 5.0
        let sentences = process_broadcast_body(&body, &store);
        assert_eq!(sentences.len(), 3); // Heading -> {HDM, VHW}, Boatspeed -> {VHW}
        assert!(sentences[0].starts_with("$IIHDM,100.0,M*"));
        assert!(sentences[1].starts_with("$IIVHW,,,100.0,M,,N,,*"));
        assert!(sentences[2].starts_with("$IIVHW,,,100.0,M,5.0,N,,*"));
    }

    #[test]
    fn unknown_format_nibble_skips_just_that_channel() {
        let store = LiveStore::new();
        let mut body = vec![0x41u8, 0x09]; // unknown nibble 0x09, no documented length
        body.extend_from_slice(&[0x49, 0x41, 0x00, 0x64]); // Heading, format x10, raw 100/10=10.0
        let sentences = process_broadcast_body(&body, &store);
        assert_eq!(sentences.len(), 2); // Heading -> {HDM, VHW}
        assert!(sentences[0].starts_with("$IIHDM,10.0,M*"));
    }

    #[test]
    fn truncated_final_triple_commits_prior_channels() {
        let store = LiveStore::new();
        let mut body = vec![0x41u8, 0x41, 0x00, 0x5B]; // complete boatspeed
        body.extend_from_slice(&[0x49, 0x41]); // truncated heading, missing payload
        let sentences = process_broadcast_body(&body, &store);
        assert_eq!(sentences.len(), 1);
        assert!(store.get_number("Boatspeed (Knots)").is_some());
        assert!(store.get_number("Heading").is_none());
    }

    #[test]
    fn ascii_latlon_frame_triggers_gll() {
        let store = LiveStore::new();
        let mut body = vec![0x47u8, 0x00];
        body.extend_from_slice(b"4916.45N12311.12W");
        let sentences = process_ascii_body(&body, &store);
        assert_eq!(sentences.len(), 1);
        assert!(sentences[0].starts_with("$GPGLL,4916.45,N,12311.12,W,"));
    }

    #[test]
    fn ascii_frame_with_non_ascii_payload_is_rejected() {
        let store = LiveStore::new();
        let mut body = vec![0x47u8, 0x00];
        body.extend_from_slice(&[0xC3, 0x28]); // not valid ASCII (nor valid UTF-8)
        let sentences = process_ascii_body(&body, &store);
        assert!(sentences.is_empty());
        assert!(store.get_string("LatLon").is_none());
    }
}
