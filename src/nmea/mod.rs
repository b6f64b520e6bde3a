//! NMEA-0183 sentence construction from the live channel store.
pub mod builders;

/// Compute the NMEA-0183 checksum: an 8-bit XOR of every character in `body`, rendered as two
/// upper-case hex digits.
pub fn checksum(body: &str) -> String {
    let value = body.bytes().fold(0u8, |acc, b| acc ^ b);
    format!("{:02X}", value)
}

/// Wrap a sentence body with its leading `$`, checksum, and trailing newline.
pub fn wrap(body: &str) -> String {
    format!("${}*{}\n", body, checksum(body))
}

/// Normalize an angle in degrees into `[0, 360)`. Used for wind angles and track headings; not
/// used for rudder angle or tidal set, which keep their sign.
pub fn normalize_angle(degrees: f64) -> f64 {
    let wrapped = degrees % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_matches_known_sentence() {
        assert_eq!(checksum("GPGLL,,,,,,V"), "06");
    }

    #[test]
    fn wrap_appends_checksum_and_newline() {
        let sentence = wrap("IIMTW,15.0,C");
        assert!(sentence.starts_with("$IIMTW,15.0,C*"));
        assert!(sentence.ends_with('\n'));
    }

    #[test]
    fn negative_angle_normalizes_into_range() {
        assert_eq!(normalize_angle(-45.0), 315.0);
        assert_eq!(normalize_angle(10.0), 10.0);
    }
}
