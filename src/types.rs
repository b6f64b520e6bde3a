//! Types definitions

/// Identifies a single measurement on the Fastnet bus (`CHANNEL_LOOKUP` key).
pub type ChannelId = u8;

/// Identifies a node (sender or recipient) on the Fastnet bus (`ADDRESS_LOOKUP` key).
pub type AddressId = u8;

/// The `command` field of a Fastnet frame header.
pub type CommandByte = u8;

/// Divisor implied by the `DD` bits of a format byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divisor {
    One,
    Ten,
    Hundred,
    Thousand,
}

impl Divisor {
    /// Extract from the top two bits of a format byte.
    pub fn from_bits(format_byte: u8) -> Divisor {
        match (format_byte >> 6) & 0b11 {
            0b00 => Divisor::One,
            0b01 => Divisor::Ten,
            0b10 => Divisor::Hundred,
            _ => Divisor::Thousand,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Divisor::One => 1.0,
            Divisor::Ten => 10.0,
            Divisor::Hundred => 100.0,
            Divisor::Thousand => 1000.0,
        }
    }
}

/// Displayable digit-count hint carried by the `GG` bits of a format byte.
///
/// Does not affect the interpreted numeric value; retained for completeness since it is
/// part of the documented wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitHint {
    One,
    Two,
    Three,
    Four,
}

impl DigitHint {
    pub fn from_bits(format_byte: u8) -> DigitHint {
        match (format_byte >> 4) & 0b11 {
            0b00 => DigitHint::One,
            0b01 => DigitHint::Two,
            0b10 => DigitHint::Three,
            _ => DigitHint::Four,
        }
    }
}

/// Classifies the `command` byte of a frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Broadcast,
    LatLon,
    KeepAlive,
    LightIntensity,
    Unknown(CommandByte),
}
