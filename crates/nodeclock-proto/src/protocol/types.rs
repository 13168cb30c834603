use core::fmt;

use super::{CLIENT_POLL, CLIENT_REFERENCE_TAG, ConstPackedSizeBytes};

/// 16.16 fixed-point seconds, as carried in the root delay and root dispersion fields.
///
/// The client only echoes these through the codec; nothing in the sync path reads them.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ShortFormat {
    /// Whole seconds.
    pub seconds: u16,
    /// Fraction of a second, in units of 2^-16 s.
    pub fraction: u16,
}

/// 32.32 fixed-point seconds since 1900-01-01 00:00 UTC.
///
/// On the wire the seconds word comes first, both words big-endian. The seconds field wraps in
/// February 2036; all arithmetic on it in this workspace is wrapping.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimestampFormat {
    /// Seconds since 1900-01-01 00:00:00 UTC.
    pub seconds: u32,
    /// Fractional seconds, in units of 2^-32 s.
    pub fraction: u32,
}

impl TimestampFormat {
    /// Build a timestamp from its two components.
    pub const fn new(seconds: u32, fraction: u32) -> Self {
        TimestampFormat { seconds, fraction }
    }

    /// True when both components are zero (the "unset" timestamp).
    pub fn is_zero(&self) -> bool {
        self.seconds == 0 && self.fraction == 0
    }
}

/// Top two bits of the first header octet: a pending leap second, or an unsynchronised server.
///
/// The sync engine ignores it.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum LeapIndicator {
    /// Nothing pending.
    #[default]
    NoWarning = 0,
    /// The last minute of the month has 61 seconds.
    AddOne = 1,
    /// The last minute of the month has 59 seconds.
    SubOne = 2,
    /// The server has no time to give.
    Unknown = 3,
}

impl LeapIndicator {
    /// Decode the low two bits of `bits`. Higher bits are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => LeapIndicator::NoWarning,
            1 => LeapIndicator::AddOne,
            2 => LeapIndicator::SubOne,
            _ => LeapIndicator::Unknown,
        }
    }
}

impl TryFrom<u8> for LeapIndicator {
    type Error = ();

    /// Like [`from_bits`](Self::from_bits), but rejects values that do not fit two bits.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > 0b11 {
            return Err(());
        }
        Ok(Self::from_bits(value))
    }
}

/// The 3-bit version field, kept as read. Requests always carry 4.
#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Version(pub(super) u8);

impl Version {
    /// NTP version 4, which the client sends.
    pub const V4: Self = Version(4);

    /// A version number from 1 to 7.
    pub fn new(v: u8) -> Option<Self> {
        matches!(v, 1..=7).then_some(Version(v))
    }

    /// The version number.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Version {
    fn default() -> Self {
        Version::V4
    }
}

/// The 3-bit association mode.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum Mode {
    /// 0.
    Reserved = 0,
    /// 1, symmetric active.
    SymmetricActive = 1,
    /// 2, symmetric passive.
    SymmetricPassive = 2,
    /// 3, what the node sends.
    #[default]
    Client = 3,
    /// 4, what a unicast server answers with.
    Server = 4,
    /// 5.
    Broadcast = 5,
    /// 6, control messages.
    NtpControlMessage = 6,
    /// 7.
    ReservedForPrivateUse = 7,
}

impl Mode {
    /// Bit that marks a server-originated mode in the 3-bit mode field.
    pub const SERVER_BIT: u8 = Mode::Server as u8;

    /// Whether the server bit of the mode field is set.
    ///
    /// This is a bitwise test on the raw field, so server (4), broadcast (5), control (6) and
    /// private (7) all pass, while every client-side and reserved mode fails.
    pub fn indicates_server(self) -> bool {
        (self as u8) & Self::SERVER_BIT == Self::SERVER_BIT
    }

    /// Decode the low three bits of `bits`. Higher bits are ignored.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0 => Mode::Reserved,
            1 => Mode::SymmetricActive,
            2 => Mode::SymmetricPassive,
            3 => Mode::Client,
            4 => Mode::Server,
            5 => Mode::Broadcast,
            6 => Mode::NtpControlMessage,
            _ => Mode::ReservedForPrivateUse,
        }
    }
}

impl TryFrom<u8> for Mode {
    type Error = ();

    /// Like [`from_bits`](Self::from_bits), but rejects values that do not fit three bits.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > 0b111 {
            return Err(());
        }
        Ok(Self::from_bits(value))
    }
}

/// Distance from a reference clock: 1 is a primary server, 2..=15 secondary, 0 and 16 mean the
/// server is not synchronised.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Stratum(pub u8);

impl Stratum {
    /// A server with its own reference clock.
    pub const PRIMARY: Self = Stratum(1);
}

/// The 32-bit reference identifier, kept as the four raw octets.
///
/// Servers put a four-character ASCII code (stratum 0/1) or an upstream IPv4 address here. This
/// client sends a fixed tag and never interprets what the server returns beyond logging it.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ReferenceId(pub [u8; 4]);

impl ReferenceId {
    /// The four octets.
    pub fn as_bytes(&self) -> [u8; 4] {
        self.0
    }
}

impl fmt::Display for ReferenceId {
    /// Printable ASCII up to the first NUL, `?` for anything else.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &octet in self.0.iter().take_while(|&&b| b != 0) {
            let c = if octet.is_ascii_graphic() {
                octet as char
            } else {
                '?'
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// The 48-octet SNTP header (RFC 4330 section 4), with no extension fields or authenticator.
///
/// | Octets | Field                              |
/// |--------|------------------------------------|
/// | 0      | LI (2 bits), VN (3 bits), mode (3) |
/// | 1      | stratum                            |
/// | 2      | poll exponent                      |
/// | 3      | precision exponent                 |
/// | 4..8   | root delay                         |
/// | 8..12  | root dispersion                    |
/// | 12..16 | reference identifier               |
/// | 16..24 | reference timestamp                |
/// | 24..32 | originate timestamp (T1)           |
/// | 32..40 | receive timestamp (T2)             |
/// | 40..48 | transmit timestamp (T3)            |
///
/// [`Default`] is an all-zero NTPv4 client header.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Packet {
    /// Leap second warning.
    pub leap_indicator: LeapIndicator,
    /// Version field.
    pub version: Version,
    /// Association mode.
    pub mode: Mode,
    /// Server stratum.
    pub stratum: Stratum,
    /// Poll interval exponent, log2 seconds.
    pub poll: i8,
    /// Clock precision exponent, log2 seconds.
    pub precision: i8,
    /// Round-trip delay to the server's reference.
    pub root_delay: ShortFormat,
    /// Dispersion to the server's reference.
    pub root_dispersion: ShortFormat,
    /// Reference identifier.
    pub reference_id: ReferenceId,
    /// When the server clock was last corrected.
    pub reference_timestamp: TimestampFormat,
    /// T1, copied by the server from the request's transmit slot. The node puts its own send
    /// time here in requests.
    pub origin_timestamp: TimestampFormat,
    /// T2, server time the request arrived.
    pub receive_timestamp: TimestampFormat,
    /// T3, server time the reply left.
    pub transmit_timestamp: TimestampFormat,
}

impl Packet {
    /// The client request template: NTPv4, client mode, poll exponent 10, the fixed reference
    /// tag and every timestamp zero.
    ///
    /// The originate timestamp is filled in right before each transmission.
    pub fn client_request() -> Self {
        Packet {
            poll: CLIENT_POLL,
            reference_id: ReferenceId(CLIENT_REFERENCE_TAG),
            ..Packet::default()
        }
    }
}

impl ConstPackedSizeBytes for ShortFormat {
    const PACKED_SIZE_BYTES: usize = 4;
}

impl ConstPackedSizeBytes for TimestampFormat {
    const PACKED_SIZE_BYTES: usize = 8;
}

impl ConstPackedSizeBytes for Stratum {
    const PACKED_SIZE_BYTES: usize = 1;
}

impl ConstPackedSizeBytes for ReferenceId {
    const PACKED_SIZE_BYTES: usize = 4;
}

impl ConstPackedSizeBytes for Packet {
    const PACKED_SIZE_BYTES: usize = 48;
}
