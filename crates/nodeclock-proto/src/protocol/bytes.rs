use crate::error::ParseError;

use super::{
    ConstPackedSizeBytes, FromBytes, LeapIndicator, Mode, Packet, ReferenceId, ShortFormat,
    Stratum, TimestampFormat, ToBytes, Version,
};

// Octet offsets of the header fields.
const FIRST_OCTET: usize = 0;
const STRATUM: usize = 1;
const POLL: usize = 2;
const PRECISION: usize = 3;
const ROOT_DELAY: usize = 4;
const ROOT_DISPERSION: usize = 8;
const REFERENCE_ID: usize = 12;
const REFERENCE_TIMESTAMP: usize = 16;
const ORIGIN_TIMESTAMP: usize = 24;
const RECEIVE_TIMESTAMP: usize = 32;
const TRANSMIT_TIMESTAMP: usize = 40;

/// Pack LI (2 bits), VN (3 bits) and mode (3 bits) into the first header octet.
pub(super) fn pack_first_octet(li: LeapIndicator, vn: Version, mode: Mode) -> u8 {
    ((li as u8) << 6) | ((vn.0 & 0b111) << 3) | mode as u8
}

/// Split the first header octet. Every value is a valid combination.
pub(super) fn unpack_first_octet(octet: u8) -> (LeapIndicator, Version, Mode) {
    (
        LeapIndicator::from_bits(octet >> 6),
        Version((octet >> 3) & 0b111),
        Mode::from_bits(octet),
    )
}

fn take<const N: usize>(buf: &[u8]) -> Result<&[u8; N], ParseError> {
    buf.first_chunk::<N>().ok_or(ParseError::Truncated {
        needed: N,
        available: buf.len(),
    })
}

fn room<const N: usize>(buf: &mut [u8]) -> Result<&mut [u8; N], ParseError> {
    let available = buf.len();
    buf.first_chunk_mut::<N>()
        .ok_or(ParseError::NoRoom { needed: N, available })
}

fn be_u32(raw: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([raw[at], raw[at + 1], raw[at + 2], raw[at + 3]])
}

fn short_at(raw: &[u8], at: usize) -> ShortFormat {
    ShortFormat {
        seconds: u16::from_be_bytes([raw[at], raw[at + 1]]),
        fraction: u16::from_be_bytes([raw[at + 2], raw[at + 3]]),
    }
}

fn timestamp_at(raw: &[u8], at: usize) -> TimestampFormat {
    TimestampFormat {
        seconds: be_u32(raw, at),
        fraction: be_u32(raw, at + 4),
    }
}

fn put_short(out: &mut [u8], at: usize, value: ShortFormat) {
    out[at..at + 2].copy_from_slice(&value.seconds.to_be_bytes());
    out[at + 2..at + 4].copy_from_slice(&value.fraction.to_be_bytes());
}

fn put_timestamp(out: &mut [u8], at: usize, value: TimestampFormat) {
    out[at..at + 4].copy_from_slice(&value.seconds.to_be_bytes());
    out[at + 4..at + 8].copy_from_slice(&value.fraction.to_be_bytes());
}

impl FromBytes for ShortFormat {
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize), ParseError> {
        let raw = take::<{ ShortFormat::PACKED_SIZE_BYTES }>(buf)?;
        Ok((short_at(raw, 0), raw.len()))
    }
}

impl FromBytes for TimestampFormat {
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize), ParseError> {
        let raw = take::<{ TimestampFormat::PACKED_SIZE_BYTES }>(buf)?;
        Ok((timestamp_at(raw, 0), raw.len()))
    }
}

impl FromBytes for Stratum {
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize), ParseError> {
        let [octet] = *take::<{ Stratum::PACKED_SIZE_BYTES }>(buf)?;
        Ok((Stratum(octet), 1))
    }
}

impl FromBytes for ReferenceId {
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize), ParseError> {
        let raw = take::<{ ReferenceId::PACKED_SIZE_BYTES }>(buf)?;
        Ok((ReferenceId(*raw), raw.len()))
    }
}

impl FromBytes for Packet {
    /// Decode the first 48 octets of `buf`. Anything after them is left alone.
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize), ParseError> {
        let raw = take::<{ Packet::PACKED_SIZE_BYTES }>(buf)?;
        let (leap_indicator, version, mode) = unpack_first_octet(raw[FIRST_OCTET]);
        let mut reference_id = [0u8; 4];
        reference_id.copy_from_slice(&raw[REFERENCE_ID..REFERENCE_ID + 4]);

        let packet = Packet {
            leap_indicator,
            version,
            mode,
            stratum: Stratum(raw[STRATUM]),
            poll: raw[POLL] as i8,
            precision: raw[PRECISION] as i8,
            root_delay: short_at(raw, ROOT_DELAY),
            root_dispersion: short_at(raw, ROOT_DISPERSION),
            reference_id: ReferenceId(reference_id),
            reference_timestamp: timestamp_at(raw, REFERENCE_TIMESTAMP),
            origin_timestamp: timestamp_at(raw, ORIGIN_TIMESTAMP),
            receive_timestamp: timestamp_at(raw, RECEIVE_TIMESTAMP),
            transmit_timestamp: timestamp_at(raw, TRANSMIT_TIMESTAMP),
        };
        Ok((packet, raw.len()))
    }
}

impl ToBytes for ShortFormat {
    fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, ParseError> {
        let out = room::<{ ShortFormat::PACKED_SIZE_BYTES }>(buf)?;
        put_short(out, 0, *self);
        Ok(out.len())
    }
}

impl ToBytes for TimestampFormat {
    fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, ParseError> {
        let out = room::<{ TimestampFormat::PACKED_SIZE_BYTES }>(buf)?;
        put_timestamp(out, 0, *self);
        Ok(out.len())
    }
}

impl ToBytes for Stratum {
    fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, ParseError> {
        let out = room::<{ Stratum::PACKED_SIZE_BYTES }>(buf)?;
        out[0] = self.0;
        Ok(1)
    }
}

impl ToBytes for ReferenceId {
    fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, ParseError> {
        let out = room::<{ ReferenceId::PACKED_SIZE_BYTES }>(buf)?;
        *out = self.0;
        Ok(out.len())
    }
}

impl ToBytes for Packet {
    fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, ParseError> {
        let out = room::<{ Packet::PACKED_SIZE_BYTES }>(buf)?;
        out[FIRST_OCTET] = pack_first_octet(self.leap_indicator, self.version, self.mode);
        out[STRATUM] = self.stratum.0;
        out[POLL] = self.poll as u8;
        out[PRECISION] = self.precision as u8;
        put_short(out, ROOT_DELAY, self.root_delay);
        put_short(out, ROOT_DISPERSION, self.root_dispersion);
        out[REFERENCE_ID..REFERENCE_ID + 4].copy_from_slice(&self.reference_id.0);
        put_timestamp(out, REFERENCE_TIMESTAMP, self.reference_timestamp);
        put_timestamp(out, ORIGIN_TIMESTAMP, self.origin_timestamp);
        put_timestamp(out, RECEIVE_TIMESTAMP, self.receive_timestamp);
        put_timestamp(out, TRANSMIT_TIMESTAMP, self.transmit_timestamp);
        Ok(out.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_octet_round_trips_every_value() {
        for octet in 0u8..=255 {
            let (li, vn, mode) = unpack_first_octet(octet);
            assert_eq!(pack_first_octet(li, vn, mode), octet);
        }
    }

    #[test]
    fn client_request_first_octet() {
        assert_eq!(
            pack_first_octet(LeapIndicator::NoWarning, Version::V4, Mode::Client),
            0x23
        );
    }

    #[test]
    fn no_room_reports_sizes() {
        let mut small = [0u8; 5];
        assert_eq!(
            TimestampFormat::new(1, 2).to_bytes(&mut small),
            Err(ParseError::NoRoom {
                needed: 8,
                available: 5
            })
        );
    }
}
