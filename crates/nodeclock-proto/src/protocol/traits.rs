#[cfg(feature = "std")]
use byteorder::{ReadBytesExt, WriteBytesExt};
#[cfg(feature = "std")]
use std::io;

use crate::error::ParseError;

/// `writer.write_bytes(packet)` for any byteorder writer, such as a `&mut [u8]` or a `Vec<u8>`
/// used by host-side tools. Requires the `std` feature.
#[cfg(feature = "std")]
pub trait WriteBytes {
    /// Append `protocol` in network byte order.
    fn write_bytes<P: WriteToBytes>(&mut self, protocol: P) -> io::Result<()>;
}

/// `reader.read_bytes::<Packet>()` for any byteorder reader. A short input fails with
/// [`io::ErrorKind::UnexpectedEof`]. Requires the `std` feature.
#[cfg(feature = "std")]
pub trait ReadBytes {
    /// Take one value off the front of the stream.
    fn read_bytes<P: ReadFromBytes>(&mut self) -> io::Result<P>;
}

/// Stream encoding for a wire type.
#[cfg(feature = "std")]
pub trait WriteToBytes {
    /// Write `self` big-endian.
    fn write_to_bytes<W: WriteBytesExt>(&self, writer: W) -> io::Result<()>;
}

/// Stream decoding for a wire type.
#[cfg(feature = "std")]
pub trait ReadFromBytes: Sized {
    /// Read one value, big-endian.
    fn read_from_bytes<R: ReadBytesExt>(reader: R) -> io::Result<Self>;
}

/// Types that have a constant size on the wire.
pub trait ConstPackedSizeBytes {
    /// The size in bytes when this type is packed for transmission.
    const PACKED_SIZE_BYTES: usize;
}

/// Parse a type from the front of a byte slice.
///
/// Operates on `&[u8]` directly, so it is available in `no_std` firmware builds where the
/// receive buffer belongs to the network stack.
pub trait FromBytes: Sized {
    /// Returns the parsed value and the number of bytes consumed from the front of `buf`.
    fn from_bytes(buf: &[u8]) -> Result<(Self, usize), ParseError>;
}

/// Serialize a type into the front of a byte slice.
pub trait ToBytes {
    /// Returns the number of bytes written. Fails with [`ParseError::NoRoom`] if `buf` cannot
    /// hold the value.
    fn to_bytes(&self, buf: &mut [u8]) -> Result<usize, ParseError>;
}
