//! Types and constants for the 48-byte SNTP packet header.
//!
//! Provides `FromBytes` and `ToBytes` implementations that work on plain byte slices (no
//! allocator, no I/O), and with the `std` feature `ReadBytes` and `WriteBytes`, which extend the
//! byteorder crate `ReadBytesExt` and `WriteBytesExt` traits with the ability to read and write
//! the protocol types.
//!
//! Documentation is largely derived from IETF RFC 5905 and RFC 4330.

/// NTP port number.
pub const PORT: u16 = 123;

/// Poll exponent advertised in client requests (2^10 = 1024 seconds).
pub const CLIENT_POLL: i8 = 10;

/// Reference identifier tag carried in client requests.
pub const CLIENT_REFERENCE_TAG: [u8; 4] = *b"AVS\0";

mod bytes;
#[cfg(feature = "std")]
mod io;
mod traits;
mod types;

pub use self::traits::*;
pub use self::types::*;
