// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Errors from the slice codec.
//!
//! Every bit pattern of the SNTP header decodes to some value, so the only way encoding or
//! decoding can fail is a buffer of the wrong length. [`ParseError`] is `no_std` and never
//! allocates; with the `std` feature it converts into [`std::io::Error`].

use core::fmt;

/// A buffer was too small for the value being read from or written to it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The input ended before the value did.
    Truncated {
        /// Bytes the value occupies.
        needed: usize,
        /// Bytes left in the input.
        available: usize,
    },
    /// The output buffer cannot hold the encoding.
    NoRoom {
        /// Bytes the encoding occupies.
        needed: usize,
        /// Bytes left in the output.
        available: usize,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ParseError::Truncated { needed, available } => {
                write!(f, "truncated input: {} of {} bytes", available, needed)
            }
            ParseError::NoRoom { needed, available } => {
                write!(f, "output buffer holds {} of {} bytes", available, needed)
            }
        }
    }
}

#[cfg(feature = "std")]
impl From<ParseError> for std::io::Error {
    fn from(err: ParseError) -> std::io::Error {
        let kind = match err {
            ParseError::Truncated { .. } => std::io::ErrorKind::UnexpectedEof,
            ParseError::NoRoom { .. } => std::io::ErrorKind::WriteZero,
        };
        std::io::Error::new(kind, err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}
