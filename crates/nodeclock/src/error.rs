// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Error types for the time-sync engine and its collaborators.
//!
//! Nothing in the engine returns these to the caller. [`SyncSession::start`] turns every failure
//! into a [`Status`] and keeps the last one for diagnostics, readable through
//! [`SyncSession::last_error`]:
//!
//! ```
//! use nodeclock::error::{ProtocolError, SyncError};
//!
//! fn explain(err: &SyncError) -> &'static str {
//!     match err {
//!         SyncError::Config(_) => "no time server configured",
//!         SyncError::Protocol(ProtocolError::UnexpectedMode { .. }) => "reply was not from a server",
//!         SyncError::Protocol(_) => "stray datagram ignored",
//!         SyncError::Timeout => "no reply",
//!         SyncError::Transport(_) => "network stack refused the request",
//!     }
//! }
//!
//! assert_eq!(explain(&SyncError::Timeout), "no reply");
//! ```
//!
//! [`SyncSession::start`]: crate::sync::SyncSession::start
//! [`SyncSession::last_error`]: crate::sync::SyncSession::last_error
//! [`Status`]: crate::sync::Status

// Re-export proto error types so callers need a single import path.
pub use nodeclock_proto::error::ParseError;

use core::fmt;
use core::net::Ipv4Addr;

/// Errors that can occur during a time synchronisation exchange.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SyncError {
    /// Invalid configuration (no server address).
    Config(ConfigError),
    /// A datagram failed reply validation.
    Protocol(ProtocolError),
    /// No valid reply arrived within the configured bound.
    Timeout,
    /// The datagram transport rejected an operation.
    Transport(TransportError),
}

/// Configuration errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// The server address is `0.0.0.0` and DHCP did not supply one.
    NoServer,
}

/// Reply validation errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProtocolError {
    /// Datagram length differs from the 48-byte packet size.
    UnexpectedSize {
        /// Number of bytes received.
        received: usize,
    },
    /// Datagram came from an address other than the configured server.
    UnexpectedSource {
        /// Address the datagram came from.
        source: Ipv4Addr,
    },
    /// Reply mode lacks the server bit.
    UnexpectedMode {
        /// The raw 3-bit mode field.
        mode: u8,
    },
}

/// Datagram transport errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TransportError {
    /// The endpoint could not be opened on the requested port.
    Bind {
        /// The local port.
        port: u16,
    },
    /// No endpoint is open for the handle.
    NotOpen,
    /// The stack did not accept the datagram for transmission.
    Send,
    /// Host socket error.
    #[cfg(feature = "std")]
    Io(std::io::ErrorKind),
}

/// Errors from pushing the wall clock into a battery-backed hardware clock.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HwClockError {
    /// No hardware clock answered on the bus.
    NotPresent,
    /// The device rejected the write.
    Write,
}

// ── Display implementations ─────────────────────────────────────────

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Config(e) => write!(f, "time sync config error: {e}"),
            SyncError::Protocol(e) => write!(f, "time sync protocol error: {e}"),
            SyncError::Timeout => write!(f, "time sync request timed out"),
            SyncError::Transport(e) => write!(f, "time sync transport error: {e}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoServer => write!(f, "no time server address configured"),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::UnexpectedSize { received } => {
                write!(f, "reply has unexpected size ({received} bytes)")
            }
            ProtocolError::UnexpectedSource { source } => {
                write!(f, "reply from unexpected source address {source}")
            }
            ProtocolError::UnexpectedMode { mode } => {
                write!(f, "unexpected reply mode {mode} (expected server)")
            }
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Bind { port } => write!(f, "cannot open endpoint on port {port}"),
            TransportError::NotOpen => write!(f, "endpoint is not open"),
            TransportError::Send => write!(f, "datagram was not sent"),
            #[cfg(feature = "std")]
            TransportError::Io(kind) => write!(f, "socket error: {kind}"),
        }
    }
}

impl fmt::Display for HwClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HwClockError::NotPresent => write!(f, "hardware clock not present"),
            HwClockError::Write => write!(f, "hardware clock write failed"),
        }
    }
}

// ── From conversions ────────────────────────────────────────────────

impl From<ConfigError> for SyncError {
    fn from(e: ConfigError) -> Self {
        SyncError::Config(e)
    }
}

impl From<ProtocolError> for SyncError {
    fn from(e: ProtocolError) -> Self {
        SyncError::Protocol(e)
    }
}

impl From<TransportError> for SyncError {
    fn from(e: TransportError) -> Self {
        SyncError::Transport(e)
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        TransportError::Io(e.kind())
    }
}

// ── std::error::Error ───────────────────────────────────────────────

#[cfg(feature = "std")]
impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Config(e) => Some(e),
            SyncError::Protocol(e) => Some(e),
            SyncError::Transport(e) => Some(e),
            SyncError::Timeout => None,
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for ProtocolError {}

#[cfg(feature = "std")]
impl std::error::Error for TransportError {}

#[cfg(feature = "std")]
impl std::error::Error for HwClockError {}
