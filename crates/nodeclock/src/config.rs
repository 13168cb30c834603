// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Time-sync configuration.
//!
//! [`SyncConfig`] is a plain value: the node's configuration store fills it in at boot and hands
//! it to [`SyncSession::new`](crate::sync::SyncSession::new).
//!
//! # Examples
//!
//! ```
//! use core::net::Ipv4Addr;
//! use nodeclock::config::SyncConfig;
//!
//! let config = SyncConfig::builder()
//!     .server(Ipv4Addr::new(192, 168, 2, 1))
//!     .utc_offset(2 * 3600)
//!     .timeout_millis(1500)
//!     .build();
//!
//! assert_eq!(config.utc_offset, 7200);
//! assert_eq!(config.poll_interval_secs, 1024);
//! ```

use core::net::Ipv4Addr;

use log::warn;

/// Reply wait bound per exchange, in milliseconds.
pub const DEFAULT_TIMEOUT_MILLIS: u32 = 3000;

/// Attempts per [`start`](crate::sync::SyncSession::start) when retrying is enabled.
pub const DEFAULT_RETRIES: u8 = 3;

/// Seconds between polls, matching the poll exponent 10 advertised in requests.
pub const DEFAULT_POLL_INTERVAL_SECS: u32 = 1024;

const HOUR: i32 = 3600;
const MINUTE: i32 = 60;

/// Every UTC offset in use somewhere in the world, in seconds.
pub const VALID_UTC_OFFSETS: [i32; 38] = [
    -12 * HOUR,
    -11 * HOUR,
    -10 * HOUR,
    -9 * HOUR - 30 * MINUTE,
    -9 * HOUR,
    -8 * HOUR,
    -7 * HOUR,
    -6 * HOUR,
    -5 * HOUR,
    -4 * HOUR,
    -3 * HOUR - 30 * MINUTE,
    -3 * HOUR,
    -2 * HOUR,
    -HOUR,
    0,
    HOUR,
    2 * HOUR,
    3 * HOUR,
    3 * HOUR + 30 * MINUTE,
    4 * HOUR,
    4 * HOUR + 30 * MINUTE,
    5 * HOUR,
    5 * HOUR + 30 * MINUTE,
    5 * HOUR + 45 * MINUTE,
    6 * HOUR,
    6 * HOUR + 30 * MINUTE,
    7 * HOUR,
    8 * HOUR,
    8 * HOUR + 45 * MINUTE,
    9 * HOUR,
    9 * HOUR + 30 * MINUTE,
    10 * HOUR,
    10 * HOUR + 30 * MINUTE,
    11 * HOUR,
    12 * HOUR,
    12 * HOUR + 45 * MINUTE,
    13 * HOUR,
    14 * HOUR,
];

/// Return `offset` if it is a real-world UTC offset, otherwise 0.
pub fn validate_utc_offset(offset: i32) -> i32 {
    if VALID_UTC_OFFSETS.contains(&offset) {
        offset
    } else {
        warn!("UTC offset {} s is not in use anywhere, using 0", offset);
        0
    }
}

/// Settings for a [`SyncSession`](crate::sync::SyncSession).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SyncConfig {
    /// Time server. `0.0.0.0` means "use the server DHCP advertised".
    pub server: Ipv4Addr,
    /// Local time minus UTC, in seconds.
    pub utc_offset: i32,
    /// Reply wait bound per exchange.
    pub timeout_millis: u32,
    /// Attempt budget per `start()`. Only used when `retry_exchanges` is set.
    pub retries: u8,
    /// Re-send after a timed-out attempt instead of giving up after the first one.
    pub retry_exchanges: bool,
    /// Seconds between polls driven by [`SyncSession::run`](crate::sync::SyncSession::run).
    pub poll_interval_secs: u32,
}

impl SyncConfig {
    /// Start building a config from the defaults.
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::new()
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            server: Ipv4Addr::UNSPECIFIED,
            utc_offset: 0,
            timeout_millis: DEFAULT_TIMEOUT_MILLIS,
            retries: DEFAULT_RETRIES,
            retry_exchanges: false,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

/// Builder for [`SyncConfig`].
#[derive(Clone, Debug)]
pub struct SyncConfigBuilder {
    config: SyncConfig,
}

impl SyncConfigBuilder {
    fn new() -> Self {
        SyncConfigBuilder {
            config: SyncConfig::default(),
        }
    }

    /// Set the time server address (default: `0.0.0.0`, i.e. from DHCP).
    pub fn server(mut self, server: Ipv4Addr) -> Self {
        self.config.server = server;
        self
    }

    /// Set the UTC offset in seconds (default: 0). Checked when the session is created.
    pub fn utc_offset(mut self, seconds: i32) -> Self {
        self.config.utc_offset = seconds;
        self
    }

    /// Set the reply wait bound (default: 3000 ms).
    pub fn timeout_millis(mut self, millis: u32) -> Self {
        self.config.timeout_millis = millis;
        self
    }

    /// Set the attempt budget used when retrying (default: 3).
    pub fn retries(mut self, retries: u8) -> Self {
        self.config.retries = retries;
        self
    }

    /// Retry timed-out exchanges within one `start()` (default: off).
    pub fn retry_exchanges(mut self, enable: bool) -> Self {
        self.config.retry_exchanges = enable;
        self
    }

    /// Set the periodic poll interval (default: 1024 s).
    pub fn poll_interval_secs(mut self, secs: u32) -> Self {
        self.config.poll_interval_secs = secs;
        self
    }

    /// Finish building.
    pub fn build(self) -> SyncConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::builder().build();
        assert_eq!(config, SyncConfig::default());
        assert_eq!(config.server, Ipv4Addr::UNSPECIFIED);
        assert_eq!(config.timeout_millis, 3000);
        assert_eq!(config.retries, 3);
        assert!(!config.retry_exchanges);
        assert_eq!(config.poll_interval_secs, 1024);
    }

    #[test]
    fn test_builder_sets_every_field() {
        let config = SyncConfig::builder()
            .server(Ipv4Addr::new(10, 0, 0, 1))
            .utc_offset(-3 * 3600)
            .timeout_millis(500)
            .retries(5)
            .retry_exchanges(true)
            .poll_interval_secs(64)
            .build();
        assert_eq!(config.server, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(config.utc_offset, -10_800);
        assert_eq!(config.timeout_millis, 500);
        assert_eq!(config.retries, 5);
        assert!(config.retry_exchanges);
        assert_eq!(config.poll_interval_secs, 64);
    }

    #[test]
    fn test_validate_keeps_known_offsets() {
        for offset in VALID_UTC_OFFSETS {
            assert_eq!(validate_utc_offset(offset), offset);
        }
        assert_eq!(validate_utc_offset(-34_200), -34_200);
        assert_eq!(validate_utc_offset(20_700), 20_700);
        assert_eq!(validate_utc_offset(45_900), 45_900);
    }

    #[test]
    fn test_validate_rejects_unknown_offsets() {
        assert_eq!(validate_utc_offset(1), 0);
        assert_eq!(validate_utc_offset(3601), 0);
        assert_eq!(validate_utc_offset(15 * 3600), 0);
        assert_eq!(validate_utc_offset(-13 * 3600), 0);
        assert_eq!(validate_utc_offset(i32::MIN), 0);
    }

    #[test]
    fn test_offsets_sorted_and_unique() {
        assert!(VALID_UTC_OFFSETS.windows(2).all(|w| w[0] < w[1]));
    }
}
