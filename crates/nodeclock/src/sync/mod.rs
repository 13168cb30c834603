// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! SNTP client that corrects the node's wall clock.
//!
//! A [`SyncSession`] runs one request/reply exchange per [`start`](SyncSession::start): it stamps
//! the request with the local time (T1), busy-polls the transport for a 48-byte reply from the
//! configured server, stamps its arrival (T4), and sets the clock from T4 plus the round-trip
//! offset computed from T1..T4. Failures never escape: they end up in [`status`] and
//! [`last_error`].
//!
//! ```
//! use core::cell::Cell;
//! use core::net::Ipv4Addr;
//! use nodeclock::clock::WallClock;
//! use nodeclock::config::SyncConfig;
//! use nodeclock::error::TransportError;
//! use nodeclock::platform::Uptime;
//! use nodeclock::sync::{Status, SyncSession};
//! use nodeclock::transport::{Datagram, DatagramTransport, Handle};
//! use nodeclock::unix_time::Instant;
//!
//! # struct Clock(Cell<Instant>);
//! # impl WallClock for Clock {
//! #     fn get_time(&self) -> Instant { self.0.get() }
//! #     fn set_time(&self, t: Instant) { self.0.set(t) }
//! # }
//! # struct Silent;
//! # impl DatagramTransport for Silent {
//! #     fn begin(&mut self, _: u16) -> Result<Handle, TransportError> { Ok(Handle(0)) }
//! #     fn send_to(&mut self, _: Handle, _: &[u8], _: Ipv4Addr, _: u16) -> Result<(), TransportError> { Ok(()) }
//! #     fn recv_from(&mut self, _: Handle) -> Option<Datagram<'_>> { None }
//! #     fn end(&mut self, _: u16) {}
//! # }
//! # struct Ticks(Cell<u32>);
//! # impl Uptime for Ticks {
//! #     fn millis(&self) -> u32 { let t = self.0.get() + 10; self.0.set(t); t }
//! # }
//! let clock = Clock(Cell::new(Instant::new(1_760_000_000, 0)));
//! let mut network = Silent;
//! let uptime = Ticks(Cell::new(0));
//!
//! let config = SyncConfig::builder().server(Ipv4Addr::new(192, 168, 2, 1)).build();
//! let mut session = SyncSession::new(config, &clock, &mut network, &uptime);
//!
//! // Nobody answers, so the exchange times out.
//! assert_eq!(session.start(), Status::Failed);
//! ```
//!
//! [`status`]: SyncSession::status
//! [`last_error`]: SyncSession::last_error

use core::fmt;
use core::net::Ipv4Addr;

use log::{debug, info, warn};

use crate::clock::WallClock;
use crate::config::{SyncConfig, validate_utc_offset};
use crate::error::{ConfigError, ProtocolError, SyncError, TransportError};
use crate::platform::{HardwareClock, StatusDisplay, Uptime};
use crate::protocol::{self, ConstPackedSizeBytes, FromBytes, Packet, TimestampFormat, ToBytes};
use crate::transport::{DatagramTransport, Handle};
use crate::unix_time::{self, Instant, timestamp_from_local};

pub mod offset;

pub use offset::{ClockOffset, Difference, ExchangeTimestamps, clock_offset, difference};

/// Where a session is in its life cycle.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Status {
    /// No server, or stopped explicitly. No endpoint is open.
    #[default]
    Stopped,
    /// The last exchange corrected the clock.
    Idle,
    /// An exchange is in flight.
    Waiting,
    /// The last exchange did not produce a usable reply.
    Failed,
}

impl Status {
    /// Label used on the console and the status display.
    pub const fn as_str(self) -> &'static str {
        match self {
            Status::Stopped => "Stopped",
            Status::Idle => "Idle",
            Status::Waiting => "Waiting",
            Status::Failed => "Failed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time synchronisation against one SNTP server.
///
/// Borrows the wall clock it corrects, the transport it talks through and the uptime counter
/// that bounds each exchange. The transport is held mutably for the life of the session, so
/// nothing else can use the endpoint while it is open.
pub struct SyncSession<'a, C, T, U>
where
    C: WallClock,
    T: DatagramTransport,
    U: Uptime,
{
    config: SyncConfig,
    clock: &'a C,
    transport: &'a mut T,
    uptime: &'a U,
    hwclock: Option<&'a mut dyn HardwareClock>,
    display: Option<&'a mut dyn StatusDisplay>,
    handle: Option<Handle>,
    request: Packet,
    status: Status,
    timestamps: ExchangeTimestamps,
    offset: Option<ClockOffset>,
    last_error: Option<SyncError>,
    last_poll_millis: u32,
}

impl<'a, C, T, U> SyncSession<'a, C, T, U>
where
    C: WallClock,
    T: DatagramTransport,
    U: Uptime,
{
    /// Create a stopped session.
    ///
    /// A `0.0.0.0` server is replaced by the one DHCP advertised, and an unknown UTC offset by 0.
    pub fn new(config: SyncConfig, clock: &'a C, transport: &'a mut T, uptime: &'a U) -> Self {
        let config = resolve(config, transport);
        SyncSession {
            config,
            clock,
            transport,
            uptime,
            hwclock: None,
            display: None,
            handle: None,
            request: Packet::client_request(),
            status: Status::Stopped,
            timestamps: ExchangeTimestamps::default(),
            offset: None,
            last_error: None,
            last_poll_millis: 0,
        }
    }

    /// Copy the clock into `hwclock` after every successful correction.
    pub fn with_hardware_clock(mut self, hwclock: &'a mut dyn HardwareClock) -> Self {
        self.hwclock = Some(hwclock);
        self
    }

    /// Report every status change to `display`.
    pub fn with_status_display(mut self, display: &'a mut dyn StatusDisplay) -> Self {
        self.display = Some(display);
        self
    }

    /// Run one synchronisation and return the resulting status.
    ///
    /// Without a server the session goes to [`Status::Stopped`] and opens nothing. Otherwise the
    /// endpoint on port 123 is opened (or reused), a request goes out and the transport is polled
    /// until a reply arrives or `timeout_millis` pass. A reply in server mode corrects the clock
    /// and ends in [`Status::Idle`]; anything else ends in [`Status::Failed`] with the clock
    /// untouched. The endpoint stays open until [`stop`](Self::stop).
    ///
    /// One exchange is made per call unless `retry_exchanges` is set, in which case failed
    /// exchanges are repeated up to `retries` times (at least once). All attempts share one
    /// `timeout_millis` window counted from the first send.
    pub fn start(&mut self) -> Status {
        if self.config.server.is_unspecified() {
            warn!("time sync disabled: {}", ConfigError::NoServer);
            self.last_error = Some(ConfigError::NoServer.into());
            self.publish(Status::Stopped);
            return self.status;
        }

        let handle = match self.open() {
            Ok(handle) => handle,
            Err(err) => {
                warn!("time sync cannot start: {}", err);
                self.last_error = Some(err.into());
                self.last_poll_millis = self.uptime.millis();
                self.publish(Status::Failed);
                return self.status;
            }
        };

        self.publish(Status::Waiting);

        let began = self.uptime.millis();
        let attempts = if self.config.retry_exchanges {
            self.config.retries.max(1)
        } else {
            1
        };
        let mut outcome = Status::Failed;
        for attempt in 1..=attempts {
            match self.exchange(handle, began) {
                Ok(()) => {
                    self.last_error = None;
                    outcome = Status::Idle;
                    break;
                }
                Err(err) => {
                    warn!("time sync attempt {} failed: {}", attempt, err);
                    self.last_error = Some(err);
                    if let SyncError::Protocol(ProtocolError::UnexpectedMode { .. }) = err {
                        break;
                    }
                }
            }
        }

        self.last_poll_millis = self.uptime.millis();

        if outcome != Status::Failed {
            self.push_hardware_clock();
        }

        self.publish(outcome);
        debug!("time sync finished: {}", outcome);
        self.status
    }

    /// Close the endpoint and go to [`Status::Stopped`]. Does nothing when already stopped.
    pub fn stop(&mut self) {
        if self.status == Status::Stopped {
            return;
        }
        if self.handle.take().is_some() {
            self.transport.end(protocol::PORT);
        }
        self.publish(Status::Stopped);
    }

    /// Poll again once `poll_interval_secs` have passed since the last exchange.
    ///
    /// Call from the main loop. Only a session that has run before (`Idle` or `Failed`) is
    /// polled; a stopped session stays stopped. Returns whether an exchange was made.
    pub fn run(&mut self) -> bool {
        if !matches!(self.status, Status::Idle | Status::Failed) {
            return false;
        }
        let elapsed = self.uptime.millis().wrapping_sub(self.last_poll_millis);
        if elapsed < self.config.poll_interval_secs.saturating_mul(1000) {
            return false;
        }
        self.start();
        true
    }

    /// Replace the configuration. The session is stopped first and must be started again.
    pub fn reconfigure(&mut self, config: SyncConfig) {
        self.stop();
        self.config = resolve(config, self.transport);
        self.offset = None;
        self.last_error = None;
    }

    /// Current status.
    pub fn status(&self) -> Status {
        self.status
    }

    /// The server this session talks to. `0.0.0.0` if none is known.
    pub fn server(&self) -> Ipv4Addr {
        self.config.server
    }

    /// The validated UTC offset in seconds.
    pub fn utc_offset(&self) -> i32 {
        self.config.utc_offset
    }

    /// The effective configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// T1..T4 of the most recent exchange. Fields not reached are zero.
    pub fn timestamps(&self) -> ExchangeTimestamps {
        self.timestamps
    }

    /// The offset applied by the most recent successful exchange.
    pub fn offset(&self) -> Option<ClockOffset> {
        self.offset
    }

    /// Why the most recent `start()` did not end in `Idle`.
    pub fn last_error(&self) -> Option<SyncError> {
        self.last_error
    }

    /// Uptime at the end of the most recent exchange.
    pub fn last_poll_millis(&self) -> u32 {
        self.last_poll_millis
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &*self.transport
    }

    /// A printable summary of the session.
    pub fn report(&self) -> SessionReport {
        SessionReport {
            status: self.status,
            server: self.config.server,
            utc_offset: self.config.utc_offset,
            timestamps: self.timestamps,
        }
    }

    fn open(&mut self) -> Result<Handle, TransportError> {
        if let Some(handle) = self.handle {
            return Ok(handle);
        }
        let handle = self.transport.begin(protocol::PORT)?;
        debug!("time sync endpoint open on port {}", protocol::PORT);
        self.handle = Some(handle);
        Ok(handle)
    }

    fn exchange(&mut self, handle: Handle, began: u32) -> Result<(), SyncError> {
        self.send(handle)?;
        let reply = self.receive(handle, began)?;

        if !reply.mode.indicates_server() {
            return Err(ProtocolError::UnexpectedMode {
                mode: reply.mode as u8,
            }
            .into());
        }

        let offset = clock_offset(&self.timestamps);
        let corrected = offset.apply(self.timestamps.destination, self.config.utc_offset);
        self.clock.set_time(corrected);
        self.offset = Some(offset);

        info!(
            "clock set to {} [{}] from {} (offset {} s {} us)",
            corrected.time_of_day(),
            corrected.secs(),
            self.config.server,
            offset.seconds,
            offset.micros
        );
        Ok(())
    }

    fn send(&mut self, handle: Handle) -> Result<(), SyncError> {
        let originate = timestamp_from_local(self.clock.get_time(), self.config.utc_offset);
        self.timestamps = ExchangeTimestamps {
            originate,
            ..ExchangeTimestamps::default()
        };
        self.request.origin_timestamp = originate;

        let mut buf = [0u8; Packet::PACKED_SIZE_BYTES];
        // Cannot fail: the buffer is packet-sized.
        let len = self
            .request
            .to_bytes(&mut buf)
            .map_err(|_| TransportError::Send)?;
        self.transport
            .send_to(handle, &buf[..len], self.config.server, protocol::PORT)?;
        debug!("sent: {} bytes to {}", len, self.config.server);
        Ok(())
    }

    fn receive(&mut self, handle: Handle, began: u32) -> Result<Packet, SyncError> {
        loop {
            if let Some(reply) = self.try_receive(handle) {
                return Ok(reply);
            }
            self.transport.poll();
            if self.uptime.millis().wrapping_sub(began) > self.config.timeout_millis {
                return Err(SyncError::Timeout);
            }
        }
    }

    /// Take one datagram off the endpoint, returning it if it is a reply from the server.
    fn try_receive(&mut self, handle: Handle) -> Option<Packet> {
        let datagram = self.transport.recv_from(handle)?;

        if datagram.payload.len() != Packet::PACKED_SIZE_BYTES {
            let err = ProtocolError::UnexpectedSize {
                received: datagram.payload.len(),
            };
            debug!("discarded: {}", err);
            self.last_error = Some(err.into());
            return None;
        }
        if datagram.source != self.config.server {
            let err = ProtocolError::UnexpectedSource {
                source: datagram.source,
            };
            debug!("discarded: {}", err);
            self.last_error = Some(err.into());
            return None;
        }

        let destination = timestamp_from_local(self.clock.get_time(), self.config.utc_offset);

        let reply = match Packet::from_bytes(datagram.payload) {
            Ok((reply, _)) => reply,
            Err(err) => {
                debug!("discarded: {}", err);
                return None;
            }
        };

        self.timestamps.receive = reply.receive_timestamp;
        self.timestamps.transmit = reply.transmit_timestamp;
        self.timestamps.destination = destination;

        debug!("recv: reply from {} ({})", self.config.server, reply.reference_id);
        let report = self.report();
        for (name, ts) in report.labelled_timestamps() {
            debug!("{} {}", name, report.ntp_time(ts));
        }
        Some(reply)
    }

    fn push_hardware_clock(&mut self) {
        let Some(hwclock) = self.hwclock.as_deref_mut() else {
            return;
        };
        match hwclock.sys_to_hc(self.clock.get_time()) {
            Ok(()) => debug!("hardware clock set from system clock"),
            Err(err) => warn!("cannot set hardware clock: {}", err),
        }
    }

    fn publish(&mut self, status: Status) {
        self.status = status;
        if let Some(display) = self.display.as_deref_mut() {
            display.show(status);
        }
    }
}

fn resolve<T: DatagramTransport>(mut config: SyncConfig, transport: &T) -> SyncConfig {
    if config.server.is_unspecified() {
        config.server = transport.dhcp_time_server();
        if !config.server.is_unspecified() {
            debug!("using DHCP time server {}", config.server);
        }
    }
    config.utc_offset = validate_utc_offset(config.utc_offset);
    config
}

/// Snapshot of a session for the console.
///
/// Displays as:
///
/// ```text
/// NTP v4 Client [Idle]
///  Server : 192.168.2.1:123
///  UTC offset : 3600 (seconds)
///  Originate   13:04:05.000000 [3969421445]
///  Receive     13:04:05.250000 [3969421445]
///  Transmit    13:04:05.250100 [3969421445]
///  Destination 13:04:05.000300 [3969421445]
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SessionReport {
    /// Session status.
    pub status: Status,
    /// Server address.
    pub server: Ipv4Addr,
    /// UTC offset in seconds.
    pub utc_offset: i32,
    /// The most recent exchange.
    pub timestamps: ExchangeTimestamps,
}

impl SessionReport {
    fn labelled_timestamps(&self) -> [(&'static str, TimestampFormat); 4] {
        [
            ("Originate  ", self.timestamps.originate),
            ("Receive    ", self.timestamps.receive),
            ("Transmit   ", self.timestamps.transmit),
            ("Destination", self.timestamps.destination),
        ]
    }

    fn ntp_time(&self, ts: TimestampFormat) -> NtpTime {
        let unix = unix_time::timestamp_to_unix(ts);
        NtpTime {
            local: Instant::new(
                unix.secs().wrapping_add(self.utc_offset as u32),
                unix.subsec_micros(),
            ),
            seconds: ts.seconds,
        }
    }
}

struct NtpTime {
    local: Instant,
    seconds: u32,
}

impl fmt::Display for NtpTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.local.time_of_day(), self.seconds)
    }
}

impl fmt::Display for SessionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "NTP v{} Client [{}]", protocol::Version::V4.value(), self.status)?;
        if self.status == Status::Stopped {
            return writeln!(f, " Not enabled");
        }
        writeln!(f, " Server : {}:{}", self.server, protocol::PORT)?;
        writeln!(f, " UTC offset : {} (seconds)", self.utc_offset)?;
        for (name, ts) in self.labelled_timestamps() {
            writeln!(f, " {} {}", name, self.ntp_time(ts))?;
        }
        Ok(())
    }
}
