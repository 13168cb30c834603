// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Shared fakes for integration tests: a register-level timer, a scripted datagram transport,
//! a stepping uptime counter and recording platform hooks.

// Integration test helpers are `pub` so each `tests/*.rs` file can import them
// via `mod common`, but not every file uses every helper.
#![allow(unreachable_pub, dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::net::Ipv4Addr;

use nodeclock::clock::{RolloverTimer, WallClock};
use nodeclock::error::{HwClockError, TransportError};
use nodeclock::platform::{HardwareClock, StatusDisplay, Uptime};
use nodeclock::protocol::{
    ConstPackedSizeBytes, FromBytes, LeapIndicator, Mode, Packet, ReferenceId, ShortFormat,
    Stratum, TimestampFormat, ToBytes, Version,
};
use nodeclock::sync::Status;
use nodeclock::transport::{Datagram, DatagramTransport, Handle};
use nodeclock::unix_time::Instant;

/// Server used by most tests.
pub const SERVER: Ipv4Addr = Ipv4Addr::new(192, 168, 2, 1);

/// Timer whose registers are plain cells. The counter only moves when a test writes it.
#[derive(Default)]
pub struct FakeTimer {
    pub tick_hz: Cell<u32>,
    pub ticks_per_rollover: Cell<u32>,
    pub counter: Cell<u32>,
    pub pending: Cell<bool>,
    pub running: Cell<bool>,
    pub irq_enabled: Cell<bool>,
    pub irq_unmasked: Cell<bool>,
}

impl RolloverTimer for FakeTimer {
    fn configure(&self, tick_hz: u32, ticks_per_rollover: u32) {
        self.tick_hz.set(tick_hz);
        self.ticks_per_rollover.set(ticks_per_rollover);
    }
    fn clear_flags(&self) {
        self.pending.set(false);
    }
    fn enable_rollover_interrupt(&self) {
        self.irq_enabled.set(true);
    }
    fn disable_rollover_interrupt(&self) {
        self.irq_enabled.set(false);
    }
    fn unmask_interrupt(&self) {
        self.irq_unmasked.set(true);
    }
    fn start(&self) {
        self.running.set(true);
    }
    fn stop(&self) {
        self.running.set(false);
    }
    fn counter(&self) -> u32 {
        self.counter.get()
    }
    fn set_counter(&self, ticks: u32) {
        self.counter.set(ticks);
    }
    fn rollover_pending(&self) -> bool {
        self.pending.get()
    }
}

/// A wall clock that stands still unless set.
pub struct FakeClock {
    now: Cell<Instant>,
    pub sets: Cell<u32>,
}

impl FakeClock {
    pub fn new(now: Instant) -> Self {
        FakeClock {
            now: Cell::new(now),
            sets: Cell::new(0),
        }
    }
}

impl WallClock for FakeClock {
    fn get_time(&self) -> Instant {
        self.now.get()
    }
    fn set_time(&self, time: Instant) {
        self.sets.set(self.sets.get() + 1);
        self.now.set(time);
    }
}

/// Uptime that moves forward by `step` milliseconds every time it is read.
pub struct FakeUptime {
    now: Cell<u32>,
    step: u32,
}

impl FakeUptime {
    pub fn new(step: u32) -> Self {
        FakeUptime {
            now: Cell::new(0),
            step,
        }
    }

    pub fn starting_at(start: u32, step: u32) -> Self {
        FakeUptime {
            now: Cell::new(start),
            step,
        }
    }

    pub fn advance(&self, millis: u32) {
        self.now.set(self.now.get().wrapping_add(millis));
    }
}

impl Uptime for FakeUptime {
    fn millis(&self) -> u32 {
        let now = self.now.get().wrapping_add(self.step);
        self.now.set(now);
        now
    }
}

/// A datagram waiting to be delivered once at least `after_sends` requests have gone out.
pub struct Scripted {
    pub payload: Vec<u8>,
    pub source: Ipv4Addr,
    pub after_sends: usize,
}

/// Transport that records what is sent and replays scripted datagrams.
#[derive(Default)]
pub struct MockTransport {
    pub inbox: VecDeque<Scripted>,
    pub sent: Vec<(Vec<u8>, Ipv4Addr, u16)>,
    pub begins: Vec<u16>,
    pub ends: Vec<u16>,
    pub polls: usize,
    pub fail_begin: bool,
    pub dhcp_server: Option<Ipv4Addr>,
    current: Vec<u8>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `payload` from `source` as soon as the first request has been sent.
    pub fn reply(mut self, payload: Vec<u8>, source: Ipv4Addr) -> Self {
        self.inbox.push_back(Scripted {
            payload,
            source,
            after_sends: 1,
        });
        self
    }

    /// Deliver `payload` from `source` once `sends` requests have been sent.
    pub fn reply_after(mut self, sends: usize, payload: Vec<u8>, source: Ipv4Addr) -> Self {
        self.inbox.push_back(Scripted {
            payload,
            source,
            after_sends: sends,
        });
        self
    }

    /// Decode the `n`th request that went out.
    pub fn sent_packet(&self, n: usize) -> Packet {
        let (bytes, _, _) = &self.sent[n];
        let (packet, _) = Packet::from_bytes(bytes).expect("sent packet parses");
        packet
    }
}

impl DatagramTransport for MockTransport {
    fn begin(&mut self, port: u16) -> Result<Handle, TransportError> {
        self.begins.push(port);
        if self.fail_begin {
            return Err(TransportError::Bind { port });
        }
        Ok(Handle(7))
    }

    fn send_to(
        &mut self,
        handle: Handle,
        payload: &[u8],
        ip: Ipv4Addr,
        port: u16,
    ) -> Result<(), TransportError> {
        assert_eq!(handle, Handle(7));
        self.sent.push((payload.to_vec(), ip, port));
        Ok(())
    }

    fn recv_from(&mut self, handle: Handle) -> Option<Datagram<'_>> {
        assert_eq!(handle, Handle(7));
        let sends = self.sent.len();
        if self.inbox.front().is_none_or(|d| d.after_sends > sends) {
            return None;
        }
        let next = self.inbox.pop_front()?;
        self.current = next.payload;
        Some(Datagram {
            payload: &self.current,
            source: next.source,
            source_port: 123,
        })
    }

    fn end(&mut self, port: u16) {
        self.ends.push(port);
    }

    fn poll(&mut self) {
        self.polls += 1;
    }

    fn dhcp_time_server(&self) -> Ipv4Addr {
        self.dhcp_server.unwrap_or(Ipv4Addr::UNSPECIFIED)
    }
}

/// Hardware clock chip that records what it was given.
#[derive(Default)]
pub struct RecordingHwClock {
    pub writes: Vec<Instant>,
    pub fail: bool,
}

impl HardwareClock for RecordingHwClock {
    fn sys_to_hc(&mut self, now: Instant) -> Result<(), HwClockError> {
        if self.fail {
            return Err(HwClockError::Write);
        }
        self.writes.push(now);
        Ok(())
    }
}

/// Status display that keeps every status it was shown.
#[derive(Default)]
pub struct RecordingDisplay {
    pub shown: Vec<Status>,
}

impl StatusDisplay for RecordingDisplay {
    fn show(&mut self, status: Status) {
        self.shown.push(status);
    }
}

/// Encode a server reply carrying `receive` and `transmit`.
pub fn server_reply(receive: TimestampFormat, transmit: TimestampFormat) -> Vec<u8> {
    reply_with_mode(Mode::Server, receive, transmit)
}

/// Encode a reply with an arbitrary mode.
pub fn reply_with_mode(mode: Mode, receive: TimestampFormat, transmit: TimestampFormat) -> Vec<u8> {
    let packet = Packet {
        leap_indicator: LeapIndicator::NoWarning,
        version: Version::V4,
        mode,
        stratum: Stratum(2),
        poll: 10,
        precision: -20,
        root_delay: ShortFormat::default(),
        root_dispersion: ShortFormat::default(),
        reference_id: ReferenceId(*b"GPS\0"),
        reference_timestamp: receive,
        origin_timestamp: TimestampFormat::default(),
        receive_timestamp: receive,
        transmit_timestamp: transmit,
    };
    let mut buf = vec![0u8; Packet::PACKED_SIZE_BYTES];
    packet.to_bytes(&mut buf).expect("reply encodes");
    buf
}

/// `ts` moved forward by `secs` seconds and `fraction` units of 2^-32 s (no carry).
pub fn later(ts: TimestampFormat, secs: u32, fraction: u32) -> TimestampFormat {
    TimestampFormat::new(ts.seconds.wrapping_add(secs), ts.fraction.wrapping_add(fraction))
}
