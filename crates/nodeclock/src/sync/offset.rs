// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Round-trip clock offset in 32-bit fixed point.
//!
//! Everything here is integer arithmetic on (seconds, fraction) pairs, so the result is the same
//! bit for bit on the node and on the host.

use crate::fixed_point::{MICROS_PER_SECOND, ntp_fraction_to_micro};
use crate::protocol::TimestampFormat;
use crate::unix_time::{EPOCH_DELTA, Instant};

/// The four timestamps of one exchange.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExchangeTimestamps {
    /// T1: local time the request left.
    pub originate: TimestampFormat,
    /// T2: server time the request arrived.
    pub receive: TimestampFormat,
    /// T3: server time the reply left.
    pub transmit: TimestampFormat,
    /// T4: local time the reply arrived.
    pub destination: TimestampFormat,
}

/// `stop - start` with the fraction kept as an unsigned binary fraction.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Difference {
    /// Whole seconds, signed.
    pub seconds: i32,
    /// Fraction of a second, in units of 2^-32 s.
    pub fraction: u32,
}

/// Compute `stop - start`.
///
/// When the fraction has to borrow, the result is the bitwise complement of
/// `start.fraction - stop.fraction` and one second is taken off. That is one unit short of the
/// two's-complement borrow, which the firmware has always done; the 2^-32 s error is far below
/// the microsecond resolution of the result.
pub fn difference(start: TimestampFormat, stop: TimestampFormat) -> Difference {
    let mut seconds = stop.seconds.wrapping_sub(start.seconds) as i32;
    let fraction = if stop.fraction >= start.fraction {
        stop.fraction - start.fraction
    } else {
        seconds = seconds.wrapping_sub(1);
        !(start.fraction - stop.fraction)
    };
    Difference { seconds, fraction }
}

/// Offset of the server clock from the local clock.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ClockOffset {
    /// Whole seconds, signed.
    pub seconds: i32,
    /// Microseconds, always added on top of `seconds`.
    pub micros: u32,
}

/// `((T2 - T1) + (T3 - T4)) / 2`.
///
/// Seconds and microseconds are summed and halved separately, each with truncating division, so
/// an odd second sum drops its half second. The microsecond part is never negative, so offsets
/// just below zero come out as `-1 s + 999_xxx µs` halved to `0 s + 499_xxx µs`. The node has
/// always corrected this way.
pub fn clock_offset(t: &ExchangeTimestamps) -> ClockOffset {
    let d1 = difference(t.originate, t.receive);
    let d2 = difference(t.destination, t.transmit);

    let mut seconds = d1.seconds.wrapping_add(d2.seconds);
    let mut micros = ntp_fraction_to_micro(d1.fraction) + ntp_fraction_to_micro(d2.fraction);
    if micros >= MICROS_PER_SECOND {
        micros -= MICROS_PER_SECOND;
        seconds = seconds.wrapping_add(1);
    }

    ClockOffset {
        seconds: seconds / 2,
        micros: micros / 2,
    }
}

impl ClockOffset {
    /// Corrected local time: the destination timestamp moved to the Unix epoch, plus this offset
    /// and the UTC offset.
    pub fn apply(&self, destination: TimestampFormat, utc_offset: i32) -> Instant {
        let mut secs = destination
            .seconds
            .wrapping_sub(EPOCH_DELTA)
            .wrapping_add(self.seconds as u32)
            .wrapping_add(utc_offset as u32);
        let mut micros = ntp_fraction_to_micro(destination.fraction) + self.micros;
        if micros >= MICROS_PER_SECOND {
            secs = secs.wrapping_add(1);
            micros -= MICROS_PER_SECOND;
        }
        Instant::new(secs, micros)
    }
}
