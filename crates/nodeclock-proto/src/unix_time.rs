//! Local wall-clock instants and their conversion to NTP timestamps.

use core::fmt;

use crate::fixed_point::{self, MICROS_PER_SECOND};
use crate::protocol;
#[cfg(feature = "std")]
use std::time;

/// The number of seconds from 1st January 1900 UTC to the start of the Unix epoch.
pub const EPOCH_DELTA: u32 = 2_208_988_800;

/// Seconds in one day.
pub const SECONDS_PER_DAY: u32 = 86_400;

/// A wall-clock reading: whole seconds since the Unix epoch plus microseconds.
///
/// The seconds are *local* time, i.e. UTC shifted by the node's configured offset. The counter is
/// 32 bits wide and wraps silently, so arithmetic on `secs` is always wrapping.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Instant {
    secs: u32,
    micros: u32,
}

impl Instant {
    /// Create a new **Instant** from its `secs` and `micros` components.
    ///
    /// `micros` at or above one second is carried into `secs`.
    pub const fn new(secs: u32, micros: u32) -> Instant {
        Instant {
            secs: secs.wrapping_add(micros / MICROS_PER_SECOND),
            micros: micros % MICROS_PER_SECOND,
        }
    }

    /// Uses `std::time::SystemTime::now` to determine the current UTC **Instant**.
    ///
    /// Times before the Unix epoch read as the epoch itself.
    #[cfg(feature = "std")]
    pub fn now() -> Self {
        match time::SystemTime::now().duration_since(time::UNIX_EPOCH) {
            Ok(duration) => Instant::new(duration.as_secs() as u32, duration.subsec_micros()),
            Err(_) => Instant::default(),
        }
    }

    /// The "seconds" component of the **Instant**.
    pub const fn secs(&self) -> u32 {
        self.secs
    }

    /// The fractional component of the **Instant** in microseconds, always below 1 000 000.
    pub const fn subsec_micros(&self) -> u32 {
        self.micros
    }

    /// The time of day of this instant, for console output.
    pub const fn time_of_day(&self) -> TimeOfDay {
        let day_secs = self.secs % SECONDS_PER_DAY;
        TimeOfDay {
            hours: (day_secs / 3600) as u8,
            minutes: ((day_secs / 60) % 60) as u8,
            seconds: (day_secs % 60) as u8,
            micros: self.micros,
        }
    }
}

/// Hours, minutes, seconds and microseconds within a day.
///
/// Displays as `hh:mm:ss.uuuuuu`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TimeOfDay {
    /// `0..24`
    pub hours: u8,
    /// `0..60`
    pub minutes: u8,
    /// `0..60`
    pub seconds: u8,
    /// `0..1_000_000`
    pub micros: u32,
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}.{:06}",
            self.hours, self.minutes, self.seconds, self.micros
        )
    }
}

/// Convert a local wall-clock [`Instant`] to an NTP timestamp.
///
/// The UTC offset is removed first, then the epoch moved from 1970 to 1900. Both steps wrap
/// modulo 2^32, matching the width of the on-wire seconds field.
///
/// ```
/// use nodeclock_proto::unix_time::{timestamp_from_local, Instant, EPOCH_DELTA};
///
/// let ts = timestamp_from_local(Instant::new(3600, 0), 3600);
/// assert_eq!(ts.seconds, EPOCH_DELTA);
/// assert_eq!(ts.fraction, 0);
/// ```
pub fn timestamp_from_local(instant: Instant, utc_offset: i32) -> protocol::TimestampFormat {
    protocol::TimestampFormat {
        seconds: instant
            .secs()
            .wrapping_sub(utc_offset as u32)
            .wrapping_add(EPOCH_DELTA),
        fraction: fixed_point::micro_to_ntp_fraction(instant.subsec_micros()),
    }
}

/// Convert an NTP timestamp to Unix seconds and microseconds, ignoring any UTC offset.
pub fn timestamp_to_unix(ts: protocol::TimestampFormat) -> Instant {
    Instant::new(
        ts.seconds.wrapping_sub(EPOCH_DELTA),
        fixed_point::ntp_fraction_to_micro(ts.fraction),
    )
}

impl From<protocol::TimestampFormat> for Instant {
    fn from(ts: protocol::TimestampFormat) -> Self {
        timestamp_to_unix(ts)
    }
}
