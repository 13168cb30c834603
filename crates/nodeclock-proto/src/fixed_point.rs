// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Conversions between microseconds and 32-bit NTP fractions without floating point or 64-bit
//! arithmetic.
//!
//! The exact scale factor is `2^32 / 10^6 = 4294.967296`. Both directions approximate it with
//! shifts and small integer multipliers so they run on cores without an FPU or a 64-bit
//! multiplier. All arithmetic is 32-bit and wraps, which is what the constants are designed for.

/// Microseconds in one second.
pub const MICROS_PER_SECOND: u32 = 1_000_000;

/// Convert microseconds `[0, 999_999]` to a 32-bit NTP fraction.
///
/// `4294*u + (1981*u >> 11) + (2911*u >> 28)`; the last term removes the residual error of the
/// first two (about 12 µs at the top of the range).
///
/// ```
/// use nodeclock_proto::fixed_point::micro_to_ntp_fraction;
///
/// assert_eq!(micro_to_ntp_fraction(0), 0);
/// assert_eq!(micro_to_ntp_fraction(999_999), 4_294_963_000);
/// ```
pub fn micro_to_ntp_fraction(micros: u32) -> u32 {
    4294u32
        .wrapping_mul(micros)
        .wrapping_add(1981u32.wrapping_mul(micros) >> 11)
        .wrapping_add(2911u32.wrapping_mul(micros) >> 28)
}

/// Convert a 32-bit NTP fraction to microseconds with the classic shift formula.
///
/// `(x >> 12) - 759 * (((x >> 10) + 32768) >> 16)`. The correction is applied in whole steps of
/// 759 µs per 2^26 fraction units, so the result can be off by up to ±380 µs between steps. It is
/// exact at multiples of 2^26, e.g. `0x8000_0000` gives 500 000.
pub fn ntp_fraction_to_micro_coarse(fraction: u32) -> u32 {
    (fraction >> 12).wrapping_sub(759u32.wrapping_mul(((fraction >> 10) + 32768) >> 16))
}

/// Residual between [`ntp_fraction_to_micro_coarse`] and a rounded per-unit correction.
///
/// Replaces the stepped `759 * round(x / 2^26)` term with `round(759 * x / 2^26)`, computed as
/// `(759 * (x >> 10) + 32768) >> 16`, which fits in 32 bits for every input. Range is ±379.
pub fn fraction_correction(fraction: u32) -> i32 {
    let stepped = 759u32.wrapping_mul(((fraction >> 10) + 32768) >> 16);
    let rounded = (759u32.wrapping_mul(fraction >> 10).wrapping_add(32768)) >> 16;
    stepped as i32 - rounded as i32
}

/// Convert a 32-bit NTP fraction to microseconds.
///
/// The coarse shift formula plus [`fraction_correction`]. Within 1.5 µs of the exact value for
/// every input, and `ntp_fraction_to_micro(micro_to_ntp_fraction(u))` is within 1 µs of `u` for
/// every `u` in `[0, 999_999]`.
///
/// ```
/// use nodeclock_proto::fixed_point::{micro_to_ntp_fraction, ntp_fraction_to_micro};
///
/// assert_eq!(ntp_fraction_to_micro(0x8000_0000), 500_000);
/// let back = ntp_fraction_to_micro(micro_to_ntp_fraction(123_456));
/// assert!(back.abs_diff(123_456) <= 1);
/// ```
pub fn ntp_fraction_to_micro(fraction: u32) -> u32 {
    ntp_fraction_to_micro_coarse(fraction).wrapping_add_signed(fraction_correction(fraction))
}
