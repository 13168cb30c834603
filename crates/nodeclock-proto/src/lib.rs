// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! NTP wire types and fixed-point timestamp arithmetic for lighting-node firmware.
//!
//! This crate provides the 48-byte SNTP packet layout (RFC 4330 / RFC 5905),
//! slice-based encoding that works without an allocator, and the integer-only
//! conversions between microseconds and 32-bit NTP fractions used by the clock
//! synchronisation engine in the `nodeclock` crate.

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

/// The codec's buffer-length error.
pub mod error;

/// Integer-only conversions between microseconds and NTP fractions.
pub mod fixed_point;

/// The SNTP header and its codecs.
pub mod protocol;

/// Conversions between the local wall clock and NTP timestamps.
pub mod unix_time;
