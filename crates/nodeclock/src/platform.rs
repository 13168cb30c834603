// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Board services the sync engine uses besides the clock and the network.

use crate::error::HwClockError;
use crate::sync::Status;
use crate::unix_time::Instant;

/// Milliseconds since boot.
///
/// Must keep counting regardless of what happens to the wall clock; the sync engine bounds its
/// receive loop with it. Wraps after about 49.7 days, and callers compare with wrapping
/// subtraction.
pub trait Uptime {
    /// Milliseconds since boot.
    fn millis(&self) -> u32;
}

impl<U: Uptime + ?Sized> Uptime for &U {
    fn millis(&self) -> u32 {
        (**self).millis()
    }
}

/// A battery-backed clock chip that keeps time across power loss.
pub trait HardwareClock {
    /// Copy the system wall clock into the hardware clock.
    fn sys_to_hc(&mut self, now: Instant) -> Result<(), HwClockError>;
}

/// Something that shows the sync status to a person, e.g. a status line on the node's display.
pub trait StatusDisplay {
    /// Show `status`.
    fn show(&mut self, status: Status);
}
