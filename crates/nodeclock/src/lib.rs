// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

/*!
Wall clock and SNTP time synchronisation for lighting-node firmware.

The node has no battery-backed time source. [`clock::MonotonicClock`] keeps wall time from a
hardware timer that rolls over once a second, and [`sync::SyncSession`] corrects it against an
SNTP server using integer-only arithmetic. The network stack, the uptime counter and the
optional hardware clock chip are reached through traits, so the same engine runs on the node and
in host tests.

# Example

```rust,no_run
use std::net::Ipv4Addr;

use nodeclock::clock::WallClock;
use nodeclock::config::SyncConfig;
use nodeclock::host::{StdUptime, UdpTransport};
use nodeclock::sync::{Status, SyncSession};
# use nodeclock::unix_time::Instant;
# struct Clock(std::cell::Cell<Instant>);
# impl WallClock for Clock {
#     fn get_time(&self) -> Instant { self.0.get() }
#     fn set_time(&self, t: Instant) { self.0.set(t) }
# }
# let clock = Clock(std::cell::Cell::new(Instant::now()));

let mut network = UdpTransport::new().with_local_port(0);
let uptime = StdUptime::new();
let config = SyncConfig::builder()
    .server(Ipv4Addr::new(192, 168, 2, 1))
    .utc_offset(3600)
    .build();

let mut session = SyncSession::new(config, &clock, &mut network, &uptime);
if session.start() == Status::Idle {
    print!("{}", session.report());
}
```

# Feature Flags

| Feature | Default | Description |
|---------|---------|-------------|
| `std` | yes | Host UDP transport and uptime source and `std::error::Error` impls. Disable for firmware builds. |

The crate does not pick a `critical-section` implementation. The final binary must provide
one: `cortex-m/critical-section-single-core` or the HAL's `critical-section-impl` on the
node, `critical-section/std` on a host.
*/

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

// Re-export protocol types from nodeclock_proto for convenience.
pub use nodeclock_proto::{fixed_point, protocol, unix_time};

/// Hardware-timer wall clock.
pub mod clock;

/// Time-sync settings and UTC offset validation.
pub mod config;

/// Error types for the sync engine and its collaborators.
pub mod error;

/// Uptime, hardware clock and status display hooks.
pub mod platform;

/// The SNTP exchange engine.
pub mod sync;

/// The datagram transport seam.
pub mod transport;

/// UDP transport and uptime for running on a host.
#[cfg(feature = "std")]
pub mod host;
