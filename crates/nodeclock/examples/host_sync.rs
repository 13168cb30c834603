// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Synchronise a host-side copy of the node clock against a real server.
//!
//! The clock starts out wrong by a minute so the correction is visible.
//!
//! Run with: `RUST_LOG=debug cargo run --example host_sync -- 129.6.15.28 3600`

use std::cell::Cell;
use std::net::Ipv4Addr;
use std::time;

use nodeclock::clock::WallClock;
use nodeclock::config::SyncConfig;
use nodeclock::host::{StdUptime, UdpTransport};
use nodeclock::sync::{Status, SyncSession};
use nodeclock::unix_time::Instant;

/// Local time kept as "value at some reference point plus elapsed time".
struct HostClock {
    base: Cell<(Instant, time::Instant)>,
}

impl HostClock {
    fn new(now: Instant) -> Self {
        HostClock {
            base: Cell::new((now, time::Instant::now())),
        }
    }
}

impl WallClock for HostClock {
    fn get_time(&self) -> Instant {
        let (at, since) = self.base.get();
        let elapsed = since.elapsed();
        Instant::new(
            at.secs().wrapping_add(elapsed.as_secs() as u32),
            at.subsec_micros() + elapsed.subsec_micros(),
        )
    }

    fn set_time(&self, time: Instant) {
        self.base.set((time, time::Instant::now()));
    }
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let server: Ipv4Addr = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(Ipv4Addr::new(129, 6, 15, 28));
    let utc_offset: i32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(0);

    let system = Instant::now();
    let skewed = Instant::new(
        system.secs().wrapping_add(utc_offset as u32).wrapping_sub(60),
        system.subsec_micros(),
    );
    let clock = HostClock::new(skewed);

    // Port 123 usually needs privileges, so take an ephemeral one.
    let mut network = UdpTransport::new().with_local_port(0);
    let uptime = StdUptime::new();
    let config = SyncConfig::builder()
        .server(server)
        .utc_offset(utc_offset)
        .timeout_millis(5000)
        .retry_exchanges(true)
        .build();

    let mut session = SyncSession::new(config, &clock, &mut network, &uptime);
    println!("before: {}", clock.get_time().time_of_day());

    let status = session.start();
    print!("{}", session.report());
    match status {
        Status::Idle => {
            if let Some(offset) = session.offset() {
                println!("offset: {} s {} us", offset.seconds, offset.micros);
            }
        }
        _ => {
            if let Some(err) = session.last_error() {
                println!("sync failed: {}", err);
            }
        }
    }
    session.stop();
    drop(session);

    println!("after:  {}", clock.get_time().time_of_day());
}
