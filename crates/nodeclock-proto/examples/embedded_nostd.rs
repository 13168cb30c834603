// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

// Firmware-side SNTP packet handling without an allocator
//
// Walks through what the node firmware does with this crate on every exchange:
// stamp the request with the local wall clock, serialise it into a stack buffer,
// then parse a reply and turn its fractions back into microseconds. Everything
// used below is available with `default-features = false`.
//
// Usage:
//   cargo run -p nodeclock-proto --example embedded_nostd

use nodeclock_proto::error::ParseError;
use nodeclock_proto::fixed_point::{micro_to_ntp_fraction, ntp_fraction_to_micro};
use nodeclock_proto::protocol::{
    ConstPackedSizeBytes, FromBytes, Mode, Packet, ReferenceId, Stratum, TimestampFormat, ToBytes,
};
use nodeclock_proto::unix_time::{EPOCH_DELTA, Instant, timestamp_from_local};

fn main() {
    println!("=== Stack-only SNTP exchange ===");
    println!();

    // ── 1. Request ─────────────────────────────────────────────────────
    //
    // Local time is UTC+01:00; the originate timestamp is UTC on the wire.

    let utc_offset = 3600;
    let local_now = Instant::new(1_760_000_000 + utc_offset as u32, 250_000);

    let mut request = Packet::client_request();
    request.origin_timestamp = timestamp_from_local(local_now, utc_offset);

    let mut tx_buf = [0u8; Packet::PACKED_SIZE_BYTES];
    let written = request
        .to_bytes(&mut tx_buf)
        .expect("buffer is exactly the right size");

    println!("Request ({} bytes):", written);
    println!("  Mode:      {:?}", request.mode);
    println!("  Reference: {}", request.reference_id);
    println!(
        "  T1:        {}.{:08x}",
        request.origin_timestamp.seconds, request.origin_timestamp.fraction
    );
    assert_eq!(request.origin_timestamp.seconds, 1_760_000_000 + EPOCH_DELTA);
    assert_eq!(
        request.origin_timestamp.fraction,
        micro_to_ntp_fraction(250_000)
    );
    println!();

    // ── 2. Reply ───────────────────────────────────────────────────────
    //
    // Pretend the server echoed our request back in server mode.

    let mut reply = request;
    reply.mode = Mode::Server;
    reply.stratum = Stratum::PRIMARY;
    reply.reference_id = ReferenceId(*b"GPS\0");
    reply.receive_timestamp = TimestampFormat::new(1_760_000_005 + EPOCH_DELTA, 0);
    reply.transmit_timestamp = TimestampFormat::new(1_760_000_005 + EPOCH_DELTA, 0x8000_0000);

    let mut rx_buf = [0u8; Packet::PACKED_SIZE_BYTES];
    reply.to_bytes(&mut rx_buf).expect("buffer is exactly the right size");

    let (parsed, consumed) = Packet::from_bytes(&rx_buf).expect("valid packet bytes");
    assert_eq!(consumed, Packet::PACKED_SIZE_BYTES);
    assert!(parsed.mode.indicates_server());

    println!("Reply from {} (stratum {}):", parsed.reference_id, parsed.stratum.0);
    println!(
        "  T2 micros: {}",
        ntp_fraction_to_micro(parsed.receive_timestamp.fraction)
    );
    println!(
        "  T3 micros: {}",
        ntp_fraction_to_micro(parsed.transmit_timestamp.fraction)
    );
    println!();

    // ── 3. Truncated datagrams ─────────────────────────────────────────

    match Packet::from_bytes(&rx_buf[..40]) {
        Err(ParseError::Truncated { needed, available }) => {
            println!("Truncated reply rejected: needed {needed}, available {available}");
        }
        other => panic!("expected Truncated, got: {:?}", other),
    }
}
