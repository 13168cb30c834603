// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Monotonic clock behavior against a register-level timer.

mod common;

use common::FakeTimer;
use nodeclock::clock::{MICROS_PER_TICK, MonotonicClock, TICK_HZ, TICKS_PER_SECOND, WallClock};
use nodeclock::unix_time::Instant;
use proptest::prelude::*;

fn running_clock() -> MonotonicClock<FakeTimer> {
    let clock = MonotonicClock::new(FakeTimer::default());
    clock.init();
    clock
}

#[test]
fn test_init_programs_one_second_rollover() {
    let clock = running_clock();
    let timer = clock.timer();
    assert_eq!(timer.tick_hz.get(), TICK_HZ);
    assert_eq!(timer.ticks_per_rollover.get(), TICKS_PER_SECOND);
    assert!(timer.running.get());
    assert!(timer.irq_enabled.get());
    assert!(timer.irq_unmasked.get());
    assert_eq!(clock.get_time(), Instant::new(0, 0));
}

#[test]
fn test_rollover_counts_seconds() {
    let clock = running_clock();
    clock.set_time(Instant::new(1000, 0));
    for _ in 0..3 {
        clock.timer().pending.set(true);
        clock.on_timer_rollover();
    }
    assert_eq!(clock.now_seconds(), 1003);
    assert!(!clock.timer().pending.get());
}

#[test]
fn test_spurious_interrupt_does_not_count() {
    let clock = running_clock();
    clock.set_time(Instant::new(1000, 0));
    clock.on_timer_rollover();
    assert_eq!(clock.now_seconds(), 1000);
}

#[test]
fn test_seconds_wrap() {
    let clock = running_clock();
    clock.set_time(Instant::new(u32::MAX, 0));
    clock.timer().pending.set(true);
    clock.on_timer_rollover();
    assert_eq!(clock.now_seconds(), 0);
}

#[test]
fn test_sub_second_from_counter() {
    let clock = running_clock();
    clock.set_time(Instant::new(42, 0));
    clock.timer().counter.set(1234);
    assert_eq!(clock.get_time(), Instant::new(42, 123_400));
}

#[test]
fn test_set_time_restarts_timer_with_clean_flags() {
    let clock = running_clock();
    clock.timer().pending.set(true);
    clock.set_time(Instant::new(5, 999_999));
    let timer = clock.timer();
    assert!(timer.running.get());
    assert!(timer.irq_enabled.get());
    assert!(!timer.pending.get());
    assert_eq!(timer.counter.get(), 9999);
}

#[test]
fn test_set_time_carries_whole_seconds_out_of_micros() {
    let clock = running_clock();
    clock.set_time(Instant::new(7, 1_000_250));
    assert_eq!(clock.now_seconds(), 8);
    assert_eq!(clock.timer().counter.get(), 2);
    assert_eq!(clock.get_time(), Instant::new(8, 200));
}

#[test]
fn test_usable_as_wall_clock() {
    fn advance<C: WallClock>(clock: &C, secs: u32) {
        let now = clock.get_time();
        clock.set_time(Instant::new(now.secs() + secs, now.subsec_micros()));
    }

    let clock = running_clock();
    clock.set_time(Instant::new(100, 500_000));
    advance(&clock, 10);
    assert_eq!(WallClock::now_seconds(&clock), 110);
    assert_eq!(clock.get_time().subsec_micros(), 500_000);
}

proptest! {
    #[test]
    fn set_then_get_within_one_tick(secs in any::<u32>(), micros in 0u32..1_000_000) {
        let clock = running_clock();
        clock.set_time(Instant::new(secs, micros));
        let now = clock.get_time();
        prop_assert_eq!(now.secs(), secs);
        prop_assert!(now.subsec_micros() <= micros);
        prop_assert!(micros - now.subsec_micros() < MICROS_PER_TICK);
    }
}
