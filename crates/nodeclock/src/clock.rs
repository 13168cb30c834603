// Copyright 2026 U.S. Federal Government (in countries where recognized)
// SPDX-License-Identifier: Apache-2.0

//! Wall clock driven by a hardware timer with a one-second rollover interrupt.
//!
//! The timer counts at 10 kHz and rolls over every 10 000 ticks, so the tick register is the
//! sub-second part in 100 µs units and the interrupt handler only has to bump a seconds counter.
//! The counter lives in a [`critical_section::Mutex`]; foreground code never touches it outside
//! `critical_section::with`.
//!
//! # Wiring on a Cortex-M target
//!
//! ```ignore
//! static CLOCK: MonotonicClock<Timer6> = MonotonicClock::new(Timer6::steal());
//!
//! #[interrupt]
//! fn TIMER6() {
//!     CLOCK.on_timer_rollover();
//! }
//!
//! #[entry]
//! fn main() -> ! {
//!     CLOCK.init();
//!     // ...
//! }
//! ```

use core::cell::Cell;

use critical_section::Mutex;
use log::debug;

use crate::unix_time::Instant;

/// Timer ticks per second, and the rollover period.
pub const TICKS_PER_SECOND: u32 = 10_000;

/// Tick rate the timer prescaler is set for.
pub const TICK_HZ: u32 = 10_000;

/// Microseconds per timer tick.
pub const MICROS_PER_TICK: u32 = 1_000_000 / TICK_HZ;

/// The hardware timer behind a [`MonotonicClock`].
///
/// Register access on microcontrollers goes through shared references to volatile cells, so
/// every method takes `&self`. Implementations must be callable from the rollover interrupt.
pub trait RolloverTimer {
    /// Set the prescaler for `tick_hz` and the period so the counter runs `0..ticks_per_rollover`.
    fn configure(&self, tick_hz: u32, ticks_per_rollover: u32);

    /// Clear every pending status and interrupt flag.
    fn clear_flags(&self);

    /// Enable the update (rollover) interrupt at the peripheral.
    fn enable_rollover_interrupt(&self);

    /// Disable the update (rollover) interrupt at the peripheral.
    fn disable_rollover_interrupt(&self);

    /// Unmask the timer interrupt in the interrupt controller at the lowest priority.
    fn unmask_interrupt(&self);

    /// Start counting.
    fn start(&self);

    /// Stop counting. The tick register keeps its value.
    fn stop(&self);

    /// Current tick register.
    fn counter(&self) -> u32;

    /// Overwrite the tick register.
    fn set_counter(&self, ticks: u32);

    /// Whether the rollover flag is set.
    fn rollover_pending(&self) -> bool;
}

/// A settable wall clock.
///
/// This is what the sync engine corrects. [`MonotonicClock`] is the firmware implementation.
pub trait WallClock {
    /// Current local time.
    fn get_time(&self) -> Instant;

    /// Overwrite the local time.
    fn set_time(&self, time: Instant);

    /// Whole seconds of [`get_time`](Self::get_time).
    fn now_seconds(&self) -> u32 {
        self.get_time().secs()
    }
}

/// Seconds counter plus hardware sub-second ticks.
///
/// Owning the timer peripheral is what makes a clock unique: a HAL hands out each timer once,
/// so only one `MonotonicClock` can drive it.
pub struct MonotonicClock<T: RolloverTimer> {
    timer: T,
    seconds: Mutex<Cell<u32>>,
}

impl<T: RolloverTimer> MonotonicClock<T> {
    /// Take ownership of the timer. The clock reads zero until [`init`](Self::init) and
    /// [`set_time`](Self::set_time).
    pub const fn new(timer: T) -> Self {
        MonotonicClock {
            timer,
            seconds: Mutex::new(Cell::new(0)),
        }
    }

    /// Program a 10 kHz tick with a one-second rollover and start the timer.
    pub fn init(&self) {
        self.timer.configure(TICK_HZ, TICKS_PER_SECOND);
        self.timer.clear_flags();
        self.timer.enable_rollover_interrupt();
        self.timer.unmask_interrupt();
        self.timer.start();
        debug!("wall clock timer running at {} Hz", TICK_HZ);
    }

    /// Body of the timer interrupt handler.
    ///
    /// Advances the seconds counter by one (wrapping) when the rollover flag is set, then clears
    /// the flags.
    pub fn on_timer_rollover(&self) {
        if self.timer.rollover_pending() {
            critical_section::with(|cs| {
                let seconds = self.seconds.borrow(cs);
                seconds.set(seconds.get().wrapping_add(1));
            });
        }
        self.timer.clear_flags();
    }

    /// Current local time at tick resolution.
    ///
    /// The seconds counter and the tick register are read one after the other. A read that
    /// straddles a rollover can pair the old seconds with a tick value near zero, i.e. come out
    /// up to one second early. Callers that need more than second-level accuracy around the
    /// rollover must read twice and compare.
    pub fn get_time(&self) -> Instant {
        let secs = critical_section::with(|cs| self.seconds.borrow(cs).get());
        let ticks = self.timer.counter();
        Instant::new(secs, ticks.wrapping_mul(MICROS_PER_TICK))
    }

    /// Overwrite the local time.
    ///
    /// The timer is frozen (interrupt off, counter stopped) while the seconds counter and the
    /// tick register are written, and restarted with clean flags afterwards. Sub-tick
    /// microseconds are truncated. [`Instant::new`] has already carried whole seconds out of
    /// the microseconds, so the tick value is always below [`TICKS_PER_SECOND`].
    pub fn set_time(&self, time: Instant) {
        let _frozen = Frozen::new(&self.timer);
        critical_section::with(|cs| self.seconds.borrow(cs).set(time.secs()));
        self.timer
            .set_counter(time.subsec_micros() / MICROS_PER_TICK);
    }

    /// Whole seconds of [`get_time`](Self::get_time).
    pub fn now_seconds(&self) -> u32 {
        self.get_time().secs()
    }

    /// The underlying timer.
    pub fn timer(&self) -> &T {
        &self.timer
    }
}

impl<T: RolloverTimer> WallClock for MonotonicClock<T> {
    fn get_time(&self) -> Instant {
        MonotonicClock::get_time(self)
    }

    fn set_time(&self, time: Instant) {
        MonotonicClock::set_time(self, time)
    }

    fn now_seconds(&self) -> u32 {
        MonotonicClock::now_seconds(self)
    }
}

/// Timer stopped with its interrupt disabled for as long as this lives.
struct Frozen<'a, T: RolloverTimer>(&'a T);

impl<'a, T: RolloverTimer> Frozen<'a, T> {
    fn new(timer: &'a T) -> Self {
        timer.disable_rollover_interrupt();
        timer.stop();
        Frozen(timer)
    }
}

impl<T: RolloverTimer> Drop for Frozen<'_, T> {
    fn drop(&mut self) {
        self.0.clear_flags();
        self.0.enable_rollover_interrupt();
        self.0.start();
    }
}
