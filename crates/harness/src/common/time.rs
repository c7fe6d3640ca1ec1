//! Simulated time.
//!
//! The simulation counts cycles; everything user-facing (trace timestamps,
//! stimulus schedules, sampling resolutions) is expressed in simulated
//! microseconds. This module provides:
//! 1. **`SimTime`:** A microsecond instant derived from a cycle count and a
//!    clock frequency.
//! 2. **`SimClock`:** The process-wide cycle counter, shared between the
//!    advancement thread (which moves it forward) and observers such as the
//!    trace recorder (which read it to stamp records).

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Microseconds per second, for cycle/time conversions.
const MICROS_PER_SEC: u128 = 1_000_000;

/// An instant in simulated time, in microseconds since reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTime(u64);

impl SimTime {
    /// Time zero (reset).
    pub const ZERO: Self = Self(0);

    /// Builds an instant from a raw microsecond count.
    #[must_use]
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Builds an instant from a millisecond count.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * 1000)
    }

    /// Converts a cycle count at the given clock frequency to simulated time.
    ///
    /// Truncates toward zero; a zero frequency maps every cycle count to
    /// time zero rather than dividing by zero.
    #[must_use]
    pub const fn from_cycles(cycles: u64, frequency_hz: u64) -> Self {
        if frequency_hz == 0 {
            return Self::ZERO;
        }
        Self((cycles as u128 * MICROS_PER_SEC / frequency_hz as u128) as u64)
    }

    /// Returns the raw microsecond count.
    #[must_use]
    pub const fn as_micros(self) -> u64 {
        self.0
    }

    /// Rounds this instant down to a multiple of `resolution_micros`.
    ///
    /// A resolution of zero or one leaves the instant untouched.
    #[must_use]
    pub const fn quantize(self, resolution_micros: u64) -> Self {
        if resolution_micros <= 1 {
            self
        } else {
            Self(self.0 - self.0 % resolution_micros)
        }
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} us", self.0)
    }
}

/// Shared simulated clock: an atomic cycle counter plus the clock frequency.
///
/// Cloning is cheap and shares the underlying counter. Only the advancement
/// thread moves the clock forward; any thread may read it. Reads and writes
/// use acquire/release ordering so a stamped record never observes a cycle
/// count older than the signal change that produced it.
#[derive(Clone, Debug)]
pub struct SimClock {
    cycles: Arc<AtomicU64>,
    frequency_hz: u64,
}

impl SimClock {
    /// Creates a clock at cycle zero for the given frequency.
    #[must_use]
    pub fn new(frequency_hz: u64) -> Self {
        Self {
            cycles: Arc::new(AtomicU64::new(0)),
            frequency_hz,
        }
    }

    /// Returns the current cycle count.
    #[must_use]
    pub fn cycle_count(&self) -> u64 {
        self.cycles.load(Ordering::Acquire)
    }

    /// Returns the clock frequency in hertz.
    #[must_use]
    pub const fn frequency_hz(&self) -> u64 {
        self.frequency_hz
    }

    /// Returns the current simulated time.
    #[must_use]
    pub fn now(&self) -> SimTime {
        SimTime::from_cycles(self.cycle_count(), self.frequency_hz)
    }

    /// Advances the clock by `cycles`.
    pub fn advance(&self, cycles: u64) {
        let _ = self.cycles.fetch_add(cycles, Ordering::AcqRel);
    }

    /// Advances the clock by the cycle equivalent of `micros` microseconds.
    ///
    /// Advances by at least one cycle so callers always make forward
    /// progress, even when the requested span rounds down to zero cycles.
    pub fn advance_micros(&self, micros: u64) {
        let cycles = (micros as u128 * self.frequency_hz as u128 / MICROS_PER_SEC) as u64;
        self.advance(cycles.max(1));
    }
}
