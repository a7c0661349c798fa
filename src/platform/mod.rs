//! Platform abstraction traits.
//!
//! The engine reads the clock through [`TimeProvider`] so hosts can substitute a
//! deterministic source (tests, replay) for the system clock.

mod std_impl;

pub use std_impl::StdTimeProvider;

/// Trait for providing time-related functionality.
pub trait TimeProvider {
    /// Get the current time as milliseconds since Unix epoch.
    fn now_millis(&self) -> i64;

    /// Get elapsed milliseconds since a timer was started.
    fn elapsed_millis(&self, start: u64) -> u64;

    /// Start a timer and return an opaque handle.
    /// The handle can be passed to `elapsed_millis` to get the elapsed time.
    fn start_timer(&self) -> u64;
}

/// A time provider frozen at a fixed instant.
pub struct FixedTimeProvider {
    millis: i64,
}

impl FixedTimeProvider {
    pub fn new(millis: i64) -> Self {
        Self { millis }
    }
}

impl TimeProvider for FixedTimeProvider {
    fn now_millis(&self) -> i64 {
        self.millis
    }

    fn elapsed_millis(&self, _start: u64) -> u64 {
        0
    }

    fn start_timer(&self) -> u64 {
        0
    }
}
