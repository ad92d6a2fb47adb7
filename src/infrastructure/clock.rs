//! Monotonic system clock.
//!
//! Guards read [`SystemClock`] unless `GuardBuilder::with_clock` injects
//! another [`Clock`]. Tests usually inject `MockClock` from
//! `crate::infrastructure::mocks`, available in test builds or with the
//! `test-helpers` feature.

use crate::application::ports::Clock;
use std::time::Instant;

/// Clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
