//! Manually driven clock.

use crate::application::ports::Clock;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Clock that only moves when a test moves it.
///
/// Digest windows are measured against the guard's clock, so injecting a
/// `MockClock` lets a test cross a window of any length instantly.
///
/// # Examples
///
/// ```
/// use fault_nom::application::ports::Clock;
/// use fault_nom::infrastructure::mocks::MockClock;
/// use std::time::{Duration, Instant};
///
/// let start = Instant::now();
/// let clock = MockClock::new(start);
/// assert_eq!(clock.now(), start);
///
/// clock.advance(Duration::from_secs(86_400));
/// assert_eq!(clock.elapsed(), Duration::from_secs(86_400));
///
/// clock.set(start + Duration::from_secs(5));
/// assert_eq!(clock.now(), start + Duration::from_secs(5));
/// ```
///
/// Clones share the same time, so a clone handed to a guard through
/// `GuardBuilder::with_clock` keeps following the test's copy.
#[derive(Debug, Clone)]
pub struct MockClock {
    origin: Instant,
    current: Arc<Mutex<Instant>>,
}

impl MockClock {
    /// Create a mock clock reading `start`.
    pub fn new(start: Instant) -> Self {
        Self {
            origin: start,
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        *self.lock() += duration;
    }

    /// Jump the clock to `instant`.
    ///
    /// An instant earlier than the current reading moves the clock backwards.
    pub fn set(&self, instant: Instant) {
        *self.lock() = instant;
    }

    /// Time advanced since the clock was created.
    ///
    /// Zero if the clock was set before its starting instant.
    pub fn elapsed(&self) -> Duration {
        self.lock().saturating_duration_since(self.origin)
    }

    // A panicking test thread must not wedge the clock for the others
    fn lock(&self) -> std::sync::MutexGuard<'_, Instant> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self.lock()
    }
}
