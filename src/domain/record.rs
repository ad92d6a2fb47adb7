//! Captured failure occurrences.

use crate::domain::kind::{Failure, FailureKind};
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};

/// One captured occurrence of an eaten failure.
///
/// Holds the original failure value, its kind at capture time, and the
/// instant it was captured.
#[derive(Debug, Clone)]
pub struct FailureRecord<E> {
    failure: E,
    kind: FailureKind,
    captured_at: Instant,
}

impl<E: Failure> FailureRecord<E> {
    /// Capture a failure at the given instant.
    pub fn new(failure: E, captured_at: Instant) -> Self {
        let kind = failure.kind();
        Self::with_kind(failure, kind, captured_at)
    }
}

impl<E> FailureRecord<E> {
    /// Capture a failure whose kind has already been computed.
    pub(crate) fn with_kind(failure: E, kind: FailureKind, captured_at: Instant) -> Self {
        Self {
            failure,
            kind,
            captured_at,
        }
    }

    /// The original failure value.
    pub fn failure(&self) -> &E {
        &self.failure
    }

    /// Kind of the failure at capture time.
    pub fn kind(&self) -> &FailureKind {
        &self.kind
    }

    /// When the failure was captured.
    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    /// Time elapsed between capture and `now`.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.captured_at)
    }

    /// Take the original failure value back.
    pub fn into_failure(self) -> E {
        self.failure
    }
}

/// Renders `kind: message`, followed by one `caused by:` line per source.
impl<E: Failure> fmt::Display for FailureRecord<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.failure)?;
        write_sources(f, &self.failure, "\n  ")
    }
}

/// Write the `source()` chain of `failure`, one cause per line.
pub(crate) fn write_sources(
    f: &mut fmt::Formatter<'_>,
    failure: &dyn Error,
    indent: &str,
) -> fmt::Result {
    let mut source = failure.source();
    while let Some(cause) = source {
        write!(f, "{}caused by: {}", indent, cause)?;
        source = cause.source();
    }
    Ok(())
}
