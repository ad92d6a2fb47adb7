//! Combined failures produced when a bucket saturates.

use crate::domain::kind::{Failure, FailureKind};
use crate::domain::record::{write_sources, FailureRecord};
use std::error::Error;
use std::fmt;
use std::time::{Duration, Instant};

/// Aggregate of every record rolled up from a saturated bucket.
///
/// The triggering kind is carried as data: use [`CombinedFailure::is_kind`] to
/// test it the same way an individual failure's kind would be tested.
#[derive(Debug, Clone)]
pub struct CombinedFailure<E> {
    kind: FailureKind,
    records: Vec<FailureRecord<E>>,
}

impl<E> CombinedFailure<E> {
    /// Combine `records` (oldest first) of the given kind.
    pub fn new(kind: FailureKind, records: Vec<FailureRecord<E>>) -> Self {
        Self { kind, records }
    }

    /// Kind of the bucket that saturated.
    pub fn kind(&self) -> &FailureKind {
        &self.kind
    }

    /// Check whether this combined failure is of `kind` or a sub-kind of it.
    pub fn is_kind(&self, kind: &FailureKind) -> bool {
        self.kind.is_a(kind)
    }

    /// The rolled-up records, oldest first.
    pub fn records(&self) -> &[FailureRecord<E>] {
        &self.records
    }

    /// Iterate over the original failure values, oldest first.
    pub fn failures(&self) -> impl Iterator<Item = &E> {
        self.records.iter().map(FailureRecord::failure)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Capture time of the oldest record.
    pub fn first_captured(&self) -> Option<Instant> {
        self.records.first().map(FailureRecord::captured_at)
    }

    /// Capture time of the newest record, the one that triggered escalation.
    pub fn last_captured(&self) -> Option<Instant> {
        self.records.last().map(FailureRecord::captured_at)
    }

    /// Time between the first and the last rolled-up record.
    pub fn span(&self) -> Duration {
        match (self.first_captured(), self.last_captured()) {
            (Some(first), Some(last)) => last.saturating_duration_since(first),
            _ => Duration::ZERO,
        }
    }

    /// Take the records back.
    pub fn into_records(self) -> Vec<FailureRecord<E>> {
        self.records
    }
}

impl<E: Failure> fmt::Display for CombinedFailure<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} `{}` failures over {:?}",
            self.records.len(),
            self.kind,
            self.span()
        )?;
        for (i, record) in self.records.iter().enumerate() {
            write!(f, "\n  [{}] {}: {}", i + 1, record.kind(), record.failure())?;
            write_sources(f, record.failure(), "\n      ")?;
        }
        Ok(())
    }
}

impl<E: Failure> Error for CombinedFailure<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.records
            .last()
            .map(|record| record.failure() as &(dyn Error + 'static))
    }
}
