//! Per-kind record buckets.
//!
//! A bucket queues the captured records of one failure kind until they are
//! digested by the flush window or rolled into a combined failure.

use crate::domain::record::FailureRecord;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Ordered records of one failure kind.
///
/// Records are kept in insertion order, which is chronological order. The
/// anchor timestamp is the capture time of the oldest retained record, so an
/// empty bucket has no anchor.
///
/// # Example
/// ```
/// use fault_nom::domain::bucket::Bucket;
/// use fault_nom::{FailureKind, FailureRecord};
/// # use fault_nom::Failure;
/// # use std::fmt;
/// use std::time::{Duration, Instant};
///
/// # #[derive(Debug)]
/// # struct Boom;
/// # impl fmt::Display for Boom {
/// #     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "boom") }
/// # }
/// # impl std::error::Error for Boom {}
/// # impl Failure for Boom {
/// #     fn kind(&self) -> FailureKind { FailureKind::root("boom") }
/// # }
/// let start = Instant::now();
/// let mut bucket = Bucket::new();
/// assert_eq!(bucket.anchor(), None);
///
/// bucket.push(FailureRecord::new(Boom, start));
/// bucket.push(FailureRecord::new(Boom, start + Duration::from_secs(1)));
/// assert_eq!(bucket.anchor(), Some(start));
///
/// // The window is measured from the anchor
/// assert!(!bucket.is_expired(start + Duration::from_secs(9), Duration::from_secs(10)));
/// assert!(bucket.is_expired(start + Duration::from_secs(10), Duration::from_secs(10)));
///
/// let drained = bucket.drain();
/// assert_eq!(drained.len(), 2);
/// assert!(bucket.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Bucket<E> {
    records: VecDeque<FailureRecord<E>>,
}

impl<E> Bucket<E> {
    /// Create an empty bucket.
    pub fn new() -> Self {
        Self {
            records: VecDeque::new(),
        }
    }

    /// Append a record and return the new record count.
    pub fn push(&mut self, record: FailureRecord<E>) -> usize {
        self.records.push_back(record);
        self.records.len()
    }

    /// Number of records currently retained.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check whether the bucket holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Capture time of the oldest retained record.
    pub fn anchor(&self) -> Option<Instant> {
        self.records.front().map(FailureRecord::captured_at)
    }

    /// Check whether at least `window` has elapsed between the anchor and `now`.
    ///
    /// An empty bucket is never expired.
    pub fn is_expired(&self, now: Instant, window: Duration) -> bool {
        self.anchor()
            .map(|anchor| now.saturating_duration_since(anchor) >= window)
            .unwrap_or(false)
    }

    /// Remove and return every record, oldest first.
    pub fn drain(&mut self) -> Vec<FailureRecord<E>> {
        self.records.drain(..).collect()
    }

    /// Iterate over the retained records, oldest first.
    pub fn records(&self) -> impl Iterator<Item = &FailureRecord<E>> {
        self.records.iter()
    }
}

impl<E> Default for Bucket<E> {
    fn default() -> Self {
        Self::new()
    }
}
