//! Central registry for per-kind bucket state.
//!
//! The registry owns one bucket per failure kind ever seen. Buckets are
//! created lazily on first occurrence and are only ever emptied, never
//! removed.

use crate::application::ports::{Clock, Storage};
use crate::domain::{bucket::Bucket, kind::FailureKind};
use std::sync::Arc;
use std::time::Instant;

/// Registry managing all bucket state.
///
/// Uses the Storage port for concurrent access: a closure passed to
/// [`BucketRegistry::with_bucket`] runs with exclusive access to that kind's
/// bucket.
///
/// This type is generic over the storage implementation, allowing different
/// storage backends to be used. The guard uses
/// [`BucketStorage`](crate::infrastructure::storage::BucketStorage).
#[derive(Clone)]
pub struct BucketRegistry<E, S>
where
    E: Send + Sync,
    S: Storage<FailureKind, Bucket<E>> + Clone,
{
    storage: S,
    clock: Arc<dyn Clock>,
    _failure: std::marker::PhantomData<fn() -> E>,
}

impl<E, S> BucketRegistry<E, S>
where
    E: Send + Sync,
    S: Storage<FailureKind, Bucket<E>> + Clone,
{
    /// Create a new registry with storage and a clock.
    pub fn new(storage: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            _failure: std::marker::PhantomData,
        }
    }

    /// Read the registry's clock.
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Access the bucket for `kind`, creating an empty one if necessary.
    pub fn with_bucket<F, R>(&self, kind: FailureKind, f: F) -> R
    where
        F: FnOnce(&mut Bucket<E>) -> R,
    {
        self.storage.with_entry_mut(kind, Bucket::new, f)
    }

    /// Access the bucket for `kind` only if the kind has been seen before.
    pub fn with_existing_bucket<F, R>(&self, kind: &FailureKind, f: F) -> Option<R>
    where
        F: FnOnce(&mut Bucket<E>) -> R,
    {
        self.storage.with_existing_mut(kind, f)
    }

    /// Number of records currently held for `kind`.
    pub fn pending(&self, kind: &FailureKind) -> usize {
        self.with_existing_bucket(kind, |bucket| bucket.len()).unwrap_or(0)
    }

    /// Anchor timestamp of the bucket for `kind`, if it holds any records.
    pub fn anchor(&self, kind: &FailureKind) -> Option<Instant> {
        self.with_existing_bucket(kind, |bucket| bucket.anchor()).flatten()
    }

    /// Total number of records held across all kinds.
    pub fn total_pending(&self) -> usize {
        let mut total = 0;
        self.storage.for_each(|_, bucket| total += bucket.len());
        total
    }

    /// Visit every tracked kind.
    pub fn for_each_kind<F>(&self, mut f: F)
    where
        F: FnMut(&FailureKind),
    {
        self.storage.for_each(|kind, _| f(kind));
    }

    /// Number of kinds tracked (including those whose bucket is empty).
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if no kind has been tracked yet.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::FailureRecord;
    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::mocks::MockClock;
    use crate::infrastructure::storage::{BucketStorage, ShardedStorage};
    use std::time::Duration;

    type TestRegistry = BucketRegistry<&'static str, BucketStorage<&'static str>>;

    fn registry(clock: Arc<dyn Clock>) -> TestRegistry {
        BucketRegistry::new(Arc::new(ShardedStorage::new()), clock)
    }

    fn push(registry: &TestRegistry, kind: &FailureKind, at: Instant) -> usize {
        registry.with_bucket(kind.clone(), |bucket| {
            bucket.push(FailureRecord::with_kind("boom", kind.clone(), at))
        })
    }

    #[test]
    fn test_registry_creation() {
        let registry = registry(Arc::new(SystemClock::new()));

        assert_eq!(registry.len(), 0);
        assert!(registry.is_empty());
        assert_eq!(registry.total_pending(), 0);
    }

    #[test]
    fn test_with_bucket_creates_lazily() {
        let registry = registry(Arc::new(SystemClock::new()));
        let kind = FailureKind::root("io");

        assert_eq!(registry.pending(&kind), 0);
        assert!(registry.is_empty());

        let now = registry.now();
        assert_eq!(push(&registry, &kind, now), 1);
        assert_eq!(push(&registry, &kind, now), 2);

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.pending(&kind), 2);
        assert_eq!(registry.anchor(&kind), Some(now));
    }

    #[test]
    fn test_with_existing_bucket_does_not_create() {
        let registry = registry(Arc::new(SystemClock::new()));
        let kind = FailureKind::root("io");

        assert_eq!(registry.with_existing_bucket(&kind, |b| b.len()), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_emptied_bucket_is_kept() {
        let registry = registry(Arc::new(SystemClock::new()));
        let kind = FailureKind::root("io");

        push(&registry, &kind, registry.now());
        registry.with_bucket(kind.clone(), |bucket| bucket.drain());

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.pending(&kind), 0);
        assert_eq!(registry.anchor(&kind), None);
    }

    #[test]
    fn test_kinds_are_independent() {
        let registry = registry(Arc::new(SystemClock::new()));
        let io = FailureKind::root("io");
        let timeout = io.child("timeout");
        let now = registry.now();

        push(&registry, &io, now);
        push(&registry, &timeout, now);
        push(&registry, &timeout, now);

        assert_eq!(registry.pending(&io), 1);
        assert_eq!(registry.pending(&timeout), 2);
        assert_eq!(registry.total_pending(), 3);
    }

    #[test]
    fn test_now_uses_injected_clock() {
        let start = Instant::now();
        let clock = Arc::new(MockClock::new(start));
        let registry = registry(clock.clone());

        assert_eq!(registry.now(), start);
        clock.advance(Duration::from_secs(3));
        assert_eq!(registry.now(), start + Duration::from_secs(3));
    }

    #[test]
    fn test_concurrent_access() {
        use std::thread;

        let registry = Arc::new(registry(Arc::new(SystemClock::new())));
        let mut handles = vec![];

        for i in 0..10 {
            let registry_clone = Arc::clone(&registry);
            let handle = thread::spawn(move || {
                let kind = FailureKind::root("worker").child(format!("w{}", i));
                for _ in 0..100 {
                    let now = registry_clone.now();
                    push(&registry_clone, &kind, now);
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.len(), 10);
        assert_eq!(registry.total_pending(), 1000);
    }
}
