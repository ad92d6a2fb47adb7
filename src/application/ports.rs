//! Ports (interfaces) for the application layer.
//!
//! In hexagonal architecture, ports define the interfaces that the application
//! layer needs. Infrastructure adapters implement these ports.

use std::fmt::Debug;
use std::hash::Hash;
use std::time::Instant;

/// Source of capture timestamps.
///
/// The guard reads it once per `exit` and once per `check_flush` without an
/// explicit timestamp. Implemented by `SystemClock` and, for tests,
/// `MockClock`.
pub trait Clock: Send + Sync + Debug {
    /// Get the current instant.
    fn now(&self) -> Instant;
}

/// Port for concurrent key-value storage.
///
/// Every accessor runs with exclusive access to the entry for its key, so a
/// read-modify-write done inside one accessor is atomic with respect to other
/// accessors on the same key. Entries for different keys do not contend
/// beyond what the implementation's sharding implies.
pub trait Storage<K, V>: Send + Sync + Debug
where
    K: Hash + Eq + Clone + Send + Sync,
    V: Send + Sync,
{
    /// Run `accessor` on the entry for `key`, inserting `factory()` first
    /// if the key is absent. Returns what the accessor returns.
    fn with_entry_mut<F, R>(&self, key: K, factory: impl FnOnce() -> V, accessor: F) -> R
    where
        F: FnOnce(&mut V) -> R;

    /// Access an existing entry with mutable access.
    ///
    /// Returns `None` without calling the accessor when the key is absent.
    fn with_existing_mut<F, R>(&self, key: &K, accessor: F) -> Option<R>
    where
        F: FnOnce(&mut V) -> R;

    /// Number of entries.
    fn len(&self) -> usize;

    /// Whether there are no entries.
    fn is_empty(&self) -> bool;

    /// Visit every entry, in no particular order.
    fn for_each<F>(&self, f: F)
    where
        F: FnMut(&K, &V);
}
