//! Observability metrics for the guard.
//!
//! Provides counters of guard decisions for monitoring and debugging.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking guard decisions.
///
/// All metrics use atomic operations for thread-safe updates and reads.
/// Clones share the same counters.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    /// Failures whose kind is not eaten
    passed_through: AtomicU64,
    /// Eaten failures swallowed below the threshold
    suppressed: AtomicU64,
    /// Records handed to the digest sink
    digested: AtomicU64,
    /// Saturated buckets rolled into a combined failure
    escalations: AtomicU64,
    /// Escalations taken by the escalate action
    absorbed: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                passed_through: AtomicU64::new(0),
                suppressed: AtomicU64::new(0),
                digested: AtomicU64::new(0),
                escalations: AtomicU64::new(0),
                absorbed: AtomicU64::new(0),
            }),
        }
    }

    pub(crate) fn record_passed_through(&self) {
        self.inner.passed_through.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_suppressed(&self) {
        self.inner.suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_digested(&self, records: usize) {
        self.inner
            .digested
            .fetch_add(records as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_escalation(&self) {
        self.inner.escalations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_absorbed(&self) {
        self.inner.absorbed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the number of failures passed through uneaten.
    pub fn passed_through(&self) -> u64 {
        self.inner.passed_through.load(Ordering::Relaxed)
    }

    /// Get the number of failures suppressed below the threshold.
    pub fn suppressed(&self) -> u64 {
        self.inner.suppressed.load(Ordering::Relaxed)
    }

    /// Get the number of records digested.
    pub fn digested(&self) -> u64 {
        self.inner.digested.load(Ordering::Relaxed)
    }

    /// Get the number of escalations.
    pub fn escalations(&self) -> u64 {
        self.inner.escalations.load(Ordering::Relaxed)
    }

    /// Get the number of escalations absorbed by the escalate action.
    pub fn absorbed(&self) -> u64 {
        self.inner.absorbed.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            passed_through: self.passed_through(),
            suppressed: self.suppressed(),
            digested: self.digested(),
            escalations: self.escalations(),
            absorbed: self.absorbed(),
        }
    }

    /// Reset all metrics to zero.
    ///
    /// Useful for testing or when starting a new monitoring period.
    pub fn reset(&self) {
        self.inner.passed_through.store(0, Ordering::Relaxed);
        self.inner.suppressed.store(0, Ordering::Relaxed);
        self.inner.digested.store(0, Ordering::Relaxed);
        self.inner.escalations.store(0, Ordering::Relaxed);
        self.inner.absorbed.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Failures whose kind is not eaten
    pub passed_through: u64,
    /// Eaten failures swallowed below the threshold
    pub suppressed: u64,
    /// Records handed to the digest sink
    pub digested: u64,
    /// Saturated buckets rolled into a combined failure
    pub escalations: u64,
    /// Escalations taken by the escalate action
    pub absorbed: u64,
}

impl MetricsSnapshot {
    /// Number of escalations that surfaced to the caller.
    pub fn surfaced(&self) -> u64 {
        self.escalations.saturating_sub(self.absorbed)
    }

    /// Calculate the escalation rate (0.0 to 1.0).
    ///
    /// Returns the ratio of escalations to suppressed-or-escalated failures.
    /// Returns 0.0 if nothing was suppressed or escalated.
    pub fn escalation_rate(&self) -> f64 {
        let total = self.suppressed.saturating_add(self.escalations);
        if total == 0 {
            0.0
        } else {
            self.escalations as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initial_state() {
        let metrics = Metrics::new();
        assert_eq!(metrics.passed_through(), 0);
        assert_eq!(metrics.suppressed(), 0);
        assert_eq!(metrics.digested(), 0);
        assert_eq!(metrics.escalations(), 0);
        assert_eq!(metrics.absorbed(), 0);
    }

    #[test]
    fn test_record_suppressed() {
        let metrics = Metrics::new();
        metrics.record_suppressed();
        metrics.record_suppressed();
        assert_eq!(metrics.suppressed(), 2);
        assert_eq!(metrics.passed_through(), 0);
    }

    #[test]
    fn test_record_digested_counts_records() {
        let metrics = Metrics::new();
        metrics.record_digested(3);
        metrics.record_digested(2);
        assert_eq!(metrics.digested(), 5);
    }

    #[test]
    fn test_snapshot() {
        let metrics = Metrics::new();
        metrics.record_passed_through();
        metrics.record_suppressed();
        metrics.record_suppressed();
        metrics.record_escalation();
        metrics.record_escalation();
        metrics.record_absorbed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.passed_through, 1);
        assert_eq!(snapshot.suppressed, 2);
        assert_eq!(snapshot.escalations, 2);
        assert_eq!(snapshot.absorbed, 1);
        assert_eq!(snapshot.surfaced(), 1);
    }

    #[test]
    fn test_snapshot_escalation_rate() {
        let metrics = Metrics::new();

        assert_eq!(metrics.snapshot().escalation_rate(), 0.0);

        metrics.record_suppressed();
        metrics.record_suppressed();
        metrics.record_suppressed();
        assert_eq!(metrics.snapshot().escalation_rate(), 0.0);

        metrics.record_escalation();
        assert!((metrics.snapshot().escalation_rate() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset() {
        let metrics = Metrics::new();
        metrics.record_passed_through();
        metrics.record_suppressed();
        metrics.record_digested(4);
        metrics.record_escalation();
        metrics.record_absorbed();

        metrics.reset();
        assert_eq!(metrics.snapshot(), Metrics::new().snapshot());
    }

    #[test]
    fn test_metrics_clone() {
        let metrics1 = Metrics::new();
        metrics1.record_suppressed();

        let metrics2 = metrics1.clone();
        metrics2.record_suppressed();

        // Both should see the same value (shared Arc)
        assert_eq!(metrics1.suppressed(), 2);
        assert_eq!(metrics2.suppressed(), 2);
    }

    #[test]
    fn test_concurrent_updates() {
        use std::thread;

        let metrics = Metrics::new();
        let mut handles = vec![];

        for _ in 0..10 {
            let m = metrics.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    m.record_suppressed();
                    m.record_digested(2);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.suppressed(), 1000);
        assert_eq!(metrics.digested(), 2000);
    }
}
