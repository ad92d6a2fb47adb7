//! The guard's decision pipeline.
//!
//! Every eaten failure runs through the same fixed sequence:
//!
//! ```text
//! observe → append → digestion check → saturation check → suppress
//! ```
//!
//! Digestion and saturation are mutually exclusive for one call: when the
//! flush window drains the bucket, the new record is part of the drain and
//! the threshold is not evaluated.
//!
//! `exit` reads the clock twice: once to stamp the record, and again after
//! the observe action for the digestion check. A record landing in an empty
//! bucket is therefore already as old as the time between the two readings.

use crate::application::metrics::Metrics;
use crate::application::ports::Clock;
use crate::application::registry::BucketRegistry;
use crate::domain::{
    combined::CombinedFailure,
    kind::{EatenKinds, Failure, FailureKind},
    outcome::{Escaped, Outcome},
    record::FailureRecord,
};
use crate::infrastructure::storage::{BucketStorage, ShardedStorage};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Callback invoked with every eaten failure, before it is bucketed.
pub type ObserveAction<E> = Arc<dyn Fn(&FailureRecord<E>) + Send + Sync + 'static>;

/// Callback invoked once per record when a bucket is flushed by the window.
pub type DigestAction<E> = Arc<dyn Fn(FailureRecord<E>) + Send + Sync + 'static>;

/// Callback deciding the fate of a combined failure.
///
/// Returning `Ok(())` absorbs the escalation. Returning the combined failure
/// back as `Err` re-raises it to the caller of `exit`.
pub type EscalateAction<E> =
    Arc<dyn Fn(CombinedFailure<E>) -> Result<(), CombinedFailure<E>> + Send + Sync + 'static>;

/// Immutable guard configuration, assembled by the builder.
pub(crate) struct GuardConfig<E> {
    pub(crate) eaten: EatenKinds,
    pub(crate) threshold: usize,
    pub(crate) digest_window: Option<Duration>,
    pub(crate) observe_action: Option<ObserveAction<E>>,
    pub(crate) digest_action: Option<DigestAction<E>>,
    pub(crate) escalate_action: Option<EscalateAction<E>>,
}

/// What the bucket critical section decided.
enum BucketVerdict<E> {
    Suppressed(usize),
    Digested(Vec<FailureRecord<E>>),
    Saturated(Vec<FailureRecord<E>>),
}

/// Stateful guard that eats, digests and escalates failures per kind.
///
/// A guard is built once and then brackets any number of units of work. It
/// is `Send + Sync` and can be shared through an `Arc`: the bookkeeping for
/// one kind is serialized, distinct kinds do not contend.
///
/// # Example
/// ```
/// use fault_nom::{Failure, FailureKind, Guard, Outcome};
/// use std::fmt;
///
/// #[derive(Debug)]
/// struct Flaky;
///
/// impl fmt::Display for Flaky {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "flaky backend")
///     }
/// }
///
/// impl std::error::Error for Flaky {}
///
/// impl Failure for Flaky {
///     fn kind(&self) -> FailureKind {
///         FailureKind::root("backend")
///     }
/// }
///
/// let guard = Guard::new(FailureKind::root("backend"), 2).unwrap();
///
/// assert!(matches!(guard.enter().exit(Some(Flaky)), Outcome::Suppressed));
/// assert!(matches!(guard.enter().exit(Some(Flaky)), Outcome::Suppressed));
///
/// // The third failure of the same kind exceeds the threshold
/// match guard.enter().exit(Some(Flaky)) {
///     Outcome::Escalated(combined) => assert_eq!(combined.len(), 3),
///     other => panic!("expected escalation, got {:?}", other),
/// }
/// ```
pub struct Guard<E: Failure> {
    config: GuardConfig<E>,
    registry: BucketRegistry<E, BucketStorage<E>>,
    metrics: Metrics,
}

impl<E: Failure> Guard<E> {
    pub(crate) fn from_config(config: GuardConfig<E>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            registry: BucketRegistry::new(Arc::new(ShardedStorage::new()), clock),
            metrics: Metrics::new(),
        }
    }

    /// Mark the start of a protected unit of work.
    ///
    /// Changes no state. The returned bracket is closed with
    /// [`Bracket::exit`]; dropping it without exiting counts as a normal
    /// completion.
    pub fn enter(&self) -> Bracket<'_, E> {
        Bracket { guard: self }
    }

    /// Close a bracket with the failure that escaped the unit of work, if any.
    ///
    /// See [`Outcome`] for the possible results.
    pub fn exit(&self, failure: Option<E>) -> Outcome<E> {
        let Some(failure) = failure else {
            return Outcome::Completed;
        };

        let kind = failure.kind();
        if !self.config.eaten.matches(&kind) {
            self.metrics.record_passed_through();
            tracing::trace!(kind = %kind, "failure passed through");
            return Outcome::PassThrough(failure);
        }

        let captured_at = self.registry.now();
        let record = FailureRecord::with_kind(failure, kind.clone(), captured_at);

        if let Some(observe) = &self.config.observe_action {
            observe(&record);
        }

        // The window is measured up to a reading taken after capture
        let now = self.registry.now();

        let threshold = self.config.threshold;
        let window = self.config.digest_window;

        // Callbacks run after the bucket lock is released
        let verdict = self.registry.with_bucket(kind.clone(), |bucket| {
            bucket.push(record);

            if let Some(window) = window {
                if bucket.is_expired(now, window) {
                    return BucketVerdict::Digested(bucket.drain());
                }
            }

            if bucket.len() > threshold {
                BucketVerdict::Saturated(bucket.drain())
            } else {
                BucketVerdict::Suppressed(bucket.len())
            }
        });

        // Concurrent drains of one kind may reach their callbacks in either order
        match verdict {
            BucketVerdict::Suppressed(count) => {
                self.metrics.record_suppressed();
                tracing::trace!(kind = %kind, count, threshold, "failure suppressed");
                Outcome::Suppressed
            }
            BucketVerdict::Digested(records) => {
                self.digest(&kind, records);
                Outcome::Digested
            }
            BucketVerdict::Saturated(records) => self.escalate(kind, records),
        }
    }

    /// Run the digestion check for `kind` at `now_override`, or at the
    /// guard's clock when `None`.
    ///
    /// Returns the number of records digested. Without a digest window this
    /// is a no-op returning 0, whatever the arguments.
    pub fn check_flush(&self, kind: &FailureKind, now_override: Option<Instant>) -> usize {
        let Some(window) = self.config.digest_window else {
            return 0;
        };
        let now = now_override.unwrap_or_else(|| self.registry.now());

        let drained = self
            .registry
            .with_existing_bucket(kind, |bucket| {
                if bucket.is_expired(now, window) {
                    bucket.drain()
                } else {
                    Vec::new()
                }
            })
            .unwrap_or_default();

        self.digest(kind, drained)
    }

    /// Run the digestion check for every tracked kind.
    ///
    /// Returns the total number of records digested.
    pub fn check_flush_all(&self, now_override: Option<Instant>) -> usize {
        if self.config.digest_window.is_none() {
            return 0;
        }
        let now = now_override.unwrap_or_else(|| self.registry.now());

        let mut kinds = Vec::with_capacity(self.registry.len());
        self.registry.for_each_kind(|kind| kinds.push(kind.clone()));

        kinds
            .iter()
            .map(|kind| self.check_flush(kind, Some(now)))
            .sum()
    }

    /// Bracket `work`: run it and feed its failure, if any, to [`Guard::exit`].
    ///
    /// Returns `Ok(Some(value))` on success, `Ok(None)` when the failure was
    /// handled, and the escaping failure otherwise.
    pub fn run<T, F>(&self, work: F) -> Result<Option<T>, Escaped<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let bracket = self.enter();
        match work() {
            Ok(value) => {
                bracket.exit(None).into_result()?;
                Ok(Some(value))
            }
            Err(failure) => {
                bracket.exit(Some(failure)).into_result()?;
                Ok(None)
            }
        }
    }

    fn digest(&self, kind: &FailureKind, records: Vec<FailureRecord<E>>) -> usize {
        let count = records.len();
        if count == 0 {
            return 0;
        }
        self.metrics.record_digested(count);

        match &self.config.digest_action {
            Some(digest) => {
                tracing::debug!(kind = %kind, records = count, "digesting bucket");
                for record in records {
                    digest(record);
                }
            }
            None => {
                tracing::debug!(
                    kind = %kind,
                    records = count,
                    "bucket flushed without a digest action, records dropped"
                );
            }
        }

        count
    }

    fn escalate(&self, kind: FailureKind, records: Vec<FailureRecord<E>>) -> Outcome<E> {
        self.metrics.record_escalation();
        tracing::warn!(
            kind = %kind,
            records = records.len(),
            threshold = self.config.threshold,
            "bucket saturated, escalating combined failure"
        );

        let combined = CombinedFailure::new(kind, records);
        let Some(escalate) = &self.config.escalate_action else {
            return Outcome::Escalated(combined);
        };

        match escalate(combined) {
            Ok(()) => {
                self.metrics.record_absorbed();
                tracing::debug!("combined failure absorbed by escalate action");
                Outcome::Absorbed
            }
            Err(combined) => Outcome::Escalated(combined),
        }
    }

    /// The configured kind selection.
    pub fn eaten_kinds(&self) -> &EatenKinds {
        &self.config.eaten
    }

    /// Maximum tolerated records per kind before escalation.
    pub fn threshold(&self) -> usize {
        self.config.threshold
    }

    /// The flush window, if time-based digestion is enabled.
    pub fn digest_window(&self) -> Option<Duration> {
        self.config.digest_window
    }

    /// Number of records currently held for `kind`.
    pub fn bucket_len(&self, kind: &FailureKind) -> usize {
        self.registry.pending(kind)
    }

    /// Anchor timestamp of the bucket for `kind`, if it holds any records.
    pub fn bucket_anchor(&self, kind: &FailureKind) -> Option<Instant> {
        self.registry.anchor(kind)
    }

    /// Number of kinds seen so far.
    pub fn tracked_kinds(&self) -> usize {
        self.registry.len()
    }

    /// Total number of records held across all kinds.
    pub fn pending(&self) -> usize {
        self.registry.total_pending()
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

impl<E: Failure> fmt::Debug for Guard<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn callback<T>(action: &Option<T>) -> Option<&'static str> {
            action.as_ref().map(|_| "<fn>")
        }

        f.debug_struct("Guard")
            .field("eaten", &self.config.eaten)
            .field("threshold", &self.config.threshold)
            .field("digest_window", &self.config.digest_window)
            .field("observe_action", &callback(&self.config.observe_action))
            .field("digest_action", &callback(&self.config.digest_action))
            .field("escalate_action", &callback(&self.config.escalate_action))
            .field("tracked_kinds", &self.registry.len())
            .finish()
    }
}

/// An open bracket around one unit of work.
///
/// Consumed by [`Bracket::exit`], so a bracket exits at most once.
#[derive(Debug)]
#[must_use = "a bracket should be exited with the failure of its unit of work"]
pub struct Bracket<'g, E: Failure> {
    guard: &'g Guard<E>,
}

impl<'g, E: Failure> Bracket<'g, E> {
    /// Close the bracket. Same semantics as [`Guard::exit`].
    pub fn exit(self, failure: Option<E>) -> Outcome<E> {
        self.guard.exit(failure)
    }
}
