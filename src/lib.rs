//! # fault-nom
//!
//! A stateful guard that eats expected failures, digests them in batches and
//! escalates them as one combined failure once they pile up.
//!
//! A [`Guard`] brackets units of work. When a unit of work fails with a kind
//! the guard is configured to eat, the failure is recorded in a per-kind
//! bucket and swallowed. Failures of any other kind pass through untouched.
//! A bucket that collects more failures than the configured threshold is
//! rolled into a single [`CombinedFailure`], and a bucket whose oldest record
//! is older than the digest window is flushed to a digest sink instead.
//!
//! ## Quick Start
//!
//! ```rust
//! use fault_nom::{Failure, FailureKind, Guard};
//! use std::fmt;
//!
//! #[derive(Debug)]
//! enum FetchError {
//!     Timeout(String),
//!     NotFound(String),
//! }
//!
//! impl fmt::Display for FetchError {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         match self {
//!             FetchError::Timeout(url) => write!(f, "timed out fetching {}", url),
//!             FetchError::NotFound(url) => write!(f, "{} not found", url),
//!         }
//!     }
//! }
//!
//! impl std::error::Error for FetchError {}
//!
//! impl Failure for FetchError {
//!     fn kind(&self) -> FailureKind {
//!         match self {
//!             FetchError::Timeout(_) => FailureKind::from_path("fetch::timeout"),
//!             FetchError::NotFound(_) => FailureKind::from_path("fetch::not_found"),
//!         }
//!     }
//! }
//!
//! // Tolerate up to three timeouts, let everything else through
//! let guard = Guard::builder()
//!     .eating("fetch::timeout")
//!     .with_threshold(3)
//!     .build()
//!     .unwrap();
//!
//! for _ in 0..3 {
//!     let result = guard.run(|| Err::<(), _>(FetchError::Timeout("a".into())));
//!     assert!(matches!(result, Ok(None)));
//! }
//!
//! // The fourth timeout escalates
//! let escaped = guard
//!     .run(|| Err::<(), _>(FetchError::Timeout("a".into())))
//!     .unwrap_err();
//! assert_eq!(escaped.as_combined().map(|c| c.len()), Some(4));
//!
//! // Other kinds are never eaten
//! let escaped = guard
//!     .run(|| Err::<(), _>(FetchError::NotFound("b".into())))
//!     .unwrap_err();
//! assert_eq!(escaped.kind(), FailureKind::from_path("fetch::not_found"));
//! ```
//!
//! ## Failure Kinds
//!
//! Every guarded failure type implements [`Failure`], which reports the
//! [`FailureKind`] of a value. Kinds form a hierarchy: `io::timeout` is a
//! sub-kind of `io`. Eating a kind eats every sub-kind of it as well, but
//! each concrete kind keeps its own bucket and its own count.
//!
//! ```rust
//! use fault_nom::{EatenKinds, FailureKind};
//!
//! let io = FailureKind::root("io");
//! let timeout = io.child("timeout");
//!
//! assert!(timeout.is_a(&io));
//! assert_eq!(timeout.to_string(), "io::timeout");
//!
//! let eaten = EatenKinds::from(io);
//! assert!(eaten.matches(&timeout));
//! assert!(!eaten.matches(&FailureKind::root("value")));
//! assert!(EatenKinds::all().matches(&FailureKind::root("value")));
//! ```
//!
//! ## Outcomes
//!
//! [`Guard::exit`] reports what it did with a failure as an [`Outcome`]:
//!
//! | Outcome | Meaning |
//! |---------|---------|
//! | `Completed` | The unit of work did not fail |
//! | `PassThrough(e)` | The kind is not eaten; `e` is handed back untouched |
//! | `Suppressed` | Recorded and swallowed |
//! | `Digested` | The bucket was flushed to the digest action |
//! | `Absorbed` | The bucket saturated; the escalate action took the combined failure |
//! | `Escalated(c)` | The bucket saturated; `c` must be propagated |
//!
//! [`Outcome::into_result`] folds the handled outcomes into `Ok(())` and the
//! escaping ones into an [`Escaped`] error.
//!
//! ## Digestion
//!
//! With a digest window configured, a bucket whose oldest record is at least
//! the window old is flushed on the next failure of that kind, or by an
//! explicit [`Guard::check_flush`]. Every record is handed to the digest
//! action in chronological order and the bucket starts over.
//!
//! ```rust
//! # use fault_nom::{Failure, FailureKind, FailureRecord, Guard, Outcome};
//! # use std::fmt;
//! # #[derive(Debug)]
//! # struct Stale(u32);
//! # impl fmt::Display for Stale {
//! #     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "stale read {}", self.0) }
//! # }
//! # impl std::error::Error for Stale {}
//! # impl Failure for Stale {
//! #     fn kind(&self) -> FailureKind { FailureKind::root("stale") }
//! # }
//! use std::sync::{Arc, Mutex};
//! use std::time::{Duration, Instant};
//!
//! let digested = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&digested);
//!
//! let guard = Guard::builder()
//!     .eating_all()
//!     .with_digest_window(Duration::from_secs(60))
//!     .with_digest_action(move |record: FailureRecord<Stale>| {
//!         sink.lock().unwrap().push(record.to_string());
//!     })
//!     .build()
//!     .unwrap();
//!
//! assert!(matches!(guard.exit(Some(Stale(1))), Outcome::Suppressed));
//! assert!(matches!(guard.exit(Some(Stale(2))), Outcome::Suppressed));
//!
//! // Force the check as if two minutes had passed
//! let later = Instant::now() + Duration::from_secs(120);
//! assert_eq!(guard.check_flush(&FailureKind::root("stale"), Some(later)), 2);
//! assert_eq!(
//!     *digested.lock().unwrap(),
//!     vec!["stale: stale read 1", "stale: stale read 2"]
//! );
//! ```
//!
//! ## Concurrency
//!
//! A guard is `Send + Sync` and is typically shared behind an `Arc`. The
//! append and the digestion or saturation decision for one kind run inside a
//! single per-key critical section of a sharded map, so concurrent exits of
//! the same kind never lose or double-count records. Callbacks run after
//! that section is left and may call back into the guard.
//!
//! ## Observability
//!
//! The guard emits `tracing` events: `trace` on suppression and
//! pass-through, `debug` on digestion, `warn` on escalation. Counters of
//! every decision are available through [`Guard::metrics`]:
//!
//! ```rust,no_run
//! # use fault_nom::{EatenKinds, Failure, FailureKind, Guard};
//! # #[derive(Debug)]
//! # struct Boom;
//! # impl std::fmt::Display for Boom {
//! #     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "boom") }
//! # }
//! # impl std::error::Error for Boom {}
//! # impl Failure for Boom {
//! #     fn kind(&self) -> FailureKind { FailureKind::root("boom") }
//! # }
//! # let guard = Guard::<Boom>::new(EatenKinds::all(), 10).unwrap();
//! let snapshot = guard.metrics().snapshot();
//! println!("Suppressed: {}", snapshot.suppressed);
//! println!("Escalations: {}", snapshot.escalations);
//! println!("Escalation rate: {:.2}%", snapshot.escalation_rate() * 100.0);
//! ```

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    bucket::Bucket,
    combined::CombinedFailure,
    kind::{EatenKinds, Failure, FailureKind, KIND_SEPARATOR},
    outcome::{Escaped, Outcome},
    record::FailureRecord,
};

pub use application::{
    guard::{Bracket, DigestAction, EscalateAction, Guard, ObserveAction},
    metrics::{Metrics, MetricsSnapshot},
    ports::{Clock, Storage},
    registry::BucketRegistry,
};

pub use infrastructure::{
    builder::{BuildError, GuardBuilder, DEFAULT_THRESHOLD},
    clock::SystemClock,
    storage::{BucketStorage, ShardedStorage},
};
