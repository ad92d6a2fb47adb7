//! Guard construction.
//!
//! A [`GuardBuilder`] collects the configuration; [`GuardBuilder::build`]
//! validates it once and produces an immutable [`Guard`].

use crate::application::guard::{DigestAction, EscalateAction, Guard, GuardConfig, ObserveAction};
use crate::application::ports::Clock;
use crate::domain::{
    combined::CombinedFailure,
    kind::{EatenKinds, Failure, FailureKind},
    record::FailureRecord,
};
use crate::infrastructure::clock::SystemClock;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Threshold used when none is configured.
pub const DEFAULT_THRESHOLD: usize = 10;

/// Error returned when building a [`Guard`] fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Threshold must be greater than zero
    ZeroThreshold,
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::ZeroThreshold => write!(f, "threshold must be greater than 0"),
        }
    }
}

impl std::error::Error for BuildError {}

/// Builder for constructing a [`Guard`].
pub struct GuardBuilder<E: Failure> {
    eaten: EatenKinds,
    threshold: usize,
    digest_window: Option<Duration>,
    observe_action: Option<ObserveAction<E>>,
    digest_action: Option<DigestAction<E>>,
    escalate_action: Option<EscalateAction<E>>,
    clock: Option<Arc<dyn Clock>>,
}

impl<E: Failure> GuardBuilder<E> {
    fn new() -> Self {
        Self {
            eaten: EatenKinds::none(),
            threshold: DEFAULT_THRESHOLD,
            digest_window: None,
            observe_action: None,
            digest_action: None,
            escalate_action: None,
            clock: None,
        }
    }

    /// Set the maximum number of failures of one kind tolerated before
    /// escalation.
    ///
    /// The bucket escalates when it holds strictly more records than this.
    /// Default: 10. Zero is rejected by [`GuardBuilder::build`].
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Eat failures of `kind` and of every sub-kind of it.
    ///
    /// Can be called repeatedly to eat several kinds.
    pub fn eating(mut self, kind: impl Into<FailureKind>) -> Self {
        self.eaten = self.eaten.with(kind.into());
        self
    }

    /// Eat every failure, whatever its kind.
    pub fn eating_all(mut self) -> Self {
        self.eaten = self.eaten.with_all();
        self
    }

    /// Replace the kind selection.
    pub fn with_eaten_kinds(mut self, eaten: impl Into<EatenKinds>) -> Self {
        self.eaten = eaten.into();
        self
    }

    /// Call `action` with every eaten failure, before it is bucketed.
    pub fn with_observe_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&FailureRecord<E>) + Send + Sync + 'static,
    {
        self.observe_action = Some(Arc::new(action));
        self
    }

    /// Call `action` once per record, oldest first, when a bucket is flushed
    /// by the digest window.
    ///
    /// The action runs after the bucket has been emptied and its lock
    /// released, so it may call back into the guard. Records of one drain are
    /// delivered in order, but two threads draining the same kind at once may
    /// deliver their batches interleaved.
    pub fn with_digest_action<F>(mut self, action: F) -> Self
    where
        F: Fn(FailureRecord<E>) + Send + Sync + 'static,
    {
        self.digest_action = Some(Arc::new(action));
        self
    }

    /// Flush a bucket once its oldest record is at least `window` old.
    ///
    /// Without a window, buckets only empty through escalation.
    pub fn with_digest_window(mut self, window: Duration) -> Self {
        self.digest_window = Some(window);
        self
    }

    /// Hand every combined failure to `action`.
    ///
    /// `Ok(())` absorbs the escalation; `Err(combined)` re-raises it.
    pub fn with_escalate_action<F>(mut self, action: F) -> Self
    where
        F: Fn(CombinedFailure<E>) -> Result<(), CombinedFailure<E>> + Send + Sync + 'static,
    {
        self.escalate_action = Some(Arc::new(action));
        self
    }

    /// Set a custom clock (for testing).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the guard.
    ///
    /// Returns an error if the threshold is zero.
    pub fn build(self) -> Result<Guard<E>, BuildError> {
        if self.threshold == 0 {
            return Err(BuildError::ZeroThreshold);
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock::new()));
        let config = GuardConfig {
            eaten: self.eaten,
            threshold: self.threshold,
            digest_window: self.digest_window,
            observe_action: self.observe_action,
            digest_action: self.digest_action,
            escalate_action: self.escalate_action,
        };

        Ok(Guard::from_config(config, clock))
    }
}

impl<E: Failure> fmt::Debug for GuardBuilder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardBuilder")
            .field("eaten", &self.eaten)
            .field("threshold", &self.threshold)
            .field("digest_window", &self.digest_window)
            .field("observe_action", &self.observe_action.is_some())
            .field("digest_action", &self.digest_action.is_some())
            .field("escalate_action", &self.escalate_action.is_some())
            .field("clock", &self.clock)
            .finish()
    }
}

impl<E: Failure> Guard<E> {
    /// Create a builder for configuring a guard.
    ///
    /// # Example
    /// ```
    /// use fault_nom::{CombinedFailure, FailureKind, Guard};
    /// # use fault_nom::Failure;
    /// # use std::fmt;
    /// # #[derive(Debug)]
    /// # struct Timeout;
    /// # impl fmt::Display for Timeout {
    /// #     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "timeout") }
    /// # }
    /// # impl std::error::Error for Timeout {}
    /// # impl Failure for Timeout {
    /// #     fn kind(&self) -> FailureKind { FailureKind::from_path("io::timeout") }
    /// # }
    /// use std::time::Duration;
    ///
    /// let guard = Guard::<Timeout>::builder()
    ///     .eating("io")
    ///     .with_threshold(5)
    ///     .with_digest_window(Duration::from_secs(60))
    ///     .with_escalate_action(|combined: CombinedFailure<Timeout>| {
    ///         eprintln!("{}", combined);
    ///         Ok(())
    ///     })
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(guard.threshold(), 5);
    /// ```
    pub fn builder() -> GuardBuilder<E> {
        GuardBuilder::new()
    }

    /// Create a guard eating `eaten` with the given threshold and no
    /// callbacks.
    ///
    /// Equivalent to
    /// `Guard::builder().with_eaten_kinds(eaten).with_threshold(threshold).build()`.
    pub fn new(eaten: impl Into<EatenKinds>, threshold: usize) -> Result<Self, BuildError> {
        Self::builder()
            .with_eaten_kinds(eaten)
            .with_threshold(threshold)
            .build()
    }
}
