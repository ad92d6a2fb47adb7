//! Outcomes of a guarded bracket.

use crate::domain::combined::CombinedFailure;
use crate::domain::kind::{Failure, FailureKind};
use std::error::Error;
use std::fmt;

/// What happened when a bracket exited.
///
/// `Suppressed`, `Digested` and `Absorbed` are the handled outcomes: the
/// original failure must not propagate. `PassThrough` and `Escalated` carry
/// the failure the caller has to propagate.
#[derive(Debug)]
#[must_use = "a pass-through or escalated failure must be propagated"]
pub enum Outcome<E> {
    /// The unit of work completed without a failure
    Completed,
    /// The failure's kind is not eaten; propagate it unmodified
    PassThrough(E),
    /// The failure was eaten and its bucket is below the threshold
    Suppressed,
    /// The bucket's flush window elapsed and every record was digested
    Digested,
    /// The bucket saturated and the escalate action took the combined failure
    Absorbed,
    /// The bucket saturated; propagate the combined failure instead
    Escalated(CombinedFailure<E>),
}

impl<E> Outcome<E> {
    /// Check whether the guard handled a failure.
    pub fn is_handled(&self) -> bool {
        matches!(
            self,
            Outcome::Suppressed | Outcome::Digested | Outcome::Absorbed
        )
    }

    /// Check whether a failure must leave the bracket.
    pub fn is_escaping(&self) -> bool {
        matches!(self, Outcome::PassThrough(_) | Outcome::Escalated(_))
    }

    /// Convert into the failure that leaves the bracket, if any.
    pub fn into_escaped(self) -> Option<Escaped<E>> {
        match self {
            Outcome::PassThrough(failure) => Some(Escaped::Original(failure)),
            Outcome::Escalated(combined) => Some(Escaped::Combined(combined)),
            Outcome::Completed | Outcome::Suppressed | Outcome::Digested | Outcome::Absorbed => {
                None
            }
        }
    }

    /// Convert into a `Result` so the escaping failure can be propagated with `?`.
    pub fn into_result(self) -> Result<(), Escaped<E>> {
        match self.into_escaped() {
            Some(escaped) => Err(escaped),
            None => Ok(()),
        }
    }
}

/// A failure leaving a guarded bracket.
#[derive(Debug)]
pub enum Escaped<E> {
    /// A failure whose kind is not eaten, unmodified
    Original(E),
    /// Every record of a saturated bucket
    Combined(CombinedFailure<E>),
}

impl<E: Failure> Escaped<E> {
    /// Kind of the escaping failure.
    pub fn kind(&self) -> FailureKind {
        match self {
            Escaped::Original(failure) => failure.kind(),
            Escaped::Combined(combined) => combined.kind().clone(),
        }
    }

    /// Check whether the escaping failure is of `kind` or a sub-kind of it.
    pub fn is_kind(&self, kind: &FailureKind) -> bool {
        self.kind().is_a(kind)
    }
}

impl<E> Escaped<E> {
    /// The combined failure, if this is an escalation.
    pub fn as_combined(&self) -> Option<&CombinedFailure<E>> {
        match self {
            Escaped::Combined(combined) => Some(combined),
            Escaped::Original(_) => None,
        }
    }
}

impl<E: Failure> fmt::Display for Escaped<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Escaped::Original(failure) => write!(f, "{}", failure),
            Escaped::Combined(combined) => write!(f, "escalated: {}", combined),
        }
    }
}

impl<E: Failure> Error for Escaped<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Escaped::Original(failure) => failure.source(),
            Escaped::Combined(combined) => Some(combined),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::record::FailureRecord;
    use std::time::Instant;

    #[derive(Debug, PartialEq)]
    struct Eof;

    impl fmt::Display for Eof {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "unexpected end of input")
        }
    }

    impl Error for Eof {}

    impl Failure for Eof {
        fn kind(&self) -> FailureKind {
            FailureKind::root("eof")
        }
    }

    fn escalated() -> Outcome<Eof> {
        let records = vec![
            FailureRecord::new(Eof, Instant::now()),
            FailureRecord::new(Eof, Instant::now()),
        ];
        Outcome::Escalated(CombinedFailure::new(FailureKind::root("eof"), records))
    }

    #[test]
    fn test_handled_outcomes() {
        assert!(Outcome::<Eof>::Suppressed.is_handled());
        assert!(Outcome::<Eof>::Digested.is_handled());
        assert!(Outcome::<Eof>::Absorbed.is_handled());
        assert!(!Outcome::<Eof>::Completed.is_handled());
        assert!(!Outcome::PassThrough(Eof).is_handled());
        assert!(!escalated().is_handled());
    }

    #[test]
    fn test_escaping_outcomes() {
        assert!(Outcome::PassThrough(Eof).is_escaping());
        assert!(escalated().is_escaping());
        assert!(!Outcome::<Eof>::Completed.is_escaping());
        assert!(!Outcome::<Eof>::Suppressed.is_escaping());
    }

    #[test]
    fn test_into_result() {
        assert!(Outcome::<Eof>::Completed.into_result().is_ok());
        assert!(Outcome::<Eof>::Digested.into_result().is_ok());

        match Outcome::PassThrough(Eof).into_result() {
            Err(Escaped::Original(failure)) => assert_eq!(failure, Eof),
            other => panic!("expected pass-through, got {:?}", other),
        }

        match escalated().into_result() {
            Err(Escaped::Combined(combined)) => assert_eq!(combined.len(), 2),
            other => panic!("expected escalation, got {:?}", other),
        }
    }

    #[test]
    fn test_escaped_kind() {
        let escaped = escalated().into_escaped().unwrap();
        assert_eq!(escaped.kind(), FailureKind::root("eof"));
        assert!(escaped.is_kind(&FailureKind::root("eof")));
        assert!(escaped.as_combined().is_some());
        assert!(escaped.source().is_some());
    }

    #[test]
    fn test_escaped_display() {
        let escaped: Escaped<Eof> = Escaped::Original(Eof);
        assert_eq!(escaped.to_string(), "unexpected end of input");

        let text = escalated().into_escaped().unwrap().to_string();
        assert!(text.starts_with("escalated: 2 `eof` failures"));
    }
}
