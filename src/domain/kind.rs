//! Failure kinds and kind selection.
//!
//! A failure kind is an explicit lineage path, root first. A kind is a
//! sub-kind of another when the other's lineage is a prefix of its own:
//!
//! ```text
//! io                 (root)
//! ├─ io::timeout     is-a io
//! └─ io::not_found   is-a io
//! ```
//!
//! Matching is done on this data, never on the concrete Rust type of the
//! failure value.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Separator used when rendering or parsing a kind path.
pub const KIND_SEPARATOR: &str = "::";

/// Identifier for a category of failure.
///
/// Cloning is cheap: the lineage is shared behind an `Arc`.
///
/// # Example
/// ```
/// use fault_nom::FailureKind;
///
/// let io = FailureKind::root("io");
/// let timeout = io.child("timeout");
///
/// assert!(timeout.is_a(&io));
/// assert!(!io.is_a(&timeout));
/// assert_eq!(timeout.to_string(), "io::timeout");
/// assert_eq!(FailureKind::from_path("io::timeout"), timeout);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FailureKind {
    lineage: Arc<[Cow<'static, str>]>,
}

impl FailureKind {
    /// Create a top-level kind with no parent.
    pub fn root(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            lineage: Arc::from(vec![name.into()]),
        }
    }

    /// Create a more specific kind below this one.
    pub fn child(&self, name: impl Into<Cow<'static, str>>) -> Self {
        let mut lineage = self.lineage.to_vec();
        lineage.push(name.into());
        Self {
            lineage: Arc::from(lineage),
        }
    }

    /// Parse a `::`-separated path such as `"io::timeout"`.
    ///
    /// Empty segments are skipped. A path with no non-empty segment becomes a
    /// root kind named after the whole input.
    pub fn from_path(path: &str) -> Self {
        let segments: Vec<Cow<'static, str>> = path
            .split(KIND_SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(|s| Cow::Owned(s.to_string()))
            .collect();

        if segments.is_empty() {
            return Self::root(path.to_string());
        }

        Self {
            lineage: Arc::from(segments),
        }
    }

    /// The most specific segment of the lineage.
    pub fn name(&self) -> &str {
        self.lineage.last().map(|s| s.as_ref()).unwrap_or_default()
    }

    /// The kind one level up, if any.
    pub fn parent(&self) -> Option<FailureKind> {
        if self.lineage.len() <= 1 {
            return None;
        }
        Some(Self {
            lineage: Arc::from(&self.lineage[..self.lineage.len() - 1]),
        })
    }

    /// Number of segments in the lineage (a root kind has depth 1).
    pub fn depth(&self) -> usize {
        self.lineage.len()
    }

    /// Iterate over the lineage segments, root first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.lineage.iter().map(|s| s.as_ref())
    }

    /// Check whether this kind is `ancestor` or a more specific sub-kind of it.
    pub fn is_a(&self, ancestor: &FailureKind) -> bool {
        self.lineage.len() >= ancestor.lineage.len()
            && self.lineage[..ancestor.lineage.len()] == ancestor.lineage[..]
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.lineage.iter().enumerate() {
            if i > 0 {
                f.write_str(KIND_SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl From<&'static str> for FailureKind {
    fn from(path: &'static str) -> Self {
        Self::from_path(path)
    }
}

/// Capability every guarded failure value exposes.
///
/// The kind returned here is the concrete kind of the value: it decides
/// whether the failure is eaten and which bucket it lands in.
///
/// # Example
/// ```
/// use fault_nom::{Failure, FailureKind};
/// use std::fmt;
///
/// #[derive(Debug)]
/// struct Timeout;
///
/// impl fmt::Display for Timeout {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "operation timed out")
///     }
/// }
///
/// impl std::error::Error for Timeout {}
///
/// impl Failure for Timeout {
///     fn kind(&self) -> FailureKind {
///         FailureKind::root("io").child("timeout")
///     }
/// }
/// ```
pub trait Failure: std::error::Error + Send + Sync + 'static {
    /// The concrete kind of this failure.
    fn kind(&self) -> FailureKind;
}

/// The set of kinds a guard intercepts.
///
/// A selection holds explicit kinds and an optional wildcard. A failure is
/// matched when the wildcard is set, or when its kind is one of the entries
/// or a sub-kind of one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EatenKinds {
    kinds: BTreeSet<FailureKind>,
    all: bool,
}

impl EatenKinds {
    /// A selection that matches nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// The wildcard selection, matching every kind.
    pub fn all() -> Self {
        Self {
            kinds: BTreeSet::new(),
            all: true,
        }
    }

    /// A selection of explicit kinds.
    pub fn of<I>(kinds: I) -> Self
    where
        I: IntoIterator<Item = FailureKind>,
    {
        Self {
            kinds: kinds.into_iter().collect(),
            all: false,
        }
    }

    /// Add one kind to the selection.
    pub fn with(mut self, kind: FailureKind) -> Self {
        self.kinds.insert(kind);
        self
    }

    /// Add the wildcard to the selection.
    pub fn with_all(mut self) -> Self {
        self.all = true;
        self
    }

    /// Check whether the wildcard is configured.
    pub fn eats_all(&self) -> bool {
        self.all
    }

    /// Check whether this selection can never match.
    pub fn is_empty(&self) -> bool {
        !self.all && self.kinds.is_empty()
    }

    /// Iterate over the explicit kinds.
    pub fn kinds(&self) -> impl Iterator<Item = &FailureKind> {
        self.kinds.iter()
    }

    /// Check whether a failure of `kind` is intercepted.
    pub fn matches(&self, kind: &FailureKind) -> bool {
        self.all || self.kinds.iter().any(|entry| kind.is_a(entry))
    }
}

impl From<FailureKind> for EatenKinds {
    fn from(kind: FailureKind) -> Self {
        Self::of([kind])
    }
}

impl From<Vec<FailureKind>> for EatenKinds {
    fn from(kinds: Vec<FailureKind>) -> Self {
        Self::of(kinds)
    }
}

impl FromIterator<FailureKind> for EatenKinds {
    fn from_iter<I: IntoIterator<Item = FailureKind>>(iter: I) -> Self {
        Self::of(iter)
    }
}
