//! Domain layer - pure types with no clock or storage access.
//!
//! This layer contains the core concepts and invariants of the guard:
//! - Failure kinds and the kind hierarchy
//! - Captured failure records
//! - Per-kind buckets and their anchor timestamps
//! - Combined failures produced on escalation
//! - Outcomes of a guarded bracket
//!
//! All types in this layer are pure and easily testable.

pub mod bucket;
pub mod combined;
pub mod kind;
pub mod outcome;
pub mod record;
