//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and manages the runtime behavior:
//! - Bucket registry (per-kind bucket table)
//! - Guard (the eat, digest and escalate pipeline)
//! - Metrics (counters of guard decisions)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod guard;
pub mod metrics;
pub mod ports;
pub mod registry;
