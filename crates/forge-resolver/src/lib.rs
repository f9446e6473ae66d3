//! Dependency resolution for Forge module releases
//!
//! Given a release, the resolver walks the declared-dependency graph,
//! accumulates the requirement specs every module is subject to and lists
//! the releases of each dependency that satisfy all of them. Resolution is a
//! fixed point over monotone per-module spec sets, so it terminates on cyclic
//! graphs and its result does not depend on the order work is processed in.

pub mod resolve;
pub mod state;

// Re-export main types
pub use resolve::{CandidateRelease, Resolution, ResolutionError, Resolver};
pub use state::{Fifo, Lifo, QueueOrder, ResolutionState};

/// Result type for resolver operations
pub type ResolverResult<T> = Result<T, ResolutionError>;
