//! Module registry for Forge
//!
//! This crate provides the [`Registry`] abstraction the resolver consumes, an
//! in-memory registry populated from JSON snapshots, and the catalog queries
//! (module summaries, search, release lookup) served on top of it.

pub mod api;
pub mod catalog;
pub mod memory;
pub mod snapshot;

// Re-export main types
pub use api::{ModuleRecord, ModuleSummary, ReleaseRecord, ReleaseSummary, SnapshotFile};
pub use catalog::{module_summary, release_for, search};
pub use memory::MemoryRegistry;
pub use snapshot::{load_snapshot, parse_snapshot};

use forge_core::error::ForgeError;
use forge_core::{Module, Release};

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, ForgeError>;

/// Read access to the module store.
///
/// Implementations hand out owned values so callers never hold a lock on the
/// store between calls.
pub trait Registry: Send + Sync {
    /// Look a module up by its `author/module` name.
    ///
    /// Fails with [`ForgeError::ModuleNotFound`] when no such module exists.
    fn find_module_by_legacy_name(&self, name: &str) -> RegistryResult<Module>;

    /// All releases of `module`, in no particular order
    fn list_releases(&self, module: &Module) -> RegistryResult<Vec<Release>>;

    /// Every module in the registry, ordered by author then name
    fn list_modules(&self) -> RegistryResult<Vec<Module>>;
}
