//! Utility functions and helpers.
//!
//! Common functionality used across multiple Forge crates.

pub mod hash;
pub mod path;

// Re-export commonly used utilities
pub use hash::blake3_hash;
pub use path::{is_safe_path, tarball_locator};
