//! Forge benchmarking suite
//!
//! Benchmarks for requirement parsing, snapshot loading, archive hashing
//! and dependency resolution over synthetic registries.

pub mod common;

pub use common::*;
