//! Core module containing fundamental types for Memory-Editor
//!
//! This module provides the foundational building blocks used throughout
//! the crate, including address handling, memory values, scan predicates,
//! and error types.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    Address, MemoryError, MemoryResult, MemoryValue, ProcessId, ScanPredicate, ScanType,
    ValueType,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

// Platform verification at compile time
#[cfg(not(any(windows, target_os = "linux", target_os = "android")))]
compile_error!("Memory-Editor only supports Windows, Linux and Android");
