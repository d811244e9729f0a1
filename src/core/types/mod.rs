//! Core type definitions for Memory-Editor
//!
//! This module contains the fundamental types used throughout the crate:
//! addresses, typed memory values, scan predicates and error types.

mod address;
mod error;
mod scan;
mod value;

// Re-export all public types
pub use address::Address;
pub use error::{MemoryError, MemoryResult};
pub use scan::{ScanPredicate, ScanType};
pub use value::{MemoryValue, ValueType};

// Common type aliases
pub type ProcessId = u32;
