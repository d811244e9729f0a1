//! Memory-Editor library: read, write and scan the memory of running processes

pub mod config;
pub mod core;
pub mod memory;
pub mod process;

#[cfg(windows)]
pub mod windows;

#[cfg(any(target_os = "linux", target_os = "android"))]
pub mod linux;

#[doc(hidden)]
pub mod testing;

// Re-export main types from core module
pub use core::types::{
    Address, MemoryError, MemoryResult, MemoryValue, ProcessId, ScanPredicate, ScanType, ValueType,
};

pub use memory::{
    MemoryOperations, MemoryReader, MemoryRegion, MemoryScanner, MemoryWriter, ScanOptions,
    ScanProgress, Search,
};
pub use process::{MemoryAccess, ProcessAccess, ProcessHandle};

// Re-export core directly for full access
pub use core::*;
