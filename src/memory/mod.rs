//! Memory operations module for reading, writing and scanning process memory
//!
//! This module provides:
//! - Byte/value conversion ([`codec`])
//! - Typed single-address reads and writes
//! - Live memory-map enumeration
//! - Lazy value scanning

pub mod codec;
pub mod reader;
pub mod regions;
pub mod scanner;
pub mod writer;

pub use reader::MemoryReader;
pub use regions::{enumerate_regions, MemoryRegion, ProtectionFlags, RegionEnumerator};
pub use scanner::{MemoryScanner, ScanOptions, ScanProgress, Search, PAGE_SIZE};
pub use writer::MemoryWriter;

use crate::core::types::{Address, MemoryResult, MemoryValue, ScanPredicate, ScanType, ValueType};
use crate::process::ProcessHandle;

/// Owns a process handle and offers every memory operation on it
pub struct MemoryOperations {
    handle: ProcessHandle,
    options: ScanOptions,
}

impl MemoryOperations {
    /// Create new memory operations context for a process
    pub fn new(handle: ProcessHandle) -> Self {
        Self::with_options(handle, ScanOptions::default())
    }

    /// Context whose scans use `options`
    pub fn with_options(handle: ProcessHandle, options: ScanOptions) -> Self {
        MemoryOperations { handle, options }
    }

    /// Get the underlying handle
    pub fn handle(&self) -> &ProcessHandle {
        &self.handle
    }

    pub fn reader(&self) -> MemoryReader<'_> {
        MemoryReader::new(&self.handle)
    }

    pub fn writer(&self) -> MemoryWriter<'_> {
        MemoryWriter::new(&self.handle)
    }

    pub fn scanner(&self) -> MemoryScanner<'_> {
        MemoryScanner::with_options(&self.handle, self.options.clone())
    }

    /// Read a value from memory
    pub fn read(
        &self,
        address: Address,
        kind: ValueType,
        length: usize,
    ) -> MemoryResult<MemoryValue> {
        self.reader().read(address, kind, length)
    }

    /// Write a value to memory
    pub fn write(
        &self,
        address: Address,
        kind: ValueType,
        length: usize,
        value: &MemoryValue,
    ) -> MemoryResult<()> {
        self.writer().write(address, kind, length, value)
    }

    /// Lazily scan for values satisfying `predicate`
    pub fn search(
        &self,
        kind: ValueType,
        length: usize,
        predicate: &ScanPredicate,
    ) -> MemoryResult<Search<'_>> {
        self.scanner().search(kind, length, predicate)
    }

    pub fn search_by_value(
        &self,
        kind: ValueType,
        length: usize,
        value: impl Into<MemoryValue>,
        scan_type: ScanType,
    ) -> MemoryResult<Search<'_>> {
        self.scanner()
            .search_by_value(kind, length, value, scan_type)
    }

    pub fn search_by_value_between(
        &self,
        kind: ValueType,
        length: usize,
        lower: impl Into<MemoryValue>,
        upper: impl Into<MemoryValue>,
    ) -> MemoryResult<Search<'_>> {
        self.scanner()
            .search_by_value_between(kind, length, lower, upper)
    }

    /// Readable regions, ascending and non-overlapping
    pub fn regions(&self) -> MemoryResult<Vec<MemoryRegion>> {
        enumerate_regions(&self.handle)
    }

    /// Releases the process handle; see [`ProcessHandle::close`]
    pub fn close(&mut self) -> MemoryResult<()> {
        self.handle.close()
    }
}
