//! Memory region enumeration functionality

use super::ProtectionFlags;
use crate::core::types::{Address, MemoryResult};
use crate::process::ProcessHandle;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// A mapped range of the target's address space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRegion {
    /// Base address of the region
    pub base_address: Address,
    /// Size of the region in bytes
    pub size: usize,
    /// Protection flags for the region
    pub protection: ProtectionFlags,
    /// Backing file or pseudo-path (`[heap]`, `[stack]`) when the OS reports one
    pub path: Option<String>,
}

impl MemoryRegion {
    pub fn new(base_address: Address, size: usize, protection: ProtectionFlags) -> Self {
        MemoryRegion {
            base_address,
            size,
            protection,
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Get the end address (exclusive) of the region
    pub fn end_address(&self) -> Address {
        Address::new(self.base_address.as_usize().saturating_add(self.size))
    }

    /// Check if an address is within this region
    pub fn contains(&self, address: Address) -> bool {
        address >= self.base_address && address < self.end_address()
    }

    pub fn is_readable(&self) -> bool {
        self.protection.is_readable()
    }

    pub fn is_writable(&self) -> bool {
        self.protection.is_writable()
    }

    /// The part of the region inside `[start, end)`, if any
    pub fn clip(&self, start: Address, end: Address) -> Option<MemoryRegion> {
        let base = self.base_address.max(start);
        let stop = self.end_address().min(end);
        if base >= stop {
            return None;
        }

        Some(MemoryRegion {
            base_address: base,
            size: stop.as_usize() - base.as_usize(),
            protection: self.protection,
            path: self.path.clone(),
        })
    }
}

/// Produces the readable regions of a process, ascending and non-overlapping
pub struct RegionEnumerator<'a> {
    handle: &'a ProcessHandle,
    start_address: Address,
    max_address: Address,
    writable_only: bool,
}

impl<'a> RegionEnumerator<'a> {
    /// Create a new region enumerator for a process
    pub fn new(handle: &'a ProcessHandle) -> Self {
        RegionEnumerator {
            handle,
            start_address: Address::null(),
            max_address: Address::new(usize::MAX),
            writable_only: false,
        }
    }

    /// Set the starting address for enumeration
    pub fn set_start_address(&mut self, address: Address) {
        self.start_address = address;
    }

    /// Set the maximum (exclusive) address for enumeration
    pub fn set_max_address(&mut self, address: Address) {
        self.max_address = address;
    }

    /// Keep only regions that are writable as well as readable
    pub fn set_writable_only(&mut self, writable_only: bool) {
        self.writable_only = writable_only;
    }

    /// Queries the live memory map. Never cached: every call asks the OS again.
    pub fn enumerate(&self) -> MemoryResult<Vec<MemoryRegion>> {
        let mut mapped = self.handle.regions()?;
        let total = mapped.len();

        mapped.retain(|region| {
            region.size > 0 && region.is_readable() && (!self.writable_only || region.is_writable())
        });
        mapped.sort_by_key(|region| region.base_address);

        let mut regions: Vec<MemoryRegion> = Vec::with_capacity(mapped.len());
        let mut covered = self.start_address;

        for region in mapped {
            // Overlapping reports are trimmed so every byte is covered once.
            let Some(region) = region.clip(covered, self.max_address) else {
                trace!(
                    base = %region.base_address,
                    size = region.size,
                    "Skipping region outside range"
                );
                continue;
            };
            covered = region.end_address();
            regions.push(region);
        }

        debug!(
            pid = self.handle.pid(),
            mapped = total,
            readable = regions.len(),
            "Enumerated memory regions"
        );

        Ok(regions)
    }
}

/// Enumerate the readable memory regions of a process
pub fn enumerate_regions(handle: &ProcessHandle) -> MemoryResult<Vec<MemoryRegion>> {
    RegionEnumerator::new(handle).enumerate()
}
