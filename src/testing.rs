//! Synthetic address space for tests and embedders

use crate::core::types::{Address, MemoryError, MemoryResult, ProcessId};
use crate::memory::regions::{MemoryRegion, ProtectionFlags};
use crate::process::{MemoryAccess, ProcessAccess, ProcessHandle};
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct FakeRegion {
    base: usize,
    data: Vec<u8>,
    protection: ProtectionFlags,
}

/// A process made of byte vectors.
///
/// Reads inside a hole stop like a page that became unmapped after the memory
/// map was taken; reads inside a vanished range fail as if the process had
/// exited.
pub struct FakeProcess {
    pid: ProcessId,
    regions: Mutex<Vec<FakeRegion>>,
    holes: Vec<Range<usize>>,
    vanished: Option<Range<usize>>,
    closes: Arc<AtomicUsize>,
}

impl Default for FakeProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeProcess {
    pub fn new() -> Self {
        FakeProcess {
            pid: 0,
            regions: Mutex::new(Vec::new()),
            holes: Vec::new(),
            vanished: None,
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_region(self, base: usize, data: Vec<u8>, writable: bool) -> Self {
        let protection = if writable {
            ProtectionFlags::read_write()
        } else {
            ProtectionFlags::read_only()
        };
        self.with_protection(base, data, protection)
    }

    pub fn with_protection(
        self,
        base: usize,
        data: Vec<u8>,
        protection: ProtectionFlags,
    ) -> Self {
        self.lock().push(FakeRegion {
            base,
            data,
            protection,
        });
        self
    }

    pub fn with_hole(mut self, hole: Range<usize>) -> Self {
        self.holes.push(hole);
        self
    }

    pub fn vanishing_at(mut self, range: Range<usize>) -> Self {
        self.vanished = Some(range);
        self
    }

    /// Counts how often the OS resource was released
    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closes)
    }

    pub fn into_handle(mut self, pid: ProcessId) -> ProcessHandle {
        self.pid = pid;
        ProcessHandle::from_backend(pid, ProcessAccess::ALL, Box::new(self))
    }

    fn lock(&self) -> MutexGuard<'_, Vec<FakeRegion>> {
        self.regions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn in_hole(&self, address: usize) -> bool {
        self.holes.iter().any(|hole| hole.contains(&address))
    }
}

impl MemoryAccess for FakeProcess {
    fn read(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<usize> {
        let start = address.as_usize();
        if self
            .vanished
            .as_ref()
            .is_some_and(|range| range.contains(&start))
        {
            return Err(MemoryError::ProcessNotFound(self.pid));
        }

        let regions = self.lock();
        let region = regions
            .iter()
            .find(|r| start >= r.base && start < r.base + r.data.len())
            .ok_or_else(|| MemoryError::invalid_address(address, "unmapped"))?;

        let mut copied = 0;
        while copied < buffer.len() {
            let at = start + copied;
            if at >= region.base + region.data.len() || self.in_hole(at) {
                break;
            }
            buffer[copied] = region.data[at - region.base];
            copied += 1;
        }

        if copied == 0 {
            return Err(MemoryError::invalid_address(address, "unreadable"));
        }
        Ok(copied)
    }

    fn write(&self, address: Address, data: &[u8]) -> MemoryResult<usize> {
        let mut regions = self.lock();
        let start = address.as_usize();
        let region = regions
            .iter_mut()
            .find(|r| start >= r.base && start < r.base + r.data.len())
            .ok_or_else(|| MemoryError::invalid_address(address, "unmapped"))?;

        let count = (region.base + region.data.len() - start).min(data.len());
        let offset = start - region.base;
        region.data[offset..offset + count].copy_from_slice(&data[..count]);
        Ok(count)
    }

    fn regions(&self) -> MemoryResult<Vec<MemoryRegion>> {
        Ok(self
            .lock()
            .iter()
            .map(|r| {
                MemoryRegion::new(Address::new(r.base), r.data.len(), r.protection)
            })
            .collect())
    }

    fn close(&mut self) -> MemoryResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// `size` zero bytes with native-endian i32 `values` at the given offsets
pub fn ints(size: usize, values: &[(usize, i32)]) -> Vec<u8> {
    let mut data = vec![0u8; size];
    for &(offset, value) in values {
        data[offset..offset + 4].copy_from_slice(&value.to_ne_bytes());
    }
    data
}
