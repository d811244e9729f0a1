//! Exclusively owned handle to a target process

use super::backend::{open_native, MemoryAccess};
use crate::core::types::{Address, MemoryError, MemoryResult, ProcessId};
use crate::memory::regions::MemoryRegion;
use std::fmt;
use tracing::{debug, warn};

/// Access rights requested when opening a process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessAccess {
    value: u32,
}

impl ProcessAccess {
    /// Read memory access
    pub const READ: Self = Self { value: 0x1 };
    /// Write memory access
    pub const WRITE: Self = Self { value: 0x2 };
    /// Query the memory map
    pub const QUERY: Self = Self { value: 0x4 };
    /// All of the above
    pub const ALL: Self = Self { value: 0x7 };

    /// Combine access rights
    pub fn combine(rights: &[Self]) -> Self {
        let mut value = 0;
        for right in rights {
            value |= right.value;
        }
        Self { value }
    }

    /// Whether every right in `other` is present
    pub fn contains(&self, other: Self) -> bool {
        self.value & other.value == other.value
    }

    /// Get raw value
    pub fn value(&self) -> u32 {
        self.value
    }
}

/// Handle to another (or the current) process.
///
/// The OS resource is released exactly once: by [`ProcessHandle::close`], or
/// on drop if the handle is still open. Every operation on a closed handle
/// fails with [`MemoryError::HandleClosed`].
pub struct ProcessHandle {
    pid: ProcessId,
    access: ProcessAccess,
    backend: Option<Box<dyn MemoryAccess>>,
}

impl ProcessHandle {
    /// Open a process for reading, writing and querying its memory
    pub fn open(pid: ProcessId) -> MemoryResult<Self> {
        Self::open_with(pid, ProcessAccess::ALL)
    }

    /// Open a process for reading memory only
    pub fn open_for_read(pid: ProcessId) -> MemoryResult<Self> {
        Self::open_with(
            pid,
            ProcessAccess::combine(&[ProcessAccess::READ, ProcessAccess::QUERY]),
        )
    }

    /// Open a process with specified access rights
    pub fn open_with(pid: ProcessId, access: ProcessAccess) -> MemoryResult<Self> {
        if pid == 0 {
            return Err(MemoryError::ProcessNotFound(pid));
        }

        let backend = open_native(pid, access)?;
        debug!(pid, access = access.value(), "Opened process");

        Ok(ProcessHandle {
            pid,
            access,
            backend: Some(backend),
        })
    }

    /// Wraps an already opened backend.
    ///
    /// Intended for tests and for embedders providing their own address space.
    #[doc(hidden)]
    pub fn from_backend(
        pid: ProcessId,
        access: ProcessAccess,
        backend: Box<dyn MemoryAccess>,
    ) -> Self {
        ProcessHandle {
            pid,
            access,
            backend: Some(backend),
        }
    }

    /// Releases the OS resource. A second call fails with `AlreadyClosed`.
    pub fn close(&mut self) -> MemoryResult<()> {
        let mut backend = self
            .backend
            .take()
            .ok_or(MemoryError::AlreadyClosed(self.pid))?;

        backend.close()?;
        debug!(pid = self.pid, "Closed process");
        Ok(())
    }

    /// Get the process ID
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Get the access rights
    pub fn access(&self) -> ProcessAccess {
        self.access
    }

    /// Whether the handle has not been closed yet
    pub fn is_open(&self) -> bool {
        self.backend.is_some()
    }

    fn backend(&self) -> MemoryResult<&dyn MemoryAccess> {
        self.backend
            .as_deref()
            .ok_or(MemoryError::HandleClosed(self.pid))
    }

    /// Fails with `HandleClosed` once the handle is closed
    pub fn ensure_open(&self) -> MemoryResult<()> {
        self.backend().map(|_| ())
    }

    /// Read memory from the process, returning the number of bytes read
    pub fn read_memory(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<usize> {
        let backend = self.backend()?;
        if !self.access.contains(ProcessAccess::READ) {
            return Err(MemoryError::access_denied(
                self.pid,
                "handle was opened without read access",
            ));
        }
        backend.read(address, buffer)
    }

    /// Write memory to the process, returning the number of bytes written
    pub fn write_memory(&self, address: Address, data: &[u8]) -> MemoryResult<usize> {
        let backend = self.backend()?;
        if !self.access.contains(ProcessAccess::WRITE) {
            return Err(MemoryError::access_denied(
                self.pid,
                "handle was opened without write access",
            ));
        }
        backend.write(address, data)
    }

    /// Raw memory map of the process, unfiltered and unordered
    pub fn regions(&self) -> MemoryResult<Vec<MemoryRegion>> {
        self.backend()?.regions()
    }

    /// The mapped region containing `address`
    pub fn region_at(&self, address: Address) -> MemoryResult<Option<MemoryRegion>> {
        self.backend()?.query(address)
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            if let Err(err) = backend.close() {
                warn!(pid = self.pid, error = %err, "Failed to release process handle");
            }
        }
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("open", &self.is_open())
            .field("access", &format!("0x{:X}", self.access.value()))
            .finish()
    }
}

impl fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProcessHandle(pid={}, open={})",
            self.pid,
            self.is_open()
        )
    }
}
