//! The OS memory-access contract every platform backend implements

use crate::core::types::{Address, MemoryResult, ProcessId};
use crate::memory::regions::MemoryRegion;
use crate::process::ProcessAccess;

/// Raw access to the address space of one opened process.
///
/// Implementations report OS failures with the crate's error taxonomy:
/// unmapped or unreadable addresses as `InvalidAddress`, a vanished target as
/// `ProcessNotFound`. Short transfers are returned as a smaller byte count,
/// never as an error.
pub trait MemoryAccess: Send + Sync {
    /// Reads up to `buffer.len()` bytes at `address`
    fn read(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<usize>;

    /// Writes up to `data.len()` bytes at `address`
    fn write(&self, address: Address, data: &[u8]) -> MemoryResult<usize>;

    /// Every region currently mapped in the target, in any order
    fn regions(&self) -> MemoryResult<Vec<MemoryRegion>>;

    /// The mapped region containing `address`, if any
    fn query(&self, address: Address) -> MemoryResult<Option<MemoryRegion>> {
        Ok(self
            .regions()?
            .into_iter()
            .find(|region| region.contains(address)))
    }

    /// Releases the OS resource
    fn close(&mut self) -> MemoryResult<()>;
}

/// Opens `pid` with the backend native to the current platform
pub(crate) fn open_native(
    pid: ProcessId,
    access: ProcessAccess,
) -> MemoryResult<Box<dyn MemoryAccess>> {
    #[cfg(windows)]
    let process = crate::windows::WindowsProcess::open(pid, access)?;

    #[cfg(any(target_os = "linux", target_os = "android"))]
    let process = crate::linux::LinuxProcess::open(pid, access)?;

    Ok(Box::new(process))
}
