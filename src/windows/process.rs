//! Process access through OpenProcess and the *ProcessMemory family

use super::bindings::kernel32;
use super::utils::ErrorCode;
use crate::core::types::{Address, MemoryError, MemoryResult, ProcessId};
use crate::memory::regions::{MemoryRegion, ProtectionFlags};
use crate::process::{MemoryAccess, ProcessAccess};
use std::ptr;
use tracing::trace;
use winapi::shared::minwindef::DWORD;
use winapi::um::winnt::{
    HANDLE, MEMORY_BASIC_INFORMATION, MEM_COMMIT, PROCESS_QUERY_INFORMATION, PROCESS_VM_OPERATION,
    PROCESS_VM_READ, PROCESS_VM_WRITE,
};

/// An open process handle owned by this value
pub struct WindowsProcess {
    pid: ProcessId,
    handle: HANDLE,
}

// HANDLEs are process-local kernel object references usable from any thread
unsafe impl Send for WindowsProcess {}
unsafe impl Sync for WindowsProcess {}

/// Windows access mask for the requested rights
fn desired_access(access: ProcessAccess) -> DWORD {
    let mut mask = PROCESS_QUERY_INFORMATION;
    if access.contains(ProcessAccess::READ) {
        mask |= PROCESS_VM_READ;
    }
    if access.contains(ProcessAccess::WRITE) {
        mask |= PROCESS_VM_WRITE | PROCESS_VM_OPERATION;
    }
    mask
}

impl WindowsProcess {
    /// Opens `pid` and checks that it has not already exited
    pub fn open(pid: ProcessId, access: ProcessAccess) -> MemoryResult<Self> {
        let handle =
            kernel32::open_process(pid, desired_access(access)).map_err(|code| match code {
                ErrorCode::AccessDenied => MemoryError::access_denied(pid, code.to_string()),
                _ => MemoryError::ProcessNotFound(pid),
            })?;

        // Owned from here on, so early returns release the handle
        let process = WindowsProcess { pid, handle };

        match unsafe { kernel32::exit_code(process.handle) } {
            Ok(kernel32::STILL_ACTIVE) => Ok(process),
            Ok(_) => Err(MemoryError::ProcessNotFound(pid)),
            Err(code) => Err(MemoryError::access_denied(pid, code.to_string())),
        }
    }

    fn raw(&self) -> MemoryResult<HANDLE> {
        if self.handle.is_null() {
            Err(MemoryError::HandleClosed(self.pid))
        } else {
            Ok(self.handle)
        }
    }

    /// A failed transfer against a process that has exited is reported as
    /// `ProcessNotFound`, whatever code the transfer itself returned
    fn has_exited(&self, handle: HANDLE) -> bool {
        !matches!(
            unsafe { kernel32::exit_code(handle) },
            Ok(kernel32::STILL_ACTIVE)
        )
    }

    fn read_error(&self, handle: HANDLE, address: Address, code: ErrorCode) -> MemoryError {
        if self.has_exited(handle) {
            return MemoryError::ProcessNotFound(self.pid);
        }
        match code {
            ErrorCode::AccessDenied => MemoryError::access_denied(self.pid, code.to_string()),
            _ => MemoryError::invalid_address(address, code.to_string()),
        }
    }

    fn write_error(&self, handle: HANDLE, address: Address, code: ErrorCode) -> MemoryError {
        if self.has_exited(handle) {
            return MemoryError::ProcessNotFound(self.pid);
        }
        match code {
            ErrorCode::AccessDenied | ErrorCode::NoAccess => MemoryError::ProtectedMemory(address),
            _ => MemoryError::invalid_address(address, code.to_string()),
        }
    }

    fn to_region(mbi: &MEMORY_BASIC_INFORMATION) -> MemoryRegion {
        MemoryRegion::new(
            Address::new(mbi.BaseAddress as usize),
            mbi.RegionSize,
            ProtectionFlags::from_windows(mbi.Protect),
        )
    }
}

impl MemoryAccess for WindowsProcess {
    fn read(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<usize> {
        if buffer.is_empty() {
            return Ok(0);
        }

        let handle = self.raw()?;
        unsafe { kernel32::read_process_memory(handle, address.as_usize(), buffer) }
            .map_err(|code| self.read_error(handle, address, code))
    }

    fn write(&self, address: Address, data: &[u8]) -> MemoryResult<usize> {
        if data.is_empty() {
            return Ok(0);
        }

        let handle = self.raw()?;
        unsafe { kernel32::write_process_memory(handle, address.as_usize(), data) }
            .map_err(|code| self.write_error(handle, address, code))
    }

    fn regions(&self) -> MemoryResult<Vec<MemoryRegion>> {
        let handle = self.raw()?;
        let mut regions = Vec::new();
        let mut address = 0usize;

        while let Some(mbi) = unsafe { kernel32::virtual_query_ex(handle, address) } {
            if mbi.State == MEM_COMMIT {
                regions.push(Self::to_region(&mbi));
            }

            let next = (mbi.BaseAddress as usize).checked_add(mbi.RegionSize);
            match next {
                Some(next) if next > address => address = next,
                _ => break,
            }
        }

        trace!(
            pid = self.pid,
            count = regions.len(),
            "Walked virtual memory"
        );
        Ok(regions)
    }

    fn query(&self, address: Address) -> MemoryResult<Option<MemoryRegion>> {
        let handle = self.raw()?;
        Ok(unsafe { kernel32::virtual_query_ex(handle, address.as_usize()) }
            .filter(|mbi| mbi.State == MEM_COMMIT)
            .map(|mbi| Self::to_region(&mbi)))
    }

    fn close(&mut self) -> MemoryResult<()> {
        let handle = self
            .raw()
            .map_err(|_| MemoryError::AlreadyClosed(self.pid))?;
        self.handle = ptr::null_mut();
        unsafe { kernel32::close_handle(handle) }
            .map_err(|code| {
                MemoryError::Unknown(format!("CloseHandle failed: {}", code))
            })
    }
}

impl Drop for WindowsProcess {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            let _ = self.close();
        }
    }
}
