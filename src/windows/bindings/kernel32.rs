//! Kernel32.dll bindings for process and memory operations
//!
//! Each wrapper returns the thread's last error code on failure and leaves
//! the translation into `MemoryError` to the caller.

use crate::windows::utils::ErrorCode;
use std::mem;
use winapi::shared::minwindef::{DWORD, FALSE, LPCVOID, LPVOID};
use winapi::um::handleapi::CloseHandle;
use winapi::um::memoryapi::{ReadProcessMemory, VirtualQueryEx, WriteProcessMemory};
use winapi::um::processthreadsapi::{GetExitCodeProcess, OpenProcess};
use winapi::um::winnt::{HANDLE, MEMORY_BASIC_INFORMATION};

/// Exit code reported for a process that has not terminated
pub const STILL_ACTIVE: DWORD = 259;

/// Safe wrapper for OpenProcess
pub fn open_process(pid: u32, desired_access: DWORD) -> Result<HANDLE, ErrorCode> {
    let handle = unsafe { OpenProcess(desired_access, FALSE, pid) };
    if handle.is_null() {
        Err(ErrorCode::last_error())
    } else {
        Ok(handle)
    }
}

/// Safe wrapper for CloseHandle
///
/// # Safety
/// The handle must be a valid Windows handle that is not used afterwards
pub unsafe fn close_handle(handle: HANDLE) -> Result<(), ErrorCode> {
    if handle.is_null() {
        return Ok(());
    }

    if CloseHandle(handle) == FALSE {
        Err(ErrorCode::last_error())
    } else {
        Ok(())
    }
}

/// Safe wrapper for GetExitCodeProcess
///
/// # Safety
/// The handle must be a valid process handle with query access
pub unsafe fn exit_code(handle: HANDLE) -> Result<DWORD, ErrorCode> {
    let mut code: DWORD = 0;
    if GetExitCodeProcess(handle, &mut code) == FALSE {
        Err(ErrorCode::last_error())
    } else {
        Ok(code)
    }
}

/// Safe wrapper for ReadProcessMemory.
///
/// A partial copy that transferred some bytes is reported as success with
/// the shorter count.
///
/// # Safety
/// The handle must be a valid process handle with appropriate access rights
pub unsafe fn read_process_memory(
    handle: HANDLE,
    address: usize,
    buffer: &mut [u8],
) -> Result<usize, ErrorCode> {
    let mut bytes_read = 0;

    let result = ReadProcessMemory(
        handle,
        address as LPCVOID,
        buffer.as_mut_ptr() as LPVOID,
        buffer.len(),
        &mut bytes_read,
    );

    if result == FALSE {
        match ErrorCode::last_error() {
            ErrorCode::PartialCopy if bytes_read > 0 => Ok(bytes_read),
            code => Err(code),
        }
    } else {
        Ok(bytes_read)
    }
}

/// Safe wrapper for WriteProcessMemory
///
/// # Safety
/// The handle must be a valid process handle with appropriate access rights
pub unsafe fn write_process_memory(
    handle: HANDLE,
    address: usize,
    data: &[u8],
) -> Result<usize, ErrorCode> {
    let mut bytes_written = 0;

    let result = WriteProcessMemory(
        handle,
        address as LPVOID,
        data.as_ptr() as LPCVOID,
        data.len(),
        &mut bytes_written,
    );

    if result == FALSE {
        match ErrorCode::last_error() {
            ErrorCode::PartialCopy if bytes_written > 0 => Ok(bytes_written),
            code => Err(code),
        }
    } else {
        Ok(bytes_written)
    }
}

/// Safe wrapper for VirtualQueryEx. `None` once `address` is past the end
/// of the user address space.
///
/// # Safety
/// The handle must be a valid process handle with query access
pub unsafe fn virtual_query_ex(handle: HANDLE, address: usize) -> Option<MEMORY_BASIC_INFORMATION> {
    let mut mbi: MEMORY_BASIC_INFORMATION = mem::zeroed();

    let result = VirtualQueryEx(
        handle,
        address as LPCVOID,
        &mut mbi,
        mem::size_of::<MEMORY_BASIC_INFORMATION>(),
    );

    if result == 0 {
        None
    } else {
        Some(mbi)
    }
}
