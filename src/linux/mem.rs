//! `/proc/<pid>/mem` access

use super::{maps, open_error};
use crate::core::types::{Address, MemoryError, MemoryResult, ProcessId};
use crate::memory::regions::MemoryRegion;
use crate::process::{MemoryAccess, ProcessAccess};
use nix::errno::Errno;
use nix::libc::off_t;
use nix::sys::signal::kill;
use nix::sys::uio::{pread, pwrite};
use nix::unistd::Pid;
use std::fs::{File, OpenOptions};
use std::io::{self, Read};

/// An opened `/proc/<pid>/mem` descriptor
pub struct LinuxProcess {
    pid: ProcessId,
    mem: Option<File>,
}

impl LinuxProcess {
    /// Checks that `pid` is alive and opens its memory file.
    ///
    /// The kernel applies the ptrace access check on open, so permission
    /// problems surface here rather than on the first read.
    pub fn open(pid: ProcessId, access: ProcessAccess) -> MemoryResult<Self> {
        let raw = i32::try_from(pid).map_err(|_| MemoryError::ProcessNotFound(pid))?;

        match kill(Pid::from_raw(raw), None) {
            Ok(()) | Err(Errno::EPERM) => {}
            Err(Errno::ESRCH) => return Err(MemoryError::ProcessNotFound(pid)),
            Err(errno) => return Err(io::Error::from(errno).into()),
        }

        let mem = OpenOptions::new()
            .read(true)
            .write(access.contains(ProcessAccess::WRITE))
            .open(format!("/proc/{}/mem", pid))
            .map_err(|err| open_error(pid, err))?;

        Ok(LinuxProcess {
            pid,
            mem: Some(mem),
        })
    }

    fn file(&self) -> MemoryResult<&File> {
        self.mem.as_ref().ok_or(MemoryError::HandleClosed(self.pid))
    }

    /// Fails with `ProcessNotFound` once the target has exited.
    ///
    /// A zombie still answers `kill` but no longer has an address space, which
    /// shows as an empty memory map.
    fn ensure_alive(&self) -> MemoryResult<()> {
        let raw = i32::try_from(self.pid).map_err(|_| MemoryError::ProcessNotFound(self.pid))?;
        if kill(Pid::from_raw(raw), None) == Err(Errno::ESRCH) {
            return Err(MemoryError::ProcessNotFound(self.pid));
        }

        let mut maps = match File::open(format!("/proc/{}/maps", self.pid)) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(MemoryError::ProcessNotFound(self.pid))
            }
            Err(_) => return Ok(()),
        };
        let mut first = [0u8; 1];
        match maps.read(&mut first) {
            Ok(0) => Err(MemoryError::ProcessNotFound(self.pid)),
            _ => Ok(()),
        }
    }

    /// An empty transfer means an unmapped address or a target that is gone
    fn checked_count(&self, count: usize) -> MemoryResult<usize> {
        if count == 0 {
            self.ensure_alive()?;
        }
        Ok(count)
    }

    fn transfer_error(&self, address: Address, errno: Errno) -> MemoryError {
        match errno {
            Errno::EIO | Errno::EFAULT => match self.ensure_alive() {
                Ok(()) => MemoryError::invalid_address(address, errno.desc()),
                Err(err) => err,
            },
            Errno::ESRCH => MemoryError::ProcessNotFound(self.pid),
            Errno::EPERM | Errno::EACCES => MemoryError::access_denied(self.pid, errno.desc()),
            other => MemoryError::Io(io::Error::from(other)),
        }
    }
}

/// The file offset for `address`; addresses beyond `off_t` are never mapped
fn offset(address: Address) -> MemoryResult<off_t> {
    off_t::try_from(address.as_usize()).map_err(|_| {
        MemoryError::invalid_address(address, "beyond the addressable file offset range")
    })
}

impl MemoryAccess for LinuxProcess {
    fn read(&self, address: Address, buffer: &mut [u8]) -> MemoryResult<usize> {
        if buffer.is_empty() {
            return Ok(0);
        }

        let offset = offset(address)?;
        let read = pread(self.file()?, buffer, offset)
            .map_err(|errno| self.transfer_error(address, errno))?;
        self.checked_count(read)
    }

    fn write(&self, address: Address, data: &[u8]) -> MemoryResult<usize> {
        if data.is_empty() {
            return Ok(0);
        }

        let offset = offset(address)?;
        let written = pwrite(self.file()?, data, offset)
            .map_err(|errno| self.transfer_error(address, errno))?;
        self.checked_count(written)
    }

    fn regions(&self) -> MemoryResult<Vec<MemoryRegion>> {
        self.file()?;
        maps::read_maps(self.pid)
    }

    fn close(&mut self) -> MemoryResult<()> {
        self.mem
            .take()
            .map(drop)
            .ok_or(MemoryError::AlreadyClosed(self.pid))
    }
}
