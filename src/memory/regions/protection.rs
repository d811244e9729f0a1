//! Page protection of a memory region

use serde::{Deserialize, Serialize};
use std::fmt;

/// Read/write/execute capability set of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ProtectionFlags {
    value: u8,
}

impl ProtectionFlags {
    pub const READ: u8 = 0x1;
    pub const WRITE: u8 = 0x2;
    pub const EXECUTE: u8 = 0x4;

    // Windows PAGE_* constants
    const PAGE_NOACCESS: u32 = 0x01;
    const PAGE_READONLY: u32 = 0x02;
    const PAGE_READWRITE: u32 = 0x04;
    const PAGE_WRITECOPY: u32 = 0x08;
    const PAGE_EXECUTE: u32 = 0x10;
    const PAGE_EXECUTE_READ: u32 = 0x20;
    const PAGE_EXECUTE_READWRITE: u32 = 0x40;
    const PAGE_EXECUTE_WRITECOPY: u32 = 0x80;
    const PAGE_GUARD: u32 = 0x100;

    /// Create new protection flags from READ/WRITE/EXECUTE bits
    pub const fn new(value: u8) -> Self {
        ProtectionFlags {
            value: value & (Self::READ | Self::WRITE | Self::EXECUTE),
        }
    }

    /// No access protection
    pub const fn no_access() -> Self {
        ProtectionFlags::new(0)
    }

    /// Read-only protection
    pub const fn read_only() -> Self {
        ProtectionFlags::new(Self::READ)
    }

    /// Read-write protection
    pub const fn read_write() -> Self {
        ProtectionFlags::new(Self::READ | Self::WRITE)
    }

    /// Execute-read protection
    pub const fn execute_read() -> Self {
        ProtectionFlags::new(Self::READ | Self::EXECUTE)
    }

    /// Parses the permission column of `/proc/<pid>/maps`, e.g. `rw-p`
    pub fn from_maps(perms: &str) -> Self {
        let bytes = perms.as_bytes();
        let mut value = 0;
        if bytes.first() == Some(&b'r') {
            value |= Self::READ;
        }
        if bytes.get(1) == Some(&b'w') {
            value |= Self::WRITE;
        }
        if bytes.get(2) == Some(&b'x') {
            value |= Self::EXECUTE;
        }
        ProtectionFlags::new(value)
    }

    /// Converts a Windows `PAGE_*` protection value.
    ///
    /// Guard pages fault on first touch and are reported as inaccessible.
    pub fn from_windows(protect: u32) -> Self {
        if protect & (Self::PAGE_GUARD | Self::PAGE_NOACCESS) != 0 {
            return Self::no_access();
        }

        let mut value = 0;
        if protect
            & (Self::PAGE_READONLY
                | Self::PAGE_READWRITE
                | Self::PAGE_WRITECOPY
                | Self::PAGE_EXECUTE_READ
                | Self::PAGE_EXECUTE_READWRITE
                | Self::PAGE_EXECUTE_WRITECOPY)
            != 0
        {
            value |= Self::READ;
        }
        if protect
            & (Self::PAGE_READWRITE
                | Self::PAGE_WRITECOPY
                | Self::PAGE_EXECUTE_READWRITE
                | Self::PAGE_EXECUTE_WRITECOPY)
            != 0
        {
            value |= Self::WRITE;
        }
        if protect
            & (Self::PAGE_EXECUTE
                | Self::PAGE_EXECUTE_READ
                | Self::PAGE_EXECUTE_READWRITE
                | Self::PAGE_EXECUTE_WRITECOPY)
            != 0
        {
            value |= Self::EXECUTE;
        }
        ProtectionFlags::new(value)
    }

    /// Check if protection allows reading
    pub const fn is_readable(&self) -> bool {
        self.value & Self::READ != 0
    }

    /// Check if protection allows writing
    pub const fn is_writable(&self) -> bool {
        self.value & Self::WRITE != 0
    }

    /// Check if protection allows execution
    pub const fn is_executable(&self) -> bool {
        self.value & Self::EXECUTE != 0
    }

    /// Get the raw protection bits
    pub const fn raw(&self) -> u8 {
        self.value
    }
}

impl fmt::Display for ProtectionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |set: bool, c: char| if set { c } else { '-' };
        write!(
            f,
            "{}{}{}",
            flag(self.is_readable(), 'r'),
            flag(self.is_writable(), 'w'),
            flag(self.is_executable(), 'x')
        )
    }
}
