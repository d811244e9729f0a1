//! Linux and Android backend built on procfs
//!
//! The memory map comes from `/proc/<pid>/maps`; reads and writes go through
//! `pread`/`pwrite` on `/proc/<pid>/mem`, using the target address as the
//! file offset.

mod maps;
mod mem;

pub use maps::{parse_maps, read_maps};
pub use mem::LinuxProcess;

use crate::core::types::{MemoryError, ProcessId};
use std::io;

/// Maps a failure to open a procfs file of `pid`
fn open_error(pid: ProcessId, err: io::Error) -> MemoryError {
    match err.kind() {
        io::ErrorKind::NotFound => MemoryError::ProcessNotFound(pid),
        io::ErrorKind::PermissionDenied => MemoryError::access_denied(pid, err.to_string()),
        _ => MemoryError::Io(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_error_mapping() {
        let err = open_error(5, io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, MemoryError::ProcessNotFound(5)));

        let err = open_error(5, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, MemoryError::AccessDenied { pid: 5, .. }));

        let err = open_error(5, io::Error::from(io::ErrorKind::Interrupted));
        assert!(matches!(err, MemoryError::Io(_)));
    }
}
